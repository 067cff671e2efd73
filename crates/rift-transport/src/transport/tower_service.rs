//! `tower::Service` adapter so a [`Transport`] can stand in for an HTTP client.

use super::Transport;
use crate::error::{BoxError, Error, Result};
use bytes::Bytes;
use futures::future::BoxFuture;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::{Request, Response};
use std::task::{Context, Poll};

/// Buffers the request body once, then dispatches synchronously.
impl<B> tower::Service<Request<B>> for Transport
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = Response<Full<Bytes>>;
    type Error = Error;
    type Future = BoxFuture<'static, Result<Self::Response>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(err) => return Err(Error::ReadBody(err.into())),
            };
            transport.dispatch(Request::from_parts(parts, body))
        })
    }
}
