use anyhow::Context;
use bytes::Bytes;
use clap::Parser;
use hyper::{Request, StatusCode};
use rift_transport::{read_body, LogSink, RoutesConfig, NO_ROUTE_BODY};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Resolve one request against a routes file and print the response.
#[derive(Parser, Debug)]
#[command(name = "rift-transport", version)]
struct Args {
    /// Routes file (YAML, or JSON with a .json extension)
    #[arg(short, long, env = "RIFT_ROUTES")]
    config: String,

    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Absolute request URL, e.g. http://example.com/users?id=10
    #[arg(short, long)]
    url: String,

    /// Request header as 'Name: value'; may be repeated
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    #[arg(short, long)]
    body: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = RoutesConfig::from_file(&args.config)?;
    info!(
        config = %args.config,
        services = config.services.len(),
        "loaded routes"
    );
    let transport = config.into_transport().with_sink(Arc::new(LogSink));

    let mut builder = Request::builder()
        .method(args.method.as_str())
        .uri(args.url.as_str());
    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("invalid header '{header}', expected 'Name: value'"))?;
        builder = builder.header(name.trim(), value.trim());
    }
    let req = builder
        .body(Bytes::from(args.body.unwrap_or_default()))
        .context("invalid request")?;

    let response = transport.dispatch(req)?;
    let status = response.status();
    println!("{status}");
    for (name, value) in response.headers() {
        println!("{name}: {}", String::from_utf8_lossy(value.as_bytes()));
    }
    let body = read_body(response);
    println!();
    println!("{}", String::from_utf8_lossy(&body));

    if status == StatusCode::NOT_FOUND && body == NO_ROUTE_BODY {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
