#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Serves the Sentinel web build from a local directory.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use sentinel_static_server::{EmbedderPolicy, ServeConfig, StaticServer};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "sentinel-serve", about = "Serve the Sentinel web build")]
struct Args {
    /// Directory holding the web build.
    #[arg(long, default_value = "build/web")]
    root: PathBuf,

    /// Interface to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Cross-Origin-Embedder-Policy sent with every response.
    #[arg(long, value_enum, default_value_t = EmbedderPolicy::Credentialless)]
    embedder_policy: EmbedderPolicy,
}

/// Entry point for the static web server.
fn main() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .init();

    let args = Args::parse();
    let server = StaticServer::bind(ServeConfig {
        root: args.root,
        address: SocketAddr::new(args.host, args.port),
        embedder_policy: args.embedder_policy,
    })
    .context("failed to start web server")?;
    server.run().context("web server stopped")
}

/// `info` unless `RUST_LOG` names its own directives.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_port_and_policy_are_parsed() {
        let args = Args::try_parse_from([
            "sentinel-serve",
            "--port",
            "9000",
            "--embedder-policy",
            "require-corp",
            "--root",
            "dist",
        ])
        .expect("valid arguments");

        assert_eq!(args.port, 9000);
        assert_eq!(args.embedder_policy, EmbedderPolicy::RequireCorp);
        assert_eq!(args.root, PathBuf::from("dist"));
        assert_eq!(args.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn log_filter_defaults_to_info_without_masking_rust_log() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("")).to_string(), "info");
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
        assert_eq!(
            log_filter(Some("sentinel_world=trace")).to_string(),
            "sentinel_world=trace"
        );
    }
}
