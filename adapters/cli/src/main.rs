#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Sentinel experience.

mod config;
mod scene;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sentinel_advisory::{Advisor, AdvisoryClient, RemoteAdvisor, RemoteConfig};
use sentinel_rendering::{palette, Presentation, RenderingBackend};
use sentinel_rendering_macroquad::MacroquadBackend;
use sentinel_simulation::Simulation;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Where tactical text comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AdvisorMode {
    /// Canned lines only; no network access.
    Local,
    /// The hosted text-generation service, falling back to canned lines.
    Remote,
}

#[derive(Parser, Debug)]
#[command(name = "sentinel", about = "Defend the core against escalating virus waves")]
struct Cli {
    /// TOML file overriding the default tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text source for lore, advice and taunts.
    #[arg(long, value_enum, default_value_t = AdvisorMode::Local)]
    advisor: AdvisorMode,

    /// API key for the remote advisor.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model queried by the remote advisor.
    #[arg(long, env = "SENTINEL_ADVISOR_MODEL")]
    model: Option<String>,

    /// Base URL of the remote advisor.
    #[arg(long)]
    advisor_url: Option<String>,

    /// Per-request timeout for the remote advisor.
    #[arg(long, default_value_t = 10_000)]
    advisor_timeout_ms: u64,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,

    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Sentinel command-line interface.
fn main() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .init();

    let cli = Cli::parse();
    let tuning = config::load_tuning(cli.config.as_deref()).context("failed to load tuning")?;
    let client =
        AdvisoryClient::spawn(build_advisor(&cli)).context("failed to start advisory worker")?;
    let mut simulation =
        Simulation::new(tuning, client).context("failed to initialise simulation")?;
    let scene = scene::initial_scene(&simulation).context("failed to build scene")?;

    tracing::info!(advisor = ?cli.advisor, "sentinel starting");

    MacroquadBackend::new()
        .with_vsync(cli.vsync)
        .with_show_fps(cli.show_fps)
        .run(
            Presentation::new("Sentinel", palette::BACKGROUND, scene),
            move |dt, input, scene| {
                scene::apply_input(&mut simulation, &input);
                simulation.advance(dt);
                scene::refresh_scene(&simulation, scene);
            },
        )
}

fn build_advisor(cli: &Cli) -> Advisor {
    match cli.advisor {
        AdvisorMode::Local => Advisor::LocalOnly,
        AdvisorMode::Remote => {
            let Some(api_key) = cli.api_key.as_deref().filter(|key| !key.trim().is_empty())
            else {
                tracing::warn!("remote advisor requested without an API key; using local lines");
                return Advisor::LocalOnly;
            };

            let mut config = RemoteConfig::new(api_key)
                .with_timeout(Duration::from_millis(cli.advisor_timeout_ms));
            if let Some(model) = &cli.model {
                config = config.with_model(model.as_str());
            }
            if let Some(base_url) = &cli.advisor_url {
                config = config.with_base_url(base_url.as_str());
            }
            Advisor::Remote(RemoteAdvisor::new(config))
        }
    }
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

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sentinel").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn defaults_to_local_advisor() {
        let cli = parse(&[]);

        assert_eq!(cli.advisor, AdvisorMode::Local);
        assert_eq!(cli.advisor_timeout_ms, 10_000);
        assert!(!cli.vsync);
        assert!(matches!(build_advisor(&cli), Advisor::LocalOnly));
    }

    #[test]
    fn remote_without_key_downgrades_to_local() {
        let mut cli = parse(&["--advisor", "remote"]);
        cli.api_key = None;

        assert!(matches!(build_advisor(&cli), Advisor::LocalOnly));

        cli.api_key = Some("   ".to_owned());
        assert!(matches!(build_advisor(&cli), Advisor::LocalOnly));
    }

    #[test]
    fn remote_with_key_builds_remote_advisor() {
        let cli = parse(&[
            "--advisor",
            "remote",
            "--api-key",
            "secret",
            "--advisor-url",
            "http://127.0.0.1:9/",
            "--advisor-timeout-ms",
            "250",
        ]);

        assert!(matches!(build_advisor(&cli), Advisor::Remote(_)));
    }

    #[test]
    fn rejects_unknown_advisor_mode() {
        let result = Cli::try_parse_from(["sentinel", "--advisor", "oracle"]);
        assert!(result.is_err());
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
