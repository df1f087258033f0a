mod cli;
mod config;
mod logging;
mod output;
mod platform;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use posture::{
    query_feature, render, summarize_with, supported_features, PostureProbe, SummaryOptions,
};
use tracing::info;

use cli::{Cli, Commands};
use config::InspectorConfig;
use platform::HostPlatform;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = InspectorConfig::load(cli.config.as_deref())?;
    config.apply_cli(cli);
    logging::init(cli.verbose, config.log_filter.as_deref());

    let host = HostPlatform::detect();
    info!(
        platform = host.name(),
        format = %config.format,
        config = ?config.source,
        "hwposture started"
    );

    let probe = host.probe(&config);
    let rendered = execute(cli.command, probe.as_ref(), &config)?;
    println!("{rendered}");
    Ok(())
}

fn execute(
    command: Commands,
    probe: &dyn PostureProbe,
    config: &InspectorConfig,
) -> Result<String> {
    let theme = output::theme_for(config.color);
    let format = config.format;

    let rendered = match command {
        Commands::Summary => {
            let options = SummaryOptions {
                parallel: config.parallel_probes,
            };
            render(&summarize_with(probe, options), format, &theme)
        }
        Commands::Features => render(&supported_features(probe), format, &theme),
        other => {
            let Some(feature) = other.feature() else {
                anyhow::bail!("unhandled command {other:?}");
            };
            if !probe.is_supported(feature) {
                anyhow::bail!("{} is not supported on this platform", feature.display_name());
            }
            let record = query_feature(probe, feature)
                .with_context(|| format!("{} detection failed", feature.display_name()))?;
            render(&record, format, &theme)
        }
    };
    rendered.context("failed rendering output")
}
