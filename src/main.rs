#![doc = include_str!("../README.md")]

use std::sync::Arc;

use env_logger::{Builder, Target};

use log::{info, warn};

mod cli;
mod collecter;
mod config;
mod decoder;
mod fleet;
mod runner;
mod sink;
mod supervisor;
mod utils;

use crate::{
    cli::Cli,
    config::Config,
    sink::{NullSink, Sink, influx::InfluxSink},
    supervisor::{ListenerState, Settings},
};

#[tokio::main]
pub async fn main() {
    let mut builder = Builder::from_default_env();

    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    // cli
    let cli = Cli::new();

    // configuration: missing or malformed files are fatal at startup
    let config = Config::load(cli.config_path())
        .unwrap_or_else(|e| panic!("Failed to load \"{}\": {}", cli.config_path(), e));

    info!(
        "loaded {} listener(s) from \"{}\"",
        config.listeners.len(),
        cli.config_path()
    );

    let sink: Arc<dyn Sink> = if cli.dry_run() {
        info!("dry-run: records will be logged, not written");
        Arc::new(NullSink)
    } else {
        info!(
            "influxdb target: {}:{} db \"{}\"",
            config.influx.host, config.influx.port, config.influx.db_name
        );
        Arc::new(InfluxSink::new(&config.influx))
    };

    let settings = Settings {
        max_retries: cli.max_retries(),
        ..Default::default()
    };

    // main task: runs until every listener is Done or Abandoned
    let states = fleet::run_fleet(config.listeners, sink, settings).await;

    let abandoned = states
        .iter()
        .filter(|(_, state)| *state == ListenerState::Abandoned)
        .count();

    if abandoned > 0 {
        warn!("fleet terminated, {} listener(s) abandoned", abandoned);
    } else {
        info!("fleet terminated");
    }
}
