//! Praesidium Risk Control Core
//!
//! Bootstraps the risk subsystem: the evaluation engine that gates orders
//! against per-account limit envelopes, the adaptive position sizer's
//! configuration, the typed event bus, and the periodic position monitor.
//!
//! Order flow, market data, and persistence are external collaborators;
//! this binary wires in-memory adapters so the core runs standalone until
//! real drivers are attached.

use anyhow::Result;
use clap::{Arg, Command};
use custodia::memory::{InMemoryAccounts, InMemoryMarketData};
use custodia::{InMemoryRiskRepository, RiskEvaluationEngine};
use mensura::SizerConfigHandle;
use std::sync::Arc;
use tracing::info;
use vigilia::{EventBus, RiskControlService, RiskMonitor};

mod config;

use crate::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("initializing Praesidium risk control core");

    let matches = Command::new("praesidium")
        .version("0.1.0")
        .about("Risk control core: limit enforcement and adaptive position sizing")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config/default"),
        )
        .get_matches();

    let config_file = matches.get_one::<String>("config").expect("has default");
    let settings = Settings::new(config_file)?;
    info!(config = %config_file, "configuration loaded");

    // Collaborator adapters. In-memory until real drivers are wired in.
    let repository = Arc::new(InMemoryRiskRepository::new());
    let accounts = Arc::new(InMemoryAccounts::new());
    let market_data = Arc::new(InMemoryMarketData::new());
    let bus = Arc::new(EventBus::new());

    // The engine seeds the built-in profiles on an empty store and
    // converges to repository state on restart.
    let engine = Arc::new(RiskEvaluationEngine::new(
        repository,
        accounts.clone(),
        market_data,
        bus.clone(),
        settings.engine_config(),
    ));
    engine.initialize().await?;
    info!("custodia: risk evaluation engine ready");

    let sizer_config = SizerConfigHandle::new(settings.sizing.clone());
    info!("mensura: position sizer configuration published");

    let monitor = RiskMonitor::new(
        engine.clone(),
        accounts.clone(),
        accounts,
        settings.monitor_period(),
    );
    let service = RiskControlService::start(engine, sizer_config, &bus, monitor);
    info!("vigilia: subscribers and monitor running");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    service.shutdown(settings.shutdown_grace()).await;

    Ok(())
}
