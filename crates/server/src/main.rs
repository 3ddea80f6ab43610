//! Totem server entry point.
//!
//! ```bash
//! totem-server scenarios/ghost_totem.ron
//! TOTEM_SCENARIO=scenarios/ghost_totem.ron RUST_LOG=totem=debug totem-server
//! ```
use anyhow::{Context, Result};
use totem_runtime::EventBus;
use totem_server::{Scenario, ServerConfig, Simulation, logging, spawn_outcome_logger};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env().with_scenario_arg(std::env::args().nth(1));
    let _log_guard = logging::setup_logging(&config)?;

    let path = config
        .scenario
        .clone()
        .context("no scenario given: pass a path or set TOTEM_SCENARIO")?;
    tracing::info!("Starting totem server");
    tracing::info!("Scenario: {}", path.display());

    let scenario = Scenario::load_from_file(&path)?;

    let events = EventBus::new();
    let logger = spawn_outcome_logger(events.subscribe());

    let mut sim = Simulation::new(&scenario, config.revival.clone(), events);
    sim.run(&scenario.steps)
        .with_context(|| format!("scenario '{}' failed", scenario.name))?;
    let report = sim.finish();

    let logged = logger.await.context("outcome logger panicked")?;
    tracing::info!(outcomes = logged, ticks = report.ticks, "Scenario complete");

    let json = serde_json::to_string_pretty(&report)?;
    match &config.report {
        Some(out) => {
            std::fs::write(out, json)
                .with_context(|| format!("failed to write report {}", out.display()))?;
            tracing::info!("Report written to {}", out.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
