use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use auto_sales_dashboard::app::DashboardApp;
use auto_sales_dashboard::config::DashboardConfig;
use auto_sales_dashboard::data::loader::load_source;
use auto_sales_dashboard::state::AppState;
use auto_sales_dashboard::ui::panels::DASHBOARD_TITLE;
use eframe::egui;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env().context("reading configuration")?;

    let dataset = load_source(&config.source)
        .with_context(|| format!("loading dataset from {}", config.source))?;
    log::info!(
        "Loaded {} rows ({} years, vehicle types {:?})",
        dataset.len(),
        dataset.years().len(),
        dataset.vehicle_types()
    );

    let state = AppState::new(Arc::new(dataset), config.source, config.initial_selection);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        DASHBOARD_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
