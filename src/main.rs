//! Traffic Accident Dashboard - interactive statistics over national accident sources
//!
//! Loads the five spreadsheet sources and shows headline metrics, trends,
//! per-state breakdowns, causes and sales phrases.

mod charts;
mod config;
mod data;
mod error;
mod gui;
mod stats;
mod views;

use anyhow::{Context, Result};
use clap::Parser;
use config::DashboardConfig;
use eframe::egui;
use gui::DashboardApp;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "accident_dashboard")]
#[command(about = "Traffic accident statistics dashboard", long_about = None)]
struct Args {
    /// Directory holding the source spreadsheets
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    info!(data_dir = %config.data_dir.display(), "starting dashboard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Traffic Accident Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Traffic Accident Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the window: {}", e))
}
