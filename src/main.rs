//! Inkdesk - document workspace with a library tree, tabbed markdown
//! editor, outline and AI chat panel.

mod app;
mod core;
mod ui;

use app::InkdeskApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Inkdesk...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("inkdesk-timers")
        .enable_time()
        .build()?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 900.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Inkdesk"),
        ..Default::default()
    };

    eframe::run_native(
        "Inkdesk",
        native_options,
        Box::new(|cc| Ok(Box::new(InkdeskApp::new(cc, runtime)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
