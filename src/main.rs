//! Pieslice - compute a pie chart widget view from JSON fixtures.

use pieslice::config::HousekeepingConfig;
use pieslice::db::MemoryStore;
use pieslice::widget::{PieChart, WidgetFields};

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("pieslice=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        let program = args.first().map(String::as_str).unwrap_or("pieslice");
        eprintln!("usage: {} <widget.json> <store.json>", program);
        std::process::exit(2);
    }

    // Load configuration
    let cfg = HousekeepingConfig::load();
    tracing::info!(
        "Housekeeping: history={} (global={}), trends={} (global={})",
        cfg.history,
        cfg.history_global,
        cfg.trends,
        cfg.trends_global
    );

    let fields = WidgetFields::from_path(&args[1])?;
    let store = MemoryStore::from_path(&args[2])?;
    tracing::info!("Loaded {} items from {}", store.items.len(), args[2]);

    let chart = PieChart::new(&store, &store, &store, &cfg);
    let view = chart.view(&fields, Utc::now())?;

    for error in &view.errors {
        tracing::warn!("{}", error);
    }

    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}
