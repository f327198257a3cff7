mod ui;

use tracing_subscriber::EnvFilter;

use mendax_backend::config::OracleConfig;
use mendax_backend::store::StateStore;

use ui::app::OracleApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mendax=debug")),
        )
        .init();

    tracing::info!("Mendax starting...");

    let config = OracleConfig::load();

    let db_path = config.resolved_database_path();
    let store = match StateStore::open(&db_path) {
        Ok(store) => store,
        Err(e) => {
            // Persistence failure is never fatal; run on memory only.
            tracing::warn!(
                "Failed to open {:?} ({}); state will not persist",
                db_path,
                e
            );
            StateStore::in_memory().expect("in-memory state store")
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_title("Mendax — Oracle of Whispers"),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Mendax",
        native_options,
        Box::new(|_cc| Ok(Box::new(OracleApp::new(config, store)))),
    ) {
        tracing::error!("UI error: {}", e);
        std::process::exit(1);
    }
}
