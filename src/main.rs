use axum::{
    routing::{get, post, put},
    Router,
};
use chrono::Local;
use colored::*;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use prefs_panel::config::init_config;
use prefs_panel::endpoint::SimulatedEndpoint;
use prefs_panel::panel::PreferencesPanel;
use prefs_panel::storage::local_store::create_store;
use prefs_panel::theme::ThemeHolder;
use prefs_panel::web::api::events::{preferences_events, theme_events};
use prefs_panel::web::api::preferences::{
    get_preferences, reload_preferences, save_preferences, update_notifications, update_theme,
};
use prefs_panel::web::api::theme::get_theme;
use prefs_panel::web::api::AppState;
use std::io::Write;
use std::{net::SocketAddr, sync::Arc};

#[tokio::main]
async fn main() {
    // Initialize the logger with a custom format that includes timestamps and colors
    Builder::new()
        .format(|buf, record| {
            // Color based on log level
            let level = match record.level() {
                log::Level::Error => record.level().to_string().red().bold(),
                log::Level::Warn => record.level().to_string().yellow().bold(),
                log::Level::Info => record.level().to_string().green(),
                log::Level::Debug => record.level().to_string().blue(),
                log::Level::Trace => record.level().to_string().purple(),
            };

            // Apply appropriate colors to the message based on level
            let message = match record.level() {
                log::Level::Error => record.args().to_string().red(),
                log::Level::Warn => record.args().to_string().yellow(),
                log::Level::Info => record.args().to_string().normal(),
                log::Level::Debug => record.args().to_string().blue(),
                log::Level::Trace => record.args().to_string().purple(),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                message
            )
        })
        .filter(None, LevelFilter::Info) // Set default log level to Info
        .parse_env("RUST_LOG") // Allow overriding with RUST_LOG environment variable
        .init();

    info!("Starting preferences panel");

    let config = init_config();

    if let Err(errors) = config.validate() {
        for error in errors {
            error!("{}", error);
        }
        std::process::exit(1);
    }

    // The theme holder wraps everything else, so it comes up first
    let store = create_store(config.storage_dir.clone());
    let theme = Arc::new(ThemeHolder::new(store));
    info!("Page theme: {}", theme.mode());

    let endpoint = Arc::new(SimulatedEndpoint::new(
        config.load_latency(),
        config.save_latency(),
        config.failure_rate,
    ));

    let panel = Arc::new(PreferencesPanel::mount(
        config.user_id.clone(),
        endpoint,
        theme.clone(),
        config.timings(),
    ));

    let state = AppState {
        panel: panel.clone(),
        theme,
    };

    let app = Router::new()
        .route("/api/preferences", get(get_preferences))
        .route("/api/preferences/notifications", put(update_notifications))
        .route("/api/preferences/theme", put(update_theme))
        .route("/api/preferences/save", post(save_preferences))
        .route("/api/preferences/reload", post(reload_preferences))
        .route("/api/theme", get(get_theme))
        .route("/api/events/preferences", get(preferences_events))
        .route("/api/events/theme", get(theme_events))
        .with_state(state);

    let ip_addr = match config.interface.parse::<std::net::IpAddr>() {
        Ok(ip_addr) => ip_addr,
        Err(e) => {
            error!("Invalid network interface address {}: {}", config.interface, e);
            std::process::exit(1);
        }
    };
    let addr = SocketAddr::from((ip_addr, config.port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server running on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    info!("Application exiting, unmounting panel...");
    panel.unmount();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Error listening for termination signal: {}", e);
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    info!("Received termination signal, shutting down...");
}
