//! Documentation of the campus mess menu backend.
//!
//! Serves the weekly menus of every dining hall: what each hall serves for each meal slot in a
//! given month, grouped per hall for the overview page, plus the admin calls to add, correct
//! and seed menus.
//!
//!
//!
//! # General Infrastructure
//! - Frontend talks to this server over JSON, routes live under `/api/menus`
//! - Menus are JSON documents in Redis, see [`database`]
//! - `MESS_STORAGE=memory` swaps Redis for an in-process store, handy for demos
//! - The seeder binary loads the reference catalog without going through HTTP
//!
//!
//!
//! # Routes
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | GET | `/api/menus/hall/{hallName}` | every meal of a hall, `?month=&year=` |
//! | GET | `/api/menus/hall/{hallName}/{day}/{mealType}` | one meal slot |
//! | GET | `/api/menus/all-halls` | every hall, grouped |
//! | POST | `/api/menus/add` | create a menu record |
//! | PUT | `/api/menus/update/{id}` | change a menu record |
//! | POST | `/api/menus/seed` | load the reference catalog |
//! | GET | `/api/menus/debug/database` | counts, distinct values, samples |
//! | GET | `/`, `/api/health` | liveness |
//!
//! Month and year default to July 2025 unless configured otherwise.
//!
//!
//!
//! # Notes
//!
//! ## Ordering
//! Meal slots come back in serving order (breakfast, lunch, snacks, dinner), not alphabetical.
//! Alphabetical would put dinner before lunch.
//!
//! ## Seeding
//! Seeding is an upsert per meal slot. Hitting the endpoint twice leaves the same number of
//! records behind.
//!
//!
//!
//! # Setup
//!
//! Run against a local Redis.
//! ```sh
//! REDIS_URL=redis://127.0.0.1:6379 RUST_LOG=info cargo run -p mess
//! ```
//!
//! Run without Redis.
//! ```sh
//! MESS_STORAGE=memory RUST_LOG=info cargo run -p mess
//! ```
//!
//! Seed from the command line.
//! ```sh
//! cargo run -p seeder -- --month July --year 2025
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post, put},
};

use signal::ctrl_c;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod menus;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use config::Config;
use error::StartupError;
use routes::{
    all_halls_handler, create_menu_handler, database_handler, hall_menu_handler,
    health_handler, meal_slot_handler, seed_handler, update_menu_handler,
};
use state::AppState;

/// Installs the `RUST_LOG` driven subscriber. Safe to call more than once.
pub fn init_tracing() {
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        debug!("Tracing subscriber already installed: {e}");
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let menus = Router::new()
        .route("/hall/{hall_name}", get(hall_menu_handler))
        .route("/hall/{hall_name}/{day}/{meal_type}", get(meal_slot_handler))
        .route("/all-halls", get(all_halls_handler))
        .route("/add", post(create_menu_handler))
        .route("/update/{id}", put(update_menu_handler))
        .route("/seed", post(seed_handler))
        .route("/debug/database", get(database_handler));

    Router::new()
        .route("/", get(health_handler))
        .route("/api/health", get(health_handler))
        .nest("/api/menus", menus)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), StartupError> {
    init_tracing();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config)?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
