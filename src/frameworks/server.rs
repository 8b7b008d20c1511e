// Framework bootstrap for the game server runtime.

use crate::domain::World;
use crate::domain::tuning::Tuning;
use crate::frameworks::config;
use crate::interface_adapters::net::{check_name_handler, spawn_world_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{WorldSettings, spawn_world};

use axum::{Router, routing::get};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/names/check", get(check_name_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::http_host(), config::http_port());

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    let rng = match config::world_seed() {
        Some(seed) => {
            tracing::info!(seed, "using fixed world seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let world = World::generate(Tuning::default(), rng);

    // The one world task for the process; every connection shares it.
    let handle = spawn_world(
        &WorldSettings {
            input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
            world_broadcast_capacity: config::WORLD_BROADCAST_CAPACITY,
            event_broadcast_capacity: config::EVENT_BROADCAST_CAPACITY,
            tick_interval: config::TICK_INTERVAL,
        },
        world,
    );
    spawn_world_serializer(&handle);

    Arc::new(AppState { world: handle })
}
