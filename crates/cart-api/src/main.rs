//! # Movie Cart RS
//!
//! Movie shop backend: browse TMDB, fill a cart, pay within the countdown.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export TMDB_API_KEY=...
//! export DATA_DIR=./data
//!
//! # Run the server
//! movie-cart
//! ```

use cart_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Data dir: {}", state.config.data_dir.display());
    info!("Catalog provider: {}", state.catalog.provider_name());
    info!("Locale: {}", state.locale().await);

    let items = state.cart.lock().await.len();
    info!("Cart restored with {} items", items);
    if items > 0 {
        state.spawn_refresh();
    }

    let app = routes::create_router(state.clone());

    info!("🎬 Movie Cart starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🛒 Cart: GET http://{}/api/v1/cart", addr);
        info!("💳 Checkout: POST http://{}/api/v1/checkout", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.checkout.teardown().await;
    info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

fn print_banner() {
    println!(
        r#"
  🎬 Movie Cart RS 🎬
  ━━━━━━━━━━━━━━━━━━━━━
  Movies, cart, countdown checkout
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
