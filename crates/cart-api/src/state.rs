//! # Application State
//!
//! Shared state for the Axum application.
//! Owns the single cart, its checkout session and the catalog provider.

use cart_core::storage::LOCALE_KEY;
use cart_core::{
    BoxedCatalog, BoxedStore, CartHandle, CartSettings, CartStore, CheckoutSession, Enricher,
    JsonFileStore, Locale, NoticeBoard, PriceBook, RouteTracker,
};
use cart_tmdb::TmdbCatalog;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory holding the persisted records
    pub data_dir: PathBuf,
    /// Locale used until the user picks one
    pub default_locale: Locale,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            default_locale: std::env::var("DEFAULT_LOCALE")
                .ok()
                .and_then(|l| l.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The cart
    pub cart: CartHandle,
    /// Payment confirmation flow over `cart`
    pub checkout: Arc<CheckoutSession>,
    /// Localized titles and posters for the cart view
    pub enricher: Arc<Enricher>,
    /// Stable per-movie prices
    pub prices: Arc<PriceBook>,
    /// Movie catalog provider
    pub catalog: BoxedCatalog,
    /// Notices waiting to be shown
    pub notices: Arc<NoticeBoard>,
    /// Route the UI was last sent to
    pub routes: Arc<RouteTracker>,
    /// CDN base for poster URLs
    pub image_base_url: String,
    /// Loaded tunables
    pub settings: CartSettings,
    /// Application config
    pub config: AppConfig,
    storage: BoxedStore,
    locale: Arc<RwLock<Locale>>,
}

impl AppState {
    /// Create the state from the environment, TMDB and `config/cart.toml`
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let settings = load_cart_settings()?;

        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            anyhow::anyhow!("Failed to create data dir {}: {}", config.data_dir.display(), e)
        })?;
        let storage: BoxedStore = Arc::new(JsonFileStore::new(&config.data_dir));

        let tmdb = TmdbCatalog::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TMDB: {}", e))?;
        let image_base_url = tmdb.config().image_base_url.clone();

        Ok(Self::with_parts(
            config,
            settings,
            storage,
            Arc::new(tmdb),
            image_base_url,
        ))
    }

    /// Assemble the state from explicit collaborators
    pub fn with_parts(
        config: AppConfig,
        settings: CartSettings,
        storage: BoxedStore,
        catalog: BoxedCatalog,
        image_base_url: impl Into<String>,
    ) -> Self {
        let notices = NoticeBoard::new();
        let routes = RouteTracker::new();

        let store = CartStore::load(
            Arc::clone(&storage),
            notices.clone(),
            settings.discount.clone(),
        );
        let cart = CartHandle::new(store);

        let checkout = CheckoutSession::new(
            cart.clone(),
            notices.clone(),
            routes.clone(),
            settings.checkout,
        );

        let locale = load_locale(&storage, config.default_locale);

        Self {
            cart,
            checkout: Arc::new(checkout),
            enricher: Arc::new(Enricher::new(Arc::clone(&catalog))),
            prices: Arc::new(PriceBook::new(Arc::clone(&storage))),
            catalog,
            notices,
            routes,
            image_base_url: image_base_url.into(),
            settings,
            config,
            storage,
            locale: Arc::new(RwLock::new(locale)),
        }
    }

    /// Active display locale
    pub async fn locale(&self) -> Locale {
        *self.locale.read().await
    }

    /// Switch the display locale, persist it and re-localize the cart.
    ///
    /// Returns whether the locale changed.
    pub async fn set_locale(&self, locale: Locale) -> bool {
        {
            let mut current = self.locale.write().await;
            if *current == locale {
                return false;
            }
            *current = locale;
        }

        match serde_json::to_string(&locale) {
            Ok(record) => {
                if let Err(e) = self.storage.set(LOCALE_KEY, &record) {
                    warn!("Failed to persist locale: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode locale: {}", e),
        }

        info!(%locale, "Locale changed");
        self.spawn_refresh();
        true
    }

    /// Re-fetch cart titles and posters in the background for the current locale
    pub fn spawn_refresh(&self) -> tokio::task::JoinHandle<bool> {
        let state = self.clone();
        tokio::spawn(async move {
            let items = state.cart.items().await;
            if items.is_empty() {
                return false;
            }
            let locale = state.locale().await;
            state.enricher.refresh(items, locale).await
        })
    }
}

/// Load the persisted locale, falling back to `default`
fn load_locale(storage: &BoxedStore, default: Locale) -> Locale {
    match storage.get(LOCALE_KEY) {
        Ok(Some(record)) => match serde_json::from_str(&record) {
            Ok(locale) => locale,
            Err(e) => {
                warn!("Ignoring malformed locale record: {}", e);
                default
            }
        },
        Ok(None) => default,
        Err(e) => {
            warn!("Failed to read locale record: {}", e);
            default
        }
    }
}

/// Load cart settings from config file
fn load_cart_settings() -> anyhow::Result<CartSettings> {
    let config_paths = [
        "config/cart.toml",
        "../config/cart.toml",
        "../../config/cart.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let settings = CartSettings::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            info!(
                "Loaded cart settings from {} ({} discount tiers)",
                path,
                settings.discount.tiers.len()
            );
            return Ok(settings);
        }
    }

    debug!("No cart settings found, using defaults");
    Ok(CartSettings::default())
}
