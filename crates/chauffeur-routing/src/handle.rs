//! Process-wide provider handle with lazy, once-only initialisation.
//!
//! The handle is created up front and injected into every resolver that
//! needs it. The underlying strategy chain is built on first use, bounded by
//! an initialisation timeout. A failed or timed-out initialisation is not
//! cached, so a later user-initiated retry initialises again.

use std::sync::Arc;
use std::time::Duration;

use chauffeur_core::is_probably_api_key;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use tokio::sync::OnceCell;

use crate::directions::{CallbackDirectionsStrategy, DirectionsClient};
use crate::error::RoutingError;
use crate::routes_api::RoutesApiClient;
use crate::strategy::{FallbackChain, RouteStrategy};

type Initializer =
    Box<dyn Fn() -> BoxFuture<'static, Result<FallbackChain, RoutingError>> + Send + Sync>;

/// Settings needed to build the provider strategy chain.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub routes_base_url: String,
    pub directions_base_url: String,
    /// Per-request timeout for the secondary protocol.
    pub request_timeout: Duration,
    pub init_timeout: Duration,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("routes_base_url", &self.routes_base_url)
            .field("directions_base_url", &self.directions_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("init_timeout", &self.init_timeout)
            .finish()
    }
}

pub struct ProviderHandle {
    cell: OnceCell<Arc<FallbackChain>>,
    init: Initializer,
    init_timeout: Duration,
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("initialized", &self.cell.initialized())
            .field("init_timeout", &self.init_timeout)
            .finish_non_exhaustive()
    }
}

impl ProviderHandle {
    /// A handle that is already initialised with `chain`.
    #[must_use]
    pub fn ready(chain: FallbackChain) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Arc::new(chain))),
            init: Box::new(|| async { Err(RoutingError::NoStrategies) }.boxed()),
            init_timeout: Duration::ZERO,
        }
    }

    /// A handle that builds its chain with `init` on first use.
    pub fn lazy<F>(init_timeout: Duration, init: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<FallbackChain, RoutingError>> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            init: Box::new(init),
            init_timeout,
        }
    }

    /// The production chain: Routes API first, legacy Directions second.
    ///
    /// The API key is checked when the handle initialises, so a missing or
    /// malformed key surfaces as a classified routing failure.
    #[must_use]
    pub fn google(config: ProviderConfig) -> Self {
        let init_timeout = config.init_timeout;
        Self::lazy(init_timeout, move || {
            let config = config.clone();
            async move { build_google_chain(&config) }.boxed()
        })
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Returns the strategy chain, initialising it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InitTimeout`] if initialisation does not finish
    /// within the configured timeout, or the initialiser's own error.
    pub async fn chain(&self) -> Result<Arc<FallbackChain>, RoutingError> {
        if let Some(chain) = self.cell.get() {
            return Ok(Arc::clone(chain));
        }

        let init = (self.init)();
        let pending = self.cell.get_or_try_init(|| init.map(|r| r.map(Arc::new)));
        match tokio::time::timeout(self.init_timeout, pending).await {
            Ok(result) => result.cloned(),
            Err(_) => {
                let secs = self.init_timeout.as_secs();
                tracing::warn!(secs, "provider initialisation timed out");
                Err(RoutingError::InitTimeout { secs })
            }
        }
    }
}

fn build_google_chain(config: &ProviderConfig) -> Result<FallbackChain, RoutingError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| is_probably_api_key(k))
        .ok_or(RoutingError::InvalidApiKey)?;

    let routes_http = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .user_agent("chauffeur/0.1 (route-quotes)")
        .build()?;
    let directions_http = Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .user_agent("chauffeur/0.1 (route-quotes)")
        .build()?;

    let primary = RoutesApiClient::with_base_url(routes_http, api_key, &config.routes_base_url)?;
    let secondary =
        DirectionsClient::with_base_url(directions_http, api_key, &config.directions_base_url)?;

    tracing::info!("routing provider initialised");
    let strategies: Vec<Arc<dyn RouteStrategy>> = vec![
        Arc::new(primary),
        Arc::new(CallbackDirectionsStrategy::new(secondary)),
    ];
    Ok(FallbackChain::new(strategies))
}
