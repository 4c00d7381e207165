//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::services::{CartLifecycle, CartValidator, SalesAnalytics, WishlistService};
use crate::store::{CartStore, Stores};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; services hold trait objects so the same
/// router runs over `PostgreSQL` or the in-memory store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    carts: Arc<dyn CartStore>,
    lifecycle: CartLifecycle,
    analytics: SalesAnalytics,
    wishlist: WishlistService,
}

impl AppState {
    /// Wire services over the given stores.
    #[must_use]
    pub fn new(config: ApiConfig, stores: Stores) -> Self {
        let validator = CartValidator::new(stores.identity.clone(), stores.catalog.clone());
        let lifecycle = CartLifecycle::new(
            stores.carts.clone(),
            stores.identity.clone(),
            stores.addresses.clone(),
            validator,
            config.status_policy,
        );
        let analytics = SalesAnalytics::new(
            stores.sales.clone(),
            config.analytics_offset,
            config.analytics_cache_ttl,
        );
        let wishlist = WishlistService::new(
            stores.wishlist.clone(),
            stores.identity.clone(),
            stores.catalog.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                carts: stores.carts,
                lifecycle,
                analytics,
                wishlist,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Raw cart store, used by the readiness probe.
    #[must_use]
    pub fn carts(&self) -> &dyn CartStore {
        self.inner.carts.as_ref()
    }

    #[must_use]
    pub fn lifecycle(&self) -> &CartLifecycle {
        &self.inner.lifecycle
    }

    #[must_use]
    pub fn analytics(&self) -> &SalesAnalytics {
        &self.inner.analytics
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistService {
        &self.inner.wishlist
    }
}
