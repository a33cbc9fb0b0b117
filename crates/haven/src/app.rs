// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root: builds the tier clients and the resolver from config.

use std::sync::Arc;

use tracing::{debug, info};

use haven_config::HavenConfig;
use haven_core::{HavenError, PluginAdapter};
use haven_resolver::{Resolver, TierTimeouts, TracingObserver};
use haven_resources::Services;
use haven_storage::SqliteCache;

/// Everything a command needs.
pub struct App {
    pub config: HavenConfig,
    pub cache: Arc<SqliteCache>,
    pub resolver: Resolver,
    pub services: Services,
}

impl App {
    /// Opens the cache and constructs whichever network clients are configured.
    pub async fn build(config: HavenConfig) -> Result<Self, HavenError> {
        let cache = Arc::new(SqliteCache::open(config.cache.clone()).await?);
        TracingObserver::describe_metrics();

        let mut resolver = Resolver::new(cache.clone())
            .with_timeouts(TierTimeouts::from_config(&config))
            .with_observer(Arc::new(TracingObserver));

        match haven_primary::from_config(&config.primary)? {
            Some(client) => {
                debug!(url = client.url(), "primary tier enabled");
                resolver = resolver.with_primary(Arc::new(client));
            }
            None => info!("primary.url not set, primary tier disabled"),
        }
        match haven_secondary::from_config(&config.secondary)? {
            Some(client) => {
                debug!(url = client.base_url(), "secondary tier enabled");
                resolver = resolver.with_secondary(Arc::new(client));
            }
            None => info!("secondary.base_url not set, secondary tier disabled"),
        }

        let services = Services::new(resolver.clone());
        Ok(Self {
            config,
            cache,
            resolver,
            services,
        })
    }

    /// The user to act for: `--user` first, then `app.user_id`.
    pub fn user_id(&self, flag: Option<&str>) -> Result<String, HavenError> {
        flag.map(str::to_string)
            .or_else(|| self.config.app.user_id.clone())
            .ok_or_else(|| {
                HavenError::Config("no user id; pass --user or set app.user_id".to_string())
            })
    }

    /// Flush the cache before exit.
    pub async fn shutdown(&self) -> Result<(), HavenError> {
        self.cache.shutdown().await
    }
}
