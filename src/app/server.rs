use crate::api::build_router;
use crate::core::loader::CsvSource;
use crate::core::lookup::LookupService;
use crate::core::store::SnapshotStore;
use crate::core::{ConfigProvider, RecordSource};
use crate::utils::error::Result;
use crate::utils::validation::{validate_delimiter, validate_field_names};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Owns the loaded snapshot store and serves it over HTTP.
pub struct LookupServer {
    service: Arc<LookupService>,
    bind_addr: String,
    cors: bool,
    reload_interval: Option<Duration>,
}

impl LookupServer {
    /// Loads the customer table named by `config`. Fails if the first load fails.
    pub async fn from_config(config: &dyn ConfigProvider) -> Result<Self> {
        let delimiter = validate_delimiter("delimiter", config.delimiter())?;
        let default_fields = validate_field_names("default_fields", config.default_fields())?;

        let source: Arc<dyn RecordSource> = Arc::new(CsvSource::new(config.csv_path(), delimiter));
        tracing::info!("📁 Loading customer data from: {}", source.describe());
        let store = Arc::new(SnapshotStore::load(source).await?);

        Ok(Self {
            service: Arc::new(LookupService::new(store, default_fields)),
            bind_addr: config.bind_addr(),
            cors: config.cors_enabled(),
            reload_interval: config.reload_interval(),
        })
    }

    pub fn service(&self) -> &Arc<LookupService> {
        &self.service
    }

    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.service), self.cors)
    }

    /// Serves until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let reloader = self.reload_interval.map(|every| {
            tracing::info!("🔄 Reloading customer data every {:?}", every);
            Arc::clone(self.service.store()).spawn_periodic_reload(every)
        });

        let listener = TcpListener::bind(self.bind_addr.as_str()).await?;
        tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await;

        if let Some(handle) = reloader {
            handle.abort();
        }
        served?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
