use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::graphql::{build_schema, AppSchema};

/// Shared, read-only application state handed to every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    pool: PgPool,
    config: Arc<AppConfig>,
    schema: AppSchema,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                pool,
                config: Arc::new(config),
                schema: build_schema(),
            }),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn schema(&self) -> &AppSchema {
        &self.inner.schema
    }
}
