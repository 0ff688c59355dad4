use std::sync::Arc;

use chrono::{DateTime, Utc};
use pokeapi_client::PokeApiClient;
use route_guard::RouteGuard;

use crate::session::SessionRefresher;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub pokeapi: PokeApiClient,
    pub guard: Arc<RouteGuard>,
    pub session: Arc<dyn SessionRefresher>,
    pub started_at: DateTime<Utc>,
    pub internal_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        pokeapi: PokeApiClient,
        guard: RouteGuard,
        session: Arc<dyn SessionRefresher>,
    ) -> Self {
        Self {
            pokeapi,
            guard: Arc::new(guard),
            session,
            started_at: Utc::now(),
            internal_secret: None,
        }
    }

    pub fn with_internal_secret(mut self, secret: Option<String>) -> Self {
        self.internal_secret = secret.map(Arc::from);
        self
    }
}
