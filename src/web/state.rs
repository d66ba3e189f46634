use std::sync::Arc;

use crate::config::ServerConfig;
use crate::review::ReviewService;
use crate::web::templates::PageRenderer;

/// Shared state handed to every handler. Everything inside is immutable.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
    pub pages: Arc<PageRenderer>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(service: Arc<ReviewService>, pages: PageRenderer, config: ServerConfig) -> Self {
        Self {
            service,
            pages: Arc::new(pages),
            config: Arc::new(config),
        }
    }
}
