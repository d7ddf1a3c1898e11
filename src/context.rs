use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::TicketGraphSource;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub ticket_source: Arc<dyn TicketGraphSource>,
}

impl AppContext {
    pub fn new(config: AppConfig, ticket_source: Arc<dyn TicketGraphSource>) -> Self {
        Self {
            config,
            ticket_source,
        }
    }
}
