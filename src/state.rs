use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, events::OrderEvents};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub events: OrderEvents,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: AppConfig) -> Self {
        let events = OrderEvents::with_capacity(config.event_channel_capacity);
        Self {
            orm,
            config: Arc::new(config),
            events,
        }
    }
}
