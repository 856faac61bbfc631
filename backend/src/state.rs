use std::sync::Arc;

use crate::{config::Config, db::connection::DbPool, identity::IdentityProvider};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            pool,
            config,
            identity,
        }
    }
}
