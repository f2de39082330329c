use crate::config::AppConfig;
use crate::db;
use crate::users::{PgUserRepository, UserRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn init(config: &AppConfig) -> Self {
        let pool = db::connect_lazy(&config.db);
        let users = Arc::new(PgUserRepository::new(pool)) as Arc<dyn UserRepository>;
        Self { users }
    }

    pub fn from_parts(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}
