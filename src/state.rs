use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{ai_search::QueryInterpreter, middleware::auth::JwtKeys};

#[derive(Clone)]
pub struct AppState {
    pub orm: Arc<DatabaseConnection>,
    pub keys: Arc<JwtKeys>,
    pub interpreter: QueryInterpreter,
}
