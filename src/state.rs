use std::sync::Arc;

use crate::config::Config;
use crate::store::DocumentStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Config,
}
