use std::sync::Arc;

use crate::config::Config;
use crate::services::identity::IdentityClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identity: Arc<IdentityClient>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let identity = IdentityClient::new(&config.identity_url, &config.identity_anon_key);
        Self {
            config: Arc::new(config),
            identity: Arc::new(identity),
        }
    }
}
