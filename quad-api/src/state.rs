use std::sync::Arc;

use quad_core::mailer::Mailer;
use quad_core::repository::UserStore;
use quad_events::EventStore;
use quad_favourites::FavouriteStore;
use quad_store::app_config::BusinessRules;
use quad_vendor::{RequestLifecycle, VendorRequestStore};

#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub favourites: Arc<dyn FavouriteStore>,
    pub vendor_requests: Arc<dyn VendorRequestStore>,
    pub users: Arc<dyn UserStore>,
    pub mailer: Arc<dyn Mailer>,
    pub lifecycle: Arc<RequestLifecycle>,
    pub auth: AuthSettings,
    pub business_rules: BusinessRules,
}
