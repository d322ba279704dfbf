// Library exports for binary tools and tests
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use services::{provisioner::Provisioner, resolver::TenantStore};

pub use error::{ProvisionError, Result};
pub use routes::create_app;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn TenantStore>,
    pub provisioner: Arc<Provisioner>,
}
