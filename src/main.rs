use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zappybot_provisioner::{
    config::Config,
    create_app, db,
    db::company::PgTenantStore,
    services::{
        provisioner::{ProvisioningSettings, Provisioner},
        railway::RailwayClient,
        resolver::TenantStore,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fail fast on missing configuration, before any tenant is touched.
    let config = Arc::new(Config::from_env()?);
    let settings = ProvisioningSettings::from_config(&config)?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let store: Arc<dyn TenantStore> = Arc::new(PgTenantStore::new(pool));
    let provider = Arc::new(RailwayClient::from_config(&config));
    let provisioner = Arc::new(Provisioner::new(store.clone(), provider, settings));

    let state = AppState {
        config: config.clone(),
        store,
        provisioner,
    };

    let app = create_app(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("zappybot provisioner listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
