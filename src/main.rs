use std::net::{Ipv6Addr, SocketAddr};

use anyhow::Context;
use log::info;
use notas::{
    appstate::AppState,
    config::{AppConfig, StoreConfig},
    notify::PushRelay,
    router,
    store::{AnyStore, RemoteStore, SqliteStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_thread_ids(true).init();

    let config = AppConfig::from_env()?;
    info!("started with {:?} failure policy", config.failure_policy);

    let store = match &config.store {
        StoreConfig::Local { path: Some(path) } => {
            AnyStore::Sqlite(SqliteStore::open(path).context("opening sqlite store")?)
        }
        StoreConfig::Local { path: None } => {
            AnyStore::Sqlite(SqliteStore::in_memory().context("opening sqlite store")?)
        }
        StoreConfig::Remote(remote) => {
            info!("using hosted store at {}", remote.endpoint);
            AnyStore::Remote(RemoteStore::https(remote.clone()))
        }
    };
    let notifier = PushRelay::https(config.push_relay_url.clone());

    let app = router(AppState::new(
        store,
        notifier,
        config.failure_policy,
        config.swipe_threshold,
    ));

    axum::Server::bind(&SocketAddr::from((Ipv6Addr::UNSPECIFIED, config.port)))
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("serving http")?;

    Ok(())
}
