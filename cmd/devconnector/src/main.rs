//! # devconnector
//!
//! Loads settings, initialises tracing, opens the document store, wires the
//! services into the axum router and serves until Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{build_router, AppState, Metrics};
use auth_adapters::{Argon2PasswordHasher, JwtTokenService};
use configs::{DatabaseSettings, LogSettings, Settings};
use domains::{PostRepository, ProfileRepository, TokenService, UserRepository};
use secrecy::ExposeSecret;
use services::{AccountService, PostService, ProfileService};
use storage_adapters::{InMemoryPostRepository, InMemoryProfileRepository, InMemoryUserRepository};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

struct Stores {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    posts: Arc<dyn PostRepository>,
}

fn in_memory() -> Stores {
    info!("using the in-memory store, data is lost on restart");
    Stores {
        users: Arc::new(InMemoryUserRepository::new()),
        profiles: Arc::new(InMemoryProfileRepository::new()),
        posts: Arc::new(InMemoryPostRepository::new()),
    }
}

#[cfg(feature = "db-postgres")]
async fn open_stores(db: &DatabaseSettings) -> anyhow::Result<Stores> {
    use storage_adapters::postgres::{
        connect, PostgresPostRepository, PostgresProfileRepository, PostgresUserRepository,
    };

    let Some(url) = &db.url else {
        return Ok(in_memory());
    };
    let pool = connect(url.expose_secret(), db.max_connections)
        .await
        .context("connecting to postgres")?;
    Ok(Stores {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        profiles: Arc::new(PostgresProfileRepository::new(pool.clone())),
        posts: Arc::new(PostgresPostRepository::new(pool)),
    })
}

#[cfg(not(feature = "db-postgres"))]
async fn open_stores(db: &DatabaseSettings) -> anyhow::Result<Stores> {
    if db.url.is_some() {
        warn!("database.url is set but this build lacks the db-postgres feature");
    }
    Ok(in_memory())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let stores = open_stores(&settings.database).await?;
    let tokens: Arc<dyn TokenService> = Arc::new(
        JwtTokenService::new(
            settings.auth.jwt_secret.expose_secret().as_bytes(),
            settings.auth.token_ttl_secs,
        )
        .context("building the token service")?,
    );

    let state = AppState {
        accounts: AccountService::new(
            stores.users.clone(),
            Arc::new(Argon2PasswordHasher::new()),
            tokens.clone(),
        ),
        profiles: ProfileService::new(stores.users.clone(), stores.profiles),
        posts: PostService::new(stores.users, stores.posts),
        tokens,
        metrics: Arc::new(Metrics::new()),
    };
    let app = build_router(state);

    let address = settings.bind_addr();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
