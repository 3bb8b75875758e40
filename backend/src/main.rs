//! Server entry point: configuration, store preparation, and bootstrap.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::Key;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::outbound::persistence::{
    DbPool, DieselCategoryRepository, DieselDepartmentRepository, DieselJobRepository,
    DieselUserRepository, PoolConfig, run_migrations,
};
use backend::seed::seed_if_empty;
use backend::server::ServerConfig;

/// Runtime settings, from flags or the environment.
#[derive(Debug, Parser)]
#[command(name = "roster-server", about = "Settlement roster web server")]
struct Settings {
    /// Socket address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,

    /// Path of the SQLite store file.
    #[arg(long, env = "DATABASE_URL", default_value = "roster.db")]
    database_url: String,

    /// File holding the session key material.
    #[arg(
        long,
        env = "SESSION_KEY_FILE",
        default_value = "/var/run/secrets/session_key"
    )]
    session_key_file: PathBuf,

    /// Fall back to a generated session key when the key file is missing.
    /// Existing sessions do not survive a restart in this mode.
    #[arg(long, env = "SESSION_ALLOW_EPHEMERAL")]
    session_allow_ephemeral: bool,

    /// Mark session cookies `Secure`. Disable only for plain-HTTP
    /// development setups.
    #[arg(
        long,
        env = "SESSION_COOKIE_SECURE",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    cookie_secure: bool,

    /// Skip seeding the demo roster into an empty store.
    #[arg(long, env = "SKIP_SEED")]
    skip_seed: bool,
}

fn load_session_key(settings: &Settings) -> std::io::Result<Key> {
    match std::fs::read(&settings.session_key_file) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(error) => {
            if cfg!(debug_assertions) || settings.session_allow_ephemeral {
                warn!(
                    path = %settings.session_key_file.display(),
                    %error,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {error}",
                    settings.session_key_file.display()
                )))
            }
        }
    }
}

fn prepare_store(settings: &Settings) -> std::io::Result<DbPool> {
    let pool = PoolConfig::new(&settings.database_url)
        .build()
        .map_err(|error| std::io::Error::other(error.to_string()))?;
    run_migrations(&pool).map_err(|error| std::io::Error::other(error.to_string()))?;
    Ok(pool)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let settings = Settings::parse();
    let key = load_session_key(&settings)?;
    let pool = prepare_store(&settings)?;

    if !settings.skip_seed {
        let users = DieselUserRepository::new(pool.clone());
        let jobs = DieselJobRepository::new(pool.clone());
        let departments = DieselDepartmentRepository::new(pool.clone());
        let categories = DieselCategoryRepository::new(pool.clone());
        seed_if_empty(&users, &jobs, &departments, &categories)
            .await
            .map_err(|error| std::io::Error::other(error.to_string()))?;
    }

    let config = ServerConfig::new(key, settings.cookie_secure, settings.bind_addr, pool);
    backend::server::run(config)?.await
}
