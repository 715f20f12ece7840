//! Runtime configuration, read from the environment after loading `.env`.
//!
//! Rocket's own settings (address, port, workers) keep coming from
//! `Rocket.toml` and `ROCKET_*` variables.

use dotenv::dotenv;
use std::env;
use std::str::FromStr;

use crate::db::memory::MemoryStore;
use crate::db::pg::PgStore;
use crate::db::{self, ErrorKind, Result, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

impl FromStr for Backend {
    type Err = db::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "postgres" => Ok(Backend::Postgres),
            "memory" => Ok(Backend::Memory),
            other => Err(ErrorKind::UnknownBackend(other.to_string()).into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Env: `NEWS_STORE` (`postgres` or `memory`). Default: `postgres`.
    pub backend: Backend,
    /// Env: `DATABASE_URL`. Required for the postgres store.
    pub database_url: Option<String>,
    /// Env: `DATABASE_POOL_SIZE`. Default: 10.
    pub pool_size: u32,
    /// Page size for listings that don't pass `limit`.
    /// Env: `NEWS_DEFAULT_LIMIT`. Default: 10.
    pub default_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::Postgres,
            database_url: None,
            pool_size: 10,
            default_limit: 10,
        }
    }
}

fn positive(key: &str, raw: String) -> Result<u32> {
    let value = raw.trim().parse::<u32>()?;
    if value == 0 {
        return Err(ErrorKind::InvalidSetting(key.to_string(), raw).into());
    }
    Ok(value)
}

impl Config {
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(backend) = lookup("NEWS_STORE") {
            config.backend = backend.trim().parse()?;
        }
        config.database_url = lookup("DATABASE_URL");
        if let Some(size) = lookup("DATABASE_POOL_SIZE") {
            config.pool_size = positive("DATABASE_POOL_SIZE", size)?;
        }
        if let Some(limit) = lookup("NEWS_DEFAULT_LIMIT") {
            config.default_limit = positive("NEWS_DEFAULT_LIMIT", limit)?;
        }
        Ok(config)
    }

    pub fn open_store(&self) -> Result<Box<dyn Store>> {
        match self.backend {
            Backend::Postgres => {
                let url = self
                    .database_url
                    .as_ref()
                    .ok_or_else(|| db::Error::from(ErrorKind::MissingDatabaseUrl))?;
                let pool = db::init_pool(url, self.pool_size)?;
                Ok(Box::new(PgStore::new(pool)))
            }
            Backend::Memory => Ok(Box::new(MemoryStore::seeded())),
        }
    }
}
