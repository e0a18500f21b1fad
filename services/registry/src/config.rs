use std::str::FromStr;

/// Which [`DocumentStore`](crate::domain::store::DocumentStore) implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Registry service configuration loaded from environment variables.
#[derive(Debug)]
pub struct RegistryConfig {
    /// Store implementation (default `postgres`). Env var: `STORE_BACKEND`.
    pub store_backend: StoreKind,
    /// PostgreSQL connection URL, required for the postgres backend. Env var: `DATABASE_URL`.
    pub database_url: Option<String>,
    /// TCP port for the HTTP server (default 3000). Env var: `REGISTRY_PORT`.
    pub registry_port: u16,
    /// Allowed CORS origin of the web frontend (default `http://localhost:5173`).
    /// Env var: `CORS_ORIGIN`.
    pub cors_origin: String,
}

impl RegistryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            store_backend: lookup("STORE_BACKEND")
                .map(|v| v.parse().expect("STORE_BACKEND"))
                .unwrap_or(StoreKind::Postgres),
            database_url: lookup("DATABASE_URL"),
            registry_port: lookup("REGISTRY_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:5173".to_owned()),
        }
    }
}
