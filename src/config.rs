use std::env;
use std::path::PathBuf;

/// Runtime settings, read from the environment with local-dev defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub sqlite_path: PathBuf,
    pub document_db_path: PathBuf,
    pub orders_service_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8002".to_string())
                .parse()
                .unwrap_or(8002),
            sqlite_path: env::var("SQLITE_PATH")
                .unwrap_or_else(|_| "./payments_service.db".to_string())
                .into(),
            document_db_path: env::var("DOCUMENT_DB_PATH")
                .unwrap_or_else(|_| "./payments_docs".to_string())
                .into(),
            orders_service_url: env::var("ORDERS_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8003".to_string()),
        }
    }
}
