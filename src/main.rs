use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use payments_service::application::service::PaymentService;
use payments_service::config::Config;
use payments_service::domain::ports::PaymentRepositoryBox;
use payments_service::infrastructure::in_memory::InMemoryPaymentRepository;
use payments_service::infrastructure::rocksdb::RocksDBPaymentRepository;
use payments_service::infrastructure::sqlite::SqlitePaymentRepository;
use payments_service::interfaces::http::api::{self, AppState};
use payments_service::interfaces::http::orders::HttpOrdersClient;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Backend {
    /// Ephemeral in-process store
    Memory,
    /// Relational store (SQLite file)
    Sqlite,
    /// Document store (RocksDB directory)
    Rocksdb,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage backend to run against
    #[arg(long, value_enum, default_value = "sqlite")]
    backend: Backend,

    /// Listen port (overrides PORT from the environment)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env();

    // The backend is chosen here, at the boundary; everything behind the
    // repository trait is backend-agnostic.
    let repository: PaymentRepositoryBox = match cli.backend {
        Backend::Memory => Box::new(InMemoryPaymentRepository::new()),
        Backend::Sqlite => {
            Box::new(SqlitePaymentRepository::open(&config.sqlite_path).into_diagnostic()?)
        }
        Backend::Rocksdb => {
            Box::new(RocksDBPaymentRepository::open(&config.document_db_path).into_diagnostic()?)
        }
    };
    info!("using {:?} backend", cli.backend);

    let state = AppState {
        payments: Arc::new(PaymentService::new(repository)),
        orders: Arc::new(HttpOrdersClient::new(config.orders_service_url.clone())),
    };

    let port = cli.port.unwrap_or(config.server_port);
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await.into_diagnostic()?;
    info!("payments service listening on {addr}");

    axum::serve(listener, api::router(state))
        .await
        .into_diagnostic()?;

    Ok(())
}
