//! Helpdesk Server — application entry point.

mod config;

use clap::Parser;
use helpdesk_auth::{AuthService, DirectoryService};
use helpdesk_core::repository::UserRepository;
use helpdesk_db::repository::{
    SurrealServiceCatalogRepository, SurrealTicketRepository, SurrealUserRepository,
};
use helpdesk_db::{DbManager, run_migrations};
use helpdesk_tickets::TicketService;
use tracing_subscriber::EnvFilter;

use config::ServerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("helpdesk=info".parse().unwrap()),
        )
        .json()
        .init();

    let config = ServerConfig::parse();

    let auth_config = match config.auth_config() {
        Ok(auth_config) => auth_config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load JWT key pair");
            std::process::exit(1);
        }
    };

    let manager = match DbManager::connect(&config.db_config()).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Migrations failed");
        std::process::exit(1);
    }

    let db = manager.client().clone();
    let user_repo = match &auth_config.pepper {
        Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper.clone()),
        None => SurrealUserRepository::new(db.clone()),
    };
    let ticket_repo = SurrealTicketRepository::new(db.clone());
    let catalog_repo = SurrealServiceCatalogRepository::new(db);

    let _auth = AuthService::new(user_repo.clone(), auth_config.clone());
    let _directory = DirectoryService::new(user_repo.clone(), auth_config);
    let _tickets = TicketService::new(ticket_repo, user_repo.clone(), catalog_repo);

    match user_repo.count().await {
        Ok(total) => tracing::info!(users = total, "Helpdesk server ready"),
        Err(e) => tracing::warn!(error = %e, "Directory health check failed"),
    }

    // TODO: serve the REST API once the HTTP layer lands.

    tracing::info!("Helpdesk server stopped.");
}
