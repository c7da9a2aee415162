use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use groupsplit::auth::AuthSettings;
use groupsplit::config::Config;
use groupsplit::handlers;
use groupsplit::store::{EventStore, InMemoryEventStore, MongoEventStore};
use mongodb::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    let store: Arc<dyn EventStore> = match &config.mongodb_uri {
        Some(uri) => {
            info!("Connecting to MongoDB");
            let client = Client::with_uri_str(uri)
                .await
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            info!(database = %config.database_name, "Connected");
            Arc::new(MongoEventStore::new(&client, &config.database_name))
        }
        None => {
            warn!("MONGODB_URI is not set, events will only be kept in memory");
            Arc::new(InMemoryEventStore::default())
        }
    };
    if config.api_token.is_none() {
        warn!("API_TOKEN is not set, every change to events will be rejected");
    }

    let store = web::Data::from(store);
    let auth = web::Data::new(AuthSettings {
        api_token: config.api_token.clone(),
    });

    info!(host = %config.host, port = config.port, "Starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(store.clone())
            .app_data(auth.clone())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
