use std::env;
use std::sync::Arc;

use actix_web::{App, HttpServer};
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use bookstore_api::api::{Author, Book};
use bookstore_api::app_config::config_app;
use bookstore_api::books_repository::{InMemoryBooksRepository, MongoBooksRepository};
use bookstore_api::document_repository::{InMemoryDocumentRepository, MongoDocumentRepository};
use bookstore_api::unit_of_work::BookstoreUnitOfWork;

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() {
    let app_name = "bookstore_api";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .expect("Failed to install OpenTelemetry tracer.");

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer using the Jaeger tracer
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    // Combined them all together in a `tracing` subscriber
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();
    println!("starting HTTP server at http://localhost:8080");

    let use_in_memory_db = env::var("USE_IN_MEMORY_DB")
        .map(|value| value.to_lowercase() == "true")
        .unwrap_or_default();
    let mongodb_uri = env::var("MONGODB_URI").unwrap_or("mongodb://127.0.0.1:27017".to_string());
    let database_name = env::var("MONGODB_DATABASE").unwrap_or("bookstore".to_string());
    let authors_collection_name =
        env::var("AUTHORS_COLLECTION_NAME").unwrap_or("authors".to_string());
    let books_collection_name = env::var("BOOKS_COLLECTION_NAME").unwrap_or("books".to_string());

    let unit_of_work = if use_in_memory_db {
        Arc::new(BookstoreUnitOfWork::new(
            Arc::new(InMemoryDocumentRepository::<Author>::default()),
            Arc::new(InMemoryBooksRepository::default()),
        ))
    } else {
        let client = mongodb::Client::with_uri_str(&mongodb_uri)
            .await
            .expect("Failed to create mongodb client");
        let database = client.database(&database_name);
        tracing::info!("Using mongodb database {}", database_name);
        Arc::new(BookstoreUnitOfWork::new(
            Arc::new(MongoDocumentRepository::new(
                database.collection::<Author>(&authors_collection_name),
            )),
            Arc::new(MongoBooksRepository::new(
                database.collection::<Book>(&books_collection_name),
            )),
        ))
    };

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(unit_of_work.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
