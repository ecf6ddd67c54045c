// File: services/bookify_backend/src/main.rs
use axum::{routing::get, Router};
use bookify_common::services::{AppointmentRepository, BoxedError, NotificationDispatcher};
use bookify_config::load_config;
use bookify_db::{DbClient, InMemoryAppointmentRepository, SqlAppointmentRepository};
use bookify_notify::{NoopDispatcher, WebhookDispatcher};
use bookify_scheduling::outbox::{Outbox, OutboxSettings};
use bookify_scheduling::routes as scheduling_routes;
use bookify_scheduling::service::SchedulingService;
use bookify_config::SchedulingConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    let config = Arc::new(load_config().expect("Failed to load config"));
    bookify_common::logging::init();

    // Persistence: SQL if a database section is configured, otherwise the
    // in-memory store (dev/offline mode).
    let repository: Arc<dyn AppointmentRepository<Error = BoxedError>> = match &config.database {
        Some(db_config) => {
            let client = DbClient::from_config(db_config)
                .await
                .expect("Failed to connect to database");
            let repository = SqlAppointmentRepository::new(client);
            repository
                .init_schema()
                .await
                .expect("Failed to initialize appointment schema");
            info!("✅ SQL appointment repository initialized.");
            Arc::new(repository)
        }
        None => {
            info!("ℹ️ No database configured, using in-memory appointment store.");
            Arc::new(InMemoryAppointmentRepository::new())
        }
    };

    // Notifications are best-effort by contract; with the flag off (or no
    // endpoints configured) the noop dispatcher absorbs the outbox traffic.
    let dispatcher: Arc<dyn NotificationDispatcher<Error = BoxedError>> =
        match (config.use_notify, &config.notify) {
            (true, Some(notify_config)) => {
                info!("✅ Webhook notification dispatcher initialized.");
                Arc::new(WebhookDispatcher::new(notify_config))
            }
            _ => {
                info!("ℹ️ Notifications disabled, using noop dispatcher.");
                Arc::new(NoopDispatcher)
            }
        };

    let outbox = Outbox::start(dispatcher, OutboxSettings::default());
    let scheduling_config = config.scheduling.clone().unwrap_or_else(SchedulingConfig::default);
    let service = Arc::new(
        SchedulingService::from_config(repository, outbox, &scheduling_config)
            .expect("Invalid scheduling configuration"),
    );

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Bookify API!" }))
        .merge(scheduling_routes::routes(config.clone(), service));

    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use bookify_scheduling::doc::SchedulingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        let openapi_doc = SchedulingApiDoc::openapi();
        println!("📖 Adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    println!("Starting server at http://{}", addr);
    println!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
