mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{AuthService, TokenService};
use crate::features::exports::{routes as exports_routes, ExportService};
use crate::features::mail::{routes as mail_routes, MailService};
use crate::features::members::{routes as members_routes, MemberService};
use crate::features::photos::{routes as photos_routes, PhotoCleanupService, PhotoCleanupWorker};
use crate::features::reports::{routes as reports_routes, ReportService};
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::mail::{Mailer, SmtpMailer};
use crate::modules::storage::PhotoStore;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(2)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded (tokio_worker_threads={}, pid={})",
        worker_threads,
        std::process::id()
    );

    // The SQLite file and the choice lists share the data directory
    tokio::fs::create_dir_all(&config.storage.data_dir).await?;
    let photo_store = Arc::new(PhotoStore::new(config.storage.upload_dir.clone()));
    photo_store
        .ensure_root()
        .await
        .map_err(|e| anyhow::anyhow!("Cannot create upload directory: {}", e))?;

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Auth
    let token_service = Arc::new(TokenService::new(&config.auth));
    let auth_service = Arc::new(AuthService::new(
        pool.clone(),
        token_service,
        config.auth.cookie_secure,
    ));

    // Domain services
    let member_service = Arc::new(MemberService::new(
        pool.clone(),
        config.storage.data_dir.clone(),
    ));
    let user_service = Arc::new(UserService::new(pool.clone(), Arc::clone(&photo_store)));
    let report_service = Arc::new(ReportService::new(
        pool.clone(),
        Arc::clone(&photo_store),
        Arc::clone(&member_service),
        config.storage.data_dir.clone(),
        config.storage.min_photo_count,
    ));
    let export_service = Arc::new(ExportService::new(
        pool.clone(),
        Arc::clone(&photo_store),
        Arc::clone(&member_service),
    ));

    // Mail
    let mailer: Arc<dyn Mailer> = Arc::new(
        SmtpMailer::from_config(&config.mail)
            .map_err(|e| anyhow::anyhow!("Invalid mail configuration: {}", e))?,
    );
    let mail_service = Arc::new(MailService::new(
        pool.clone(),
        mailer,
        config.mail.clone(),
        Arc::clone(&report_service),
    ));

    // Photo retention
    let cleanup_service = Arc::new(PhotoCleanupService::new(
        pool.clone(),
        Arc::clone(&photo_store),
        config.cleanup.clone(),
    ));
    if config.cleanup.enabled {
        let worker = PhotoCleanupWorker::new(Arc::clone(&cleanup_service));
        tokio::spawn(async move {
            worker.run().await;
        });
    } else {
        tracing::info!("Scheduled photo cleanup disabled");
    }

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require a session)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(users_routes::routes(user_service))
        .merge(reports_routes::routes(
            report_service,
            Arc::clone(&mail_service),
            config.app.max_upload_bytes,
        ))
        .merge(mail_routes::routes(mail_service))
        .merge(members_routes::routes(member_service))
        .merge(exports_routes::routes(export_service))
        .merge(photos_routes::routes(cleanup_service))
        .merge(photos_routes::file_routes(photo_store.root()))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&auth_service),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(auth_routes::public_routes(auth_service))
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
