use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use hotel_gateway::{
    background_task::start_eviction_task,
    errors::expose_error_details,
    graceful_shutdown::shutdown_signal,
    handlers::home::not_found,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn build_cors(config: &AppConfig) -> Cors {
    let origins = config.cors_origins();

    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::RETRY_AFTER, header::ALLOW])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.is_production());
    tracing::info!("Loaded configuration: {:?}", config);

    expose_error_details(config.is_development());

    let app_state = match AppState::new(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Startup error: {:#}", e);
            std::process::exit(1);
        }
    };

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let limiter_store = app_state.recaptcha_handler.limiter.local_store().clone();
    let cms_cache = app_state
        .content_handler
        .source
        .as_ref()
        .map(|client| client.cache().clone());
    let idle_ttl = config.rate_limit_window() + Duration::from_secs(60);

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&server_config))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
            .default_service(web::to(not_found))
    })
    .workers(config.worker_count.max(1))
    .bind(server_addr)?
    .run();

    tokio::spawn(start_eviction_task(limiter_store, idle_ttl, cms_cache));

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
