//! Main entry point for the Stayhub booking API server.
//! This crate reads the configuration, prepares the database and serves the
//! REST API.

mod config;
mod cors;

use std::sync::Arc;

use actix_files::Files;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;

use auth_services::jwt::JwtService;
use auth_services::repository::PgUserRepository;
use auth_services::service::AuthService;
use auth_services::types::CookieSettings;
use listing_services::{BookingService, PgBookingRepository, PgPlaceRepository, PlaceService};
use postgres::database::*;
use upload_services::types::DEFAULT_MAX_FILES;
use upload_services::{
    CloudinaryHost, ImageHost, LocalImageHost, UPLOADS_ROUTE, UploadLimits, UploadService,
};
use web_handlers::configure_api;

use crate::config::ServerConfig;
use crate::cors::build_cors;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting Stayhub API server...");

    let config = ServerConfig::from_env().context("invalid server configuration")?;

    // Create database connection pool
    let pool = match create_connection_pool(&config.database_url).await {
        Ok(pool) => {
            log::info!("🗃️ Database pool created successfully");
            pool
        }
        Err(e) => {
            log::error!("❌ Failed to create database pool: {}", e);
            log::error!("💡 Make sure PostgreSQL is running and DATABASE_URL is correct");
            return Err(e).context("failed to connect to PostgreSQL");
        }
    };

    if let Err(e) = test_connection(&pool).await {
        log::error!("❌ Database connection test failed: {}", e);
    }

    run_migrations(&pool)
        .await
        .context("failed to apply database migrations")?;

    // Services
    let places = Arc::new(PgPlaceRepository::new(pool.clone()));
    let auth_service = web::Data::new(AuthService::new(Arc::new(PgUserRepository::new(
        pool.clone(),
    ))));
    let jwt_service = web::Data::new(JwtService::new(&config.jwt_secret, config.token_ttl));
    let cookie_settings = web::Data::new(CookieSettings {
        production: config.production,
    });
    let place_service = web::Data::new(PlaceService::new(places.clone()));
    let booking_service = web::Data::new(BookingService::new(
        Arc::new(PgBookingRepository::new(pool.clone())),
        places,
    ));

    // Image host: Cloudinary when configured, local directory otherwise
    let (host, local_dir): (Arc<dyn ImageHost>, Option<String>) = match config.cloudinary.clone() {
        Some(cloudinary) => {
            log::info!("☁️ Uploading images to Cloudinary cloud {}", cloudinary.cloud_name);
            (Arc::new(CloudinaryHost::new(cloudinary)), None)
        }
        None => {
            log::warn!(
                "📁 Cloudinary not configured, storing images in {}",
                config.upload_dir
            );
            let host = LocalImageHost::new(
                &config.upload_dir,
                &config.public_url,
                config.max_upload_bytes,
            )
            .context("failed to prepare the upload directory")?;
            (Arc::new(host), Some(config.upload_dir.clone()))
        }
    };
    let upload_service = web::Data::new(UploadService::new(
        host,
        UploadLimits {
            max_file_size: config.max_upload_bytes,
            max_files: DEFAULT_MAX_FILES,
        },
    ));

    let (bind_host, port) = config.bind_address();
    log::info!("🌐 Server will be available at: http://{}:{}", bind_host, port);

    let server_config = config.clone();
    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(auth_service.clone())
            .app_data(jwt_service.clone())
            .app_data(cookie_settings.clone())
            .app_data(place_service.clone())
            .app_data(booking_service.clone())
            .app_data(upload_service.clone())
            .wrap(build_cors(&server_config))
            .wrap(Logger::default())
            .configure(configure_api);

        if let Some(dir) = &local_dir {
            app = app.service(Files::new(UPLOADS_ROUTE, dir));
        }
        app
    })
    .bind((bind_host, port))?
    .run()
    .await?;

    Ok(())
}
