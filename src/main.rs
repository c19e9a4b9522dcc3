use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use std::sync::Arc;

use taskforge_auth::auth::{PasswordHasher, SystemClock};
use taskforge_auth::config::Config;
use taskforge_auth::repository::PgUserRepository;
use taskforge_auth::routes;
use taskforge_auth::service::{AuthService, AuthServiceConfig};

fn startup_error(context: &str, error: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, error);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, error))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let users = PgUserRepository::connect(&config.database_url, config.database_max_connections)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;
    sqlx::migrate!("./migrations")
        .run(users.pool())
        .await
        .map_err(|e| startup_error("failed to run migrations", e))?;

    let access_credentials = config
        .access_token
        .credentials("access")
        .map_err(|e| startup_error("invalid access token keys", e))?;
    let refresh_credentials = config
        .refresh_token
        .credentials("refresh")
        .map_err(|e| startup_error("invalid refresh token keys", e))?;
    let hasher = PasswordHasher::new(config.bcrypt_cost)
        .map_err(|e| startup_error("invalid bcrypt cost", e))?;

    let service = AuthService::new(AuthServiceConfig {
        users: Arc::new(users),
        access_credentials,
        refresh_credentials,
        hasher,
        clock: Arc::new(SystemClock),
        request_timeout: config.request_timeout,
    })
    .map_err(|e| startup_error("failed to build auth service", e))?;
    let service = web::Data::new(service);

    log::info!("Starting taskforge-auth at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config(service.clone()))
            .default_service(web::to(routes::not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
