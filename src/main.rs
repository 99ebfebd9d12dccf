mod config;
mod context;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
mod middlewares;
mod request;
mod response;

use actix_web::middleware::Logger;
use actix_web::web::{delete, get, post, put, resource, scope, Data};
use actix_web::{App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use config::Config;
use database::sqlx::PgSqlxManager;
use impls::banks::files::LocalBanks;
use impls::hasher::bcrypt::Bcrypt;
use impls::mailer::AnyMailer;
use impls::tokener::jwt::JWT;
use middlewares::admin::Admin;
use middlewares::jwt::JWTMiddleware;
use middlewares::rate_limit::{RateLimit, RateLimiter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    sqlx::migrate!("./migrations").run(&pool).await.context("failed to run migrations")?;

    let mailer = AnyMailer::from_config(config.email.as_ref())?;
    if config.email.is_none() {
        log::warn!("EMAIL_USER not set, outgoing mail will only be logged");
    }
    let secret = config.jwt_secret.as_bytes().to_vec();
    let limiter = Arc::new(RateLimiter::new(config.rate_limit_max, Duration::from_secs(config.rate_limit_window_secs)));
    let trust_proxy = config.trust_proxy;
    let banks_dir = config.banks_dir.as_deref().map(LocalBanks::new);

    let manager = PgSqlxManager::new(pool.clone());
    let db = Data::new(manager.clone());
    let hasher = Data::new(Bcrypt::new(config.bcrypt_cost));
    let tokener = Data::new(JWT::new(secret.clone()));
    let mailer = Data::new(mailer);
    let files = Data::new(banks_dir);
    let bind_addr = config.bind_addr.clone();
    let config = Data::new(config);

    log::info!("listening on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(hasher.clone())
            .app_data(tokener.clone())
            .app_data(mailer.clone())
            .app_data(files.clone())
            .app_data(config.clone())
            .service(
                scope("/api")
                    .route("/health", get().to(handlers::health))
                    .route("/academic-levels", get().to(handlers::subject::levels))
                    .route("/subjects", get().to(handlers::subject::subjects))
                    .route("/banks", get().to(handlers::bank::list))
                    .route("/bank/{bank}", get().to(handlers::bank::load))
                    .route("/rankings", get().to(handlers::attempt::rankings))
                    .service(
                        resource("/support-tickets")
                            .wrap(JWTMiddleware::optional(secret.clone()))
                            .wrap(RateLimit::new(limiter.clone()).trust_proxy(trust_proxy))
                            .route(post().to(handlers::ticket::open)),
                    )
                    .service(resource("/register-user").wrap(RateLimit::new(limiter.clone()).trust_proxy(trust_proxy)).route(post().to(handlers::user::register)))
                    .service(resource("/login").wrap(RateLimit::new(limiter.clone()).trust_proxy(trust_proxy)).route(post().to(handlers::user::login)))
                    .service(
                        resource("/password-reset/request")
                            .wrap(RateLimit::new(limiter.clone()).trust_proxy(trust_proxy))
                            .route(post().to(handlers::user::request_password_reset)),
                    )
                    .service(
                        resource("/password-reset/confirm")
                            .wrap(RateLimit::new(limiter.clone()).trust_proxy(trust_proxy))
                            .route(post().to(handlers::user::confirm_password_reset)),
                    )
                    .service(
                        scope("/admin")
                            .wrap(Admin::new(manager.clone()))
                            .wrap(JWTMiddleware::new(secret.clone()))
                            .route("/users", get().to(handlers::user::list))
                            .route("/users/{id}", put().to(handlers::user::set_admin))
                            .route("/users/{id}", delete().to(handlers::user::delete))
                            .route("/academic-levels", post().to(handlers::subject::create_level))
                            .route("/academic-levels/{id}", put().to(handlers::subject::update_level))
                            .route("/academic-levels/{id}", delete().to(handlers::subject::delete_level))
                            .route("/subjects", post().to(handlers::subject::create_subject))
                            .route("/subjects/{id}", put().to(handlers::subject::update_subject))
                            .route("/subjects/{id}", delete().to(handlers::subject::delete_subject))
                            .route("/banks", get().to(handlers::bank::admin_list))
                            .route("/banks", post().to(handlers::bank::create))
                            .route("/banks/{id}", get().to(handlers::bank::detail))
                            .route("/banks/{id}", put().to(handlers::bank::update))
                            .route("/banks/{id}", delete().to(handlers::bank::delete))
                            .route("/notifications", post().to(handlers::notification::create))
                            .route("/notifications/{id}", delete().to(handlers::notification::delete))
                            .route("/tickets", get().to(handlers::ticket::list))
                            .route("/tickets/{id}", put().to(handlers::ticket::update))
                            .route("/attempts", get().to(handlers::attempt::admin_list)),
                    )
                    .service(
                        scope("")
                            .wrap(JWTMiddleware::new(secret.clone()))
                            .route("/me", get().to(handlers::user::me))
                            .route("/me/preferences", put().to(handlers::user::update_preferences))
                            .route("/me/password", put().to(handlers::user::change_password))
                            .route("/attempts", post().to(handlers::attempt::submit))
                            .route("/attempts", get().to(handlers::attempt::list))
                            .route("/attempts/{id}", get().to(handlers::attempt::detail))
                            .route("/notifications", get().to(handlers::notification::list))
                            .route("/notifications/read-all", put().to(handlers::notification::mark_all_read))
                            .route("/notifications/{id}/read", put().to(handlers::notification::mark_read)),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await?;
    Ok(())
}
