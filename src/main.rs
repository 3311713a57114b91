use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use pollbox::{auth, db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Ensure data directory exists for the default database location
    std::fs::create_dir_all("data").expect("Failed to create data directory");

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/pollbox.db".to_string());
    let pool = db::init_pool(&database_url).await;
    db::run_migrations(&pool).await;

    // Bootstrap admin so a fresh deployment has someone who can create polls
    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let admin_hash =
        auth::password::hash_password(&admin_password).expect("Failed to hash admin password");
    db::seed_admin(&pool, &admin_email, &admin_hash).await;

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw =
            SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                .cookie_secure(false)
                .cookie_http_only(true)
                .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            // Public routes
            .route("/api/register", web::post().to(handlers::auth_handlers::register))
            .route("/api/login", web::post().to(handlers::auth_handlers::login))
            // Protected routes
            .service(
                web::scope("/api")
                    .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                    .route("/logout", web::post().to(handlers::auth_handlers::logout))
                    // Account
                    .route("/profile", web::get().to(handlers::account_handlers::profile))
                    .route("/profile", web::put().to(handlers::account_handlers::update_profile))
                    .route(
                        "/profile/password",
                        web::put().to(handlers::account_handlers::change_password),
                    )
                    // Polls — /polls/mine BEFORE /polls/{id} to avoid routing conflict
                    .route("/polls", web::post().to(handlers::poll_handlers::create))
                    .route("/polls", web::get().to(handlers::poll_handlers::list_all))
                    .route("/polls/mine", web::get().to(handlers::poll_handlers::list_mine))
                    .route("/polls/{id}", web::get().to(handlers::poll_handlers::read))
                    .route("/polls/{id}", web::put().to(handlers::poll_handlers::update))
                    .route("/polls/{id}", web::delete().to(handlers::poll_handlers::delete))
                    .route("/polls/{id}/vote", web::post().to(handlers::vote_handlers::cast))
                    // Admin
                    .route("/admin/users", web::get().to(handlers::admin_handlers::list_users))
                    .route(
                        "/admin/users/role",
                        web::post().to(handlers::admin_handlers::set_role),
                    )
                    .route(
                        "/admin/users/{id}",
                        web::delete().to(handlers::admin_handlers::delete_user),
                    )
                    .route(
                        "/admin/polls/{id}/summary",
                        web::get().to(handlers::admin_handlers::summary),
                    )
                    .route(
                        "/admin/polls/{id}/summary/download",
                        web::get().to(handlers::admin_handlers::download_summary),
                    ),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}
