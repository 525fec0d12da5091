//! TickerDesk API - Community blog and stock tracking backend
//!
//! CRUD endpoints for users, blog posts, and stocks with price history,
//! plus read access to the request audit logs. Every domain router is a
//! thin specialization of the generic store in `db::store`, and every
//! endpoint answers with the same response envelope.

mod auth;
mod config;
mod db;
mod error;
mod models;
mod pagination;
mod response;
mod routes;
mod state;

use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting TickerDesk API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    if std::env::var("JWT_SECRET").is_err() {
        warn!("⚠️  JWT_SECRET not set, using default (INSECURE - set in production!)");
    }

    // Initialize database pool - REQUIRED (no in-memory fallback)
    let state = match init_database_pool(&settings).await {
        Ok(pool) => {
            info!("✅ Database pool created successfully");

            if let Err(e) = create_database_tables(&pool).await {
                warn!("⚠️  Warning creating tables: {}", e);
            }

            Arc::new(AppState::new(pool))
        }
        Err(e) => {
            error!("❌ FATAL: Failed to initialize database pool: {}", e);
            error!("DATABASE_URL must be set in .env and the database must be accessible");
            return Err(e);
        }
    };

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Authentication ───");
    info!("   POST /api/v1/auth/register         - Register new account");
    info!("   POST /api/v1/auth/login            - Login with username/password");
    info!("   POST /api/v1/auth/refresh          - Refresh access token");
    info!("   GET  /api/v1/auth/me               - Get current user");
    info!("   POST /api/v1/auth/change-password  - Change password");
    info!("");
    info!("   ─── Users ───");
    info!("   POST   /api/v1/users/create        - Create user");
    info!("   GET    /api/v1/users/list          - List users (paginated)");
    info!("   GET    /api/v1/users/retrieve/:id  - Get user by id");
    info!("   PUT    /api/v1/users/update/:id    - Update user");
    info!("   DELETE /api/v1/users/delete/:id    - Delete user");
    info!("");
    info!("   ─── Blog ───");
    info!("   POST   /api/v1/blog/posts/create       - Create post");
    info!("   GET    /api/v1/blog/posts/list         - List posts (paginated)");
    info!("   GET    /api/v1/blog/posts/retrieve/:id - Get post by id");
    info!("   PATCH  /api/v1/blog/posts/update/:id   - Update post");
    info!("   DELETE /api/v1/blog/posts/delete/:id   - Delete post (soft)");
    info!("");
    info!("   ─── Stocks ───");
    info!("   POST  /api/v1/stocks/create        - Create stock (seeds history)");
    info!("   GET   /api/v1/stocks/list          - List stocks (paginated)");
    info!("   GET   /api/v1/stocks/retrieve/:id  - Get stock with history");
    info!("   PATCH /api/v1/stocks/update/:id    - Update stock (tracks price)");
    info!("");
    info!("   ─── Logs ───");
    info!("   GET /api/v1/logs/api-logs          - List API logs (paginated)");
    info!("   GET /api/v1/logs/error-logs        - List error logs (paginated)");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tickerdesk_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Initialize database pool from settings
async fn init_database_pool(settings: &Settings) -> anyhow::Result<deadpool_postgres::Pool> {
    use deadpool_postgres::{Config, ManagerConfig, RecyclingMethod};

    let db = &settings.database;

    // Managed Postgres providers require TLS
    let use_tls = std::env::var("DATABASE_URL")
        .map(|url| url.contains("sslmode=require"))
        .unwrap_or(false)
        || db.host.ends_with("neon.tech");

    let mut cfg = Config::new();
    cfg.host = Some(db.host.clone());
    cfg.port = Some(db.port);
    cfg.user = Some(db.user.clone());
    cfg.password = Some(db.password.clone());
    cfg.dbname = Some(db.database.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    let pool = if use_tls {
        let certs = rustls_native_certs::load_native_certs();
        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

        cfg.create_pool(Some(deadpool_postgres::Runtime::Tokio1), tls)
            .map_err(|e| anyhow::anyhow!("Failed to create TLS pool: {}", e))?
    } else {
        cfg.create_pool(
            Some(deadpool_postgres::Runtime::Tokio1),
            tokio_postgres::NoTls,
        )
        .map_err(|e| anyhow::anyhow!("Failed to create pool: {}", e))?
    };

    // Verify the connection works before serving traffic
    let client = pool
        .get()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to get pool connection: {}", e))?;
    let _row = client
        .query_one("SELECT 1 as ok", &[])
        .await
        .map_err(|e| anyhow::anyhow!("Failed to verify database connection: {}", e))?;

    info!("✅ Database connection successful (TLS: {})", use_tls);
    Ok(pool)
}

/// Create database tables if they don't exist
async fn create_database_tables(pool: &deadpool_postgres::Pool) -> anyhow::Result<()> {
    let client = pool.get().await?;

    // Create users table
    client
        .execute(
            "CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                username VARCHAR(50) UNIQUE NOT NULL,
                email VARCHAR(255) UNIQUE NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at TIMESTAMPTZ,
                is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
                created_by INTEGER,
                updated_by INTEGER
            )",
            &[],
        )
        .await?;

    // Create posts table
    client
        .execute(
            "CREATE TABLE IF NOT EXISTS posts (
                id SERIAL PRIMARY KEY,
                author_id INTEGER NOT NULL REFERENCES users(id),
                title VARCHAR(255) NOT NULL,
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at TIMESTAMPTZ,
                is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
                created_by INTEGER,
                updated_by INTEGER
            )",
            &[],
        )
        .await?;

    // Create stocks table
    client
        .execute(
            "CREATE TABLE IF NOT EXISTS stocks (
                id SERIAL PRIMARY KEY,
                symbol VARCHAR(10) UNIQUE NOT NULL,
                company_name VARCHAR(255) NOT NULL,
                price BIGINT NOT NULL,
                last_updated TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at TIMESTAMPTZ,
                is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
                created_by INTEGER,
                updated_by INTEGER
            )",
            &[],
        )
        .await?;

    // Create stock_history table
    client
        .execute(
            "CREATE TABLE IF NOT EXISTS stock_history (
                id SERIAL PRIMARY KEY,
                stock_id INTEGER NOT NULL REFERENCES stocks(id) ON DELETE CASCADE,
                price BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at TIMESTAMPTZ,
                is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
                created_by INTEGER,
                updated_by INTEGER
            )",
            &[],
        )
        .await?;

    // Create log tables (rows are written by the edge audit middleware)
    for table in ["api_logs", "error_logs"] {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                        id SERIAL PRIMARY KEY,
                        url VARCHAR(255) NOT NULL,
                        method VARCHAR(50) NOT NULL,
                        ip VARCHAR(255),
                        user_agent VARCHAR(255),
                        body JSONB,
                        header JSONB,
                        response JSONB,
                        system_details JSONB,
                        extra JSONB,
                        user_id INTEGER,
                        status_code VARCHAR(50),
                        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                        updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                        deleted_at TIMESTAMPTZ,
                        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
                        created_by INTEGER,
                        updated_by INTEGER
                    )",
            table
        );
        client.execute(sql.as_str(), &[]).await?;
    }

    // Create indexes for performance
    let _ = client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_posts_author_id ON posts(author_id)",
            &[],
        )
        .await;
    let _ = client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_stock_history_stock_id ON stock_history(stock_id)",
            &[],
        )
        .await;
    let _ = client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_api_logs_created_at ON api_logs(created_at)",
            &[],
        )
        .await;
    let _ = client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_error_logs_created_at ON error_logs(created_at)",
            &[],
        )
        .await;

    info!("✅ Database tables initialized");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
