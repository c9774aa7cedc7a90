//! FitFuel settings service binary.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fitfuel_settings::adapters::auth::{JwtConfig, JwtSessionValidator};
use fitfuel_settings::adapters::cache::{
    EventBusCacheInvalidator, LoggingCacheInvalidator, RedisCacheInvalidator,
};
use fitfuel_settings::adapters::events::RedisEventPublisher;
use fitfuel_settings::adapters::http::{api_router, SettingsHandlers};
use fitfuel_settings::adapters::profile::PgProfileRepository;
use fitfuel_settings::application::{
    DependentCacheInvalidator, LoadProfileHandler, SaveProfileHandler,
};
use fitfuel_settings::config::{AppConfig, InvalidationMode, RedisConfig, ServerConfig};
use fitfuel_settings::ports::{CacheInvalidator, EventPublisher, SessionValidator};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let auth = config.auth;
    let mut jwt = JwtConfig::new(auth.jwt_secret, auth.audience);
    jwt.leeway_secs = auth.leeway_secs;
    if let Some(issuer) = auth.issuer {
        jwt = jwt.with_issuer(issuer);
    }
    let sessions: Arc<dyn SessionValidator> = Arc::new(JwtSessionValidator::new(jwt));

    let (cache, events) = stale_signals(&config.redis).await?;
    let repository = Arc::new(PgProfileRepository::new(pool));

    let load = LoadProfileHandler::new(sessions.clone(), repository.clone());
    let mut save =
        SaveProfileHandler::new(sessions, repository, DependentCacheInvalidator::new(cache));
    if let Some(events) = events {
        save = save.with_event_publisher(events);
    }

    let app = with_layers(
        api_router(SettingsHandlers::new(Arc::new(load), Arc::new(save))),
        &config.server,
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Settings service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

/// Picks the stale-signal sink and, with Redis, the event publisher.
async fn stale_signals(
    settings: &RedisConfig,
) -> Result<(Arc<dyn CacheInvalidator>, Option<Arc<dyn EventPublisher>>), BoxError> {
    let Some(url) = settings.enabled_url() else {
        tracing::info!("No Redis configured, stale signals are logged only");
        let cache: Arc<dyn CacheInvalidator> = Arc::new(LoggingCacheInvalidator::new());
        return Ok((cache, None));
    };

    let conn = redis::Client::open(url)?
        .get_multiplexed_tokio_connection()
        .await?;
    let events: Arc<dyn EventPublisher> = Arc::new(RedisEventPublisher::new(
        conn.clone(),
        settings.events_channel.clone(),
        settings.timeout(),
    ));

    let cache: Arc<dyn CacheInvalidator> = match settings.invalidation {
        InvalidationMode::Direct => {
            tracing::info!(channel = %settings.channel, "Stale signals go to Redis");
            Arc::new(RedisCacheInvalidator::new(
                conn,
                settings.channel.clone(),
                settings.timeout(),
            ))
        }
        InvalidationMode::Events => {
            tracing::info!(channel = %settings.events_channel, "Stale signals go out as events");
            Arc::new(EventBusCacheInvalidator::new(events.clone()))
        }
    };

    Ok((cache, Some(events)))
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn with_layers(router: Router, server: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .allow_origin(AllowOrigin::list(origins));

    router
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
