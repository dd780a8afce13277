//! Yoga Sessions server
//!
//! Wires configuration, logging, persistence, the event bus and the HTTP
//! API together, then serves until SIGINT/SIGTERM.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use yoga_sessions::adapters::auth::JwtSessionValidator;
use yoga_sessions::adapters::events::{InMemoryEventBus, RedisEventBus, RedisEventBusConfig};
use yoga_sessions::adapters::http::middleware::RateLimiterState;
use yoga_sessions::adapters::http::{build_router, ApiDependencies, ApiState, RouterOptions};
use yoga_sessions::adapters::memory::{
    InMemoryLocationRepository, InMemoryPhotoRepository, InMemorySessionRepository,
};
use yoga_sessions::adapters::postgres::{
    self, PoolSettings, PostgresLocationRepository, PostgresPhotoRepository,
    PostgresSessionRepository,
};
use yoga_sessions::adapters::rate_limiter::{
    InMemoryRateLimiter, RateLimitConfig, RedisRateLimiter, ThrottleRule,
};
use yoga_sessions::adapters::storage::LocalObjectStorage;
use yoga_sessions::application::handlers::media::MediaSettings;
use yoga_sessions::application::Consumers;
use yoga_sessions::config::{AppConfig, ConfigError, RateLimitSettings, RedisConfig};
use yoga_sessions::ports::{
    EventPublisher, LocationRepository, ObjectStorage, PhotoRepository, SessionRepository,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

fn load_configuration() -> Result<AppConfig, ConfigError> {
    let config = AppConfig::load()?;
    config.validate()?;
    Ok(config)
}

/// JSON logs in production, pretty logs otherwise. `RUST_LOG` wins over config.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        fmt().pretty().with_env_filter(filter).with_target(true).init();
    }
}

struct Stores {
    sessions: Arc<dyn SessionRepository>,
    locations: Arc<dyn LocationRepository>,
    photos: Arc<dyn PhotoRepository>,
}

async fn open_stores(config: &AppConfig) -> Result<Stores, BoxError> {
    let Some(database) = &config.database else {
        tracing::warn!("no database configured, using in-memory stores");
        return Ok(Stores {
            sessions: Arc::new(InMemorySessionRepository::new()),
            locations: Arc::new(InMemoryLocationRepository::new()),
            photos: Arc::new(InMemoryPhotoRepository::new()),
        });
    };

    let pool = postgres::connect(
        &database.url,
        &PoolSettings {
            max_connections: database.max_connections,
            min_connections: database.min_connections,
            connect_timeout: database.connect_timeout(),
        },
    )
    .await?;
    tracing::info!("database pool ready");

    if database.run_migrations {
        postgres::run_migrations(&pool).await?;
    }

    Ok(Stores {
        sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
        locations: Arc::new(PostgresLocationRepository::new(pool.clone())),
        photos: Arc::new(PostgresPhotoRepository::new(pool)),
    })
}

fn redis_bus_config(redis: &RedisConfig) -> RedisEventBusConfig {
    let mut bus = RedisEventBusConfig::default()
        .with_stream_prefix(redis.stream_prefix.clone())
        .with_group(redis.consumer_group.clone());
    if let Some(name) = &redis.consumer_name {
        bus = bus.with_consumer(name.clone());
    }
    bus.block = redis.block();
    bus.claim_idle = redis.claim_idle();
    bus.batch_size = redis.batch_size;
    bus
}

fn rate_limit_config(settings: &RateLimitSettings) -> RateLimitConfig {
    RateLimitConfig {
        medium: ThrottleRule::new(settings.medium_limit, settings.medium_window_secs),
        long: ThrottleRule::new(settings.long_limit, settings.long_window_secs),
        upload: ThrottleRule::new(settings.upload_limit, settings.upload_window_secs),
        delete: ThrottleRule::new(settings.delete_limit, settings.delete_window_secs),
    }
}

/// Shared counters in Redis when available, per-process counters otherwise.
async fn open_rate_limiter(config: &AppConfig) -> Result<Option<RateLimiterState>, BoxError> {
    if !config.rate_limit.enabled {
        tracing::warn!("rate limiting disabled");
        return Ok(None);
    }
    let limits = rate_limit_config(&config.rate_limit);
    let limiter: RateLimiterState = match &config.redis {
        Some(redis) => Arc::new(RedisRateLimiter::connect(&redis.url, limits).await?),
        None => Arc::new(InMemoryRateLimiter::new(limits)),
    };
    Ok(Some(limiter))
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting yoga-sessions");

    let stores = open_stores(&config).await?;

    tokio::fs::create_dir_all(&config.storage.root_dir).await?;
    let storage: Arc<dyn ObjectStorage> = Arc::new(LocalObjectStorage::new(
        &config.storage.root_dir,
        config.storage.public_base_url.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Bus first: consumers need a publisher, the Redis consumer loop needs subscriptions.
    let (publisher, consumer_task): (Arc<dyn EventPublisher>, _) = match &config.redis {
        Some(redis) => {
            let bus = Arc::new(RedisEventBus::connect(&redis.url, redis_bus_config(redis)).await?);
            let consumers = Consumers::new(
                stores.sessions.clone(),
                stores.locations.clone(),
                stores.photos.clone(),
                storage.clone(),
                bus.clone(),
            );
            consumers.register(bus.as_ref());

            let runner = bus.clone();
            let task = tokio::spawn(async move {
                if let Err(e) = runner.run(shutdown_rx).await {
                    tracing::error!(error = %e, "event consumer stopped");
                }
            });
            (bus as Arc<dyn EventPublisher>, Some(task))
        }
        None => {
            tracing::warn!("no redis configured, using the in-process event bus");
            let bus = Arc::new(InMemoryEventBus::new());
            let consumers = Consumers::new(
                stores.sessions.clone(),
                stores.locations.clone(),
                stores.photos.clone(),
                storage.clone(),
                bus.clone(),
            );
            consumers.register(bus.as_ref());
            (bus as Arc<dyn EventPublisher>, None)
        }
    };

    let validator = Arc::new(JwtSessionValidator::new(
        &config.auth.jwt_secret,
        config.auth.issuer.clone(),
    ));

    let state = ApiState::new(ApiDependencies {
        sessions: stores.sessions,
        locations: stores.locations,
        photos: stores.photos,
        storage,
        publisher,
        auth: validator,
        media_settings: MediaSettings {
            user_photo_folder: config.storage.user_photo_folder.clone(),
            session_photo_folder: config.storage.session_photo_folder.clone(),
            max_file_bytes: config.storage.max_file_bytes,
        },
        rate_limiter: open_rate_limiter(&config).await?,
    });

    let app = build_router(
        state,
        &RouterOptions {
            cors_origins: config.server.cors_origins_list(),
            request_timeout: config.server.request_timeout(),
            max_file_bytes: config.storage.max_file_bytes,
            files_dir: Some(config.storage.root_dir.clone()),
        },
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    // Peer addresses feed the rate limiter when no proxy header is present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    })
    .await?;

    if let Some(task) = consumer_task {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "event consumer task panicked");
        }
    }

    tracing::info!("server shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
