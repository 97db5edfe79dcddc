use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use axum::body::Body;
use http::{HeaderValue, StatusCode};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::{GovernorError, GovernorLayer};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lunar_solar_calendar::config::Config;
use lunar_solar_calendar::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lunar_solar_calendar=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting lunar solar calendar service");
    tracing::info!(
        "Serving assets from {}",
        config.server.asset_dir.display()
    );

    let app_state = Arc::new(AppState {
        config: config.clone(),
    });

    let thread_shutdown = Arc::new(AtomicBool::new(false));

    // Per-IP rate limiter for the API. The error handler keeps the same error
    // shape as `AppError -> IntoResponse`.
    let mut api_builder = GovernorConfigBuilder::default();
    api_builder.per_second(config.rate_limit.api_per_second.into());
    api_builder.burst_size(config.rate_limit.api_burst);
    api_builder.key_extractor(SmartIpKeyExtractor);
    api_builder.error_handler(|error: GovernorError| -> http::Response<Body> {
        let (status, body, retry_after, headers) = match error {
            GovernorError::TooManyRequests { wait_time, headers } => (
                StatusCode::TOO_MANY_REQUESTS,
                serde_json::json!({
                    "error": {
                        "code": "RATE_LIMITED",
                        "message": "Rate limit exceeded",
                        "details": { "retry_after_seconds": wait_time }
                    }
                }),
                Some(wait_time),
                headers,
            ),
            GovernorError::UnableToExtractKey => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": {
                        "code": "BAD_REQUEST",
                        "message": "Unable to determine client IP for rate limiting"
                    }
                }),
                None,
                None,
            ),
            GovernorError::Other { code, msg, headers } => (
                StatusCode::from_u16(code.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                serde_json::json!({
                    "error": {
                        "code": "INTERNAL_ERROR",
                        "message": msg.unwrap_or_else(|| "Rate limiting error".to_string())
                    }
                }),
                None,
                headers,
            ),
        };

        let mut resp = http::Response::new(Body::from(body.to_string()));
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        // Include any headers provided by the governor (e.g., X-RateLimit-* if enabled)
        if let Some(hmap) = headers {
            for (name, value) in hmap.iter() {
                resp.headers_mut().append(name.clone(), value.clone());
            }
        }

        if let Some(seconds) = retry_after {
            resp.headers_mut()
                .insert(http::header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        resp
    });

    let api_gov_conf = Arc::new(
        api_builder
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to build API governor config"))?,
    );

    // Background cleanup for limiter storage
    let api_cleaner = {
        let limiter = api_gov_conf.limiter().clone();
        let interval = Duration::from_secs(60);
        let flag = thread_shutdown.clone();
        std::thread::spawn(move || {
            // Use smaller sleep granularity to allow quick shutdown.
            let tick = Duration::from_secs(1);
            loop {
                for _ in 0..interval.as_secs() {
                    if flag.load(Ordering::SeqCst) {
                        tracing::info!("API rate limiter cleanup thread exiting");
                        return;
                    }
                    std::thread::sleep(tick);
                }
                tracing::debug!("API rate limiter size: {}", limiter.len());
                limiter.retain_recent();
            }
        })
    };

    let api_rate_layer = GovernorLayer {
        config: api_gov_conf.clone(),
    };

    let cors_origin = config
        .server
        .frontend_url
        .parse::<HeaderValue>()
        .map_err(|e| anyhow::anyhow!("Invalid FRONTEND_URL for CORS: {}", e))?;

    // Build router
    let app = routes::app(
        routes::api_router().layer(api_rate_layer),
        app_state.clone(),
    )
    .layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_seconds,
    )))
    .layer(TraceLayer::new_for_http())
    .layer(
        CorsLayer::new()
            .allow_origin(cors_origin)
            .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
            .allow_headers([http::header::CONTENT_TYPE, http::header::ACCEPT]),
    );

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server_fut = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    let thread_shutdown_clone = thread_shutdown.clone();
    let signal_fut = async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut term) => {
                    tokio::select! {
                        _ = ctrl_c => {},
                        _ = term.recv() => {},
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to bind SIGTERM, waiting for Ctrl+C only: {}", e);
                    let _ = ctrl_c.await;
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }

        tracing::info!("Shutdown signal received");
        thread_shutdown_clone.store(true, Ordering::SeqCst);
    };

    tokio::select! {
        res = server_fut => {
            if let Err(e) = res {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = signal_fut => {
            tracing::info!("Signal handler completed; server future dropped to stop accepting new connections");
        }
    }

    // The cleanup thread checks `thread_shutdown` once per second.
    thread_shutdown.store(true, Ordering::SeqCst);
    if let Err(e) = api_cleaner.join() {
        tracing::warn!("API rate limiter cleanup thread join failed: {:?}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
