//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the submission handler
//! - Wire up middleware (request ID, tracing, panic capture, timeout, body limit)
//! - Own the rate limiter and run its reaper
//! - Apply reloaded rate-limit settings
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::HeaderMap,
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::delivery::{build_sink, DeliveryError, DeliverySink};
use crate::http::request::make_request_span;
use crate::http::response::panic_response;
use crate::security::{FixedWindowLimiter, Reaper, WindowPolicy};
use crate::submission::{Acceptance, SubmissionError, SubmissionPipeline};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SubmissionPipeline>,
}

/// HTTP server for the intake gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    limiter: Arc<FixedWindowLimiter>,
}

impl HttpServer {
    /// Create a server delivering to the sink named in `config`.
    pub fn new(config: GatewayConfig) -> Result<Self, DeliveryError> {
        let sink = build_sink(&config.delivery, config.observability.log_submissions)?;
        Ok(Self::with_sink(config, sink))
    }

    /// Create a server delivering to `sink`.
    pub fn with_sink(config: GatewayConfig, sink: Arc<dyn DeliverySink>) -> Self {
        let limiter = Arc::new(FixedWindowLimiter::new(WindowPolicy::from(&config.rate_limit)));
        let pipeline = Arc::new(SubmissionPipeline::new(
            limiter.clone(),
            sink,
            config.delivery.timeout(),
        ));

        let router = Self::build_router(&config, AppState { pipeline });
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.listener.submission_path, post(submit_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(std::time::Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Reloaded configs arrive on `config_updates`; the server stops when
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.listener.submission_path,
            "HTTP server starting"
        );

        let reaper = Reaper::new(self.limiter.clone(), self.config.rate_limit.sweep_interval());
        tokio::spawn(reaper.run(shutdown.resubscribe()));

        let limiter = self.limiter.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => apply_reload(&limiter, &config),
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The live rate limiter.
    pub fn limiter(&self) -> Arc<FixedWindowLimiter> {
        self.limiter.clone()
    }

    /// A handle to the router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

fn apply_reload(limiter: &FixedWindowLimiter, config: &GatewayConfig) {
    limiter.set_policy(WindowPolicy::from(&config.rate_limit));
    tracing::info!("Config reloaded; settings outside [rate_limit] apply after restart");
}

/// POST handler for the submission endpoint.
async fn submit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Acceptance, SubmissionError> {
    state.pipeline.process(&headers, &body).await
}
