use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::error::{AppError, AppResult};
use crate::models::AppConfig;
use crate::proxy::config::{ListenProtocol, ProxyConfig};
use crate::proxy::credentials::UpstreamCredential;
use crate::proxy::session::SessionManager;
use crate::proxy::signer::Signer;
use crate::proxy::upstream::{Dispatcher, UpstreamTransport};

/// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(sessions: SessionManager, dispatcher: Dispatcher) -> Self {
        Self {
            sessions: Arc::new(sessions),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Wire the service from config, the loaded credential and a transport
    pub fn from_config(
        config: &AppConfig,
        credential: Arc<UpstreamCredential>,
        transport: Arc<dyn UpstreamTransport>,
    ) -> Self {
        let signer = Signer::new(credential, config.upstream.host.clone());
        let dispatcher = Dispatcher::new(
            signer,
            transport,
            Duration::from_secs(config.upstream.request_timeout_secs),
        );
        Self::new(SessionManager::new(&config.session), dispatcher)
    }
}

/// Build routes
pub fn build_router(state: AppState) -> Router {
    use crate::proxy::handlers;

    // Every VMS operation sits behind the session gate
    let protected = Router::new()
        .route("/api/doors/door/linked", post(handlers::doors::handle_linked_doors))
        .route("/api/visitors/visitor/list", post(handlers::visitors::handle_visitor_list))
        .route(
            "/api/register/visitor/register",
            post(handlers::visitors::handle_register_visitor),
        )
        .route("/api/system/version", get(handlers::system::handle_version))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::proxy::middleware::auth_middleware,
        ));

    Router::new()
        .route("/token", post(handlers::auth::handle_token))
        .route("/healthz", get(handlers::system::health_check_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(crate::proxy::middleware::cors_layer())
        .with_state(state)
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AxumServer {
    /// Start Axum server
    ///
    /// HTTPS mode without usable cert/key files falls back to plain HTTP.
    pub async fn start(
        config: &ProxyConfig,
        base_dir: &Path,
        state: AppState,
    ) -> AppResult<(Self, tokio::task::JoinHandle<()>)> {
        let app = build_router(state);

        let tls = match config.protocol {
            ListenProtocol::Http => None,
            ListenProtocol::Https => {
                let cert_file = base_dir.join(&config.cert_file);
                let key_file = base_dir.join(&config.key_file);
                match crate::proxy::tls::load_acceptor(&cert_file, &key_file) {
                    Ok(acceptor) => Some(acceptor),
                    Err(e) => {
                        error!("HTTPS selected but TLS setup failed ({}), falling back to HTTP", e);
                        None
                    }
                }
            }
        };

        // Bind address
        let addr = format!("{}:{}", config.get_bind_address(), config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind address {}: {}", addr, e)))?;

        let scheme = if tls.is_some() { "https" } else { "http" };
        tracing::info!("VMS controller started at {}://{}", scheme, addr);

        // Create shutdown channel
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
        };

        // Start server in new task
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, peer)) => {
                                let app = app.clone();
                                let tls = tls.clone();

                                tokio::task::spawn(async move {
                                    match tls {
                                        Some(acceptor) => match acceptor.accept(stream).await {
                                            Ok(tls_stream) => serve_connection(tls_stream, app).await,
                                            Err(e) => debug!("TLS handshake with {} failed: {:?}", peer, e),
                                        },
                                        None => serve_connection(stream, app).await,
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("VMS controller stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    /// Stop server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_connection<I>(io: I, app: Router)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    use hyper::server::conn::http1;
    use hyper_util::rt::TokioIo;
    use hyper_util::service::TowerToHyperService;

    let service = TowerToHyperService::new(app);
    if let Err(err) = http1::Builder::new()
        .serve_connection(TokioIo::new(io), service)
        .await
    {
        debug!("Connection handling finished or errored: {:?}", err);
    }
}
