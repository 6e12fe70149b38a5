use crate::logging::init_logging;
use crate::router::router::create_app_router;
use vllm_router_core::config::loader::{get_config_path, load_config};
use vllm_router_core::Config;
use vllm_router_discovery::{DiscoveryScheduler, DiscoveryService};
use vllm_router_relay::RequestForwarder;

use anyhow::Result;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<DiscoveryService>,
    pub forwarder: Arc<RequestForwarder>,
    pub config: Arc<Config>,
}

impl AppState {
    /// 创建新的应用状态，路由表初始为空
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let discovery = Arc::new(DiscoveryService::new(&config.discovery)?);
        let forwarder = Arc::new(RequestForwarder::new(
            discovery.routes(),
            config.server.connect_timeout(),
        ));

        Ok(Self {
            discovery,
            forwarder,
            config: Arc::new(config),
        })
    }
}

/// 创建应用路由
pub fn create_app(state: AppState) -> Router {
    create_app_router(state.config.server.cors).with_state(state)
}

/// 启动应用服务器
pub async fn start_server() -> Result<()> {
    let config_path = get_config_path();
    let config = load_config()?;

    let _log_guard = init_logging(&config.logging)?;

    info!("Starting vLLM Router...");
    info!("Configuration loaded successfully from: {}", config_path);
    if let Some(file) = &config.logging.file {
        info!("Appending logs to: {}", file);
    }

    let app_state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            return Err(e);
        }
    };

    info!(
        "Backends: {:?} (default: {})",
        app_state.config.discovery.addresses,
        app_state.discovery.routes().default_backend()
    );

    // 接收流量前先探测一次
    let initial = app_state.discovery.sweep().await;
    if initial.table.is_empty() {
        warn!("Initial discovery found no models; all requests go to the default backend");
    }

    let bind_addr = std::env::var("BIND_ADDRESS")
        .unwrap_or_else(|_| app_state.config.server.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    serve(listener, app_state, shutdown_signal()).await
}

/// 在已绑定的监听器上运行服务，直到 `signal` 完成
///
/// 收到信号时立即取消发现调度，再等待进行中的请求结束。
pub async fn serve<F>(listener: TcpListener, app_state: AppState, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let discovery_settings = app_state.config.discovery.clone();
    let scheduler = DiscoveryScheduler::spawn(
        app_state.discovery.clone(),
        discovery_settings.interval(),
    );
    let token = scheduler.cancellation_token();

    let addr = listener.local_addr()?;
    let app = create_app(app_state);

    info!("Server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /available_models - Refresh and list routable models");
    info!("  *    /*                - GET/POST/PUT/PATCH/DELETE/OPTIONS forwarded to the backend serving the model");

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        signal.await;
        token.cancel();
        info!("Discovery stopped, waiting for in-flight requests to finish");
    });

    let result = server.await;
    if let Err(e) = &result {
        error!("Server error: {}", e);
    }

    if let Err(e) = scheduler
        .shutdown(discovery_settings.shutdown_timeout())
        .await
    {
        warn!("{}", e);
    }
    info!("Application shutdown complete");

    result.map_err(Into::into)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
