use super::{BackendProbe, ProbeError, RouteTable, RouteTableHandle};
use anyhow::Result;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vllm_router_core::{BackendAddress, DiscoverySettings, ModelId};

/// 一次探测的结果
#[derive(Debug)]
pub struct SweepReport {
    /// 本次发布的路由表
    pub table: Arc<RouteTable>,
    /// 探测失败的后端及原因
    pub failures: Vec<(BackendAddress, ProbeError)>,
    pub duration: Duration,
}

/// 后端发现服务
/// 探测所有配置的后端，并整体替换路由表
pub struct DiscoveryService {
    addresses: Vec<BackendAddress>,
    probe: BackendProbe,
    routes: Arc<RouteTableHandle>,
    sweep_lock: Mutex<()>,
}

impl DiscoveryService {
    /// 根据配置创建发现服务
    pub fn new(settings: &DiscoverySettings) -> Result<Self> {
        let default_backend = settings.default_backend()?.clone();
        Ok(Self::with_probe(
            settings.addresses.clone(),
            default_backend,
            BackendProbe::new(settings.probe_timeout()),
        ))
    }

    pub fn with_probe(
        addresses: Vec<BackendAddress>,
        default_backend: BackendAddress,
        probe: BackendProbe,
    ) -> Self {
        Self {
            addresses,
            probe,
            routes: Arc::new(RouteTableHandle::new(default_backend)),
            sweep_lock: Mutex::new(()),
        }
    }

    pub fn addresses(&self) -> &[BackendAddress] {
        &self.addresses
    }

    /// 路由表句柄，供请求转发读取
    pub fn routes(&self) -> Arc<RouteTableHandle> {
        self.routes.clone()
    }

    /// 探测所有后端并发布新的路由表
    ///
    /// 并发的调用会排队执行，保证路由表版本按顺序发布。
    pub async fn sweep(&self) -> SweepReport {
        let _guard = self.sweep_lock.lock().await;
        let start_time = Instant::now();

        debug!("Starting discovery sweep for {} backends", self.addresses.len());

        let outcomes = join_all(self.addresses.iter().map(|address| async move {
            (address, self.probe.probe(address).await)
        }))
        .await;

        let mut routes: HashMap<ModelId, BackendAddress> = HashMap::new();
        let mut failures = Vec::new();

        // 按配置顺序合并，同一模型以后配置的后端为准
        for (address, outcome) in outcomes {
            match outcome {
                Ok(model) => {
                    if let Some(previous) = routes.insert(model.clone(), address.clone()) {
                        warn!(
                            "Model '{}' is served by both {} and {}; routing to {}",
                            model, previous, address, address
                        );
                    }
                }
                Err(e) => {
                    warn!("Probe failed for backend {}: {}", address, e);
                    failures.push((address.clone(), e));
                }
            }
        }

        let table = self.routes.publish(routes);
        let duration = start_time.elapsed();

        info!(
            "Updated map (version {}, {}ms): {:?}",
            table.version(),
            duration.as_millis(),
            table.routes()
        );

        SweepReport {
            table,
            failures,
            duration,
        }
    }

    /// 立即刷新并返回可用模型列表
    pub async fn refresh(&self) -> Vec<ModelId> {
        info!("Manual discovery sweep triggered");
        self.sweep().await.table.models()
    }
}
