use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use vllm_router_core::{BackendAddress, ModelId};

/// 路由表快照
///
/// 每次探测完成后整体重建，发布后不再修改。
#[derive(Debug, Clone, Serialize)]
pub struct RouteTable {
    version: u64,
    refreshed_at: Option<DateTime<Utc>>,
    routes: HashMap<ModelId, BackendAddress>,
}

impl RouteTable {
    /// 进程启动时的空表，版本为0
    pub fn empty() -> Self {
        Self {
            version: 0,
            refreshed_at: None,
            routes: HashMap::new(),
        }
    }

    pub fn new(version: u64, routes: HashMap<ModelId, BackendAddress>) -> Self {
        Self {
            version,
            refreshed_at: Some(Utc::now()),
            routes,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn routes(&self) -> &HashMap<ModelId, BackendAddress> {
        &self.routes
    }

    pub fn get(&self, model: &str) -> Option<&BackendAddress> {
        self.routes.get(model)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// 排序后的模型列表
    pub fn models(&self) -> Vec<ModelId> {
        let mut models: Vec<_> = self.routes.keys().cloned().collect();
        models.sort();
        models
    }
}

/// 一次路由解析的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub backend: BackendAddress,
    /// 模型是否在路由表中命中，未命中时使用默认后端
    pub matched: bool,
    pub table_version: u64,
}

/// 路由表句柄
///
/// 单写多读：探测任务整体替换快照，请求处理只做无锁读取。
pub struct RouteTableHandle {
    current: ArcSwap<RouteTable>,
    default_backend: BackendAddress,
}

impl RouteTableHandle {
    pub fn new(default_backend: BackendAddress) -> Self {
        Self {
            current: ArcSwap::from_pointee(RouteTable::empty()),
            default_backend,
        }
    }

    pub fn default_backend(&self) -> &BackendAddress {
        &self.default_backend
    }

    /// 获取当前快照
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.current.load_full()
    }

    /// 用新的映射整体替换路由表，返回新快照
    ///
    /// 调用方负责串行化写入，版本号基于当前快照递增。
    pub fn publish(&self, routes: HashMap<ModelId, BackendAddress>) -> Arc<RouteTable> {
        let next = Arc::new(RouteTable::new(self.current.load().version() + 1, routes));
        self.current.store(next.clone());
        next
    }

    /// 在当前快照中解析模型对应的后端
    pub fn resolve(&self, model: Option<&str>) -> Resolution {
        let table = self.current.load();
        match model.and_then(|m| table.get(m)) {
            Some(backend) => Resolution {
                backend: backend.clone(),
                matched: true,
                table_version: table.version(),
            },
            None => Resolution {
                backend: self.default_backend.clone(),
                matched: false,
                table_version: table.version(),
            },
        }
    }
}
