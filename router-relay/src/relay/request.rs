use super::RelayError;
use axum::body::Body;
use axum::extract::{ConnectInfo, Query};
use axum::http::{header, HeaderMap, Method, Request, Uri};
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use vllm_router_core::ModelId;

/// 从请求中解析出的路由信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTarget {
    pub model: Option<ModelId>,
    pub stream: bool,
}

impl RequestTarget {
    /// 提取模型名称和流式标志
    ///
    /// POST/PUT/PATCH 先读请求体中的JSON对象，请求体不是JSON对象时回退到查询参数；
    /// 其他方法只读查询参数。
    pub fn inspect(method: &Method, uri: &Uri, body: &[u8]) -> Self {
        if method_carries_body(method) {
            if let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) {
                return Self {
                    model: fields.get("model").and_then(Value::as_str).map(str::to_string),
                    stream: fields.get("stream").and_then(Value::as_bool).unwrap_or(false),
                };
            }
        }

        Self {
            model: model_from_query(uri),
            stream: false,
        }
    }
}

fn method_carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn model_from_query(uri: &Uri) -> Option<ModelId> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .ok()
        .and_then(|Query(mut params)| params.remove("model"))
}

/// 待转发的请求
#[derive(Debug)]
pub struct ProxyRequest {
    pub method: Method,
    pub uri: Uri,
    /// 已去掉 `host` 的请求头
    pub headers: HeaderMap,
    pub body: Bytes,
    pub peer: Option<SocketAddr>,
}

impl ProxyRequest {
    pub fn new(method: Method, uri: Uri, mut headers: HeaderMap, body: Bytes) -> Self {
        headers.remove(header::HOST);
        Self {
            method,
            uri,
            headers,
            body,
            peer: None,
        }
    }

    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    /// 读取完整请求体并构建转发请求
    pub async fn from_request(request: Request<Body>) -> Result<Self, RelayError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(RelayError::RequestBody)?;

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let mut request = Self::new(parts.method, parts.uri, parts.headers, body);
        request.peer = peer;
        Ok(request)
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn target(&self) -> RequestTarget {
        RequestTarget::inspect(&self.method, &self.uri, &self.body)
    }
}
