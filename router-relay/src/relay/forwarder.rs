use super::{ProxyRequest, RelayError, RequestTarget};
use axum::body::Body;
use axum::http::{header, HeaderMap};
use axum::response::Response;
use futures::TryStreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use vllm_router_core::BackendAddress;
use vllm_router_discovery::{Resolution, RouteTableHandle};

/// 请求转发器
/// 根据路由表选择后端，原样转发请求并回传后端响应
pub struct RequestForwarder {
    client: reqwest::Client,
    routes: Arc<RouteTableHandle>,
}

impl RequestForwarder {
    /// 创建转发器，只设置连接超时，不限制总请求时间
    pub fn new(routes: Arc<RouteTableHandle>, connect_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self::with_client(routes, client)
    }

    pub fn with_client(routes: Arc<RouteTableHandle>, client: reqwest::Client) -> Self {
        Self { client, routes }
    }

    pub fn routes(&self) -> &Arc<RouteTableHandle> {
        &self.routes
    }

    /// 为请求选择后端，未命中时使用默认后端
    pub fn resolve(&self, target: &RequestTarget) -> Resolution {
        let resolution = self.routes.resolve(target.model.as_deref());
        if !resolution.matched {
            debug!(
                "Model {:?} not in route table (version {}), using default backend {}",
                target.model, resolution.table_version, resolution.backend
            );
        }
        resolution
    }

    /// 转发请求
    pub async fn forward(&self, request: ProxyRequest) -> Result<Response, RelayError> {
        let target = request.target();
        let resolution = self.resolve(&target);
        let backend = resolution.backend;

        let mut url = backend.join(request.path());
        if let Some(query) = request.query() {
            url.push('?');
            url.push_str(query);
        }

        info!(
            "Query from: {} Routing to {}; Model: {}",
            request
                .peer
                .map(|peer| peer.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            backend,
            target.model.as_deref().unwrap_or("none")
        );

        let mut headers = request.headers;
        strip_hop_by_hop(&mut headers);

        let upstream = self
            .client
            .request(request.method, &url)
            .headers(headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                error!("Request to backend {} failed: {}", backend, e);
                RelayError::upstream(&backend, e)
            })?;

        if target.stream {
            Ok(Self::streaming_response(upstream, backend))
        } else {
            Self::buffered_response(upstream, backend).await
        }
    }

    /// 非流式：读取完整响应体后返回
    async fn buffered_response(
        upstream: reqwest::Response,
        backend: BackendAddress,
    ) -> Result<Response, RelayError> {
        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);

        let body = upstream.bytes().await.map_err(|e| {
            error!("Failed to read response body from {}: {}", backend, e);
            RelayError::upstream(&backend, e)
        })?;

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    /// 流式：状态码和头部立即返回，响应体按块转发
    ///
    /// 头部和数据流来自同一次后端请求。
    fn streaming_response(upstream: reqwest::Response, backend: BackendAddress) -> Response {
        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);

        let chunks = upstream.bytes_stream().inspect_err(move |e| {
            error!("Streaming response from {} interrupted: {}", backend, e);
        });

        let mut response = Response::new(Body::from_stream(chunks));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

/// 去掉逐跳头部，消息分帧由两端的HTTP实现各自生成
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONNECTION);
}
