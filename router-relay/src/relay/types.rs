use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use vllm_router_core::BackendAddress;

/// 转发过程中的错误
#[derive(Debug, Error)]
pub enum RelayError {
    /// 读取客户端请求体失败
    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    /// 后端超时
    #[error("backend {backend} timed out: {source}")]
    UpstreamTimeout {
        backend: BackendAddress,
        #[source]
        source: reqwest::Error,
    },

    /// 后端不可达、连接被重置等传输错误
    #[error("backend {backend} is unavailable: {source}")]
    UpstreamUnavailable {
        backend: BackendAddress,
        #[source]
        source: reqwest::Error,
    },
}

impl RelayError {
    /// 根据reqwest错误区分超时和其他传输错误
    pub fn upstream(backend: &BackendAddress, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            RelayError::UpstreamTimeout {
                backend: backend.clone(),
                source,
            }
        } else {
            RelayError::UpstreamUnavailable {
                backend: backend.clone(),
                source,
            }
        }
    }

    /// 获取对应的HTTP状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::RequestBody(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RelayError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            RelayError::RequestBody(_) => "invalid_request_body",
            RelayError::UpstreamTimeout { .. } => "upstream_timeout",
            RelayError::UpstreamUnavailable { .. } => "upstream_unavailable",
        }
    }

    pub fn backend(&self) -> Option<&BackendAddress> {
        match self {
            RelayError::RequestBody(_) => None,
            RelayError::UpstreamTimeout { backend, .. }
            | RelayError::UpstreamUnavailable { backend, .. } => Some(backend),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
                "backend": self.backend().map(BackendAddress::as_str),
                "code": status.as_u16(),
            }
        });
        (status, Json(body)).into_response()
    }
}
