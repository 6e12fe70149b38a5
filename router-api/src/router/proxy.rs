use crate::app::AppState;
use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use vllm_router_relay::ProxyRequest;

/// 通用转发处理器
pub async fn proxy(State(state): State<AppState>, request: Request) -> Response {
    let request = match ProxyRequest::from_request(request).await {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state.forwarder.forward(request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
