use crate::app::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use vllm_router_core::ModelId;

/// 模型列表响应
#[derive(Debug, Serialize)]
pub struct AvailableModels {
    pub available_models: Vec<ModelId>,
}

/// 立即重新探测所有后端并返回可路由的模型
pub async fn available_models(State(state): State<AppState>) -> Json<AvailableModels> {
    let available_models = state.discovery.refresh().await;
    Json(AvailableModels { available_models })
}
