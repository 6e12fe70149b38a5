use crate::app::AppState;
use axum::{
    routing::{get, MethodRouter},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{models::available_models, proxy::proxy};

/// 创建应用路由
///
/// `/available_models` 只拦截GET，其余方法与所有其他路径一样转发给后端。
/// 只接受 GET/POST/PUT/PATCH/DELETE/OPTIONS，其他方法返回405。
pub fn create_app_router(cors: bool) -> Router<AppState> {
    let router = Router::new()
        .route(
            "/available_models",
            get(available_models)
                .post(proxy)
                .put(proxy)
                .patch(proxy)
                .delete(proxy)
                .options(proxy),
        )
        .route("/", forwarded())
        .route("/{*path}", forwarded())
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// 转发给后端的方法
fn forwarded() -> MethodRouter<AppState> {
    get(proxy)
        .post(proxy)
        .put(proxy)
        .patch(proxy)
        .delete(proxy)
        .options(proxy)
}
