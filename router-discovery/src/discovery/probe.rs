use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use vllm_router_core::{BackendAddress, ModelId};

/// 单次探测失败的原因
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("malformed model list: {0}")]
    MalformedBody(String),

    #[error("model list is empty")]
    NoModels,
}

impl From<reqwest::Error> for ProbeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProbeError::Timeout
        } else if error.is_decode() {
            ProbeError::MalformedBody(error.to_string())
        } else {
            ProbeError::Network(error)
        }
    }
}

/// 后端探测器
/// 通过 `GET <address>/v1/models` 查询后端当前提供的模型
#[derive(Clone)]
pub struct BackendProbe {
    client: Client,
}

impl BackendProbe {
    /// 创建新的探测器，`timeout` 限制整个探测请求的时间
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// 探测单个后端，返回它提供的第一个模型
    pub async fn probe(&self, address: &BackendAddress) -> Result<ModelId, ProbeError> {
        let start_time = Instant::now();
        let url = address.models_url();
        debug!("Probing backend {} via {}", address, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ProbeError::Status(status));
        }

        let body: Value = response.json().await?;
        let model = extract_first_model(&body)?;

        debug!(
            "Backend {} serves model '{}' ({}ms)",
            address,
            model,
            start_time.elapsed().as_millis()
        );
        Ok(model)
    }
}

/// 从 `{"data": [{"id": "..."}, ...]}` 中取第一个模型ID
fn extract_first_model(body: &Value) -> Result<ModelId, ProbeError> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ProbeError::MalformedBody("missing 'data' array".to_string()))?;

    let first = data.first().ok_or(ProbeError::NoModels)?;

    first
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProbeError::MalformedBody("first entry has no string 'id'".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend_responding(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn probe() -> BackendProbe {
        BackendProbe::new(Duration::from_secs(2))
    }

    #[test]
    fn test_extract_first_model_only_reads_first_entry() {
        let body = json!({"data": [{"id": "modelA"}, {"not_an_id": true}]});
        assert_eq!(extract_first_model(&body).unwrap(), "modelA");
    }

    #[test]
    fn test_extract_first_model_rejects_missing_data() {
        let result = extract_first_model(&json!({"object": "list"}));
        assert!(matches!(result, Err(ProbeError::MalformedBody(_))));
    }

    #[test]
    fn test_extract_first_model_rejects_non_string_id() {
        let result = extract_first_model(&json!({"data": [{"id": 42}]}));
        assert!(matches!(result, Err(ProbeError::MalformedBody(_))));
    }

    #[tokio::test]
    async fn test_probe_returns_first_model() {
        let server = backend_responding(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"id": "modelA", "object": "model"}, {"id": "modelB"}]
        })))
        .await;

        let model = probe().probe(&BackendAddress::from(server.uri())).await.unwrap();
        assert_eq!(model, "modelA");
    }

    #[tokio::test]
    async fn test_probe_accepts_trailing_slash_address() {
        let server = backend_responding(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "modelA"}]})),
        )
        .await;

        let address = BackendAddress::from(format!("{}/", server.uri()));
        assert_eq!(probe().probe(&address).await.unwrap(), "modelA");
    }

    #[tokio::test]
    async fn test_probe_non_200_status() {
        let server = backend_responding(ResponseTemplate::new(503)).await;

        let result = probe().probe(&BackendAddress::from(server.uri())).await;
        assert!(matches!(result, Err(ProbeError::Status(s)) if s == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_probe_other_success_status_is_failure() {
        let server = backend_responding(
            ResponseTemplate::new(202).set_body_json(json!({"data": [{"id": "modelA"}]})),
        )
        .await;

        let result = probe().probe(&BackendAddress::from(server.uri())).await;
        assert!(matches!(result, Err(ProbeError::Status(_))));
    }

    #[tokio::test]
    async fn test_probe_malformed_json() {
        let server = backend_responding(ResponseTemplate::new(200).set_body_string("not json")).await;

        let result = probe().probe(&BackendAddress::from(server.uri())).await;
        assert!(matches!(result, Err(ProbeError::MalformedBody(_))));
    }

    #[tokio::test]
    async fn test_probe_empty_model_list() {
        let server =
            backend_responding(ResponseTemplate::new(200).set_body_json(json!({"data": []}))).await;

        let result = probe().probe(&BackendAddress::from(server.uri())).await;
        assert!(matches!(result, Err(ProbeError::NoModels)));
    }

    #[tokio::test]
    async fn test_probe_unreachable_backend() {
        // 端口1上没有服务
        let result = probe().probe(&BackendAddress::from("http://127.0.0.1:1")).await;
        assert!(matches!(result, Err(ProbeError::Network(_)) | Err(ProbeError::Timeout)));
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let server = backend_responding(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"id": "modelA"}]}))
                .set_delay(Duration::from_secs(5)),
        )
        .await;

        let slow_probe = BackendProbe::new(Duration::from_millis(200));
        let result = slow_probe.probe(&BackendAddress::from(server.uri())).await;
        assert!(matches!(result, Err(ProbeError::Timeout)));
    }
}
