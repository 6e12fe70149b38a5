use serde::{Deserialize, Serialize};
use std::fmt;

/// 模型标识，从请求体或查询参数中提取，不做任何校验
pub type ModelId = String;

/// 后端地址
///
/// 一个计算节点的基础URL，按配置原样保存。拼接路径时忽略末尾的 `/`，
/// 所以 `http://host:8000/` 和 `http://host:8000` 得到相同的目标URL。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendAddress(String);

impl BackendAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 将请求路径原样拼接到后端地址上
    pub fn join(&self, path: &str) -> String {
        let base = self.0.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// 模型列表接口地址
    pub fn models_url(&self) -> String {
        self.join("/v1/models")
    }
}

impl fmt::Display for BackendAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for BackendAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_ignores_trailing_slash() {
        let plain = BackendAddress::from("http://workstation1:8000");
        let slashed = BackendAddress::from("http://workstation1:8000/");

        assert_eq!(
            plain.join("/v1/chat/completions"),
            "http://workstation1:8000/v1/chat/completions"
        );
        assert_eq!(plain.join("/v1/chat/completions"), slashed.join("/v1/chat/completions"));
    }

    #[test]
    fn test_join_keeps_request_path_verbatim() {
        let address = BackendAddress::from("http://workstation1:8000/");

        assert_eq!(address.join("//v1/x"), "http://workstation1:8000//v1/x");
        assert_eq!(address.join("/v1/x/"), "http://workstation1:8000/v1/x/");
        assert_eq!(address.join("/"), "http://workstation1:8000/");
    }

    #[test]
    fn test_models_url() {
        let address = BackendAddress::from("http://workstation2:9000//");
        assert_eq!(address.models_url(), "http://workstation2:9000/v1/models");
    }

    #[test]
    fn test_display_keeps_configured_form() {
        let address = BackendAddress::from("http://workstation1:8000/");
        assert_eq!(address.to_string(), "http://workstation1:8000/");
    }
}
