use crate::config::loader::{load_config_from_path, parse_config};
use crate::config::model::*;
use crate::types::BackendAddress;

fn create_test_config() -> Config {
    Config::with_addresses(vec![
        BackendAddress::from("http://workstation1:8000"),
        BackendAddress::from("http://workstation2:8000"),
    ])
}

#[test]
fn test_config_validation_success() {
    let config = create_test_config();
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_minimal_config_uses_defaults() {
    let config = parse_config(
        r#"
[discovery]
addresses = ["http://workstation1:8000/", "http://workstation2:8000/"]
"#,
    )
    .unwrap();

    assert_eq!(config.discovery.addresses.len(), 2);
    assert_eq!(config.discovery.default_index, 0);
    assert_eq!(config.discovery.interval_seconds, 600);
    assert_eq!(config.discovery.probe_timeout_seconds, 5);
    assert_eq!(config.discovery.shutdown_timeout_seconds, 10);
    assert_eq!(config.server.bind_address, "0.0.0.0:5000");
    assert_eq!(config.server.connect_timeout_seconds, 10);
    assert!(config.server.cors);
    assert!(config.logging.file.is_none());

    let default_backend = config.discovery.default_backend().unwrap();
    assert_eq!(default_backend.as_str(), "http://workstation1:8000/");
}

#[test]
fn test_parse_full_config() {
    let config = parse_config(
        r#"
[discovery]
addresses = ["http://a:8000", "http://b:8000", "http://c:8000"]
default_index = 2
interval_seconds = 30
probe_timeout_seconds = 2
shutdown_timeout_seconds = 3

[server]
bind_address = "127.0.0.1:8080"
connect_timeout_seconds = 4
cors = false

[logging]
file = "app.log"
"#,
    )
    .unwrap();

    assert_eq!(config.discovery.default_backend().unwrap().as_str(), "http://c:8000");
    assert_eq!(config.discovery.interval().as_secs(), 30);
    assert_eq!(config.discovery.probe_timeout().as_secs(), 2);
    assert_eq!(config.discovery.shutdown_timeout().as_secs(), 3);
    assert_eq!(config.server.bind_address, "127.0.0.1:8080");
    assert_eq!(config.server.connect_timeout().as_secs(), 4);
    assert!(!config.server.cors);
    assert_eq!(config.logging.file.as_deref(), Some("app.log"));
}

#[test]
fn test_config_validation_no_addresses() {
    let config = Config::with_addresses(vec![]);

    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("no backend addresses"));
}

#[test]
fn test_config_validation_invalid_scheme() {
    let config = Config::with_addresses(vec![BackendAddress::from("ftp://workstation1:8000")]);

    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("invalid scheme"));
}

#[test]
fn test_config_validation_not_a_url() {
    let config = Config::with_addresses(vec![BackendAddress::from("workstation1")]);

    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not a valid URL"));
}

#[test]
fn test_config_validation_duplicate_address() {
    let config = Config::with_addresses(vec![
        BackendAddress::from("http://workstation1:8000"),
        BackendAddress::from("http://workstation1:8000/"),
    ]);

    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("more than once"));
}

#[test]
fn test_config_validation_default_index_out_of_range() {
    let mut config = create_test_config();
    config.discovery.default_index = 2;

    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("out of range"));
}

#[test]
fn test_config_validation_zero_interval() {
    let mut config = create_test_config();
    config.discovery.interval_seconds = 0;

    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("interval_seconds"));
}

#[test]
fn test_config_validation_zero_connect_timeout() {
    let mut config = create_test_config();
    config.server.connect_timeout_seconds = 0;

    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("connect_timeout_seconds"));
}

#[test]
fn test_parse_config_missing_discovery_section() {
    let result = parse_config("[server]\nbind_address = \"0.0.0.0:5000\"\n");
    assert!(result.is_err());
}

#[test]
fn test_load_config_missing_file() {
    let result = load_config_from_path("/nonexistent/vllm-router/config.toml");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Failed to read config file"));
}
