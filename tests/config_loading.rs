//! Integration tests for config loading across all file formats.

use cors_relay::config::model::Config;
use cors_relay::config::parse_config_str;
use cors_relay::config::validation::validate;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[test]
fn yaml_example_loads_and_validates() {
    let content = load_example("cors-relay.yaml");
    let config = parse_config_str("yaml", &content, "cors-relay.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.listen.port, 3007);
    assert_eq!(config.upstream.base_url, "http://localhost:8080");
}

#[test]
fn yaml_full_example_loads_and_validates() {
    let content = load_example("full.yaml");
    let config = parse_config_str("yaml", &content, "full.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.api_prefix, "/backend/");
    assert_eq!(config.upstream.timeout, 10_000);
    assert!(config.cors.allow_headers.contains(&"X-Requested-With".to_string()));
}

#[cfg(feature = "json")]
#[test]
fn json_example_loads_and_validates() {
    let content = load_example("cors-relay.json");
    let config = parse_config_str("json", &content, "cors-relay.json").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.listen.port, 3007);
}

#[cfg(feature = "toml")]
#[test]
fn toml_example_loads_and_validates() {
    let content = load_example("cors-relay.toml");
    let config = parse_config_str("toml", &content, "cors-relay.toml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.listen.port, 3007);
}

#[cfg(all(feature = "json", feature = "toml"))]
#[test]
fn all_formats_produce_equivalent_configs() {
    let yaml_config =
        parse_config_str("yaml", &load_example("cors-relay.yaml"), "yaml").unwrap();
    let json_config =
        parse_config_str("json", &load_example("cors-relay.json"), "json").unwrap();
    let toml_config =
        parse_config_str("toml", &load_example("cors-relay.toml"), "toml").unwrap();

    assert_eq!(yaml_config.listen.port, json_config.listen.port);
    assert_eq!(yaml_config.listen.port, toml_config.listen.port);
    assert_eq!(yaml_config.upstream.base_url, json_config.upstream.base_url);
    assert_eq!(yaml_config.upstream.base_url, toml_config.upstream.base_url);
    assert_eq!(
        yaml_config.static_files.root,
        toml_config.static_files.root
    );
}

#[test]
fn unsupported_format_returns_error() {
    let result = parse_config_str("xml", "{}", "test.xml");
    assert!(result.is_err());
}

#[test]
fn empty_document_uses_defaults() {
    let config = parse_config_str("yaml", "{}", "empty.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.listen.port, 3007);
    assert_eq!(config.api_prefix, "/api/");
    assert_eq!(config.upstream.timeout, 30_000);
}

#[test]
fn unknown_fields_are_rejected() {
    let result = parse_config_str("yaml", "bogus_key: 1", "bad.yaml");
    assert!(result.is_err());
}

#[test]
fn defaults_are_sensible() {
    let config = Config::default();
    assert_eq!(config.listen.host, "0.0.0.0");
    assert_eq!(config.listen.port, 3007);
    assert_eq!(config.upstream.base_url, "http://localhost:8080");
    assert_eq!(config.upstream.timeout, 30_000);
    assert_eq!(config.api_prefix, "/api/");
    assert_eq!(
        config.cors.allow_methods,
        vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"]
    );
    assert_eq!(
        config.cors.allow_headers,
        vec!["Origin", "Content-Type", "Accept", "Authorization"]
    );
}
