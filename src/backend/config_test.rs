use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn full_config_parses() {
    let config = BackendConfig::from_lookup(lookup(&[
        ("BACKEND_URL", "https://proj.example.co"),
        ("BACKEND_ANON_KEY", "anon-key"),
        ("BACKEND_TIMEOUT_SECS", "30"),
    ]))
    .unwrap();

    assert_eq!(config.base_url, "https://proj.example.co");
    assert_eq!(config.anon_key, "anon-key");
    assert_eq!(config.timeout_secs, 30);
}

#[test]
fn timeout_defaults_when_absent() {
    let config = BackendConfig::from_lookup(lookup(&[
        ("BACKEND_URL", "https://proj.example.co"),
        ("BACKEND_ANON_KEY", "anon-key"),
    ]))
    .unwrap();
    assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
}

#[test]
fn trailing_slash_is_trimmed() {
    let config = BackendConfig::from_lookup(lookup(&[
        ("BACKEND_URL", "https://proj.example.co/"),
        ("BACKEND_ANON_KEY", "anon-key"),
    ]))
    .unwrap();
    assert_eq!(config.base_url, "https://proj.example.co");
}

#[test]
fn missing_url_is_an_error() {
    let err = BackendConfig::from_lookup(lookup(&[("BACKEND_ANON_KEY", "k")])).unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar("BACKEND_URL")));
}

#[test]
fn missing_key_is_an_error() {
    let err =
        BackendConfig::from_lookup(lookup(&[("BACKEND_URL", "https://x.example")])).unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar("BACKEND_ANON_KEY")));
}

#[test]
fn empty_values_count_as_missing() {
    let err = BackendConfig::from_lookup(lookup(&[
        ("BACKEND_URL", "   "),
        ("BACKEND_ANON_KEY", "k"),
    ]))
    .unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar("BACKEND_URL")));
}

#[test]
fn invalid_timeout_is_an_error() {
    let err = BackendConfig::from_lookup(lookup(&[
        ("BACKEND_URL", "https://x.example"),
        ("BACKEND_ANON_KEY", "k"),
        ("BACKEND_TIMEOUT_SECS", "soon"),
    ]))
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidVar { var: "BACKEND_TIMEOUT_SECS", .. }));
}
