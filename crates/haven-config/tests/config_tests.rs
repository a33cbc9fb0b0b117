// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Haven configuration system.

use haven_config::diagnostic::ConfigError;
use haven_config::model::HavenConfig;
use haven_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_haven_config() {
    let toml = r#"
[app]
log_level = "debug"

[primary]
url = "https://happy-otter-123.convex.cloud"
auth_token = "jwt-abc"
timeout_ms = 3000
subscription_poll_ms = 500

[secondary]
base_url = "https://api.example.com/api"
timeout_ms = 4000

[cache]
database_path = "/tmp/haven-test.db"
wal_mode = false
timeout_ms = 250
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(
        config.primary.url.as_deref(),
        Some("https://happy-otter-123.convex.cloud")
    );
    assert_eq!(config.primary.auth_token.as_deref(), Some("jwt-abc"));
    assert_eq!(config.primary.timeout_ms, 3000);
    assert_eq!(config.primary.subscription_poll_ms, 500);
    assert_eq!(
        config.secondary.base_url.as_deref(),
        Some("https://api.example.com/api")
    );
    assert!(config.secondary.auth_token.is_none());
    assert_eq!(config.secondary.timeout_ms, 4000);
    assert_eq!(config.cache.database_path, "/tmp/haven-test.db");
    assert!(!config.cache.wal_mode);
    assert_eq!(config.cache.timeout_ms, 250);
}

/// Missing sections use defaults, and both network tiers start disabled.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.app.log_level, "info");
    assert!(config.primary.url.is_none());
    assert!(config.secondary.base_url.is_none());
    assert_eq!(config.primary.timeout_ms, 5_000);
    assert_eq!(config.secondary.timeout_ms, 8_000);
    assert_eq!(config.cache.timeout_ms, 2_000);
    assert!(config.cache.wal_mode);
    assert!(config.cache.database_path.ends_with("haven.db"));
}

/// Unknown field in [secondary] is rejected.
#[test]
fn unknown_field_in_secondary_produces_error() {
    let toml = r#"
[secondary]
base_ulr = "https://api.example.com"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("base_ulr"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[metrics]
enabled = true
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// load_and_validate_str converts an unknown key into a suggestion-bearing diagnostic.
#[test]
fn diagnostic_error_includes_unknown_key_and_suggestion() {
    let toml = r#"
[primary]
ulr = "https://db.example.com"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("should contain an UnknownKey error");
    assert_eq!(unknown.0, "ulr");
    assert_eq!(unknown.1.as_deref(), Some("url"));
}

/// Wrong value types become InvalidType diagnostics.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[cache]
wal_mode = "yes please"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_through_load_and_validate_str() {
    let toml = r#"
[primary]
url = "ftp://db.example.com"
timeout_ms = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

/// An explicit config file is honoured, with env overrides layered on top.
#[test]
fn explicit_path_with_env_override() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[secondary]
base_url = "https://from-file.example.com"

[cache]
database_path = "from-file.db"
"#,
        )?;
        jail.set_env("HAVEN_CACHE_DATABASE_PATH", "from-env.db");

        let config = load_and_validate_path(std::path::Path::new("custom.toml"))
            .expect("config should validate");
        assert_eq!(
            config.secondary.base_url.as_deref(),
            Some("https://from-file.example.com")
        );
        assert_eq!(config.cache.database_path, "from-env.db");
        Ok(())
    });
}

/// Auth tokens are never written back out when the config is serialized.
#[test]
fn auth_tokens_are_not_serialized() {
    let mut config = HavenConfig::default();
    config.primary.auth_token = Some("secret-jwt".to_string());
    let rendered = toml::to_string(&config).expect("config should serialize");
    assert!(!rendered.contains("secret-jwt"));
}
