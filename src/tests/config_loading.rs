#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use serial_test::serial;

    use crate::cache::open_token_store;
    use crate::cache::token::TokenRecord;
    use crate::config::proc_loader::{
        env_to_config, env_to_scoped_config, expand_env_vars, file_to_config, parse_config, parse_scoped_config,
        ConfigScope,
    };
    use crate::store::TokenStore;
    use crate::config::settings::LogFormat;
    use crate::utils::constants::{DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_TOKEN_URL};

    const FULL_CONFIG: &str = r#"
settings:
  safety_margin_seconds: 120
  database_path: /var/lib/token-keeper/tokens.db
  http:
    timeout_ms: 2500
  retry:
    attempts: 4
    base_delay_ms: 100
    max_delay_ms: 800
  server:
    host: 0.0.0.0
    port: "9090"
  metrics:
    path: /metrics
    is_enabled: true
  logging:
    level: debug
    format: json
provider:
  token_url: https://auth.example.com/oauth2/token
  client_id: ${TK_TEST_CLIENT_ID}
  client_secret: ${TK_TEST_CLIENT_SECRET:fallback-secret}
  initial_refresh_token: ${TK_TEST_BOOTSTRAP:}
"#;

    #[tokio::test]
    #[serial]
    async fn full_config_is_parsed_with_env_expansion() {
        std::env::set_var("TK_TEST_CLIENT_ID", "my-client");
        std::env::remove_var("TK_TEST_CLIENT_SECRET");
        std::env::remove_var("TK_TEST_BOOTSTRAP");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();

        let config = file_to_config(file.path()).await.unwrap();

        assert_eq!(config.settings.safety_margin_seconds, 120);
        assert_eq!(config.settings.database_path, "/var/lib/token-keeper/tokens.db");
        assert_eq!(config.settings.http.timeout_ms, 2500);
        assert_eq!(config.settings.retry.attempts, Some(4));
        assert_eq!(config.settings.server.port, "9090");
        assert!(config.settings.metrics.is_enabled);
        assert_eq!(config.settings.logging.as_ref().unwrap().format, LogFormat::Json);

        let credentials = config.provider.credentials().unwrap();
        assert_eq!(credentials.client_id, "my-client");
        assert_eq!(credentials.client_secret, "fallback-secret");
        assert!(config.provider.bootstrap_refresh_token().is_none());

        std::env::remove_var("TK_TEST_CLIENT_ID");
    }

    #[tokio::test]
    #[serial]
    async fn shipped_config_is_valid() {
        std::env::set_var("CLIENT_ID", "id");
        std::env::set_var("CLIENT_SECRET", "secret");
        std::env::remove_var("INITIAL_REFRESH_TOKEN");
        std::env::remove_var("TOKEN_URL");
        std::env::remove_var("DATABASE_PATH");

        let config = file_to_config(Path::new("token-keeper.yaml"))
            .await
            .expect("token-keeper.yaml must exist in repo root for tests");

        assert_eq!(config.provider.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.settings.database_path, "tokens.db");
        assert!(config.provider.bootstrap_refresh_token().is_none());

        std::env::remove_var("CLIENT_ID");
        std::env::remove_var("CLIENT_SECRET");
    }

    #[tokio::test]
    async fn minimal_config_gets_defaults() {
        let config = parse_config(
            r#"
provider:
  client_id: id
  client_secret: secret
"#
            .to_owned(),
        )
        .await
        .unwrap();

        assert_eq!(config.settings.safety_margin_seconds, DEFAULT_SAFETY_MARGIN_SECS);
        assert_eq!(config.settings.database_path, "tokens.db");
        assert_eq!(config.provider.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.settings.logging.as_ref().unwrap().level, "info");
        assert!(!config.settings.metrics.is_enabled);
    }

    #[tokio::test]
    async fn invalid_config_reports_all_errors() {
        let err = parse_config(
            r#"
settings:
  database_path: ""
  retry:
    attempts: 0
    base_delay_ms: 500
    max_delay_ms: 100
  logging:
    level: loud
    format: compact
provider:
  token_url: ftp://auth.example.com/token
"#
            .to_owned(),
        )
        .await
        .unwrap_err()
        .to_string();

        assert!(err.starts_with("config is not valid"));
        for expected in [
            "client_id",
            "client_secret",
            "token_url",
            "database_path",
            "attempts",
            "base_delay_ms",
            "logging.level",
        ] {
            assert!(err.contains(expected), "missing '{}' in: {}", expected, err);
        }
    }

    #[tokio::test]
    async fn malformed_yaml_is_rejected() {
        assert!(parse_config("settings: [not, a, map".to_owned()).await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn env_only_config_reads_credentials_and_bootstrap() {
        std::env::set_var("CLIENT_ID", "env-id");
        std::env::set_var("CLIENT_SECRET", "env-secret");
        std::env::set_var("INITIAL_REFRESH_TOKEN", "env-rt0");
        std::env::set_var("DATABASE_PATH", "/tmp/env-tokens.db");
        std::env::remove_var("TOKEN_URL");

        let config = env_to_config().await.unwrap();

        assert_eq!(config.provider.credentials().unwrap().client_id, "env-id");
        assert_eq!(config.provider.bootstrap_refresh_token().as_deref(), Some("env-rt0"));
        assert_eq!(config.settings.database_path, "/tmp/env-tokens.db");
        assert_eq!(config.provider.token_url, DEFAULT_TOKEN_URL);

        for var in ["CLIENT_ID", "CLIENT_SECRET", "INITIAL_REFRESH_TOKEN", "DATABASE_PATH"] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    #[serial]
    async fn env_only_config_without_credentials_fails() {
        std::env::remove_var("CLIENT_ID");
        std::env::remove_var("CLIENT_SECRET");

        let err = env_to_config().await.unwrap_err().to_string();
        assert!(err.contains("CLIENT_ID") && err.contains("CLIENT_SECRET"));
    }

    #[tokio::test]
    #[serial]
    async fn store_only_config_reads_record_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("tokens.db");
        std::env::remove_var("CLIENT_ID");
        std::env::remove_var("CLIENT_SECRET");
        std::env::set_var("DATABASE_PATH", &db);

        let config = env_to_scoped_config(ConfigScope::StoreOnly).await.unwrap();
        assert!(config.provider.credentials().is_err());

        let store = open_token_store(&config.settings).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        let record = TokenRecord::new("at".into(), "rt".into(), 42);
        store.save(&record).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(record));

        std::env::remove_var("DATABASE_PATH");
    }

    #[tokio::test]
    async fn store_only_scope_still_checks_settings() {
        let content = r#"
settings:
  database_path: ""
"#;
        let err = parse_scoped_config(content.to_owned(), ConfigScope::StoreOnly)
            .await
            .unwrap_err()
            .to_string();

        assert!(err.contains("database_path"));
        assert!(!err.contains("client_id"));
    }

    #[test]
    #[serial]
    fn expand_env_vars_uses_defaults_for_unset_vars() {
        std::env::set_var("TK_TEST_SET", "value");
        std::env::remove_var("TK_TEST_UNSET");

        assert_eq!(
            expand_env_vars("a=${TK_TEST_SET} b=${TK_TEST_UNSET:dflt} c=${TK_TEST_UNSET}"),
            "a=value b=dflt c="
        );

        std::env::remove_var("TK_TEST_SET");
    }
}
