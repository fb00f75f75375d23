#[cfg(test)]
mod test {
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;

    use serial_test::serial;

    use crate::config::proc_initiator::exchange_config;
    use crate::config::proc_loader::file_to_config;
    use crate::utils::config_loader;

    #[tokio::test]
    async fn validate_demo_config_is_valid() {
        let path = Path::new("demos/spiffe-gcp-token.yaml");
        let service_config = file_to_config(path)
            .await
            .expect("demos/spiffe-gcp-token.yaml must exist in repo root for tests");
        let cfg = exchange_config(&service_config).unwrap();
        assert!(cfg.audience.starts_with("//iam.googleapis.com/projects/"));
        assert_eq!(cfg.identity_fetch_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    #[serial]
    async fn environment_variables_are_expanded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
settings:
  http_timeout_seconds: 3
exchange:
  service_account: "${{SPIFFE_GCP_TOKEN_TEST_SA}}"
  audience: "${{SPIFFE_GCP_TOKEN_TEST_AUDIENCE:default-audience}}"
  sts_url: "${{SPIFFE_GCP_TOKEN_TEST_STS}}"
"#
        )
        .unwrap();

        std::env::set_var("SPIFFE_GCP_TOKEN_TEST_SA", "writer@demo.iam.gserviceaccount.com");
        std::env::set_var("SPIFFE_GCP_TOKEN_TEST_STS", "http://127.0.0.1:8080/v1/token");
        std::env::remove_var("SPIFFE_GCP_TOKEN_TEST_AUDIENCE");

        let service_config = config_loader::run(file.path().to_str().unwrap()).await.unwrap();
        let cfg = exchange_config(&service_config).unwrap();

        std::env::remove_var("SPIFFE_GCP_TOKEN_TEST_SA");
        std::env::remove_var("SPIFFE_GCP_TOKEN_TEST_STS");

        assert_eq!(cfg.service_account, "writer@demo.iam.gserviceaccount.com");
        assert_eq!(cfg.audience, "default-audience");
        assert_eq!(cfg.sts_url, "http://127.0.0.1:8080/v1/token");
        assert_eq!(cfg.http_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    #[serial]
    async fn missing_service_account_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
exchange:
  service_account: "${{SPIFFE_GCP_TOKEN_TEST_MISSING}}"
  audience: aud
"#
        )
        .unwrap();
        std::env::remove_var("SPIFFE_GCP_TOKEN_TEST_MISSING");

        let err = config_loader::run(file.path().to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("service_account"), "{err}");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = config_loader::run("does/not/exist.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Invalid config format"), "{err}");
    }
}
