use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_groundtruth_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("GROUNDTRUTH_PORT");
        env::remove_var("GROUNDTRUTH_BIND_ADDR");
        env::remove_var("GROUNDTRUTH_CLASSIFIER_PATH");
        env::remove_var("GROUNDTRUTH_ENCODER_PATH");
        env::remove_var("GROUNDTRUTH_CAPABILITY_URL");
        env::remove_var("GROUNDTRUTH_FETCH_TIMEOUT_MS");
        env::remove_var("GROUNDTRUTH_BLOCKED_DOMAINS");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 5001);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert!(config.classifier_path.is_none());
    assert!(config.encoder_path.is_none());
    assert!(config.capability_url.is_none());
    assert_eq!(config.fetch_timeout, Duration::from_secs(3));
    assert_eq!(config.blocked_domains, vec!["reddit".to_string()]);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:5001");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_groundtruth_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 5001);
    assert_eq!(config.fetch_timeout, Duration::from_secs(3));
}

#[test]
#[serial]
fn test_from_env_custom_port() {
    clear_groundtruth_env();

    with_env_vars(&[("GROUNDTRUTH_PORT", "3000")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.port, 3000);
    });
}

#[test]
#[serial]
fn test_from_env_ipv6_bind_addr() {
    clear_groundtruth_env();

    with_env_vars(&[("GROUNDTRUTH_BIND_ADDR", "::1")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(
            config.bind_addr,
            IpAddr::V6(std::net::Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    });
}

#[test]
#[serial]
fn test_from_env_model_paths_and_url() {
    clear_groundtruth_env();

    with_env_vars(
        &[
            ("GROUNDTRUTH_CLASSIFIER_PATH", "/models/roberta-fact-check"),
            ("GROUNDTRUTH_ENCODER_PATH", " /models/minilm "),
            ("GROUNDTRUTH_CAPABILITY_URL", "http://models.internal:5002"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(
                config.classifier_path,
                Some(PathBuf::from("/models/roberta-fact-check"))
            );
            assert_eq!(config.encoder_path, Some(PathBuf::from("/models/minilm")));
            assert_eq!(
                config.capability_url.as_deref(),
                Some("http://models.internal:5002")
            );
        },
    );
}

#[test]
#[serial]
fn test_from_env_blank_path_is_none() {
    clear_groundtruth_env();

    with_env_vars(&[("GROUNDTRUTH_CLASSIFIER_PATH", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.classifier_path.is_none());
    });
}

#[test]
#[serial]
fn test_from_env_timeouts() {
    clear_groundtruth_env();

    with_env_vars(
        &[("GROUNDTRUTH_FETCH_TIMEOUT_MS", "1500")],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.fetch_timeout, Duration::from_millis(1500));
        },
    );
}

#[test]
#[serial]
fn test_capability_call_timeout_has_a_single_source() {
    clear_groundtruth_env();

    // Remote calls share the verifier's per-call timeout; the server config has none.
    with_env_vars(
        &[
            ("GROUNDTRUTH_CAPABILITY_URL", "http://127.0.0.1:9000"),
            ("GROUNDTRUTH_CAPABILITY_TIMEOUT_MS", "not-a-number"),
            ("GROUNDTRUTH_CALL_TIMEOUT_MS", "30000"),
        ],
        || {
            let config = Config::from_env().expect("unknown timeout var is ignored");
            config.validate().expect("should validate");

            let verifier = crate::verification::VerifierConfig::from_env().expect("should parse");
            assert_eq!(verifier.call_timeout, Duration::from_secs(30));
        },
    );
}

#[test]
#[serial]
fn test_from_env_invalid_timeout() {
    clear_groundtruth_env();

    with_env_vars(&[("GROUNDTRUTH_FETCH_TIMEOUT_MS", "soon")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::DurationParseError { .. }));
        assert!(err.to_string().contains("GROUNDTRUTH_FETCH_TIMEOUT_MS"));
    });
}

#[test]
#[serial]
fn test_from_env_blocked_domains_list() {
    clear_groundtruth_env();

    with_env_vars(
        &[("GROUNDTRUTH_BLOCKED_DOMAINS", "Reddit, quora ,,pinterest")],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(
                config.blocked_domains,
                vec![
                    "reddit".to_string(),
                    "quora".to_string(),
                    "pinterest".to_string()
                ]
            );
        },
    );
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_groundtruth_env();

    with_env_vars(&[("GROUNDTRUTH_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("invalid port"));
    });
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_groundtruth_env();

    with_env_vars(&[("GROUNDTRUTH_PORT", "not_a_port")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_groundtruth_env();

    with_env_vars(&[("GROUNDTRUTH_BIND_ADDR", "not.an.ip.address")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    });
}

#[test]
fn test_validate_nonexistent_classifier_path() {
    let config = Config {
        classifier_path: Some(PathBuf::from("/nonexistent/path/to/classifier")),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn test_validate_encoder_path_is_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("model.safetensors");
    std::fs::write(&file, b"not a directory").unwrap();

    let config = Config {
        encoder_path: Some(file),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_success_with_model_dirs() {
    let dir = tempfile::tempdir().unwrap();

    let config = Config {
        classifier_path: Some(dir.path().to_path_buf()),
        encoder_path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_non_http_url() {
    let config = Config {
        capability_url: Some("localhost:5002".to_string()),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { .. }));
}

#[test]
fn test_validate_rejects_zero_timeout() {
    let config = Config {
        fetch_timeout: Duration::ZERO,
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::ZeroTimeout { .. }));
}

#[test]
fn test_validate_success_with_defaults() {
    assert!(Config::default().validate().is_ok());
}
