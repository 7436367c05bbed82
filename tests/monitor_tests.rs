// tests/monitor_tests.rs
use async_trait::async_trait;
use std::sync::Mutex;
use url_monitor::alert::{AlertError, AlertMessage, AlertOutcome, MailTransport};
use url_monitor::config::{load_config, ConfigError, MonitorConfig};
use url_monitor::monitor::{ExitStatus, Monitor};

#[derive(Default)]
struct FakeMailer {
    sent: Mutex<Vec<AlertMessage>>,
    reject_auth: bool,
}

#[async_trait]
impl MailTransport for FakeMailer {
    async fn send(&self, message: &AlertMessage) -> Result<(), AlertError> {
        if self.reject_auth {
            return Err(AlertError::Auth(
                "535 5.7.8 Username and Password not accepted".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn config_for(targets: &[(String, u16)]) -> MonitorConfig {
    let mut yaml = String::from("urls:\n");
    for (url, expected_status) in targets {
        yaml.push_str(&format!(
            "  - url: {}\n    expected_status: {}\n",
            url, expected_status
        ));
    }
    yaml.push_str(
        r#"smtp:
  server: smtp.example.com
  username: monitor@example.com
  password: secret
  recipients: [ops@example.com, backup@example.com]
monitoring:
  timeout_seconds: 5
"#,
    );

    let config: MonitorConfig = serde_yaml::from_str(&yaml).unwrap();
    config.validate().unwrap();
    config
}

#[tokio::test]
async fn test_one_failing_target_sends_one_alert_and_fails_the_run() {
    let mut server = mockito::Server::new_async().await;
    let _a = server
        .mock("GET", "/a")
        .with_status(200)
        .create_async()
        .await;
    let _b = server
        .mock("GET", "/b")
        .with_status(503)
        .create_async()
        .await;

    let url_a = format!("{}/a", server.url());
    let url_b = format!("{}/b", server.url());
    let config = config_for(&[(url_a.clone(), 200), (url_b.clone(), 200)]);

    let monitor = Monitor::with_transport(config, FakeMailer::default()).unwrap();
    let summary = monitor.run().await;

    let urls: Vec<&str> = summary.report.results.iter().map(|r| r.url()).collect();
    assert_eq!(urls, vec![url_a.as_str(), url_b.as_str()]);
    assert!(summary.report.results[0].success());
    assert!(!summary.report.results[1].success());
    assert_eq!(summary.report.results[1].http_status, Some(503));

    assert_eq!(
        summary.alert,
        AlertOutcome::Sent {
            recipients: 2,
            failures: 1
        }
    );
    let sent = monitor.dispatcher().transport().sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains(&url_b));
    assert!(!sent[0].body.contains(&url_a));
    assert!(sent[0].recipients.contains("ops@example.com"));
    assert!(sent[0].recipients.contains("backup@example.com"));

    assert_eq!(summary.exit_status(), ExitStatus::Failing);
    assert_ne!(summary.exit_status().code(), 0);
}

#[tokio::test]
async fn test_rejected_mail_auth_keeps_failing_exit_status() {
    let mut server = mockito::Server::new_async().await;
    let _down = server
        .mock("GET", "/down")
        .with_status(500)
        .create_async()
        .await;

    let config = config_for(&[(format!("{}/down", server.url()), 200)]);
    let mailer = FakeMailer {
        reject_auth: true,
        ..Default::default()
    };

    let monitor = Monitor::with_transport(config, mailer).unwrap();
    let summary = monitor.run().await;

    assert!(summary.alert.is_failed());
    assert_eq!(summary.report.failed(), 1);
    assert_eq!(summary.exit_status().code(), 1);
}

#[tokio::test]
async fn test_repeated_passing_runs_never_alert() {
    let mut server = mockito::Server::new_async().await;
    let ok_mock = server
        .mock("GET", "/ok")
        .with_status(200)
        .with_body("service healthy")
        .expect(2)
        .create_async()
        .await;

    let config = config_for(&[(format!("{}/ok", server.url()), 200)]);
    let monitor = Monitor::with_transport(config, FakeMailer::default()).unwrap();

    for _ in 0..2 {
        let summary = monitor.run().await;
        assert!(summary.report.all_passed());
        assert_eq!(summary.alert, AlertOutcome::NotNeeded);
        assert_eq!(summary.exit_status(), ExitStatus::Healthy);
        assert_eq!(summary.exit_status().code(), 0);
    }

    assert!(monitor.dispatcher().transport().sent.lock().unwrap().is_empty());
    ok_mock.assert_async().await;
}

#[tokio::test]
async fn test_load_config_yaml_and_json() {
    let dir = tempfile::tempdir().unwrap();

    let yaml_path = dir.path().join("config.yml");
    std::fs::write(
        &yaml_path,
        r#"
urls:
  - url: https://www.example.com
    search_string: Example Domain
smtp:
  server: smtp.example.com
  username: monitor@example.com
  password: secret
  to: [ops@example.com]
"#,
    )
    .unwrap();
    let config = load_config(&yaml_path).await.unwrap();
    assert_eq!(config.urls.len(), 1);
    assert_eq!(config.smtp.recipients, vec!["ops@example.com".to_string()]);

    let json_path = dir.path().join("config.json");
    std::fs::write(
        &json_path,
        r#"{
  "urls": [{"url": "http://localhost:8080/health", "expected_status": 204}],
  "smtp": {
    "server": "smtp.example.com",
    "port": 2525,
    "username": "monitor@example.com",
    "password": "secret",
    "recipients": ["ops@example.com"]
  }
}"#,
    )
    .unwrap();
    let config = load_config(&json_path).await.unwrap();
    assert_eq!(config.urls[0].expected_status, 204);
    assert_eq!(config.smtp.port, 2525);
}

#[tokio::test]
async fn test_load_config_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let smtp = r#"
smtp:
  server: smtp.example.com
  username: monitor@example.com
  password: secret
  recipients: [ops@example.com]
"#;

    let empty = dir.path().join("empty.yaml");
    std::fs::write(&empty, format!("urls: []\n{}", smtp)).unwrap();
    assert!(matches!(
        load_config(&empty).await,
        Err(ConfigError::NoTargets)
    ));

    let missing_url = dir.path().join("missing.yaml");
    std::fs::write(
        &missing_url,
        format!("urls:\n  - expected_status: 200\n{}", smtp),
    )
    .unwrap();
    let err = load_config(&missing_url).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("url"));

    let absent = dir.path().join("absent.yaml");
    assert!(matches!(
        load_config(&absent).await,
        Err(ConfigError::Read { .. })
    ));
}
