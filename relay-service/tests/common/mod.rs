#![allow(dead_code)]

use relay_service::config::{AuthConfig, RelayConfig, TelegramConfig};
use relay_service::services::init_metrics;
use relay_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::OnceLock;
use wiremock::MockServer;

/// The Prometheus recorder is process-global, so it is installed once per
/// test binary and shared by every spawned app.
static METRICS_RECORDER: OnceLock<()> = OnceLock::new();

pub fn install_metrics_recorder() {
    METRICS_RECORDER
        .get_or_init(|| init_metrics().expect("Failed to install metrics recorder"));
}

pub const TEST_TOKEN: &str = "test-shared-secret";
pub const TEST_CHAT_ID: &str = "-1001234567890";
pub const TEST_BOT_TOKEN: &str = "123456:test-bot-token";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Stand-in for the Telegram Bot API.
    pub telegram: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn against a fresh mock Bot API, letting the test adjust the
    /// configuration first.
    pub async fn spawn_with(customize: impl FnOnce(&mut RelayConfig)) -> Self {
        install_metrics_recorder();

        let telegram = MockServer::start().await;
        let mut config = test_config(Some(format!("{}/bot{}/", telegram.uri(), TEST_BOT_TOKEN)));
        customize(&mut config);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            telegram,
        }
    }

    /// Path the relay posts to on the mock Bot API.
    pub fn send_message_path(&self) -> String {
        format!("/bot{}/sendMessage", TEST_BOT_TOKEN)
    }

    /// Prometheus exposition from `/metrics`.
    pub async fn metrics(&self) -> String {
        reqwest::Client::new()
            .get(format!("{}/metrics", self.address))
            .send()
            .await
            .expect("Failed to execute request")
            .text()
            .await
            .expect("Failed to read metrics")
    }

    /// Current value of one series, e.g.
    /// `relay_notifications_total{outcome="sent"}`; 0 when not yet recorded.
    pub async fn metric_value(&self, series: &str) -> f64 {
        let prefix = format!("{} ", series);
        self.metrics()
            .await
            .lines()
            .find_map(|line| line.strip_prefix(&prefix))
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0.0)
    }

    pub async fn send_notification(
        &self,
        token: Option<&str>,
        body: impl Into<reqwest::Body>,
    ) -> reqwest::Response {
        let mut request = reqwest::Client::new()
            .post(format!("{}/send-notification", self.address))
            .header("content-type", "application/json")
            .body(body);

        if let Some(token) = token {
            request = request.header("token", token);
        }

        request.send().await.expect("Failed to execute request")
    }
}

pub fn test_config(api_base_url: Option<String>) -> RelayConfig {
    RelayConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        telegram: TelegramConfig {
            chat_id: TEST_CHAT_ID.to_string(),
            bot_token: Secret::new(TEST_BOT_TOKEN.to_string()),
            api_base_url,
        },
        auth: AuthConfig {
            token: Secret::new(TEST_TOKEN.to_string()),
        },
    }
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    listener
        .local_addr()
        .expect("Failed to read probe port")
        .port()
}
