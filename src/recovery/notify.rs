//! Operator notifications
//!
//! Delivery is best-effort: a failing channel is logged and never affects the
//! recovery outcome.

use crate::config::NotificationConfig;
use crate::exec::{fill_model_template, CommandRunner, HttpClient};
use crate::recovery::types::Notice;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(20);

/// Sends notices to the configured webhook and command
pub struct Notifier {
    config: NotificationConfig,
    runner: Arc<dyn CommandRunner>,
    http: Arc<dyn HttpClient>,
}

impl Notifier {
    pub fn new(
        config: NotificationConfig,
        runner: Arc<dyn CommandRunner>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            config,
            runner,
            http,
        }
    }

    pub async fn notify(&self, notice: &Notice) {
        let message = notice.message();
        info!("notify: {}", message.replace('\n', " | "));

        if let Some(url) = self.config.webhook_url() {
            let body = json!({ "text": message });
            match self.http.post_json(url, &body, WEBHOOK_TIMEOUT).await {
                Ok(code) if code >= 400 => warn!("notify webhook failed: status={}", code),
                Ok(_) => {}
                Err(e) => warn!("notify webhook failed: {}", e),
            }
        }

        if let Some(argv) = self.config.argv() {
            let formatted = fill_model_template(argv, None, Some(&message));
            let out = self.runner.run(&formatted, COMMAND_TIMEOUT).await;
            if !out.success() {
                warn!(
                    "notify command failed rc={}, stderr={}",
                    out.exit_code,
                    out.stderr_trimmed()
                );
            }
        }
    }
}
