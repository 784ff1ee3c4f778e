#![allow(dead_code)]

use anyhow::Result;

/// Helper utilities for interacting with GreenMail server during tests
pub struct GreenMailHelper {
    base_url: String,
    client: reqwest::Client,
}

impl GreenMailHelper {
    pub fn new() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Check if GreenMail server is running and accessible
    pub async fn is_server_running(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Clear all emails from GreenMail server
    pub async fn clear_all_emails(&self) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/mail", self.base_url))
            .send()
            .await?;

        // Don't fail if clearing returns error - just log it
        if !response.status().is_success() {
            println!("Warning: Clear emails returned HTTP {}", response.status());
        }

        Ok(())
    }

    /// Raw JSON listing of the messages GreenMail holds for `address`.
    pub async fn inbox_json(&self, address: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/api/user/{}/messages/INBOX", self.base_url, address))
            .send()
            .await?;
        Ok(response.text().await?)
    }
}

/// Wait for GreenMail server to be ready
pub async fn wait_for_server_ready(timeout_seconds: u64) -> Result<()> {
    let helper = GreenMailHelper::new();
    let start = std::time::Instant::now();

    loop {
        if helper.is_server_running().await {
            return Ok(());
        }

        if start.elapsed().as_secs() > timeout_seconds {
            return Err(anyhow::anyhow!(
                "GreenMail server not ready after {} seconds. Make sure it's running with:\n\
                docker run -d --name greenmail-test \\\n\
                  -p 3025:3025 -p 8080:8080 \\\n\
                  -e GREENMAIL_OPTS=\"-Dgreenmail.setup.test.all -Dgreenmail.hostname=0.0.0.0 -Dgreenmail.auth.disabled -Dgreenmail.verbose\" \\\n\
                  greenmail/standalone:2.0.1",
                timeout_seconds
            ));
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
    }
}
