//! Microsoft Graph client — inbox listing and plain-text mail sending
//! with client-credentials auth.

use chrono::Utc;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::GraphConfig;
use crate::error::RemoteError;

const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";
const SERVICE: &str = "graph";

/// One inbox message, trimmed to what the digest needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub subject: String,
    pub from: String,
    pub snippet: String,
    pub date: String,
}

/// Client for the Microsoft Graph mail API.
pub struct GraphClient {
    http: reqwest::Client,
    config: GraphConfig,
}

impl GraphClient {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Midnight UTC of the current day, Graph `$filter` format.
    fn today_utc_start() -> String {
        format!("{}T00:00:00Z", Utc::now().date_naive())
    }

    /// Fetch an app-only access token via the client-credentials flow.
    async fn access_token(&self) -> Result<String, RemoteError> {
        let token_url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.config.tenant_id
        );

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("grant_type", "client_credentials"),
            ("scope", "https://graph.microsoft.com/.default"),
        ];

        let resp = self
            .http
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| RemoteError::request(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RemoteError::request(SERVICE, e))?;

        data.get("access_token")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| RemoteError::MissingField {
                service: SERVICE.to_string(),
                field: "access_token".to_string(),
            })
    }

    /// List today's messages for a mailbox, newest first.
    pub async fn list_today_messages(
        &self,
        user_id: &str,
        top: usize,
    ) -> Result<Vec<MailMessage>, RemoteError> {
        let access_token = self.access_token().await?;

        let url = format!("{GRAPH_BASE}/users/{user_id}/messages");
        let filter = format!("receivedDateTime ge {}", Self::today_utc_start());
        let top = top.to_string();
        let params = [
            ("$top", top.as_str()),
            ("$orderby", "receivedDateTime desc"),
            ("$filter", filter.as_str()),
            ("$select", "subject,from,receivedDateTime,bodyPreview"),
        ];

        let resp = self
            .http
            .get(url)
            .query(&params)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| RemoteError::request(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RemoteError::request(SERVICE, e))?;

        let items = data
            .get("value")
            .and_then(|v| v.as_array())
            .map(|messages| messages.iter().map(parse_message).collect())
            .unwrap_or_default();

        Ok(items)
    }

    /// Send a plain-text mail from the given mailbox.
    pub async fn send_mail_plain(
        &self,
        user_id: &str,
        to: &str,
        subject: &str,
        body_text: &str,
    ) -> Result<(), RemoteError> {
        let access_token = self.access_token().await?;

        let url = format!("{GRAPH_BASE}/users/{user_id}/sendMail");
        let payload = serde_json::json!({
            "message": {
                "subject": subject,
                "body": {"contentType": "Text", "content": body_text},
                "toRecipients": [{"emailAddress": {"address": to}}],
            },
            "saveToSentItems": true,
        });

        let resp = self
            .http
            .post(url)
            .bearer_auth(&access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RemoteError::request(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Map a raw Graph message into the trimmed digest shape. Snippets are
/// capped so a digest payload stays small.
fn parse_message(raw: &serde_json::Value) -> MailMessage {
    const MAX_SNIPPET: usize = 1200;

    let from = raw
        .pointer("/from/emailAddress/address")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let mut snippet = raw
        .get("bodyPreview")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if snippet.len() > MAX_SNIPPET {
        let cut = snippet
            .char_indices()
            .take_while(|(i, _)| *i < MAX_SNIPPET)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        snippet.truncate(cut);
    }

    MailMessage {
        subject: raw
            .get("subject")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        from,
        snippet,
        date: raw
            .get("receivedDateTime")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    }
}
