//! Telegram Bot API: the chat platform for alerts and commands.

use anyhow::{Context, Result};
use feed_client::body_snippet;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const API_BASE: &str = "https://api.telegram.org";

// ====================================================================
// getUpdates payload
// ====================================================================

#[derive(Debug, Deserialize)]
pub struct TgUpdatesResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Vec<TgUpdate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub chat: TgChat,
    pub from: Option<TgUser>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
}

// ====================================================================
// Client
// ====================================================================

pub struct TelegramClient {
    http: reqwest::Client,
    token: String,
}

impl TelegramClient {
    /// `timeout` bounds sendMessage; long polls add their own wait on top.
    pub fn new(token: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout + Duration::from_secs(30))
            .user_agent("FutNews/1.0")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// HTML parse mode. `preview` controls the link preview card.
    pub async fn send_message(&self, chat_id: i64, text: &str, preview: bool) -> Result<i64> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": !preview,
        });
        let resp = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .context("Telegram sendMessage request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("Telegram sendMessage failed: {} {}", status, body);
            anyhow::bail!("Telegram sendMessage failed: {}", status);
        }
        let resp_json: serde_json::Value = resp.json().await?;
        Ok(resp_json["result"]["message_id"].as_i64().unwrap_or(0))
    }

    /// Long poll; `wait_secs` is the server-side hold time.
    pub async fn get_updates(&self, offset: i64, wait_secs: u64) -> Result<Vec<TgUpdate>> {
        let url = format!(
            "{}?offset={}&timeout={}&allowed_updates=[\"message\"]",
            self.method_url("getUpdates"),
            offset,
            wait_secs
        );
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("getUpdates HTTP {}: {}", status, body_snippet(&body, 200));
        }
        parse_updates(&body)
    }

    /// Bot username, used to accept `/cmd@username`.
    pub async fn get_me(&self) -> Result<Option<String>> {
        let resp: serde_json::Value = self
            .http
            .get(self.method_url("getMe"))
            .send()
            .await?
            .json()
            .await?;
        Ok(resp["result"]["username"].as_str().map(str::to_string))
    }
}

pub fn parse_updates(body: &str) -> Result<Vec<TgUpdate>> {
    let parsed: TgUpdatesResponse = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse getUpdates: {}", body_snippet(body, 200)))?;
    if !parsed.ok {
        anyhow::bail!("getUpdates returned ok=false");
    }
    Ok(parsed.result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_updates() {
        let body = r#"{"ok":true,"result":[
            {"update_id":10,"message":{"message_id":5,"date":1700000000,
              "chat":{"id":-1001,"type":"group"},
              "from":{"id":42,"is_bot":false,"first_name":"Ana","username":"ana"},
              "text":"/tabela 5"}},
            {"update_id":11,"edited_message":{"message_id":5}}
        ]}"#;
        let updates = parse_updates(body).unwrap();
        assert_eq!(updates.len(), 2);
        let msg = updates[0].message.as_ref().unwrap();
        assert_eq!(msg.chat.id, -1001);
        assert_eq!(msg.from.as_ref().map(|u| u.id), Some(42));
        assert_eq!(msg.text.as_deref(), Some("/tabela 5"));
        assert!(updates[1].message.is_none());
    }

    #[test]
    fn not_ok_is_an_error() {
        assert!(parse_updates(r#"{"ok":false,"result":[]}"#).is_err());
        assert!(parse_updates("<html>").is_err());
    }

    #[test]
    fn unparsable_multibyte_body_is_an_error() {
        let body = format!("{}é<html>", "x".repeat(199));
        let err = parse_updates(&body).unwrap_err();
        assert!(format!("{err:#}").contains("xé"));
    }
}
