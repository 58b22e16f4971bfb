//! Microsoft Entra client-credentials exchange and Graph `sendMail`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::gateway::{
    AccessToken, GatewayError, MailTransport, Mailbox, OutboundMail, TokenProvider,
};
use crate::config::MailConfig;

pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

async fn rejected(response: reqwest::Response) -> GatewayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    GatewayError::Rejected { status, body }
}

/// Exchanges the application's client credentials for a Graph token.
#[derive(Clone)]
pub struct EntraTokenClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl EntraTokenClient {
    pub fn new(config: &MailConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &MailConfig) -> Self {
        Self {
            http,
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                config.authority_url.trim_end_matches('/'),
                config.tenant_id
            ),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

impl std::fmt::Debug for EntraTokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntraTokenClient")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for EntraTokenClient {
    async fn access_token(&self) -> Result<AccessToken, GatewayError> {
        debug!(url = %self.token_url, "requesting graph access token");
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", GRAPH_SCOPE),
            ("grant_type", "client_credentials"),
        ];

        let response = self.http.post(&self.token_url).form(&form).send().await?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|err| GatewayError::InvalidResponse(err.to_string()))?;
        Ok(AccessToken::new(token.access_token))
    }
}

/// Sends mail on behalf of one configured mailbox.
#[derive(Debug, Clone)]
pub struct GraphMailClient {
    http: reqwest::Client,
    send_url: String,
}

impl GraphMailClient {
    pub fn new(config: &MailConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &MailConfig) -> Self {
        Self {
            http,
            send_url: format!(
                "{}/users/{}/sendMail",
                config.graph_base_url.trim_end_matches('/'),
                config.sender
            ),
        }
    }
}

fn address(mailbox: &Mailbox) -> Value {
    match &mailbox.name {
        Some(name) => json!({ "emailAddress": { "address": mailbox.address, "name": name } }),
        None => json!({ "emailAddress": { "address": mailbox.address } }),
    }
}

pub(crate) fn send_mail_payload(mail: &OutboundMail) -> Value {
    json!({
        "message": {
            "subject": mail.subject,
            "body": {
                "contentType": "HTML",
                "content": mail.html_body,
            },
            "toRecipients": [address(&mail.to)],
            "replyTo": [address(&mail.reply_to)],
        },
        "saveToSentItems": false,
    })
}

#[async_trait]
impl MailTransport for GraphMailClient {
    async fn send(&self, token: &AccessToken, mail: &OutboundMail) -> Result<(), GatewayError> {
        debug!(url = %self.send_url, subject = %mail.subject, "submitting graph sendMail");
        let response = self
            .http
            .post(&self.send_url)
            .bearer_auth(token.as_str())
            .json(&send_mail_payload(mail))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(())
    }
}
