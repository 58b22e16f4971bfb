use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::contact::domain::ContactSubmission;
use crate::contact::gateway::{
    AccessToken, GatewayError, MailTransport, OutboundMail, TokenProvider,
};
use crate::contact::relay::ContactRelay;

pub(super) const OFFICE: &str = "office@sira-group.at";

pub(super) fn submission() -> ContactSubmission {
    ContactSubmission {
        vorname: "Anna".to_string(),
        nachname: "Huber".to_string(),
        email: "anna.huber@example.at".to_string(),
        telefonnr: Some("+43 660 1234567".to_string()),
        nachricht: "Ich interessiere mich für die Wohnung in 1190 Wien.".to_string(),
        date: Some("14.03.2025".to_string()),
        source_url: Some("https://sira-group.at/immobilien/42".to_string()),
    }
}

#[derive(Default)]
pub(super) struct FakeTokens {
    calls: AtomicUsize,
    reject: bool,
}

impl FakeTokens {
    pub(super) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn access_token(&self) -> Result<AccessToken, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(GatewayError::Rejected {
                status: 401,
                body: "invalid_client".to_string(),
            });
        }
        Ok(AccessToken::new("token-123"))
    }
}

#[derive(Default)]
pub(super) struct MemoryOutbox {
    sent: Mutex<Vec<(String, OutboundMail)>>,
    reject: bool,
}

impl MemoryOutbox {
    pub(super) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub(super) fn sent(&self) -> Vec<(String, OutboundMail)> {
        self.sent.lock().expect("outbox mutex poisoned").clone()
    }
}

#[async_trait]
impl MailTransport for MemoryOutbox {
    async fn send(&self, token: &AccessToken, mail: &OutboundMail) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .expect("outbox mutex poisoned")
            .push((token.as_str().to_string(), mail.clone()));
        if self.reject {
            return Err(GatewayError::Rejected {
                status: 403,
                body: "ErrorAccessDenied".to_string(),
            });
        }
        Ok(())
    }
}

pub(super) fn build_relay(
    tokens: FakeTokens,
    outbox: MemoryOutbox,
) -> (
    ContactRelay<FakeTokens, MemoryOutbox>,
    Arc<FakeTokens>,
    Arc<MemoryOutbox>,
) {
    let tokens = Arc::new(tokens);
    let outbox = Arc::new(outbox);
    let relay = ContactRelay::new(tokens.clone(), outbox.clone(), OFFICE);
    (relay, tokens, outbox)
}
