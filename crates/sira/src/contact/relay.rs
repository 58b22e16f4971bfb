use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use super::domain::ContactSubmission;
use super::gateway::{GatewayError, Mailbox, MailTransport, OutboundMail, TokenProvider};
use super::template::{contact_subject, render_contact_email};

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("missing required fields: {}", .0.join(", "))]
    Validation(Vec<&'static str>),
    #[error("token exchange failed: {0}")]
    TokenExchange(#[source] GatewayError),
    #[error("mail delivery failed: {0}")]
    Delivery(#[source] GatewayError),
}

/// Turns a contact form submission into one e-mail to the office mailbox.
pub struct ContactRelay<T, M> {
    tokens: Arc<T>,
    transport: Arc<M>,
    recipient: Mailbox,
}

impl<T, M> ContactRelay<T, M>
where
    T: TokenProvider + 'static,
    M: MailTransport + 'static,
{
    pub fn new(tokens: Arc<T>, transport: Arc<M>, recipient: impl Into<String>) -> Self {
        Self {
            tokens,
            transport,
            recipient: Mailbox::new(recipient),
        }
    }

    pub async fn relay(&self, submission: ContactSubmission) -> Result<(), ContactError> {
        self.relay_on(submission, Local::now().date_naive()).await
    }

    /// Same as [`relay`](Self::relay) with an explicit fallback date.
    pub async fn relay_on(
        &self,
        submission: ContactSubmission,
        today: NaiveDate,
    ) -> Result<(), ContactError> {
        let contact = submission.validate()?;

        let token = self.tokens.access_token().await.map_err(|err| {
            warn!(error = %err, "graph token exchange failed");
            ContactError::TokenExchange(err)
        })?;

        let mail = OutboundMail {
            subject: contact_subject(&contact),
            html_body: render_contact_email(&contact, today),
            to: self.recipient.clone(),
            reply_to: Mailbox::named(contact.email.clone(), contact.display_name()),
        };

        self.transport.send(&token, &mail).await.map_err(|err| {
            warn!(error = %err, "contact mail delivery failed");
            ContactError::Delivery(err)
        })?;

        info!(reply_to = %mail.reply_to.address, "contact request delivered");
        Ok(())
    }
}
