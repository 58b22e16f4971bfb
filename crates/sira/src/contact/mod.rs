//! Contact form relay to the office mailbox through Microsoft Graph.

pub mod domain;
pub mod gateway;
pub mod graph;
pub mod relay;
pub mod router;
pub mod template;

#[cfg(test)]
mod tests;

pub use domain::{ContactSubmission, ValidatedContact};
pub use gateway::{AccessToken, GatewayError, MailTransport, Mailbox, OutboundMail, TokenProvider};
pub use graph::{EntraTokenClient, GraphMailClient};
pub use relay::{ContactError, ContactRelay};
pub use router::contact_router;
pub use template::render_contact_email;
