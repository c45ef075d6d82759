//! Outbound HTTP integrations: GitHub commits and Microsoft Graph mail.

pub mod github;
pub mod graph;

pub use github::GitHubClient;
pub use graph::{GraphClient, MailMessage};
