//! Account flows built on link tokens
//!
//! Registration, password reset and email unsubscribe over pluggable
//! storage ([`AccountStore`]) and delivery ([`LinkNotifier`]).

pub mod handlers;
pub mod model;
pub mod notifier;
pub mod router;
pub mod store;

pub use handlers::{
    AccountView, AppState, PasswordResetConfirmInput, PasswordResetTriggerInput, RegisterInput,
};
pub use model::{Account, EmailNotificationType};
pub use notifier::{LinkNotifier, LoggingNotifier, Mailer, Notification, RecordingNotifier};
pub use router::build_account_routes;
pub use store::{AccountStore, EmailTaken, InMemoryAccountStore};
