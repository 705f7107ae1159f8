//! Signed, time-bounded tokens for link-based actions
//!
//! Password reset and unsubscribe links carry a token that proves the link
//! was issued by this server for this subject, for this purpose, recently.
//! Nothing is stored server-side.

pub mod codec;
pub mod permalink;
pub mod registry;
pub mod subject;
pub mod uid;

pub use codec::{TokenCodec, days_since_epoch};
pub use permalink::Permalink;
pub use registry::{TokenPurpose, TokenRegistry};
pub use subject::{HashInputs, HashInputsFn, HashInputsKind, TokenSubject};
pub use uid::{decode_uid, encode_uid};
