//! Core module containing the validation-error protocol and shared plumbing

pub mod case;
pub mod clock;
pub mod error;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{QbError, QbResult};
pub use validation::{ErrorNode, ErrorTreeBuilder, FailureMap, FailureValue};
