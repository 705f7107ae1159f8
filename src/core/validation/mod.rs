//! Structured validation-error protocol
//!
//! Validation failures of any depth (plain fields, nested objects, lists of
//! objects) are reported as a single ordered tree of [`ErrorNode`]s. Each
//! node carries the `clientId` of the submitted object it belongs to, so a
//! client can attach errors to the element that produced them.

pub mod extractor;
pub mod failure;
pub mod filters;
pub mod node;
pub mod response;
pub mod schema;
pub mod tree;
pub mod validators;

pub use extractor::{FallbackMessage, ValidatedInput};
pub use failure::{FailureMap, FailureValue};
pub use node::{
    ARRAY_NON_MEMBER_ERRORS, ArrayErrorContent, ArrayErrorNode, ErrorContent, ErrorNode,
    NON_FIELD_ERRORS,
};
pub use response::{MutationEmptyResponse, MutationResponse, mutation_is_not_valid};
pub use schema::{FieldRule, InputSchema};
pub use tree::{DEFAULT_ERROR_MESSAGE, ErrorTreeBuilder};
