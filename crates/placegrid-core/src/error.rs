//! Descriptor validation errors.

use thiserror::Error;

/// Why an [`AppDescriptor`](crate::AppDescriptor) was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("missing or empty field: {0}")]
    MissingField(&'static str),

    #[error("unknown resource type: {0:?} (expected \"CPU\" or \"Memory\")")]
    UnknownResourceType(String),

    #[error("field {field} contains a delimiter or line break")]
    ForbiddenCharacter { field: &'static str },
}
