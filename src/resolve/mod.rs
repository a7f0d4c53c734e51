//! Reference resolution
//!
//! - [`bundle`]: inline every external `$ref`, producing a self-contained
//!   [`BundledDocument`](crate::models::BundledDocument)
//! - [`dereference`]: additionally replace internal refs with their targets

pub mod bundle;
pub mod dereference;
pub mod reference;

pub use bundle::bundle;
pub use dereference::dereference;

use crate::fetch::FetchError;
use crate::import::FormatError;

/// Error type for reference resolution
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ReferenceError {
    /// A `$ref` target does not exist or cannot be addressed
    #[error("Broken reference '{reference}' in {document}: {reason}")]
    Broken {
        reference: String,
        document: String,
        reason: String,
    },

    /// An external document could not be retrieved
    #[error("Referenced document {location} could not be fetched: {source}")]
    Unreachable {
        location: String,
        #[source]
        source: FetchError,
    },

    /// An external document was retrieved but is not YAML or JSON
    #[error("Referenced document {location} could not be parsed: {source}")]
    Unparseable {
        location: String,
        #[source]
        source: FormatError,
    },

    /// References form a cycle that cannot be resolved
    #[error("Cyclic reference: {}", .chain.join(" -> "))]
    Cyclic { chain: Vec<String> },
}

/// Result type for reference resolution
pub type ReferenceResult<T> = Result<T, ReferenceError>;
