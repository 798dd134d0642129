//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by the JOSE utility crates. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every failure here is a caller error and is surfaced at construction
//!   time. Nothing is retried or treated as transient.
//! - Record errors name the record type and the required field set.
//! - Mapping errors name the offending key.
//! - Crypto errors name the key family or object involved, never the key
//!   material itself.

use thiserror::Error;

/// Top-level error type for the JOSE utility crates.
#[derive(Error, Debug)]
pub enum JoseError {
    /// Fixed-schema record construction or lookup failed.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Frozen mapping construction or lookup failed.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Wrapping or canonicalizing a cryptographic object failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Error raised by [`ImmutableRecord`](crate::record::ImmutableRecord).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The declared schema repeats a field name or contains an empty one.
    #[error("{record} declares a malformed schema: field {field:?} is empty or repeated")]
    MalformedSchema {
        /// Record type name.
        record: &'static str,
        /// The offending field name.
        field: &'static str,
    },

    /// The supplied field names differ from the declared schema.
    #[error("{record} takes exactly the following fields: {required} ({given} given)")]
    FieldMismatch {
        /// Record type name.
        record: &'static str,
        /// Comma-separated required field names in declared order.
        required: String,
        /// Comma-separated supplied field names, or `none`.
        given: String,
    },

    /// The same field name was supplied more than once.
    #[error("{record} received field {field:?} more than once")]
    DuplicateField {
        /// Record type name.
        record: &'static str,
        /// The repeated field name.
        field: String,
    },

    /// Lookup of a field the schema does not declare.
    #[error("{record} has no field {field:?}")]
    NoSuchField {
        /// Record type name.
        record: &'static str,
        /// The requested field name.
        field: String,
    },
}

/// Error raised by [`FrozenMapping`](crate::frozen::FrozenMapping).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// Both a source mapping and named bindings were supplied.
    #[error("frozen mapping takes either one mapping or named bindings, not both")]
    ConflictingSources,

    /// Neither a source mapping nor any named binding was supplied.
    #[error("frozen mapping requires one mapping or at least one named binding")]
    NoSource,

    /// A named binding repeated a key.
    #[error("binding {0} supplied more than once")]
    DuplicateKey(String),

    /// Item lookup of an absent key.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Attribute lookup of an absent name.
    #[error("no attribute named {0:?}")]
    AttributeNotFound(String),
}

/// Error in wrapping or canonicalizing cryptographic objects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The supplied object is not one of the wrappable variants.
    #[error("unsupported object: {0}")]
    UnsupportedObject(String),

    /// DER or PEM encoding or decoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The key has no canonical numeric form, so it cannot be hashed.
    #[error("hashing unsupported for {family} key: {reason}")]
    HashUnsupported {
        /// Key family name.
        family: &'static str,
        /// Why no canonical form exists.
        reason: String,
    },

    /// Key reconstruction from numeric components failed.
    #[error("key error: {0}")]
    KeyError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mismatch_names_required_set() {
        let err = RecordError::FieldMismatch {
            record: "Header",
            required: "typ, alg".to_string(),
            given: "typ".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Header takes exactly the following fields: typ, alg (typ given)"
        );
    }

    #[test]
    fn test_top_level_wraps_sources() {
        let err: JoseError = MappingError::NoSource.into();
        assert!(matches!(err, JoseError::Mapping(MappingError::NoSource)));
        assert!(err.to_string().starts_with("mapping error:"));

        let err: JoseError = CryptoError::HashUnsupported {
            family: "RSA",
            reason: "3 primes".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "crypto error: hashing unsupported for RSA key: 3 primes"
        );
    }
}
