//! # jose-crypto — Comparable Cryptographic Objects
//!
//! Native certificate and key objects compare by identity, which breaks
//! their use as set or map members and in equality assertions. This crate
//! restores value semantics:
//!
//! - **`ComparableX509`** wraps a certificate or certificate request and
//!   compares and hashes its canonical DER encoding.
//! - **`ComparableKey`** wraps an RSA, elliptic-curve (P-256, P-384), or OKP
//!   (Ed25519, X25519) key and compares and hashes its canonical numeric
//!   components.
//!
//! Both wrappers can be placed inside `jose_core::ImmutableRecord` and
//! `jose_core::FrozenMapping` values, whose hashes then include the
//! wrappers' hashes.
//!
//! ## Crate Policy
//!
//! - Depends only on `jose-core` internally.
//! - Never generates key material and never parses keys; callers parse them
//!   with the RustCrypto crates and wrap the result.
//! - Private numeric material is never logged and never rendered by `Debug`.
//! - No mocking of cryptographic objects in tests; all tests use real keys
//!   and certificates.

pub mod key;
pub mod x509;

pub use key::{CanonicalKey, ComparableKey, KeyFamily, KeyKind, KeyNumbers, WrappedKey};
pub use x509::{ComparableX509, X509Encoding, X509Kind, X509Object};
