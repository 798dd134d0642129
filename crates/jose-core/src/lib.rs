//! # jose-core — Immutable Structured Values for JOSE Objects
//!
//! This crate is the leaf of the workspace. It defines the immutable,
//! hashable containers that higher-level JOSE protocol objects (JWK, JWS and
//! JWE headers) are assembled from, plus the error hierarchy shared with
//! `jose-crypto`.
//!
//! ## Key Design Principles
//!
//! 1. **Schema declared once per type.** `ImmutableRecord<S, V>` takes its
//!    ordered field-name list from the `RecordSchema` marker type `S`, usually
//!    declared with [`record_schema!`]. Instances carry values only.
//!
//! 2. **Strict construction.** Records reject missing and unexpected fields;
//!    frozen mappings reject ambiguous sources. Failures surface at
//!    construction, never later.
//!
//! 3. **Immutability by type.** No `&mut self` API exists on either
//!    container. "Updating" allocates a new value.
//!
//! 4. **Deterministic hashing.** Records hash their values in declared order;
//!    frozen mappings hash, iterate, and render in ascending key order.
//!    `Hash` is only implemented when every contained value is `Hash`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jose-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests, except in `Index` impls
//!   whose contract is to panic on an absent key.

pub mod error;
pub mod frozen;
pub mod record;

// Re-export primary types for ergonomic imports.
pub use error::{CryptoError, JoseError, MappingError, RecordError};
pub use frozen::FrozenMapping;
pub use record::{ImmutableRecord, RecordSchema};
