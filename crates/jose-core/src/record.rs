//! # Immutable Records — Fixed-Schema Structured Values
//!
//! `ImmutableRecord<S, V>` is a structured value whose field names are fixed
//! once per record type by a [`RecordSchema`]. Each instance holds exactly one
//! value per declared field, supplied by name in one constructing step.
//!
//! ## Invariants
//!
//! - The field set of an instance always equals the schema, no more, no fewer.
//!   Missing or unexpected names fail construction with
//!   [`RecordError::FieldMismatch`], which lists the required field set.
//! - Instances never change after construction. There is no `&mut self` API
//!   and the storage is private, so assignment is rejected at compile time:
//!
//! ```compile_fail
//! use jose_core::{record_schema, ImmutableRecord};
//!
//! record_schema!(pub struct Header { typ, alg });
//!
//! let header = ImmutableRecord::<Header, &str>::new([("typ", "JWT"), ("alg", "RS256")]).unwrap();
//! header.values[1] = "HS256";
//! ```
//!
//! ```compile_fail
//! use jose_core::{record_schema, ImmutableRecord};
//!
//! record_schema!(pub struct Header { typ, alg });
//!
//! let header = ImmutableRecord::<Header, String>::new([
//!     ("typ", "JWT".to_string()),
//!     ("alg", "RS256".to_string()),
//! ])
//! .unwrap();
//! *header.get("alg").unwrap() = "HS256".to_string();
//! ```
//!
//! - [`ImmutableRecord::update`] allocates a new instance; the receiver is
//!   untouched.
//! - Hashing is available only when every field value is `Hash`, so the
//!   hashability obligation is checked by the compiler.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::RecordError;

/// The ordered field-name list of a record type, declared once per type.
///
/// Usually implemented through [`record_schema!`](crate::record_schema).
pub trait RecordSchema {
    /// Record type name used in diagnostics and `Debug` output.
    const NAME: &'static str;
    /// Field names in declared order.
    const FIELDS: &'static [&'static str];
}

/// Declare a record schema as a zero-sized marker type.
///
/// ```
/// use jose_core::{record_schema, ImmutableRecord, RecordSchema};
///
/// record_schema! {
///     /// Protected header of a compact JWS.
///     pub struct JwsHeader { typ, alg }
/// }
///
/// assert_eq!(JwsHeader::FIELDS, &["typ", "alg"]);
/// let header = ImmutableRecord::<JwsHeader, &str>::new([("alg", "RS256"), ("typ", "JWT")]).unwrap();
/// assert_eq!(header["typ"], "JWT");
/// ```
#[macro_export]
macro_rules! record_schema {
    ($(#[$meta:meta])* $vis:vis struct $name:ident { $($field:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        $vis struct $name;

        impl $crate::record::RecordSchema for $name {
            const NAME: &'static str = stringify!($name);
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];
        }
    };
}

/// A fixed-schema immutable record with one value of type `V` per field of `S`.
pub struct ImmutableRecord<S: RecordSchema, V> {
    values: Box<[V]>,
    schema: PhantomData<fn() -> S>,
}

impl<S: RecordSchema, V> ImmutableRecord<S, V> {
    /// Construct a record from named bindings.
    ///
    /// The supplied names must be exactly the schema's field set; order does
    /// not matter.
    ///
    /// # Errors
    ///
    /// - [`RecordError::MalformedSchema`] if `S` repeats or empties a name.
    /// - [`RecordError::DuplicateField`] if a name is supplied twice.
    /// - [`RecordError::FieldMismatch`] if a field is missing or unexpected.
    pub fn new<I, K>(bindings: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        validate_schema::<S>()?;

        let mut slots: Vec<Option<V>> = S::FIELDS.iter().map(|_| None).collect();
        let mut given = Vec::new();
        let mut unexpected = false;
        for (name, value) in bindings {
            let name = name.as_ref();
            given.push(name.to_string());
            match field_index::<S>(name) {
                Some(index) if slots[index].is_some() => {
                    return Err(RecordError::DuplicateField {
                        record: S::NAME,
                        field: name.to_string(),
                    });
                }
                Some(index) => slots[index] = Some(value),
                None => unexpected = true,
            }
        }

        if unexpected || slots.iter().any(Option::is_none) {
            let err = field_mismatch::<S>(&given);
            tracing::debug!(record = S::NAME, error = %err, "record construction rejected");
            return Err(err);
        }

        Ok(Self {
            values: slots.into_iter().flatten().collect(),
            schema: PhantomData,
        })
    }

    /// Return a new record with the fields in `partial` replaced.
    ///
    /// The receiver is never modified.
    ///
    /// # Errors
    ///
    /// [`RecordError::FieldMismatch`] if `partial` names a field the schema
    /// does not declare, [`RecordError::DuplicateField`] if it names one twice.
    pub fn update<I, K>(&self, partial: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Clone,
    {
        let mut values = self.values.to_vec();
        let mut replaced = vec![false; values.len()];
        for (name, value) in partial {
            let name = name.as_ref();
            let Some(index) = field_index::<S>(name) else {
                let mut given: Vec<String> = S::FIELDS.iter().map(|f| f.to_string()).collect();
                given.push(name.to_string());
                let err = field_mismatch::<S>(&given);
                tracing::debug!(record = S::NAME, error = %err, "record update rejected");
                return Err(err);
            };
            if replaced[index] {
                return Err(RecordError::DuplicateField {
                    record: S::NAME,
                    field: name.to_string(),
                });
            }
            replaced[index] = true;
            values[index] = value;
        }
        Ok(Self {
            values: values.into_boxed_slice(),
            schema: PhantomData,
        })
    }

    /// Look up a field by name.
    ///
    /// Attribute-style and item-style access resolve to the same stored value;
    /// `record["alg"]` is the panicking form of `record.get("alg")`.
    pub fn get(&self, field: &str) -> Result<&V, RecordError> {
        field_index::<S>(field)
            .map(|index| &self.values[index])
            .ok_or_else(|| RecordError::NoSuchField {
                record: S::NAME,
                field: field.to_string(),
            })
    }

    /// Field names in declared order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        S::FIELDS.iter().copied()
    }

    /// Field values in declared order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }

    /// `(name, value)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &V)> {
        S::FIELDS.iter().copied().zip(self.values.iter())
    }

    /// Number of fields, always equal to the schema length.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for a record type that declares no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy the record out as owned named bindings, suitable for
    /// constructing a modified record elsewhere.
    pub fn to_bindings(&self) -> Vec<(&'static str, V)>
    where
        V: Clone,
    {
        self.iter().map(|(name, value)| (name, value.clone())).collect()
    }
}

fn validate_schema<S: RecordSchema>() -> Result<(), RecordError> {
    for (index, field) in S::FIELDS.iter().enumerate() {
        if field.is_empty() || S::FIELDS[..index].contains(field) {
            return Err(RecordError::MalformedSchema {
                record: S::NAME,
                field: *field,
            });
        }
    }
    Ok(())
}

fn field_index<S: RecordSchema>(name: &str) -> Option<usize> {
    S::FIELDS.iter().position(|field| *field == name)
}

fn field_mismatch<S: RecordSchema>(given: &[String]) -> RecordError {
    RecordError::FieldMismatch {
        record: S::NAME,
        required: S::FIELDS.join(", "),
        given: if given.is_empty() {
            "none".to_string()
        } else {
            given.join(", ")
        },
    }
}

impl<S: RecordSchema, V> std::ops::Index<&str> for ImmutableRecord<S, V> {
    type Output = V;

    fn index(&self, field: &str) -> &V {
        match self.get(field) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<'a, S: RecordSchema, V> IntoIterator for &'a ImmutableRecord<S, V> {
    type Item = (&'static str, &'a V);
    type IntoIter = std::iter::Zip<
        std::iter::Copied<std::slice::Iter<'static, &'static str>>,
        std::slice::Iter<'a, V>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        S::FIELDS.iter().copied().zip(self.values.iter())
    }
}

impl<S: RecordSchema, V: Clone> Clone for ImmutableRecord<S, V> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            schema: PhantomData,
        }
    }
}

impl<S: RecordSchema, V: PartialEq> PartialEq for ImmutableRecord<S, V> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<S: RecordSchema, V: Eq> Eq for ImmutableRecord<S, V> {}

impl<S: RecordSchema, V: Hash> Hash for ImmutableRecord<S, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl<S: RecordSchema, V: fmt::Debug> fmt::Debug for ImmutableRecord<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", S::NAME)?;
        for (position, (name, value)) in self.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        f.write_str(")")
    }
}

impl<S: RecordSchema, V: Serialize> Serialize for ImmutableRecord<S, V> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de, S: RecordSchema, V: Deserialize<'de>> Deserialize<'de> for ImmutableRecord<S, V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor<S, V>(PhantomData<fn() -> (S, V)>);

        impl<'de, S: RecordSchema, V: Deserialize<'de>> Visitor<'de> for RecordVisitor<S, V> {
            type Value = ImmutableRecord<S, V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map with fields {}", S::FIELDS.join(", "))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut bindings: Vec<(String, V)> = Vec::new();
                while let Some(entry) = access.next_entry()? {
                    bindings.push(entry);
                }
                ImmutableRecord::new(bindings).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(RecordVisitor(PhantomData))
    }
}
