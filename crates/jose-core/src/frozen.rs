//! # Frozen Mappings — Immutable, Canonically Ordered Key/Value Bindings
//!
//! `FrozenMapping<K, V>` holds an arbitrary set of bindings fixed at
//! construction. Iteration, hashing, and textual rendering all visit keys in
//! ascending order, so two mappings built from the same bindings in a
//! different order compare equal, hash identically, and print identically.
//!
//! ## Construction
//!
//! A mapping is built from exactly one source: one pre-built mapping, or a
//! non-empty set of named bindings. [`FrozenMapping::from_sources`] enforces
//! the rule when both shapes may be present; [`FrozenMapping::from_mapping`]
//! and [`FrozenMapping::from_bindings`] are the single-source forms.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::MappingError;

/// An immutable mapping iterated, hashed, and rendered in ascending key order.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrozenMapping<K, V> {
    items: BTreeMap<K, V>,
}

impl<K: Ord, V> FrozenMapping<K, V> {
    /// Freeze an existing mapping. An empty mapping is a valid source.
    ///
    /// # Errors
    ///
    /// [`MappingError::DuplicateKey`] when the source yields a key twice,
    /// which only a pair sequence can do; `BTreeMap` and `HashMap` sources
    /// convert infallibly through `From`.
    pub fn from_mapping<M>(mapping: M) -> Result<Self, MappingError>
    where
        M: IntoIterator<Item = (K, V)>,
        K: fmt::Debug,
    {
        Ok(Self {
            items: collect_unique(mapping)?,
        })
    }

    /// Freeze a set of named bindings.
    ///
    /// # Errors
    ///
    /// [`MappingError::NoSource`] when `bindings` is empty,
    /// [`MappingError::DuplicateKey`] when a key repeats.
    pub fn from_bindings<I>(bindings: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: fmt::Debug,
    {
        let items = collect_unique(bindings)?;
        if items.is_empty() {
            tracing::debug!("frozen mapping constructed without a source");
            return Err(MappingError::NoSource);
        }
        Ok(Self { items })
    }

    /// Freeze from whichever single source is present.
    ///
    /// # Errors
    ///
    /// [`MappingError::ConflictingSources`] when `mapping` is `Some` and
    /// `bindings` is non-empty, [`MappingError::NoSource`] when neither is
    /// supplied, plus the errors of [`FrozenMapping::from_bindings`].
    pub fn from_sources<M, I>(mapping: Option<M>, bindings: I) -> Result<Self, MappingError>
    where
        M: IntoIterator<Item = (K, V)>,
        I: IntoIterator<Item = (K, V)>,
        K: fmt::Debug,
    {
        let mut bindings = bindings.into_iter().peekable();
        match (mapping, bindings.peek().is_some()) {
            (Some(_), true) => {
                tracing::debug!("frozen mapping given both a mapping and named bindings");
                Err(MappingError::ConflictingSources)
            }
            (Some(mapping), false) => Self::from_mapping(mapping),
            (None, _) => Self::from_bindings(bindings),
        }
    }

    /// Item lookup.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.items.get(key)
    }

    /// Item lookup that reports an absent key as [`MappingError::KeyNotFound`].
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V, MappingError>
    where
        K: Borrow<Q>,
        Q: Ord + fmt::Debug + ?Sized,
    {
        self.items
            .get(key)
            .ok_or_else(|| MappingError::KeyNotFound(format!("{key:?}")))
    }

    /// Attribute-style lookup by name, over the same storage as
    /// [`FrozenMapping::get`].
    pub fn attr(&self, name: &str) -> Result<&V, MappingError>
    where
        K: Borrow<str>,
    {
        self.items
            .get(name)
            .ok_or_else(|| MappingError::AttributeNotFound(name.to_string()))
    }

    /// Whether `key` is bound.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.items.contains_key(key)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the mapping holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bindings in ascending key order.
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, K, V> {
        self.items.iter()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> std::collections::btree_map::Keys<'_, K, V> {
        self.items.keys()
    }

    /// Values in ascending key order.
    pub fn values(&self) -> std::collections::btree_map::Values<'_, K, V> {
        self.items.values()
    }
}

fn collect_unique<K, V, I>(bindings: I) -> Result<BTreeMap<K, V>, MappingError>
where
    K: Ord + fmt::Debug,
    I: IntoIterator<Item = (K, V)>,
{
    let mut items = BTreeMap::new();
    for (key, value) in bindings {
        if items.contains_key(&key) {
            let err = MappingError::DuplicateKey(format!("{key:?}"));
            tracing::debug!(error = %err, "frozen mapping construction rejected");
            return Err(err);
        }
        items.insert(key, value);
    }
    Ok(items)
}

impl<K: Ord, V> From<BTreeMap<K, V>> for FrozenMapping<K, V> {
    fn from(items: BTreeMap<K, V>) -> Self {
        Self { items }
    }
}

impl<K: Ord + std::hash::Hash, V, H> From<HashMap<K, V, H>> for FrozenMapping<K, V> {
    fn from(items: HashMap<K, V, H>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

impl<K, Q, V> std::ops::Index<&Q> for FrozenMapping<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + fmt::Debug + ?Sized,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.try_get(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a FrozenMapping<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::collections::btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Renders `frozendict(key=value, ...)` in ascending key order.
impl<K: fmt::Display, V: fmt::Debug> fmt::Display for FrozenMapping<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("frozendict(")?;
        for (position, (key, value)) in self.items.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value:?}")?;
        }
        f.write_str(")")
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for FrozenMapping<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FrozenMapping")?;
        f.debug_map().entries(self.items.iter()).finish()
    }
}

impl<K: Serialize, V: Serialize> Serialize for FrozenMapping<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (key, value) in &self.items {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for FrozenMapping<K, V>
where
    K: Deserialize<'de> + Ord + fmt::Debug,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MappingVisitor<K, V>(PhantomData<fn() -> (K, V)>);

        impl<'de, K, V> Visitor<'de> for MappingVisitor<K, V>
        where
            K: Deserialize<'de> + Ord + fmt::Debug,
            V: Deserialize<'de>,
        {
            type Value = FrozenMapping<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut items = BTreeMap::new();
                while let Some((key, value)) = access.next_entry::<K, V>()? {
                    if items.contains_key(&key) {
                        return Err(de::Error::custom(MappingError::DuplicateKey(format!(
                            "{key:?}"
                        ))));
                    }
                    items.insert(key, value);
                }
                Ok(FrozenMapping { items })
            }
        }

        deserializer.deserialize_map(MappingVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn ab_bindings() -> FrozenMapping<&'static str, i64> {
        FrozenMapping::from_bindings([("a", 1), ("b", 2)]).unwrap()
    }

    #[test]
    fn test_bindings_and_mapping_sources_agree() {
        let from_bindings = ab_bindings();
        let mut source = HashMap::new();
        source.insert("b", 2);
        source.insert("a", 1);
        let from_mapping = FrozenMapping::from(source);

        assert_eq!(from_bindings, from_mapping);
        assert_eq!(hash_of(&from_bindings), hash_of(&from_mapping));
        assert_eq!(from_bindings.to_string(), "frozendict(a=1, b=2)");
        assert_eq!(from_mapping.to_string(), "frozendict(a=1, b=2)");
    }

    #[test]
    fn test_iteration_is_sorted() {
        let m = FrozenMapping::from_bindings([("zeta", 0), ("alpha", 1), ("mu", 2)]).unwrap();
        assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec!["alpha", "mu", "zeta"]);
        assert_eq!(m.values().copied().collect::<Vec<_>>(), vec![1, 2, 0]);
        assert_eq!((&m).into_iter().count(), 3);
    }

    #[test]
    fn test_both_sources_rejected() {
        let err = FrozenMapping::from_sources(Some(vec![("a", 1)]), vec![("b", 2)]).unwrap_err();
        assert_eq!(err, MappingError::ConflictingSources);
    }

    #[test]
    fn test_no_source_rejected() {
        let err =
            FrozenMapping::<&str, i64>::from_sources(None::<Vec<(&str, i64)>>, Vec::new())
                .unwrap_err();
        assert_eq!(err, MappingError::NoSource);
        assert_eq!(
            FrozenMapping::<&str, i64>::from_bindings(Vec::new()).unwrap_err(),
            MappingError::NoSource
        );
    }

    #[test]
    fn test_single_sources_accepted() {
        let m = FrozenMapping::from_sources(Some(vec![("a", 1)]), Vec::new()).unwrap();
        assert_eq!(m.len(), 1);
        let m = FrozenMapping::from_sources(None::<Vec<(&str, i64)>>, vec![("a", 1)]).unwrap();
        assert_eq!(m["a"], 1);
    }

    #[test]
    fn test_empty_mapping_is_a_source() {
        let m = FrozenMapping::<String, i64>::from_mapping(BTreeMap::new()).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.to_string(), "frozendict()");
    }

    #[test]
    fn test_mapping_source_with_repeated_key_rejected() {
        let err = FrozenMapping::from_mapping(vec![("a", 1), ("a", 2)]).unwrap_err();
        assert_eq!(err, MappingError::DuplicateKey("\"a\"".to_string()));

        let err = FrozenMapping::from_sources(Some(vec![("b", 1), ("b", 1)]), Vec::new()).unwrap_err();
        assert_eq!(err, MappingError::DuplicateKey("\"b\"".to_string()));
    }

    #[test]
    fn test_duplicate_binding_rejected() {
        let err = FrozenMapping::from_bindings([("a", 1), ("a", 2)]).unwrap_err();
        assert_eq!(err, MappingError::DuplicateKey("\"a\"".to_string()));
    }

    #[test]
    fn test_item_and_attribute_lookup() {
        let m: FrozenMapping<String, i64> =
            FrozenMapping::from_bindings([("kty".to_string(), 1), ("use".to_string(), 2)]).unwrap();
        assert_eq!(m.get("kty"), Some(&1));
        assert_eq!(m.attr("use").unwrap(), &2);
        assert!(m.contains_key("kty"));
        assert_eq!(
            m.try_get("crv").unwrap_err(),
            MappingError::KeyNotFound("\"crv\"".to_string())
        );
        assert_eq!(
            m.attr("crv").unwrap_err(),
            MappingError::AttributeNotFound("crv".to_string())
        );
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_absent_key_panics() {
        let m = ab_bindings();
        let _value = m["c"];
    }

    #[test]
    fn test_non_string_keys() {
        let m = FrozenMapping::from_bindings([(3u8, "c"), (1u8, "a")]).unwrap();
        assert_eq!(m.to_string(), r#"frozendict(1="a", 3="c")"#);
        assert_eq!(format!("{m:?}"), r#"FrozenMapping{1: "a", 3: "c"}"#);
    }

    #[test]
    fn test_nested_mappings_hash_by_value() {
        let inner_a = ab_bindings();
        let inner_b = FrozenMapping::from_mapping(vec![("b", 2i64), ("a", 1)]).unwrap();
        let outer_a = FrozenMapping::from_bindings([("x", inner_a)]).unwrap();
        let outer_b = FrozenMapping::from_bindings([("x", inner_b)]).unwrap();
        assert_eq!(outer_a, outer_b);
        assert_eq!(hash_of(&outer_a), hash_of(&outer_b));
    }

    #[test]
    fn test_serde_json_sorted() {
        let m = FrozenMapping::from_mapping(vec![("b".to_string(), 2), ("a".to_string(), 1)]).unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), r#"{"a":1,"b":2}"#);

        let back: FrozenMapping<String, i64> = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_serde_json_rejects_duplicate_keys() {
        let err = serde_json::from_str::<FrozenMapping<String, i64>>(r#"{"a":1,"a":2}"#)
            .unwrap_err();
        assert!(err.to_string().contains("supplied more than once"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn construction_order_never_matters(
                entries in proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 1..16),
            ) {
                let forward: Vec<_> = entries.clone().into_iter().collect();
                let mut backward = forward.clone();
                backward.reverse();

                let a = FrozenMapping::from_bindings(forward).unwrap();
                let b = FrozenMapping::from_bindings(backward).unwrap();
                prop_assert_eq!(&a, &b);
                prop_assert_eq!(hash_of(&a), hash_of(&b));
                prop_assert_eq!(a.to_string(), b.to_string());
                let keys: Vec<_> = a.keys().cloned().collect();
                let sorted: Vec<_> = entries.keys().cloned().collect();
                prop_assert_eq!(keys, sorted);
            }
        }
    }
}
