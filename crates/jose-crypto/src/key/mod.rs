//! # Comparable Keys — Value Semantics for Asymmetric Keys
//!
//! Native key objects compare by identity: two independently parsed copies
//! of the same key are different objects. `ComparableKey` restores value
//! semantics by reducing the key to its canonical numeric components once,
//! at wrap time, and comparing and hashing those.
//!
//! ## Families
//!
//! The supported families form a closed set, one module each:
//!
//! | Family | Private-key hash input | Public-key hash input |
//! |---|---|---|
//! | RSA | (p, q, dmp1, dmq1, iqmp, n, e) | (n, e) |
//! | Elliptic curve | (curve, x, y, private scalar) | (curve, x, y) |
//! | OKP | (curve, x) | (curve, x) |
//!
//! Every hash input is prefixed with the family and kind tags so keys of
//! different variants never collide. Adding a family means adding a
//! [`WrappedKey`] variant and a [`CanonicalKey`] implementation.
//!
//! ## Invariants
//!
//! - Equality is defined only between keys of the same family and the same
//!   private/public kind; OKP keys must also share a curve, since Ed25519 and
//!   X25519 keys are distinct key types. Anything else is "not comparable":
//!   [`ComparableKey::try_eq`] returns `None` and `==` returns `false`.
//! - `a == b` implies `hash(a) == hash(b)`.
//! - A key whose material has no canonical numeric form is rejected at wrap
//!   time with [`CryptoError::HashUnsupported`]. No identity-based fallback
//!   exists.
//! - The wrapper borrows the caller's key when given a reference and never
//!   takes responsibility for erasing it.

pub mod ec;
pub mod okp;
pub mod rsa;

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use jose_core::error::CryptoError;

pub use self::ec::{EcCurve, EcKey, EcNumbers, EcPrivateNumbers, EcPublicNumbers};
pub use self::okp::{OkpCurve, OkpKey, OkpNumbers, OkpPrivateNumbers, OkpPublicNumbers};
pub use self::rsa::{RsaKey, RsaNumbers, RsaPrivateNumbers, RsaPublicNumbers};

/// Algorithm class of an asymmetric key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyFamily {
    /// RSA.
    Rsa,
    /// Elliptic curve over a prime field (NIST curves).
    EllipticCurve,
    /// Octet key pair: Edwards and Montgomery curves.
    Okp,
}

impl KeyFamily {
    /// Returns the JWK `kty` name of the family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::EllipticCurve => "EC",
            Self::Okp => "OKP",
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a wrapped key holds private material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    /// Holds private material; the public key is derivable.
    Private,
    /// Public material only.
    Public,
}

impl KeyKind {
    /// Returns `"private"` or `"public"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-family canonicalization of key material.
pub trait CanonicalKey {
    /// The family every value of this type belongs to.
    const FAMILY: KeyFamily;

    /// Canonical numeric form. Its `Hash` impl hashes exactly the family's
    /// hash-input tuple; its `PartialEq` compares the full numeric form.
    type Numbers: Clone + PartialEq + Eq + Hash;

    /// The owned public-key form of this family.
    type Public;

    fn kind(&self) -> KeyKind;

    /// Reduce the key to its canonical numeric form.
    ///
    /// # Errors
    ///
    /// [`CryptoError::HashUnsupported`] if the key has no canonical form.
    fn canonicalize(&self) -> Result<Self::Numbers, CryptoError>;

    /// Derive the public key of the same family.
    fn public_key(&self) -> Result<Self::Public, CryptoError>;
}

/// A key of one of the supported families, borrowed or owned.
#[derive(Clone)]
pub enum WrappedKey<'a> {
    Rsa(RsaKey<'a>),
    Ec(EcKey<'a>),
    Okp(OkpKey<'a>),
}

impl WrappedKey<'_> {
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Rsa(_) => RsaKey::FAMILY,
            Self::Ec(_) => EcKey::FAMILY,
            Self::Okp(_) => OkpKey::FAMILY,
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Rsa(key) => key.kind(),
            Self::Ec(key) => key.kind(),
            Self::Okp(key) => key.kind(),
        }
    }

    fn canonicalize(&self) -> Result<KeyNumbers, CryptoError> {
        Ok(match self {
            Self::Rsa(key) => KeyNumbers::Rsa(key.canonicalize()?),
            Self::Ec(key) => KeyNumbers::Ec(key.canonicalize()?),
            Self::Okp(key) => KeyNumbers::Okp(key.canonicalize()?),
        })
    }

    fn public_key(&self) -> Result<WrappedKey<'static>, CryptoError> {
        Ok(match self {
            Self::Rsa(key) => WrappedKey::Rsa(key.public_key()?),
            Self::Ec(key) => WrappedKey::Ec(key.public_key()?),
            Self::Okp(key) => WrappedKey::Okp(key.public_key()?),
        })
    }

    fn into_owned(self) -> WrappedKey<'static> {
        match self {
            Self::Rsa(key) => WrappedKey::Rsa(key.into_owned()),
            Self::Ec(key) => WrappedKey::Ec(key.into_owned()),
            Self::Okp(key) => WrappedKey::Okp(key.into_owned()),
        }
    }
}

impl<'a> From<RsaKey<'a>> for WrappedKey<'a> {
    fn from(key: RsaKey<'a>) -> Self {
        Self::Rsa(key)
    }
}

impl<'a> From<EcKey<'a>> for WrappedKey<'a> {
    fn from(key: EcKey<'a>) -> Self {
        Self::Ec(key)
    }
}

impl<'a> From<OkpKey<'a>> for WrappedKey<'a> {
    fn from(key: OkpKey<'a>) -> Self {
        Self::Okp(key)
    }
}

/// Implements borrowed and owned conversions from a native key type into
/// its family enum and into [`WrappedKey`].
macro_rules! impl_key_from {
    ($family:ident :: $variant:ident => $native:ty) => {
        impl<'a> From<&'a $native> for $family<'a> {
            fn from(key: &'a $native) -> Self {
                $family::$variant(::std::borrow::Cow::Borrowed(key))
            }
        }

        impl From<$native> for $family<'static> {
            fn from(key: $native) -> Self {
                $family::$variant(::std::borrow::Cow::Owned(key))
            }
        }

        impl<'a> From<&'a $native> for $crate::key::WrappedKey<'a> {
            fn from(key: &'a $native) -> Self {
                $family::from(key).into()
            }
        }

        impl From<$native> for $crate::key::WrappedKey<'static> {
            fn from(key: $native) -> Self {
                $family::from(key).into()
            }
        }
    };
}

pub(crate) use impl_key_from;

/// Canonical numeric form of any supported key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum KeyNumbers {
    Rsa(RsaNumbers),
    Ec(EcNumbers),
    Okp(OkpNumbers),
}

impl fmt::Debug for KeyNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa(numbers) => fmt::Debug::fmt(numbers, f),
            Self::Ec(numbers) => fmt::Debug::fmt(numbers, f),
            Self::Okp(numbers) => fmt::Debug::fmt(numbers, f),
        }
    }
}

/// Wrapper giving an asymmetric key value equality and stable hashing.
#[derive(Clone)]
pub struct ComparableKey<'a> {
    wrapped: WrappedKey<'a>,
    numbers: KeyNumbers,
}

impl<'a> ComparableKey<'a> {
    /// Wrap a key, computing its canonical numeric form.
    ///
    /// Accepts a reference to (or an owned) RSA, P-256, P-384, Ed25519, or
    /// X25519 key, private or public.
    ///
    /// # Errors
    ///
    /// [`CryptoError::HashUnsupported`] if the key has no canonical numeric
    /// form (for example a multi-prime RSA key).
    pub fn new(key: impl Into<WrappedKey<'a>>) -> Result<Self, CryptoError> {
        let wrapped = key.into();
        let numbers = wrapped.canonicalize().map_err(|err| {
            tracing::debug!(
                family = %wrapped.family(),
                kind = %wrapped.kind(),
                error = %err,
                "key canonicalization rejected"
            );
            err
        })?;
        tracing::trace!(family = %wrapped.family(), kind = %wrapped.kind(), "canonicalized key");
        Ok(Self { wrapped, numbers })
    }

    pub fn family(&self) -> KeyFamily {
        self.wrapped.family()
    }

    pub fn kind(&self) -> KeyKind {
        self.wrapped.kind()
    }

    pub fn is_private(&self) -> bool {
        self.kind() == KeyKind::Private
    }

    /// The wrapped key.
    pub fn wrapped(&self) -> &WrappedKey<'a> {
        &self.wrapped
    }

    /// The canonical numeric form used for equality and hashing.
    pub fn numbers(&self) -> &KeyNumbers {
        &self.numbers
    }

    /// Compare with another wrapped key.
    ///
    /// Returns `None` ("not comparable") unless both keys share family and
    /// kind, and for OKP keys also the curve; otherwise compares the full
    /// numeric form. EC keys on different curves compare unequal.
    pub fn try_eq(&self, other: &ComparableKey<'_>) -> Option<bool> {
        if self.family() != other.family() || self.kind() != other.kind() {
            return None;
        }
        if let (WrappedKey::Okp(a), WrappedKey::Okp(b)) = (&self.wrapped, &other.wrapped) {
            if a.curve() != b.curve() {
                return None;
            }
        }
        Some(self.numbers == other.numbers)
    }

    /// Wrap the public key of the same family.
    ///
    /// Public keys return an owned copy of themselves.
    pub fn public_key(&self) -> Result<ComparableKey<'static>, CryptoError> {
        ComparableKey::new(self.wrapped.public_key()?)
    }

    /// Detach from the borrowed key by cloning it.
    pub fn into_owned(self) -> ComparableKey<'static> {
        ComparableKey {
            wrapped: self.wrapped.into_owned(),
            numbers: self.numbers,
        }
    }
}

impl PartialEq for ComparableKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other) == Some(true)
    }
}

impl Eq for ComparableKey<'_> {}

impl Hash for ComparableKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.family().hash(state);
        self.kind().hash(state);
        self.numbers.hash(state);
    }
}

impl fmt::Debug for ComparableKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComparableKey({} {}, {:?})", self.family(), self.kind(), self.numbers)
    }
}

/// Debug rendering for numeric components: a short hex prefix of public
/// values; private values are never rendered.
pub(crate) fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn to_static<T: Clone>(value: &Cow<'_, T>) -> Cow<'static, T> {
    Cow::Owned(value.as_ref().clone())
}

pub(crate) fn into_static<T: Clone>(value: Cow<'_, T>) -> Cow<'static, T> {
    Cow::Owned(value.into_owned())
}
