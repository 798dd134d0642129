//! # Octet Key Pair Canonicalization
//!
//! Edwards (Ed25519) and Montgomery (X25519) keys reduce to the curve name
//! and the public key bytes `x`, with the private key bytes `d` added for
//! private keys. Private and public keys hash the same `(curve, x)` tuple;
//! the kind tag keeps them apart.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use jose_core::error::CryptoError;

use super::{hex_prefix, impl_key_from, into_static, to_static, CanonicalKey, KeyFamily, KeyKind};

/// Supported octet-key-pair curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OkpCurve {
    Ed25519,
    X25519,
}

impl OkpCurve {
    /// Returns the JWK `crv` name of the curve.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
            Self::X25519 => "X25519",
        }
    }
}

impl fmt::Display for OkpCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An Ed25519 or X25519 private or public key.
#[derive(Clone)]
pub enum OkpKey<'a> {
    Ed25519Private(Cow<'a, ed25519_dalek::SigningKey>),
    Ed25519Public(Cow<'a, ed25519_dalek::VerifyingKey>),
    X25519Private(Cow<'a, x25519_dalek::StaticSecret>),
    X25519Public(Cow<'a, x25519_dalek::PublicKey>),
}

impl_key_from!(OkpKey::Ed25519Private => ed25519_dalek::SigningKey);
impl_key_from!(OkpKey::Ed25519Public => ed25519_dalek::VerifyingKey);
impl_key_from!(OkpKey::X25519Private => x25519_dalek::StaticSecret);
impl_key_from!(OkpKey::X25519Public => x25519_dalek::PublicKey);

impl OkpKey<'_> {
    pub fn curve(&self) -> OkpCurve {
        match self {
            Self::Ed25519Private(_) | Self::Ed25519Public(_) => OkpCurve::Ed25519,
            Self::X25519Private(_) | Self::X25519Public(_) => OkpCurve::X25519,
        }
    }

    pub fn into_owned(self) -> OkpKey<'static> {
        match self {
            Self::Ed25519Private(key) => OkpKey::Ed25519Private(into_static(key)),
            Self::Ed25519Public(key) => OkpKey::Ed25519Public(into_static(key)),
            Self::X25519Private(key) => OkpKey::X25519Private(into_static(key)),
            Self::X25519Public(key) => OkpKey::X25519Public(into_static(key)),
        }
    }
}

impl CanonicalKey for OkpKey<'_> {
    const FAMILY: KeyFamily = KeyFamily::Okp;
    type Numbers = OkpNumbers;
    type Public = OkpKey<'static>;

    fn kind(&self) -> KeyKind {
        match self {
            Self::Ed25519Private(_) | Self::X25519Private(_) => KeyKind::Private,
            Self::Ed25519Public(_) | Self::X25519Public(_) => KeyKind::Public,
        }
    }

    fn canonicalize(&self) -> Result<OkpNumbers, CryptoError> {
        let curve = self.curve();
        Ok(match self {
            Self::Ed25519Private(key) => OkpNumbers::Private(OkpPrivateNumbers {
                public: OkpPublicNumbers {
                    curve,
                    x: key.verifying_key().to_bytes(),
                },
                d: key.to_bytes(),
            }),
            Self::Ed25519Public(key) => OkpNumbers::Public(OkpPublicNumbers {
                curve,
                x: key.to_bytes(),
            }),
            Self::X25519Private(key) => OkpNumbers::Private(OkpPrivateNumbers {
                public: OkpPublicNumbers {
                    curve,
                    x: x25519_dalek::PublicKey::from(&**key).to_bytes(),
                },
                d: key.to_bytes(),
            }),
            Self::X25519Public(key) => OkpNumbers::Public(OkpPublicNumbers {
                curve,
                x: key.to_bytes(),
            }),
        })
    }

    fn public_key(&self) -> Result<OkpKey<'static>, CryptoError> {
        Ok(match self {
            Self::Ed25519Private(key) => OkpKey::from(key.verifying_key()),
            Self::Ed25519Public(key) => OkpKey::Ed25519Public(to_static(key)),
            Self::X25519Private(key) => OkpKey::from(x25519_dalek::PublicKey::from(&**key)),
            Self::X25519Public(key) => OkpKey::X25519Public(to_static(key)),
        })
    }
}

/// Canonical numeric form of an octet key pair.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum OkpNumbers {
    Private(OkpPrivateNumbers),
    Public(OkpPublicNumbers),
}

impl fmt::Debug for OkpNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private(numbers) => fmt::Debug::fmt(numbers, f),
            Self::Public(numbers) => fmt::Debug::fmt(numbers, f),
        }
    }
}

/// Curve name and public key bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OkpPublicNumbers {
    pub curve: OkpCurve,
    pub x: [u8; 32],
}

impl fmt::Debug for OkpPublicNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OkpPublicNumbers({}, x={}...)", self.curve, hex_prefix(&self.x))
    }
}

/// Public numbers plus the private key bytes.
///
/// Equality compares `d` as well; hashing covers only `(curve, x)`, which
/// `d` determines.
#[derive(Clone, PartialEq, Eq)]
pub struct OkpPrivateNumbers {
    pub public: OkpPublicNumbers,
    pub d: [u8; 32],
}

impl Hash for OkpPrivateNumbers {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public.hash(state);
    }
}

impl fmt::Debug for OkpPrivateNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OkpPrivateNumbers(<private>, public={:?})", self.public)
    }
}
