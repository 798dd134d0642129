//! # Elliptic-Curve Key Canonicalization
//!
//! Keys reduce to `(curve, x, y)` for public keys and `(curve, x, y, d)` for
//! private keys. Coordinates and the private scalar are fixed-width
//! big-endian field elements, so the byte form is canonical per curve.
//!
//! The public key of a private key is rebuilt from its public numbers
//! (uncompressed SEC1 point) rather than taken from the secret key object.

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;

use jose_core::error::CryptoError;
use p256::elliptic_curve::sec1::ToEncodedPoint;

use super::{hex_prefix, impl_key_from, into_static, to_static, CanonicalKey, KeyFamily, KeyKind};

/// SEC1 tag of an uncompressed curve point.
const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// Supported NIST curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EcCurve {
    P256,
    P384,
}

impl EcCurve {
    /// Returns the JWK `crv` name of the curve.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
        }
    }

    /// Width in bytes of a field element.
    pub fn field_size(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
        }
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An elliptic-curve private or public key.
#[derive(Clone)]
pub enum EcKey<'a> {
    P256Private(Cow<'a, p256::SecretKey>),
    P256Public(Cow<'a, p256::PublicKey>),
    P384Private(Cow<'a, p384::SecretKey>),
    P384Public(Cow<'a, p384::PublicKey>),
}

impl_key_from!(EcKey::P256Private => p256::SecretKey);
impl_key_from!(EcKey::P256Public => p256::PublicKey);
impl_key_from!(EcKey::P384Private => p384::SecretKey);
impl_key_from!(EcKey::P384Public => p384::PublicKey);

impl EcKey<'_> {
    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256Private(_) | Self::P256Public(_) => EcCurve::P256,
            Self::P384Private(_) | Self::P384Public(_) => EcCurve::P384,
        }
    }

    pub fn into_owned(self) -> EcKey<'static> {
        match self {
            Self::P256Private(key) => EcKey::P256Private(into_static(key)),
            Self::P256Public(key) => EcKey::P256Public(into_static(key)),
            Self::P384Private(key) => EcKey::P384Private(into_static(key)),
            Self::P384Public(key) => EcKey::P384Public(into_static(key)),
        }
    }

    fn public_numbers(&self) -> Result<EcPublicNumbers, CryptoError> {
        let curve = self.curve();
        match self {
            Self::P256Private(key) => {
                let point = key.public_key().to_encoded_point(false);
                EcPublicNumbers::from_coordinates(curve, point.x(), point.y())
            }
            Self::P256Public(key) => {
                let point = key.to_encoded_point(false);
                EcPublicNumbers::from_coordinates(curve, point.x(), point.y())
            }
            Self::P384Private(key) => {
                let point = key.public_key().to_encoded_point(false);
                EcPublicNumbers::from_coordinates(curve, point.x(), point.y())
            }
            Self::P384Public(key) => {
                let point = key.to_encoded_point(false);
                EcPublicNumbers::from_coordinates(curve, point.x(), point.y())
            }
        }
    }
}

impl CanonicalKey for EcKey<'_> {
    const FAMILY: KeyFamily = KeyFamily::EllipticCurve;
    type Numbers = EcNumbers;
    type Public = EcKey<'static>;

    fn kind(&self) -> KeyKind {
        match self {
            Self::P256Private(_) | Self::P384Private(_) => KeyKind::Private,
            Self::P256Public(_) | Self::P384Public(_) => KeyKind::Public,
        }
    }

    fn canonicalize(&self) -> Result<EcNumbers, CryptoError> {
        let public = self.public_numbers()?;
        let d = match self {
            Self::P256Private(key) => key.to_bytes().to_vec(),
            Self::P384Private(key) => key.to_bytes().to_vec(),
            Self::P256Public(_) | Self::P384Public(_) => return Ok(EcNumbers::Public(public)),
        };
        Ok(EcNumbers::Private(EcPrivateNumbers { public, d }))
    }

    fn public_key(&self) -> Result<EcKey<'static>, CryptoError> {
        match self {
            Self::P256Public(key) => Ok(EcKey::P256Public(to_static(key))),
            Self::P384Public(key) => Ok(EcKey::P384Public(to_static(key))),
            Self::P256Private(_) | Self::P384Private(_) => self.public_numbers()?.to_key(),
        }
    }
}

/// Canonical numeric form of an elliptic-curve key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum EcNumbers {
    Private(EcPrivateNumbers),
    Public(EcPublicNumbers),
}

impl fmt::Debug for EcNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private(numbers) => fmt::Debug::fmt(numbers, f),
            Self::Public(numbers) => fmt::Debug::fmt(numbers, f),
        }
    }
}

/// Affine coordinates of a public point.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EcPublicNumbers {
    pub curve: EcCurve,
    pub x: Vec<u8>,
    pub y: Vec<u8>,
}

impl EcPublicNumbers {
    fn from_coordinates<X, Y>(curve: EcCurve, x: Option<&X>, y: Option<&Y>) -> Result<Self, CryptoError>
    where
        X: AsRef<[u8]> + ?Sized,
        Y: AsRef<[u8]> + ?Sized,
    {
        match (x, y) {
            (Some(x), Some(y)) => Ok(Self {
                curve,
                x: x.as_ref().to_vec(),
                y: y.as_ref().to_vec(),
            }),
            _ => Err(CryptoError::KeyError(format!(
                "{curve} public key has no affine coordinates"
            ))),
        }
    }

    /// Uncompressed SEC1 encoding `04 || x || y`.
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.x.len() + self.y.len());
        bytes.push(UNCOMPRESSED_POINT_TAG);
        bytes.extend_from_slice(&self.x);
        bytes.extend_from_slice(&self.y);
        bytes
    }

    /// Rebuild a public key object from the coordinates.
    pub fn to_key(&self) -> Result<EcKey<'static>, CryptoError> {
        let sec1 = self.to_sec1_bytes();
        let invalid = |e: p256::elliptic_curve::Error| {
            CryptoError::KeyError(format!("invalid {} point: {e}", self.curve))
        };
        Ok(match self.curve {
            EcCurve::P256 => EcKey::from(p256::PublicKey::from_sec1_bytes(&sec1).map_err(invalid)?),
            EcCurve::P384 => EcKey::from(p384::PublicKey::from_sec1_bytes(&sec1).map_err(invalid)?),
        })
    }
}

impl fmt::Debug for EcPublicNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EcPublicNumbers({}, x={}..., y={}...)",
            self.curve,
            hex_prefix(&self.x),
            hex_prefix(&self.y)
        )
    }
}

/// Public point plus the private scalar.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EcPrivateNumbers {
    pub public: EcPublicNumbers,
    /// Private scalar, big-endian, field-size bytes.
    pub d: Vec<u8>,
}

impl fmt::Debug for EcPrivateNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcPrivateNumbers(<private>, public={:?})", self.public)
    }
}
