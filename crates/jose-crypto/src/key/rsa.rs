//! # RSA Key Canonicalization
//!
//! Private keys reduce to the two-prime CRT form `(p, q, d, dmp1, dmq1, iqmp)`
//! plus the public `(n, e)`. The CRT exponents are recomputed from `d`, `p`,
//! and `q` rather than read from the key's precomputed values, so keys that
//! were parsed with and without precomputation canonicalize identically.
//!
//! Multi-prime keys have no two-prime CRT form and are rejected with
//! [`CryptoError::HashUnsupported`].

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use jose_core::error::CryptoError;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use super::{hex_prefix, impl_key_from, into_static, to_static, CanonicalKey, KeyFamily, KeyKind};

/// An RSA private or public key.
#[derive(Clone)]
pub enum RsaKey<'a> {
    Private(Cow<'a, RsaPrivateKey>),
    Public(Cow<'a, RsaPublicKey>),
}

impl_key_from!(RsaKey::Private => RsaPrivateKey);
impl_key_from!(RsaKey::Public => RsaPublicKey);

impl RsaKey<'_> {
    pub fn into_owned(self) -> RsaKey<'static> {
        match self {
            Self::Private(key) => RsaKey::Private(into_static(key)),
            Self::Public(key) => RsaKey::Public(into_static(key)),
        }
    }
}

impl CanonicalKey for RsaKey<'_> {
    const FAMILY: KeyFamily = KeyFamily::Rsa;
    type Numbers = RsaNumbers;
    type Public = RsaKey<'static>;

    fn kind(&self) -> KeyKind {
        match self {
            Self::Private(_) => KeyKind::Private,
            Self::Public(_) => KeyKind::Public,
        }
    }

    fn canonicalize(&self) -> Result<RsaNumbers, CryptoError> {
        match self {
            Self::Private(key) => RsaPrivateNumbers::from_key(key).map(RsaNumbers::Private),
            Self::Public(key) => Ok(RsaNumbers::Public(RsaPublicNumbers::from_key(&**key))),
        }
    }

    fn public_key(&self) -> Result<RsaKey<'static>, CryptoError> {
        Ok(match self {
            Self::Private(key) => RsaKey::Public(Cow::Owned(key.to_public_key())),
            Self::Public(key) => RsaKey::Public(to_static(key)),
        })
    }
}

/// Canonical numeric form of an RSA key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum RsaNumbers {
    Private(RsaPrivateNumbers),
    Public(RsaPublicNumbers),
}

impl fmt::Debug for RsaNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private(numbers) => fmt::Debug::fmt(numbers, f),
            Self::Public(numbers) => fmt::Debug::fmt(numbers, f),
        }
    }
}

/// Public RSA components: modulus and public exponent.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPublicNumbers {
    pub n: BigUint,
    pub e: BigUint,
}

impl RsaPublicNumbers {
    pub fn from_key(key: &impl PublicKeyParts) -> Self {
        Self {
            n: key.n().clone(),
            e: key.e().clone(),
        }
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.n.bits()
    }
}

impl Hash for RsaPublicNumbers {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.n.to_bytes_be().hash(state);
        self.e.to_bytes_be().hash(state);
    }
}

impl fmt::Debug for RsaPublicNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RsaPublicNumbers(n={}..., e={})",
            hex_prefix(&self.n.to_bytes_be()),
            self.e
        )
    }
}

/// Private RSA components in two-prime CRT form.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateNumbers {
    pub p: BigUint,
    pub q: BigUint,
    pub d: BigUint,
    /// `d mod (p - 1)`
    pub dmp1: BigUint,
    /// `d mod (q - 1)`
    pub dmq1: BigUint,
    /// `q^-1 mod p`
    pub iqmp: BigUint,
    pub public: RsaPublicNumbers,
}

impl RsaPrivateNumbers {
    pub fn from_key(key: &RsaPrivateKey) -> Result<Self, CryptoError> {
        Self::from_parts(
            RsaPublicNumbers::from_key(key),
            key.d(),
            key.primes(),
            key.crt_coefficient(),
        )
    }

    fn from_parts(
        public: RsaPublicNumbers,
        d: &BigUint,
        primes: &[BigUint],
        iqmp: Option<BigUint>,
    ) -> Result<Self, CryptoError> {
        let [p, q] = primes else {
            return Err(CryptoError::HashUnsupported {
                family: KeyFamily::Rsa.as_str(),
                reason: format!("expected 2 prime factors, found {}", primes.len()),
            });
        };
        let iqmp = iqmp.ok_or_else(|| CryptoError::HashUnsupported {
            family: KeyFamily::Rsa.as_str(),
            reason: "q has no inverse modulo p".to_string(),
        })?;
        let one = BigUint::from(1u8);
        Ok(Self {
            dmp1: d % (p - &one),
            dmq1: d % (q - &one),
            p: p.clone(),
            q: q.clone(),
            d: d.clone(),
            iqmp,
            public,
        })
    }
}

impl Hash for RsaPrivateNumbers {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for component in [&self.p, &self.q, &self.dmp1, &self.dmq1, &self.iqmp] {
            component.to_bytes_be().hash(state);
        }
        self.public.hash(state);
    }
}

impl fmt::Debug for RsaPrivateNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RsaPrivateNumbers(<private>, public={:?})", self.public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};

    const PRIVATE_PEM: &str = include_str!("../../tests/fixtures/rsa2048_private.pem");
    const PUBLIC_PEM: &str = include_str!("../../tests/fixtures/rsa2048_public.pem");

    fn private_key() -> RsaPrivateKey {
        RsaPrivateKey::from_pkcs8_pem(PRIVATE_PEM).expect("fixture key parses")
    }

    #[test]
    fn test_private_numbers_crt_consistent() {
        let key = private_key();
        let numbers = RsaPrivateNumbers::from_key(&key).unwrap();
        let one = BigUint::from(1u8);
        assert_eq!(&numbers.p * &numbers.q, numbers.public.n);
        assert_eq!(&numbers.d % (&numbers.p - &one), numbers.dmp1);
        assert_eq!((&numbers.iqmp * &numbers.q) % &numbers.p, one);
        assert_eq!(numbers.public.bits(), 2048);
    }

    #[test]
    fn test_public_numbers_match_derived() {
        let key = private_key();
        let public = RsaPublicKey::from_public_key_pem(PUBLIC_PEM).unwrap();
        assert_eq!(
            RsaPublicNumbers::from_key(&key),
            RsaPublicNumbers::from_key(&public)
        );
    }

    #[test]
    fn test_multi_prime_rejected() {
        let primes = [BigUint::from(3u8), BigUint::from(5u8), BigUint::from(7u8)];
        let public = RsaPublicNumbers {
            n: BigUint::from(105u8),
            e: BigUint::from(5u8),
        };
        let err = RsaPrivateNumbers::from_parts(public, &BigUint::from(29u8), &primes, None)
            .unwrap_err();
        assert_eq!(
            err,
            CryptoError::HashUnsupported {
                family: "RSA",
                reason: "expected 2 prime factors, found 3".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_crt_coefficient_rejected() {
        let primes = [BigUint::from(5u8), BigUint::from(5u8)];
        let public = RsaPublicNumbers {
            n: BigUint::from(25u8),
            e: BigUint::from(3u8),
        };
        let err = RsaPrivateNumbers::from_parts(public, &BigUint::from(3u8), &primes, None)
            .unwrap_err();
        assert!(matches!(err, CryptoError::HashUnsupported { family: "RSA", .. }));
    }

    #[test]
    fn test_public_key_of_private() {
        let key = private_key();
        let wrapped = RsaKey::from(&key);
        assert_eq!(wrapped.kind(), KeyKind::Private);
        let public = wrapped.public_key().unwrap();
        assert_eq!(public.kind(), KeyKind::Public);
    }

    #[test]
    fn test_debug_hides_private_components() {
        let key = private_key();
        let numbers = RsaPrivateNumbers::from_key(&key).unwrap();
        let debug = format!("{numbers:?}");
        assert!(debug.starts_with("RsaPrivateNumbers(<private>, public=RsaPublicNumbers(n="));
        assert!(debug.ends_with("e=65537))"));
    }
}
