//! # Comparable X.509 Objects
//!
//! `ComparableX509` wraps a certificate or a certificate signing request and
//! gives it value semantics. The canonical form is the DER encoding, computed
//! once at wrap time: two objects decoded from different encodings (PEM vs
//! DER) of the same certificate produce identical canonical bytes, compare
//! equal, and hash identically.
//!
//! ## Invariants
//!
//! - Equality is defined only between wrappers of the same variant. A
//!   certificate compared with a request is "not comparable":
//!   [`ComparableX509::try_eq`] returns `None` and `==` returns `false`.
//! - The hash input is `(variant, canonical DER)`.
//! - The wrapped object is exposed through explicit accessors; the wrapper
//!   does not forward the wrapped object's API.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use der::pem::LineEnding;
use der::{Decode, DecodePem, Encode, EncodePem};
use jose_core::error::CryptoError;
use sha2::{Digest, Sha256};
use x509_cert::request::CertReq;
use x509_cert::Certificate;

/// PEM label of a certificate.
const CERTIFICATE_LABEL: &str = "CERTIFICATE";
/// PEM label of a PKCS#10 certificate signing request.
const CERTIFICATE_REQUEST_LABEL: &str = "CERTIFICATE REQUEST";

/// Which certificate-like object a wrapper holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum X509Kind {
    Certificate,
    CertificateRequest,
}

impl X509Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::CertificateRequest => "certificate request",
        }
    }

    /// RFC 7468 label of the PEM encoding.
    pub fn pem_label(&self) -> &'static str {
        match self {
            Self::Certificate => CERTIFICATE_LABEL,
            Self::CertificateRequest => CERTIFICATE_REQUEST_LABEL,
        }
    }
}

impl fmt::Display for X509Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output encoding for [`ComparableX509::dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum X509Encoding {
    /// Binary DER. This is the canonical form.
    Der,
    /// RFC 7468 PEM with LF line endings.
    Pem,
}

/// A certificate or certificate request, borrowed or owned.
#[derive(Clone)]
pub enum X509Object<'a> {
    Certificate(Cow<'a, Certificate>),
    CertificateRequest(Cow<'a, CertReq>),
}

impl X509Object<'_> {
    pub fn kind(&self) -> X509Kind {
        match self {
            Self::Certificate(_) => X509Kind::Certificate,
            Self::CertificateRequest(_) => X509Kind::CertificateRequest,
        }
    }

    fn to_der(&self) -> Result<Vec<u8>, der::Error> {
        match self {
            Self::Certificate(cert) => cert.to_der(),
            Self::CertificateRequest(req) => req.to_der(),
        }
    }

    fn to_pem(&self) -> Result<String, der::Error> {
        match self {
            Self::Certificate(cert) => cert.to_pem(LineEnding::LF),
            Self::CertificateRequest(req) => req.to_pem(LineEnding::LF),
        }
    }

    fn into_owned(self) -> X509Object<'static> {
        match self {
            Self::Certificate(cert) => X509Object::Certificate(Cow::Owned(cert.into_owned())),
            Self::CertificateRequest(req) => {
                X509Object::CertificateRequest(Cow::Owned(req.into_owned()))
            }
        }
    }
}

impl<'a> From<&'a Certificate> for X509Object<'a> {
    fn from(cert: &'a Certificate) -> Self {
        Self::Certificate(Cow::Borrowed(cert))
    }
}

impl From<Certificate> for X509Object<'static> {
    fn from(cert: Certificate) -> Self {
        Self::Certificate(Cow::Owned(cert))
    }
}

impl<'a> From<&'a CertReq> for X509Object<'a> {
    fn from(req: &'a CertReq) -> Self {
        Self::CertificateRequest(Cow::Borrowed(req))
    }
}

impl From<CertReq> for X509Object<'static> {
    fn from(req: CertReq) -> Self {
        Self::CertificateRequest(Cow::Owned(req))
    }
}

/// Wrapper giving a certificate or certificate request value equality and
/// stable hashing through its DER encoding.
#[derive(Clone)]
pub struct ComparableX509<'a> {
    wrapped: X509Object<'a>,
    der: Vec<u8>,
}

impl<'a> ComparableX509<'a> {
    /// Wrap a certificate or certificate request.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Encoding`] if the object cannot be DER-encoded.
    pub fn new(wrapped: impl Into<X509Object<'a>>) -> Result<Self, CryptoError> {
        let wrapped = wrapped.into();
        let der = wrapped
            .to_der()
            .map_err(|e| CryptoError::Encoding(format!("DER encoding of {} failed: {e}", wrapped.kind())))?;
        tracing::trace!(kind = %wrapped.kind(), len = der.len(), "canonicalized x509 object");
        Ok(Self { wrapped, der })
    }

    pub fn kind(&self) -> X509Kind {
        self.wrapped.kind()
    }

    /// The wrapped object.
    pub fn wrapped(&self) -> &X509Object<'a> {
        &self.wrapped
    }

    /// The wrapped certificate, if this wraps one.
    pub fn as_certificate(&self) -> Option<&Certificate> {
        match &self.wrapped {
            X509Object::Certificate(cert) => Some(&**cert),
            X509Object::CertificateRequest(_) => None,
        }
    }

    /// The wrapped certificate request, if this wraps one.
    pub fn as_request(&self) -> Option<&CertReq> {
        match &self.wrapped {
            X509Object::CertificateRequest(req) => Some(&**req),
            X509Object::Certificate(_) => None,
        }
    }

    /// Canonical DER encoding.
    pub fn canonical_bytes(&self) -> &[u8] {
        &self.der
    }

    /// Encode the wrapped object in the requested encoding.
    pub fn dump(&self, encoding: X509Encoding) -> Result<Vec<u8>, CryptoError> {
        match encoding {
            X509Encoding::Der => Ok(self.der.clone()),
            X509Encoding::Pem => self
                .wrapped
                .to_pem()
                .map(String::into_bytes)
                .map_err(|e| CryptoError::Encoding(format!("PEM encoding of {} failed: {e}", self.kind()))),
        }
    }

    /// SHA-256 over the canonical DER encoding.
    pub fn fingerprint(&self) -> [u8; 32] {
        let hash = Sha256::digest(&self.der);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        bytes
    }

    /// Render the fingerprint as a lowercase hex string.
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Compare with another wrapper.
    ///
    /// Returns `None` ("not comparable") when the variants differ; otherwise
    /// whether the canonical bytes match.
    pub fn try_eq(&self, other: &ComparableX509<'_>) -> Option<bool> {
        if self.kind() != other.kind() {
            return None;
        }
        Some(self.der == other.der)
    }

    /// Detach from the borrowed object by cloning it.
    pub fn into_owned(self) -> ComparableX509<'static> {
        ComparableX509 {
            wrapped: self.wrapped.into_owned(),
            der: self.der,
        }
    }
}

impl ComparableX509<'static> {
    /// Decode and wrap a PEM certificate or certificate request, chosen by
    /// the PEM label.
    ///
    /// # Errors
    ///
    /// [`CryptoError::UnsupportedObject`] for any other label,
    /// [`CryptoError::Encoding`] if the document is malformed.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let label = der::pem::decode_label(pem.as_bytes())
            .map_err(|e| CryptoError::Encoding(format!("malformed PEM: {e}")))?;
        let malformed = |e: der::Error| CryptoError::Encoding(format!("malformed {label}: {e}"));
        match label {
            CERTIFICATE_LABEL => Self::new(Certificate::from_pem(pem).map_err(malformed)?),
            CERTIFICATE_REQUEST_LABEL => Self::new(CertReq::from_pem(pem).map_err(malformed)?),
            other => {
                tracing::debug!(label = other, "rejected PEM object that is not a certificate or request");
                Err(CryptoError::UnsupportedObject(format!(
                    "expected {CERTIFICATE_LABEL} or {CERTIFICATE_REQUEST_LABEL} PEM, found {other}"
                )))
            }
        }
    }

    /// Decode and wrap a DER certificate.
    pub fn from_der_certificate(der: &[u8]) -> Result<Self, CryptoError> {
        let cert = Certificate::from_der(der)
            .map_err(|e| CryptoError::Encoding(format!("malformed certificate: {e}")))?;
        Self::new(cert)
    }

    /// Decode and wrap a DER certificate request.
    pub fn from_der_request(der: &[u8]) -> Result<Self, CryptoError> {
        let req = CertReq::from_der(der)
            .map_err(|e| CryptoError::Encoding(format!("malformed certificate request: {e}")))?;
        Self::new(req)
    }
}

impl PartialEq for ComparableX509<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other) == Some(true)
    }
}

impl Eq for ComparableX509<'_> {}

impl Hash for ComparableX509<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.der.hash(state);
    }
}

impl fmt::Debug for ComparableX509<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComparableX509({}, sha256:{}...)",
            self.kind(),
            &self.fingerprint_hex()[..8]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT_PEM: &str = include_str!("../tests/fixtures/cert.pem");
    const CERT_DER: &[u8] = include_bytes!("../tests/fixtures/cert.der");
    const CSR_PEM: &str = include_str!("../tests/fixtures/csr.pem");
    const KEY_PEM: &str = include_str!("../tests/fixtures/p256_private.pem");

    #[test]
    fn test_canonical_bytes_are_der() {
        let cert = ComparableX509::from_pem(CERT_PEM).unwrap();
        assert_eq!(cert.canonical_bytes(), CERT_DER);
        assert_eq!(cert.dump(X509Encoding::Der).unwrap(), CERT_DER);
        assert_eq!(cert.kind(), X509Kind::Certificate);
    }

    #[test]
    fn test_pem_dump_roundtrips() {
        let cert = ComparableX509::from_pem(CERT_PEM).unwrap();
        let pem = String::from_utf8(cert.dump(X509Encoding::Pem).unwrap()).unwrap();
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));
        assert_eq!(ComparableX509::from_pem(&pem).unwrap(), cert);
    }

    #[test]
    fn test_request_label_selects_variant() {
        let req = ComparableX509::from_pem(CSR_PEM).unwrap();
        assert_eq!(req.kind(), X509Kind::CertificateRequest);
        assert!(req.as_request().is_some());
        assert!(req.as_certificate().is_none());
    }

    #[test]
    fn test_non_certificate_pem_rejected() {
        let err = ComparableX509::from_pem(KEY_PEM).unwrap_err();
        assert_eq!(
            err,
            CryptoError::UnsupportedObject(
                "expected CERTIFICATE or CERTIFICATE REQUEST PEM, found PRIVATE KEY".to_string()
            )
        );
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            ComparableX509::from_pem("not a pem document"),
            Err(CryptoError::Encoding(_))
        ));
        assert!(matches!(
            ComparableX509::from_der_certificate(&[0x30, 0x03, 0x01]),
            Err(CryptoError::Encoding(_))
        ));
    }

    #[test]
    fn test_certificate_and_request_not_comparable() {
        let cert = ComparableX509::from_pem(CERT_PEM).unwrap();
        let req = ComparableX509::from_pem(CSR_PEM).unwrap();
        assert_eq!(cert.try_eq(&req), None);
        assert_ne!(cert, req);
    }

    #[test]
    fn test_fingerprint_is_sha256_of_der() {
        let cert = ComparableX509::from_der_certificate(CERT_DER).unwrap();
        let expected: [u8; 32] = Sha256::digest(CERT_DER).into();
        assert_eq!(cert.fingerprint(), expected);
        assert_eq!(cert.fingerprint_hex().len(), 64);
        let debug = format!("{cert:?}");
        assert!(debug.starts_with("ComparableX509(certificate, sha256:"));
    }
}
