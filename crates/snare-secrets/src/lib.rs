//! # Snare Secrets
//!
//! The decoy secret model for the Snare deception platform:
//!
//! - **Closed kind set**: every tracked secret is one of a fixed set of
//!   [`SecretKind`]s with a fixed payload schema
//! - **Marker labels**: only objects carrying the decoy-credential or
//!   canary-token marker are managed; everything else is ignored
//! - **Typed policy view**: raw label/annotation strings are parsed once
//!   into a [`DecoySpec`] at the store boundary
//! - **Secure synthesis**: payloads are generated from OS randomness and
//!   never derived from a previous value
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use snare_secrets::{SecretKind, SecretName, SecretObject, synthesize};
//!
//! let name = SecretName::new("trap-web", "db-decoy").expect("valid name");
//! let object = SecretObject::decoy_credential(
//!     name,
//!     SecretKind::Database,
//!     Duration::from_secs(12 * 3600),
//! )
//! .expect("credential kind");
//!
//! assert!(object.is_decoy_credential());
//!
//! let payload = synthesize(SecretKind::Database).expect("randomness available");
//! assert!(payload.contains_key("password"));
//! ```
//!
//! ## Security Considerations
//!
//! - Payload bytes are redacted from `Debug` output
//! - Randomness comes from the operating system; a failed read is an error,
//!   never a weak or empty payload

pub mod classify;
pub mod error;
pub mod generate;
pub mod types;

// Re-export commonly used types
pub use classify::{DecoySpec, IntervalSource};
pub use error::{Error, Result};
pub use generate::{canary_token, synthesize};
pub use types::{
    CANARY_TOKEN_LABEL, CREDENTIAL_KIND_LABEL, DECOY_CREDENTIAL_LABEL, LAST_ROTATION_ANNOTATION,
    ROTATION_INTERVAL_ANNOTATION, SecretKind, SecretName, SecretObject,
};
