//! Secure payload synthesis, one generator per kind.
//!
//! Every generated field is drawn from OS randomness on each invocation;
//! nothing is derived from a previous payload, so a leaked old decoy cannot
//! be correlated with the current one.

use std::collections::BTreeMap;

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};
use crate::types::SecretKind;

/// Fixed username planted in SSH decoys.
pub const SSH_USERNAME: &str = "admin";
/// Fixed username planted in database decoys.
pub const DATABASE_USERNAME: &str = "db_admin";
/// Fixed database name planted in database decoys.
pub const DATABASE_NAME: &str = "production";
/// Fixed host planted in database decoys.
pub const DATABASE_HOST: &str = "db.internal.local";
/// Recognizable prefix of a cloud-style access key id.
pub const AWS_ACCESS_KEY_PREFIX: &str = "AKIA";
/// Fixed region planted in cloud-style decoys.
pub const AWS_REGION: &str = "us-east-1";

/// Number of random bytes behind a canary token.
pub const CANARY_TOKEN_BYTES: usize = 32;

// 64 symbols, so masking a random byte with 0x3f indexes uniformly.
const CHARSET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Synthesizes a fresh payload for the given kind.
///
/// The returned map holds exactly [`SecretKind::payload_fields`] for the
/// kind, every random field at full strength.
///
/// # Errors
///
/// Returns an error if the OS randomness source fails; no partial or weak
/// payload is ever returned.
pub fn synthesize(kind: SecretKind) -> Result<BTreeMap<String, Vec<u8>>> {
    match kind {
        SecretKind::Ssh => ssh_credential(),
        SecretKind::Database => database_credential(),
        SecretKind::Api => api_credential(),
        SecretKind::Aws => aws_credential(),
        SecretKind::Generic => generic_credential(),
        SecretKind::CanaryToken => canary_payload(),
    }
}

/// Generates a fresh opaque canary token: hex encoding of
/// [`CANARY_TOKEN_BYTES`] bytes of OS randomness.
///
/// # Errors
///
/// Returns an error if the OS randomness source fails.
pub fn canary_token() -> Result<String> {
    let mut bytes = vec![0u8; CANARY_TOKEN_BYTES];
    fill_random(&mut bytes)?;
    Ok(hex::encode(bytes))
}

fn ssh_credential() -> Result<BTreeMap<String, Vec<u8>>> {
    let password = random_string(16)?;
    Ok(BTreeMap::from([
        ("username".to_string(), SSH_USERNAME.as_bytes().to_vec()),
        ("password".to_string(), password.into_bytes()),
    ]))
}

fn database_credential() -> Result<BTreeMap<String, Vec<u8>>> {
    let password = random_string(24)?;
    Ok(BTreeMap::from([
        ("username".to_string(), DATABASE_USERNAME.as_bytes().to_vec()),
        ("password".to_string(), password.into_bytes()),
        ("database".to_string(), DATABASE_NAME.as_bytes().to_vec()),
        ("host".to_string(), DATABASE_HOST.as_bytes().to_vec()),
    ]))
}

fn api_credential() -> Result<BTreeMap<String, Vec<u8>>> {
    let api_key = random_string(32)?;
    let api_secret = random_string(64)?;
    Ok(BTreeMap::from([
        ("api_key".to_string(), api_key.into_bytes()),
        ("api_secret".to_string(), api_secret.into_bytes()),
    ]))
}

fn aws_credential() -> Result<BTreeMap<String, Vec<u8>>> {
    let access_key_id = format!("{AWS_ACCESS_KEY_PREFIX}{}", random_string(16)?);
    let secret_access_key = random_string(40)?;
    Ok(BTreeMap::from([
        ("access_key_id".to_string(), access_key_id.into_bytes()),
        ("secret_access_key".to_string(), secret_access_key.into_bytes()),
        ("region".to_string(), AWS_REGION.as_bytes().to_vec()),
    ]))
}

fn generic_credential() -> Result<BTreeMap<String, Vec<u8>>> {
    let token = random_string(32)?;
    Ok(BTreeMap::from([("token".to_string(), token.into_bytes())]))
}

fn canary_payload() -> Result<BTreeMap<String, Vec<u8>>> {
    let token = canary_token()?;
    Ok(BTreeMap::from([("token".to_string(), token.into_bytes())]))
}

/// Generates a random string of the given length over a 64-symbol
/// URL-safe alphabet.
fn random_string(length: usize) -> Result<String> {
    let mut bytes = vec![0u8; length];
    fill_random(&mut bytes)?;
    let chars: Vec<u8> = bytes
        .iter()
        .map(|b| CHARSET[usize::from(b & 0x3f)])
        .collect();
    // Charset is pure ASCII
    Ok(String::from_utf8_lossy(&chars).into_owned())
}

fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(|e| Error::Generation {
        reason: e.to_string(),
    })
}
