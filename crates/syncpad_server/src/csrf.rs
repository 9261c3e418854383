//! CSRF token issuance and verification.
//!
//! Tokens are `nonce || HMAC-SHA256(key, nonce)`, hex-encoded. The key is
//! generated on first run and persisted in the data directory so tokens
//! embedded in already-open pages survive a server restart.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::fs;
use std::io;
use std::path::Path;

type HmacSha256 = Hmac<Sha256>;

/// Length of the persisted signing key.
const KEY_LEN: usize = 32;
/// Length of the random nonce prefix in each token.
const NONCE_LEN: usize = 16;
/// File holding the signing key inside the data directory.
const KEY_FILE: &str = "csrf.key";

/// Issues and verifies CSRF tokens for mutating requests.
#[derive(Clone)]
pub struct CsrfProtect {
    key: [u8; KEY_LEN],
}

impl CsrfProtect {
    /// Loads the signing key from the data directory, generating and
    /// persisting a fresh one if it is missing.
    ///
    /// A key file of the wrong length is replaced; that can only come from
    /// a truncated write, and its tokens were never valid anyway.
    ///
    /// # Errors
    ///
    /// Returns an error if the key file cannot be read or written.
    pub fn load_or_generate(data_dir: &Path) -> io::Result<Self> {
        let path = data_dir.join(KEY_FILE);

        match fs::read(&path) {
            Ok(data) if data.len() == KEY_LEN => {
                let mut key = [0u8; KEY_LEN];
                key.copy_from_slice(&data);
                return Ok(Self { key });
            }
            Ok(_) => {
                tracing::warn!(path = %path.display(), "CSRF key has wrong length, regenerating");
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }

        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        fs::write(&path, key)?;
        restrict_permissions(&path)?;
        tracing::info!(path = %path.display(), "generated new CSRF key");

        Ok(Self { key })
    }

    /// Creates a protector from an explicit key.
    ///
    /// Useful for tests.
    #[must_use]
    pub fn with_key(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Issues a fresh token.
    #[must_use]
    pub fn issue(&self) -> String {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let mut token = Vec::with_capacity(NONCE_LEN + 32);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&self.sign(&nonce));
        hex_encode(&token)
    }

    /// Verifies a token previously issued with the same key.
    #[must_use]
    pub fn verify(&self, token: &str) -> bool {
        let Some(bytes) = hex_decode(token) else {
            return false;
        };
        if bytes.len() != NONCE_LEN + 32 {
            return false;
        }

        let (nonce, signature) = bytes.split_at(NONCE_LEN);
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC accepts keys of any length");
        mac.update(nonce);
        mac.verify_slice(signature).is_ok()
    }

    /// Signs data with HMAC-SHA256.
    fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        mac.finalize().into_bytes().into()
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn hex_decode(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}
