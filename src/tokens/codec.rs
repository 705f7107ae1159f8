//! Signed, time-bounded link tokens
//!
//! A token is `"<base36 days>-<hex digest>"`. The day count is measured from
//! 2001-01-01 and the digest is an HMAC-SHA256 over the purpose's hash inputs
//! for that day, keyed by `SHA256(salt || secret)`. Embedding the day makes
//! expiry stateless; signing it makes the expiry unforgeable.

use chrono::{DateTime, Datelike, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

use super::subject::{HashInputs, TokenSubject};

type HmacSha256 = Hmac<Sha256>;

/// `num_days_from_ce()` of 2001-01-01, the token epoch
const EPOCH_DAYS_FROM_CE: i32 = 730_486;

/// Longest base36 timestamp accepted when parsing
const MAX_TIMESTAMP_LEN: usize = 13;

/// Whole days between the token epoch and `now` (UTC), clamped at zero
pub fn days_since_epoch(now: DateTime<Utc>) -> u64 {
    (now.date_naive().num_days_from_ce() - EPOCH_DAYS_FROM_CE).max(0) as u64
}

/// Encode `n` in lowercase base36
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Decode a base36 string, rejecting signs, overlong input and overflow
pub fn from_base36(s: &str) -> Option<u64> {
    if s.is_empty() || s.len() > MAX_TIMESTAMP_LEN || !s.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return None;
    }
    u64::from_str_radix(s, 36).ok()
}

/// Issues and verifies tokens for one purpose
#[derive(Clone)]
pub struct TokenCodec {
    purpose: String,
    salt: String,
    key: [u8; 32],
    expiry_days: u64,
    hash_inputs: HashInputs,
}

impl TokenCodec {
    pub fn new(
        purpose: impl Into<String>,
        salt: impl Into<String>,
        secret: &str,
        expiry_days: u64,
        hash_inputs: HashInputs,
    ) -> Self {
        let salt = salt.into();
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(secret.as_bytes());

        Self {
            purpose: purpose.into(),
            salt,
            key: hasher.finalize().into(),
            expiry_days,
            hash_inputs,
        }
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn expiry_days(&self) -> u64 {
        self.expiry_days
    }

    /// Mint a token for `subject` at `now`
    pub fn issue(&self, subject: &dyn TokenSubject, now: DateTime<Utc>) -> String {
        self.make_token(subject, days_since_epoch(now))
    }

    /// Check a presented token
    ///
    /// Returns `false` without saying why for a missing subject, a malformed
    /// token, a digest mismatch, a timestamp later than `now` or an expired
    /// token. The digest comparison runs in constant time.
    pub fn verify(
        &self,
        subject: Option<&dyn TokenSubject>,
        token: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(subject) = subject else {
            return self.reject("missing subject");
        };
        if subject.subject_id().is_empty() || token.is_empty() {
            return self.reject("empty subject or token");
        }

        let mut parts = token.split('-');
        let (Some(ts_b36), Some(_), None) = (parts.next(), parts.next(), parts.next()) else {
            return self.reject("malformed");
        };
        let Some(timestamp) = from_base36(ts_b36) else {
            return self.reject("malformed timestamp");
        };

        let expected = self.make_token(subject, timestamp);
        if !constant_time_eq(token, &expected) {
            return self.reject("digest mismatch");
        }

        let today = days_since_epoch(now);
        if timestamp > today {
            return self.reject("issued in the future");
        }
        if today - timestamp > self.expiry_days {
            return self.reject("expired");
        }

        true
    }

    fn make_token(&self, subject: &dyn TokenSubject, timestamp: u64) -> String {
        format!("{}-{}", to_base36(timestamp), self.digest(subject, timestamp))
    }

    fn digest(&self, subject: &dyn TokenSubject, timestamp: u64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(self.hash_inputs.render(subject, timestamp).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn reject(&self, reason: &'static str) -> bool {
        tracing::debug!(purpose = %self.purpose, reason, "token rejected");
        false
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("purpose", &self.purpose)
            .field("salt", &self.salt)
            .field("key", &"[REDACTED]")
            .field("expiry_days", &self.expiry_days)
            .field("hash_inputs", &self.hash_inputs)
            .finish()
    }
}

/// Constant-time string comparison
///
/// On a length mismatch a dummy comparison still runs so timing does not
/// depend on where the inputs differ.
fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}
