//! Round-robin credential rotation for rate-limited backends.
//!
//! A [`KeyPool`] is shared by every caller of one backend. Rotation is
//! blind: keys are handed out in order regardless of how earlier calls
//! went, which spreads load evenly but does no backoff or health checks.

use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::error::RagErr;
use crate::error::Result;

/// Ordered, non-empty pool of API keys for one service.
pub struct KeyPool {
    service: String,
    keys: Vec<String>,
    /// Always in `0..keys.len()`.
    cursor: AtomicUsize,
}

impl KeyPool {
    /// Create a pool from the given keys.
    ///
    /// Keys are trimmed and blank entries dropped. Fails if nothing is left.
    pub fn new<I, S>(service: impl Into<String>, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let service = service.into();
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            return Err(RagErr::EmptyCredentialPool { service });
        }
        Ok(Self {
            service,
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Create a pool from a comma-separated list such as `"k1, k2,k3"`.
    pub fn from_csv(service: impl Into<String>, csv: &str) -> Result<Self> {
        Self::new(service, csv.split(','))
    }

    /// Return the key at the cursor and advance it, wrapping around.
    ///
    /// Concurrent callers each observe a distinct cursor position.
    pub fn next_key(&self) -> &str {
        let len = self.keys.len();
        let index = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
        {
            Ok(prev) | Err(prev) => prev,
        };
        &self.keys[index]
    }
}

impl fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPool")
            .field("service", &self.service)
            .field("len", &self.keys.len())
            .finish_non_exhaustive()
    }
}

/// Mask a secret for display, keeping the last four characters.
pub fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[cfg(test)]
#[path = "keys.test.rs"]
mod tests;
