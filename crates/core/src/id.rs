// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! ID generation abstractions shared by the fixed-width identifier types
//! (`DelegationId`, `SignalId`, ...). `MemoryNodeId` does not use this
//! buffer: its dotted hierarchical suffixes (`mem-a1b2.1.3`) are unbounded,
//! so it is a plain `String` newtype instead (see `memory.rs`).

use sha2::{Digest, Sha256};

/// Maximum byte length for an inline fixed-width ID.
pub const ID_MAX_LEN: usize = 23;

/// Fixed-size inline ID buffer. Always ≤ 23 ASCII bytes, `Copy`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IdBuf {
    len: u8,
    buf: [u8; ID_MAX_LEN],
}

impl std::hash::Hash for IdBuf {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Hash only the active bytes so it matches str::hash, which is
        // required for Borrow<str> HashMap lookups.
        self.as_str().hash(state);
    }
}

impl IdBuf {
    pub const fn empty() -> Self {
        Self { len: 0, buf: [0; ID_MAX_LEN] }
    }

    pub fn new(s: &str) -> Self {
        debug_assert!(
            s.len() <= ID_MAX_LEN,
            "ID exceeds {} bytes ({} bytes): {:?}",
            ID_MAX_LEN,
            s.len(),
            s,
        );
        let len = s.len().min(ID_MAX_LEN);
        let mut buf = [0u8; ID_MAX_LEN];
        buf[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self { len: len as u8, buf }
    }

    pub fn as_str(&self) -> &str {
        // Invariant: only constructed from &str, always valid UTF-8.
        match std::str::from_utf8(&self.buf[..self.len as usize]) {
            Ok(s) => s,
            Err(_) => unreachable!("IdBuf constructed from non-UTF-8"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::borrow::Borrow<str> for IdBuf {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Debug for IdBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl std::fmt::Display for IdBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for IdBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for IdBuf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.len() > ID_MAX_LEN {
            return Err(serde::de::Error::custom(format!(
                "ID exceeds {} bytes: {:?}",
                ID_MAX_LEN, s
            )));
        }
        Ok(IdBuf::new(s))
    }
}

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

/// Lowercase hex encoding, no external `hex` crate dependency needed for
/// the handful of call sites that need it.
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// `n` random hex characters, drawn from the OS RNG via `rand`.
///
/// Used for [`crate::SignalId`], whose format (§4.7/§6) is an opaque fresh
/// token rather than a content hash.
pub fn random_hex(n: usize) -> String {
    let byte_len = n.div_ceil(2);
    let bytes: Vec<u8> = (0..byte_len).map(|_| rand::random::<u8>()).collect();
    let hex = to_hex(&bytes);
    hex[..n].to_string()
}

/// Truncated SHA-256 digest over caller-supplied parts, hex-encoded and
/// truncated to `hex_len` characters.
///
/// Used for [`crate::DelegationId`] (§4.4) and [`crate::MemoryNodeId`]
/// (§4.6), both of which the spec defines as content/entropy hashes rather
/// than random tokens.
pub fn hash_id(parts: &[&str], hex_len: usize) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\0");
        }
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    let hex = to_hex(&digest);
    hex[..hex_len.min(hex.len())].to_string()
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
