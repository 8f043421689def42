//! Bounded text fields
//!
//! `FixedStr<N>` is an inline `N`-byte buffer holding at most `N - 1` bytes
//! of UTF-8 followed by NUL padding. Appending past the capacity truncates
//! silently at the last whole character that fits; nothing ever allocates.

use core::fmt;

use serde::{Serialize, Serializer};

/// Inline, NUL-terminated, UTF-8 text of at most `N - 1` bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedStr<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> FixedStr<N> {
    /// Maximum number of text bytes; one byte is reserved for the terminator.
    pub const CAPACITY: usize = N.saturating_sub(1);

    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    /// Copy `s`, truncating to the field width.
    pub fn from_str_truncated(s: &str) -> Self {
        let mut out = Self::new();
        out.push_str(s);
        out
    }

    /// Decode a NUL-terminated wire field.
    ///
    /// Bytes after the first NUL are ignored; an invalid UTF-8 tail is cut
    /// off at the last valid character.
    pub fn from_wire(bytes: &[u8]) -> Self {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let raw = &bytes[..end];
        let text = match core::str::from_utf8(raw) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&raw[..e.valid_up_to()]).unwrap_or(""),
        };
        Self::from_str_truncated(text)
    }

    /// Append `s`; returns `false` if anything had to be cut.
    pub fn push_str(&mut self, s: &str) -> bool {
        let room = Self::CAPACITY - self.len;
        let take = floor_char_boundary(s, room);
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        take == s.len()
    }

    /// Write the field as exactly `N` wire bytes (text, then NUL padding).
    ///
    /// `out` must be `N` bytes long.
    pub fn write_wire(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), N);
        out.copy_from_slice(&self.buf);
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Formatting into a field truncates instead of failing.
impl<const N: usize> fmt::Write for FixedStr<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl<const N: usize> PartialEq<str> for FixedStr<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const N: usize> PartialEq<&str> for FixedStr<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<const N: usize> Serialize for FixedStr<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Largest char boundary of `s` that is `<= index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
