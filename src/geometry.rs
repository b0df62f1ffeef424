//! Page geometry and bookmark records.
//!
//! Everything here is plain data: the presenter moves these values from the
//! sources to the screen without interpreting them. Rectangles are expressed
//! in device-independent units; scaling to pixels is the renderer's problem.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Page number within the mushaf. Always positive.
pub type PageId = u32;

/// Axis-aligned rectangle in device-independent units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// A `sura:ayah` pair identifying one verse.
///
/// The textual form (`"2:255"`) is what the geometry files and the original
/// data sources use, so serde round-trips through it. Ordering is sura-major
/// so maps keyed by `VerseKey` iterate in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerseKey {
    pub sura: u16,
    pub ayah: u16,
}

impl VerseKey {
    pub fn new(sura: u16, ayah: u16) -> Self {
        Self { sura, ayah }
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sura, self.ayah)
    }
}

impl FromStr for VerseKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (sura, ayah) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("verse key must be sura:ayah, got {s:?}"))?;
        Ok(Self {
            sura: sura
                .parse()
                .with_context(|| format!("invalid sura in verse key {s:?}"))?,
            ayah: ayah
                .parse()
                .with_context(|| format!("invalid ayah in verse key {s:?}"))?,
        })
    }
}

impl TryFrom<String> for VerseKey {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<VerseKey> for String {
    fn from(key: VerseKey) -> Self {
        key.to_string()
    }
}

/// Bounds of one page of content, paired with the page it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCoordinates {
    pub page: PageId,
    pub bounds: Rect,
}

/// Glyph boxes for every ayah on a page. A verse wrapping across lines has
/// one box per line, in line order.
pub type AyahBoundsMap = BTreeMap<VerseKey, Vec<Rect>>;

/// A saved verse location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub sura: u16,
    pub ayah: u16,
    pub page: PageId,
}

impl Bookmark {
    pub fn verse(&self) -> VerseKey {
        VerseKey::new(self.sura, self.ayah)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_key_round_trips_through_text() {
        let key: VerseKey = "2:255".parse().expect("valid key should parse");
        assert_eq!(key, VerseKey::new(2, 255));
        assert_eq!(key.to_string(), "2:255");
    }

    #[test]
    fn verse_key_rejects_malformed_input() {
        assert!("2".parse::<VerseKey>().is_err());
        assert!("2:".parse::<VerseKey>().is_err());
        assert!("two:255".parse::<VerseKey>().is_err());
    }

    #[test]
    fn verse_keys_order_sura_major() {
        let mut keys = vec![
            VerseKey::new(3, 1),
            VerseKey::new(2, 255),
            VerseKey::new(2, 10),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                VerseKey::new(2, 10),
                VerseKey::new(2, 255),
                VerseKey::new(3, 1),
            ]
        );
    }
}
