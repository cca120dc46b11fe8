//! Per-family cliff model variation limits.
//!
//! Each cliff discontinuity shape (step code) ships with a fixed number of
//! model variants, and the number differs between the city and the standard
//! cliff sets. Requesting a variant past the last one would reference a
//! model file that does not exist, so requested variations are clamped
//! against these tables.
//!
//! The tables are compile-time arrays indexed by a perfect hash of the step
//! code. Shipped models never step more than two tiers within one tile, so
//! only letters `A..=C` are addressable (3^4 = 81 slots); any other code has
//! no model variants and clamps to 0.

use serde::{Deserialize, Serialize};

use super::cliff::StepCode;

pub const STEP_CODE_SLOTS: usize = 81;

/// Cliff model family, selected by the cliff tileset's model directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliffFamily {
    City,
    Standard,
}

impl CliffFamily {
    pub const ALL: [CliffFamily; 2] = [CliffFamily::City, CliffFamily::Standard];

    /// `CityCliffs` selects the city family; every other directory uses the
    /// standard tables.
    pub fn from_model_dir(dir: &str) -> Self {
        if dir.eq_ignore_ascii_case("CityCliffs") {
            CliffFamily::City
        } else {
            CliffFamily::Standard
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "city" => Some(CliffFamily::City),
            "standard" => Some(CliffFamily::Standard),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CliffFamily::City => "city",
            CliffFamily::Standard => "standard",
        }
    }

    const fn index(self) -> usize {
        match self {
            CliffFamily::City => 0,
            CliffFamily::Standard => 1,
        }
    }
}

/// Perfect hash of a step code over letters `A..=C`.
pub const fn step_code_slot(letters: [u8; 4]) -> Option<usize> {
    let mut slot = 0usize;
    let mut i = 0;
    while i < 4 {
        let letter = letters[i];
        if letter < b'A' || letter > b'C' {
            return None;
        }
        slot = slot * 3 + (letter - b'A') as usize;
        i += 1;
    }
    Some(slot)
}

const fn build_table(entries: &[(&[u8; 4], u8)]) -> [u8; STEP_CODE_SLOTS] {
    let mut table = [0u8; STEP_CODE_SLOTS];
    let mut i = 0;
    while i < entries.len() {
        let (code, max) = entries[i];
        match step_code_slot(*code) {
            Some(slot) => table[slot] = max,
            None => panic!("variation table entry outside A..=C"),
        }
        i += 1;
    }
    table
}

#[rustfmt::skip]
const STANDARD_CLIFF_VARIATIONS: [u8; STEP_CODE_SLOTS] = build_table(&[
    (b"AAAB", 1), (b"AAAC", 1), (b"AABA", 1), (b"AABB", 2), (b"AABC", 0), (b"AACA", 1),
    (b"AACB", 0), (b"AACC", 1), (b"ABAA", 1), (b"ABAB", 1), (b"ABAC", 0), (b"ABBA", 2),
    (b"ABBB", 1), (b"ABBC", 0), (b"ABCA", 0), (b"ABCB", 0), (b"ABCC", 0), (b"ACAA", 1),
    (b"ACAB", 0), (b"ACAC", 1), (b"ACBA", 0), (b"ACBB", 0), (b"ACBC", 0), (b"ACCA", 1),
    (b"ACCB", 0), (b"ACCC", 1), (b"BAAA", 1), (b"BAAB", 1), (b"BAAC", 0), (b"BABA", 1),
    (b"BABB", 1), (b"BABC", 0), (b"BACA", 0), (b"BACB", 0), (b"BACC", 0), (b"BBAA", 1),
    (b"BBAB", 1), (b"BBAC", 0), (b"BBBA", 1), (b"BBCA", 0), (b"BCAA", 0), (b"BCAB", 0),
    (b"BCAC", 0), (b"BCBA", 0), (b"CAAA", 1), (b"CAAB", 0), (b"CAAC", 1), (b"CABA", 0),
    (b"CABB", 0), (b"CABC", 0), (b"CACA", 1), (b"CACB", 0), (b"CACC", 1), (b"CBAA", 0),
    (b"CBAB", 0), (b"CBAC", 0), (b"CBBA", 0), (b"CCAA", 1), (b"CCAB", 0), (b"CCAC", 1),
    (b"CCBA", 0), (b"CCCA", 1),
]);

#[rustfmt::skip]
const CITY_CLIFF_VARIATIONS: [u8; STEP_CODE_SLOTS] = build_table(&[
    (b"AAAB", 2), (b"AAAC", 1), (b"AABA", 1), (b"AABB", 3), (b"AABC", 0), (b"AACA", 1),
    (b"AACB", 0), (b"AACC", 3), (b"ABAA", 1), (b"ABAB", 1), (b"ABAC", 0), (b"ABBA", 1),
    (b"ABBB", 1), (b"ABBC", 0), (b"ABCA", 0), (b"ABCB", 0), (b"ABCC", 0), (b"ACAA", 1),
    (b"ACAB", 0), (b"ACAC", 1), (b"ACBA", 0), (b"ACBB", 0), (b"ACBC", 0), (b"ACCA", 1),
    (b"ACCB", 0), (b"ACCC", 1), (b"BAAA", 1), (b"BAAB", 1), (b"BAAC", 0), (b"BABA", 1),
    (b"BABB", 1), (b"BABC", 0), (b"BACA", 0), (b"BACB", 0), (b"BACC", 0), (b"BBAA", 1),
    (b"BBAB", 1), (b"BBAC", 0), (b"BBBA", 1), (b"BBCA", 0), (b"BCAA", 0), (b"BCAB", 0),
    (b"BCAC", 0), (b"BCBA", 0), (b"CAAA", 1), (b"CAAB", 0), (b"CAAC", 1), (b"CABA", 0),
    (b"CABB", 0), (b"CABC", 0), (b"CACA", 1), (b"CACB", 0), (b"CACC", 1), (b"CBAA", 0),
    (b"CBAB", 0), (b"CBAC", 0), (b"CBBA", 0), (b"CCAA", 1), (b"CCAB", 0), (b"CCAC", 1),
    (b"CCBA", 0), (b"CCCA", 1),
]);

/// Maximum model variation per cliff family and step code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliffVariationTable {
    tables: [[u8; STEP_CODE_SLOTS]; 2],
}

impl Default for CliffVariationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CliffVariationTable {
    pub const fn builtin() -> Self {
        Self {
            tables: [CITY_CLIFF_VARIATIONS, STANDARD_CLIFF_VARIATIONS],
        }
    }

    /// Table where every step code clamps to variation 0.
    pub const fn empty() -> Self {
        Self {
            tables: [[0; STEP_CODE_SLOTS]; 2],
        }
    }

    /// Unknown step codes have no variants beyond 0.
    pub fn max_variation(&self, family: CliffFamily, code: StepCode) -> u8 {
        step_code_slot(code.letters())
            .map(|slot| self.tables[family.index()][slot])
            .unwrap_or(0)
    }

    pub fn clamp(&self, family: CliffFamily, code: StepCode, requested: u8) -> u8 {
        requested.min(self.max_variation(family, code))
    }

    /// Override one entry. Returns false when the code has a letter past
    /// `C` and so cannot be stored.
    pub fn set(&mut self, family: CliffFamily, code: StepCode, max_variation: u8) -> bool {
        match step_code_slot(code.letters()) {
            Some(slot) => {
                self.tables[family.index()][slot] = max_variation;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> StepCode {
        s.parse().unwrap()
    }

    #[test]
    fn slot_hash_is_dense_and_unique() {
        let mut seen = [false; STEP_CODE_SLOTS];
        for a in b'A'..=b'C' {
            for b in b'A'..=b'C' {
                for c in b'A'..=b'C' {
                    for d in b'A'..=b'C' {
                        let slot = step_code_slot([a, b, c, d]).unwrap();
                        assert!(!seen[slot], "slot {} assigned twice", slot);
                        seen[slot] = true;
                    }
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(step_code_slot(*b"AAAA"), Some(0));
        assert_eq!(step_code_slot(*b"CCCC"), Some(80));
        assert_eq!(step_code_slot(*b"AADA"), None);
    }

    #[test]
    fn family_from_model_dir() {
        assert_eq!(CliffFamily::from_model_dir("CityCliffs"), CliffFamily::City);
        assert_eq!(CliffFamily::from_model_dir("citycliffs"), CliffFamily::City);
        assert_eq!(CliffFamily::from_model_dir("Cliffs"), CliffFamily::Standard);
        assert_eq!(CliffFamily::from_model_dir("Cliffs2"), CliffFamily::Standard);
    }

    #[test]
    fn builtin_families_differ() {
        let table = CliffVariationTable::builtin();
        assert_eq!(table.max_variation(CliffFamily::Standard, code("AAAB")), 1);
        assert_eq!(table.max_variation(CliffFamily::City, code("AAAB")), 2);
        assert_eq!(table.max_variation(CliffFamily::Standard, code("AABB")), 2);
        assert_eq!(table.max_variation(CliffFamily::City, code("AABB")), 3);
    }

    #[test]
    fn clamp_uses_table_maximum() {
        let table = CliffVariationTable::builtin();
        assert_eq!(table.clamp(CliffFamily::Standard, code("AABA"), 0), 0);
        assert_eq!(table.clamp(CliffFamily::Standard, code("AABA"), 1), 1);
        assert_eq!(table.clamp(CliffFamily::Standard, code("AABA"), 7), 1);
        assert_eq!(table.clamp(CliffFamily::City, code("AACC"), 7), 3);
    }

    #[test]
    fn unknown_codes_clamp_to_zero() {
        let table = CliffVariationTable::builtin();
        // Not in either table
        assert_eq!(table.max_variation(CliffFamily::Standard, code("BCCA")), 0);
        // Letter beyond C is not addressable at all
        assert_eq!(table.clamp(CliffFamily::City, code("AAAD"), 9), 0);
    }

    #[test]
    fn set_overrides_single_entry() {
        let mut table = CliffVariationTable::empty();
        assert!(table.set(CliffFamily::City, code("ABBA"), 4));
        assert_eq!(table.max_variation(CliffFamily::City, code("ABBA")), 4);
        assert_eq!(table.max_variation(CliffFamily::Standard, code("ABBA")), 0);
        assert!(!table.set(CliffFamily::City, code("ABBE"), 4));
    }

    #[test]
    fn family_names_round_trip() {
        for family in CliffFamily::ALL {
            assert_eq!(CliffFamily::from_name(family.name()), Some(family));
        }
        assert_eq!(CliffFamily::from_name("lava"), None);
    }
}
