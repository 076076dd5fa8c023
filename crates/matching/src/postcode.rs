//! Postcode scanning against the gazetteer's pattern tables
//!
//! Postcodes are exact, structured strings, so the scan is pure regex
//! work: punctuation is blanked out (length preserving, offsets stay
//! valid), each table's full patterns are run over the result, and the
//! bare pattern pulls the lookup key back out of every hit.

use address_engine_core::PostcodeMatch;
use address_engine_gazetteer::PostcodeTable;

/// Exact postcode matcher over the gazetteer's compiled tables.
pub struct PostcodeScanner<'a> {
    tables: &'a [PostcodeTable],
}

impl<'a> PostcodeScanner<'a> {
    pub fn new(tables: &'a [PostcodeTable]) -> Self {
        PostcodeScanner { tables }
    }

    /// Scan one cleaned text. Every `(town, origin)` entry registered for
    /// a hit's key yields one match; duplicates survive until flagging.
    pub fn scan(&self, text: &str) -> Vec<PostcodeMatch> {
        let processed = blank_punctuation(text);
        let mut matches = Vec::new();
        for table in self.tables {
            for pattern in &table.patterns {
                for hit in pattern.full.find_iter(&processed) {
                    let hit_text = hit.as_str();
                    let key = match pattern.base.find(hit_text) {
                        Some(found) => found.as_str(),
                        None => continue,
                    };
                    let entries = match table.entries.get(key) {
                        Some(entries) => entries,
                        None => continue,
                    };
                    for (town, origin) in entries {
                        matches.push(PostcodeMatch {
                            start: hit.start(),
                            end: hit.end(),
                            matched_text: hit_text.to_string(),
                            possibility: town.clone(),
                            origin: origin.clone(),
                        });
                    }
                }
            }
        }
        matches
    }
}

/// Replace every byte outside `[A-Z0-9]` with a space, preserving length.
fn blank_punctuation(text: &str) -> String {
    text.bytes()
        .map(|b| {
            if b.is_ascii_uppercase() || b.is_ascii_digit() {
                b as char
            } else {
                ' '
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn entries(pairs: &[(&str, &[(&str, &str)])]) -> HashMap<String, Vec<(String, String)>> {
        pairs
            .iter()
            .map(|(key, towns)| {
                (
                    key.to_string(),
                    towns
                        .iter()
                        .map(|(t, o)| (t.to_string(), o.to_string()))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_plain_postcode_lookup() {
        let table = PostcodeTable::new(
            "generic",
            "",
            &[r"\b[0-9]{5}\b"],
            entries(&[("75001", &[("PARIS", "FR")])]),
        )
        .unwrap();
        let tables = vec![table];
        let scanner = PostcodeScanner::new(&tables);

        let matches = scanner.scan("75001 PARIS");
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!((m.start, m.end), (0, 5));
        assert_eq!(m.matched_text, "75001");
        assert_eq!(m.possibility, "PARIS");
        assert_eq!(m.origin, "FR");
    }

    #[test]
    fn test_punctuation_is_blanked_but_offsets_hold() {
        let table = PostcodeTable::new(
            "generic",
            "",
            &[r"\b[0-9]{5}\b"],
            entries(&[("75001", &[("PARIS", "FR")])]),
        )
        .unwrap();
        let tables = vec![table];
        let scanner = PostcodeScanner::new(&tables);

        let text = "CP:75001,PARIS";
        let matches = scanner.scan(text);
        assert_eq!(matches.len(), 1);
        assert_eq!((matches[0].start, matches[0].end), (3, 8));
        assert_eq!(&text[matches[0].start..matches[0].end], "75001");
    }

    #[test]
    fn test_structure_suffix_extends_match_but_not_key() {
        // The suffix validates trailing structure; the key stays the bare
        // pattern's portion of the hit.
        let table = PostcodeTable::new(
            "xx",
            "[0-9]{2}",
            &[r"\bK7"],
            entries(&[("K7", &[("KTOWN", "XX")])]),
        )
        .unwrap();
        let tables = vec![table];
        let scanner = PostcodeScanner::new(&tables);

        let matches = scanner.scan("K712 MAIN STREET");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_text, "K712");
        assert_eq!(matches[0].possibility, "KTOWN");

        // Without the trailing digits the full pattern does not fire.
        assert!(scanner.scan("K7 MAIN STREET").is_empty());
    }

    #[test]
    fn test_unknown_key_is_skipped() {
        let table = PostcodeTable::new(
            "generic",
            "",
            &[r"\b[0-9]{5}\b"],
            entries(&[("75001", &[("PARIS", "FR")])]),
        )
        .unwrap();
        let tables = vec![table];
        let scanner = PostcodeScanner::new(&tables);
        assert!(scanner.scan("99999 NOWHERE").is_empty());
    }

    #[test]
    fn test_shared_postcode_fans_out() {
        let table = PostcodeTable::new(
            "generic",
            "",
            &[r"\b[0-9]{4}\b"],
            entries(&[("1000", &[("BRUSSELS", "BE"), ("LAUSANNE", "CH")])]),
        )
        .unwrap();
        let tables = vec![table];
        let scanner = PostcodeScanner::new(&tables);

        let matches = scanner.scan("1000 SOMEWHERE");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].possibility, "BRUSSELS");
        assert_eq!(matches[1].possibility, "LAUSANNE");
    }
}
