//! Name normalization and alias generation
//!
//! Gazetteer names and input text are folded to plain ASCII before any
//! matching happens, so byte offsets and character offsets agree everywhere
//! downstream. Alias generation covers the two spelling axes that vary
//! freely between data sources: hyphen vs space separators and the
//! "Saint"/"St."/"St-" prefix family.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Separator characters treated as interchangeable in place names.
const SEPARATOR_VARIANTS: [char; 2] = ['-', ' '];

/// Canonical spellings of the "Saint" prefix, each with its own separator.
const SAINT_VARIANTS: [&str; 3] = ["SAINT-", "ST. ", "ST-"];

/// Placeholder inserted while rewriting; never occurs in gazetteer names.
const TOKEN: &str = "%TOKEN%";

// Matches "SAINT", "ST." or "ST" at a word start, consuming the separator
// (space or punctuation) that follows the prefix.
static SAINT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bSAINT([^\s\w]|\s)|\bST\.([^\s\w]|\s)|\bST([^\s\w]|\s)").unwrap()
});

/// Fold a string to plain ASCII.
///
/// Latin letters lose their diacritics, typographic quotes and dashes
/// collapse to `'` and `-`, and `@` becomes `a` (a common OCR artifact in
/// scanned addresses). Characters with no mapping are dropped, so the
/// result is always pure ASCII.
///
/// # Examples
/// ```
/// use address_engine_gazetteer::normalize::fold_ascii;
/// assert_eq!(fold_ascii("SÃO PAULO"), "SAO PAULO");
/// assert_eq!(fold_ascii("Čačak"), "Cacak");
/// ```
pub fn fold_ascii(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii() {
            match c {
                '@' => out.push('a'),
                '`' => out.push('\''),
                _ => out.push(c),
            }
        } else if let Some(repl) = fold_char(c) {
            out.push_str(repl);
        }
    }
    out
}

/// Key used for population and origin-metadata lookups: lowercased, folded.
pub fn lookup_key(name: &str) -> String {
    fold_ascii(&name.to_lowercase())
}

/// Spellings of `name` with `-` and ` ` separators swapped out.
///
/// A name without either separator comes back as a singleton set.
pub fn separator_aliases(name: &str) -> BTreeSet<String> {
    let mut tokenized = name.to_string();
    for sep in SEPARATOR_VARIANTS {
        tokenized = tokenized.replace(sep, TOKEN);
    }
    if !tokenized.contains(TOKEN) {
        return BTreeSet::from([name.to_string()]);
    }
    SEPARATOR_VARIANTS
        .iter()
        .map(|sep| tokenized.replace(TOKEN, &sep.to_string()))
        .collect()
}

/// Spellings of `name` with the "Saint" prefix family swapped out.
///
/// "SAINT-ETIENNE" expands to itself plus "ST. ETIENNE" and "ST-ETIENNE";
/// a name without the prefix comes back as a singleton set.
pub fn saint_aliases(name: &str) -> BTreeSet<String> {
    let tokenized = SAINT_PREFIX.replace_all(name, TOKEN);
    if tokenized == name {
        return BTreeSet::from([name.to_string()]);
    }
    SAINT_VARIANTS
        .iter()
        .map(|variant| tokenized.replace(TOKEN, variant))
        .collect()
}

/// All spellings of `name` across both alias axes, original first.
pub fn generate_aliases(name: &str) -> Vec<String> {
    let mut aliases = vec![name.to_string()];
    for saint_variant in saint_aliases(name) {
        for alias in separator_aliases(&saint_variant) {
            aliases.push(alias);
        }
    }
    aliases
}

/// Replacement for a single non-ASCII character, if one is known.
fn fold_char(c: char) -> Option<&'static str> {
    let repl = match c {
        // Latin-1 Supplement, uppercase
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'Æ' => "AE",
        'Ç' => "C",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'Ð' => "D",
        'Ñ' => "N",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
        'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
        'Ý' => "Y",
        'Þ' => "TH",

        // Latin-1 Supplement, lowercase
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ð' => "d",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'þ' => "th",
        'ß' => "ss",

        // Latin Extended-A
        'Ā' | 'Ă' | 'Ą' => "A",
        'ā' | 'ă' | 'ą' => "a",
        'Ć' | 'Ĉ' | 'Ċ' | 'Č' => "C",
        'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'Ď' | 'Đ' => "D",
        'ď' | 'đ' => "d",
        'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E",
        'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'Ĥ' | 'Ħ' => "H",
        'ĥ' | 'ħ' => "h",
        'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => "I",
        'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'Ĵ' => "J",
        'ĵ' => "j",
        'Ķ' => "K",
        'ķ' | 'ĸ' => "k",
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => "L",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'Ń' | 'Ņ' | 'Ň' | 'Ŋ' => "N",
        'ń' | 'ņ' | 'ň' | 'ŉ' | 'ŋ' => "n",
        'Ō' | 'Ŏ' | 'Ő' => "O",
        'ō' | 'ŏ' | 'ő' => "o",
        'Œ' => "OE",
        'œ' => "oe",
        'Ŕ' | 'Ŗ' | 'Ř' => "R",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'Ś' | 'Ŝ' | 'Ş' | 'Š' | 'Ș' => "S",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => "s",
        'Ţ' | 'Ť' | 'Ŧ' | 'Ț' => "T",
        'ţ' | 'ť' | 'ŧ' | 'ț' => "t",
        'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => "U",
        'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'Ŵ' => "W",
        'ŵ' => "w",
        'Ŷ' => "Y",
        'ŷ' => "y",
        'Ÿ' => "Y",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ź' | 'ż' | 'ž' => "z",
        'ſ' => "s",

        // Typographic punctuation
        '\u{00A0}' => " ",
        '´' | '\u{02B9}' | '\u{02BB}' | '\u{02BC}' | '\u{02BD}' | '\u{2018}' | '\u{2019}'
        | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{2035}' => "'",
        '«' | '»' | '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
        | '\u{2212}' => "-",
        '\u{2026}' => "...",
        '×' => "x",

        _ => return None,
    };
    Some(repl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fold_replaces_typographic_characters() {
        let input = "this needs to be replaced: `test @ Rock´n roll` and \u{2018}\u{2013}others\u{2013}\u{2019}";
        let expected = "this needs to be replaced: 'test a Rock'n roll' and '-others-'";
        assert_eq!(fold_ascii(input), expected);
    }

    #[test]
    fn test_fold_strips_diacritics() {
        assert_eq!(fold_ascii("MÜNCHEN"), "MUNCHEN");
        assert_eq!(fold_ascii("Łódź"), "Lodz");
        assert_eq!(fold_ascii("AÇORES"), "ACORES");
        assert_eq!(fold_ascii("Þórshöfn"), "THorshofn");
    }

    #[test]
    fn test_fold_drops_unmapped_characters() {
        assert_eq!(fold_ascii("東京 TOKYO"), " TOKYO");
        assert_eq!(fold_ascii(""), "");
    }

    #[test]
    fn test_lookup_key_lowercases_then_folds() {
        assert_eq!(lookup_key("PARIS"), "paris");
        assert_eq!(lookup_key("SÃO PAULO"), "sao paulo");
    }

    #[test]
    fn test_saint_prefix_with_hyphen() {
        assert_eq!(
            saint_aliases("SAINT-ETIENNE"),
            set(&["SAINT-ETIENNE", "ST. ETIENNE", "ST-ETIENNE"])
        );
    }

    #[test]
    fn test_saint_prefix_with_dot() {
        assert_eq!(
            saint_aliases("ST. JOHN'S"),
            set(&["SAINT-JOHN'S", "ST. JOHN'S", "ST-JOHN'S"])
        );
    }

    #[test]
    fn test_saint_prefix_bare() {
        assert_eq!(
            saint_aliases("ST JULIANS"),
            set(&["SAINT-JULIANS", "ST. JULIANS", "ST-JULIANS"])
        );
        assert_eq!(
            saint_aliases("SAINT PETERSBURG"),
            set(&["SAINT-PETERSBURG", "ST. PETERSBURG", "ST-PETERSBURG"])
        );
    }

    #[test]
    fn test_saint_prefix_absent() {
        assert_eq!(saint_aliases("AINT-ETIENNE"), set(&["AINT-ETIENNE"]));
    }

    #[test]
    fn test_separator_swap_both_directions() {
        assert_eq!(
            separator_aliases("Val-d'Oise"),
            set(&["Val-d'Oise", "Val d'Oise"])
        );
        assert_eq!(
            separator_aliases("Val d'Oise"),
            set(&["Val-d'Oise", "Val d'Oise"])
        );
    }

    #[test]
    fn test_separator_absent() {
        assert_eq!(separator_aliases("NoSeparator"), set(&["NoSeparator"]));
    }

    #[test]
    fn test_generate_aliases_keeps_original_first() {
        let aliases = generate_aliases("SAINT-ETIENNE");
        assert_eq!(aliases[0], "SAINT-ETIENNE");
        for expected in [
            "SAINT ETIENNE",
            "SAINT-ETIENNE",
            "ST. ETIENNE",
            "ST.-ETIENNE",
            "ST ETIENNE",
            "ST-ETIENNE",
        ] {
            assert!(aliases.iter().any(|a| a == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_generate_aliases_without_variants() {
        assert_eq!(generate_aliases("BERLIN"), vec!["BERLIN".to_string()]);
    }
}
