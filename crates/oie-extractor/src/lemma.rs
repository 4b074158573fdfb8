//! Verb base forms
//!
//! Gerunds are rewritten to their base form when a participial clause is
//! turned into a finite one ("waving his arms" -> "wave his arms"). The
//! rules only cover "-ing" forms; anything else passes through unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

/// Gerunds whose stem the suffix rules get wrong
const IRREGULAR: [(&str, &str); 28] = [
    ("being", "be"),
    ("having", "have"),
    ("doing", "do"),
    ("lying", "lie"),
    ("dying", "die"),
    ("tying", "tie"),
    ("creating", "create"),
    ("writing", "write"),
    ("using", "use"),
    ("changing", "change"),
    ("adding", "add"),
    ("voting", "vote"),
    ("hoping", "hope"),
    ("coping", "cope"),
    ("shaping", "shape"),
    ("typing", "type"),
    ("piping", "pipe"),
    ("ruling", "rule"),
    ("staring", "stare"),
    ("caring", "care"),
    ("daring", "dare"),
    ("sharing", "share"),
    ("comparing", "compare"),
    ("preparing", "prepare"),
    ("scoring", "score"),
    ("storing", "store"),
    ("ignoring", "ignore"),
    ("exploring", "explore"),
];

/// Doubled final consonants that belong to the stem ("falling", "passing")
const KEEP_DOUBLED: [char; 4] = ['l', 's', 'z', 'f'];

/// Stem endings that lost a silent "e" before the suffix
static SILENT_E: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?:v|[^z]z|c|dg|rg|u|[^aeiou][iu]d|[^aeiou]at|[bcdfgkpstz]l|[^aeiou][aeiou][kgm])$").ok()
});

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Base form of a verb, lowercased
pub fn base_form(word: &str) -> String {
    let lower = word.to_lowercase();
    if let Some((_, base)) = IRREGULAR.iter().find(|(form, _)| *form == lower) {
        return base.to_string();
    }

    let Some(stem) = lower.strip_suffix("ing") else {
        return lower;
    };
    // "sing", "bring", "string"
    if stem.chars().count() < 2 || !stem.chars().any(is_vowel) {
        return lower;
    }

    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n >= 3 {
        let last = chars[n - 1];
        if last == chars[n - 2] && !is_vowel(last) && !KEEP_DOUBLED.contains(&last) {
            return chars[..n - 1].iter().collect();
        }
    }

    let silent_e = SILENT_E
        .as_ref()
        .map(|re| re.is_match(stem))
        .unwrap_or(false);
    if silent_e {
        format!("{}e", stem)
    } else {
        stem.to_string()
    }
}
