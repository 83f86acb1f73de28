//! Lexical normalization of raw ingredient strings.
//!
//! Splits an ingredient name into identity-bearing *base* tokens and
//! *form* modifiers (processing, preservation, size, quality). Measurement
//! and packaging words are dropped entirely.
//!
//! All vocabularies are static and every function here is pure: the same
//! input always yields the same tokens and classification.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// =============================================================================
// Vocabularies
// =============================================================================

/// Modifiers that differentiate variants of the same base ingredient.
const FORM_MODIFIERS_RAW: &[&str] = &[
    // Processing state
    "powder",
    "powdered",
    "ground",
    "granulated",
    "granules",
    "flakes",
    "flaked",
    "minced",
    "chopped",
    "diced",
    "sliced",
    "shredded",
    "grated",
    "crushed",
    "whole",
    "halved",
    "quartered",
    "cubed",
    "mashed",
    "pureed",
    // Preservation
    "fresh",
    "dried",
    "dry",
    "frozen",
    "canned",
    "pickled",
    "smoked",
    "cured",
    "roasted",
    "toasted",
    // Preparation
    "raw",
    "cooked",
    "uncooked",
    "blanched",
    "peeled",
    "seeded",
    "pitted",
    "boneless",
    "skinless",
    "melted",
    "softened",
    // Size
    "large",
    "medium",
    "small",
    "baby",
    "mini",
    "jumbo",
    "thin",
    "thick",
    // Quality
    "organic",
    "natural",
    "pure",
    "real",
    "imitation",
    "low-fat",
    "nonfat",
    "unsalted",
    "salted",
    "sweetened",
    "unsweetened",
];

/// Words that describe measurement or packaging, not identity.
const UNIT_WORDS_RAW: &[&str] = &[
    "clove",
    "cloves",
    "head",
    "heads",
    "bulb",
    "bulbs",
    "stalk",
    "stalks",
    "leaf",
    "leaves",
    "sprig",
    "sprigs",
    "bunch",
    "bunches",
    "rib",
    "ribs",
    "ear",
    "ears",
    "strip",
    "strips",
    "piece",
    "pieces",
    "slice",
    "slices",
    "cup",
    "cups",
    "tablespoon",
    "tablespoons",
    "teaspoon",
    "teaspoons",
    "pound",
    "pounds",
    "ounce",
    "ounces",
    "can",
    "cans",
    "package",
    "packages",
];

/// Irregular spellings mapped to their canonical lemma.
const LEMMAS_RAW: &[(&str, &str)] = &[
    ("powdered", "powder"),
    ("granulated", "granules"),
    ("flaked", "flakes"),
    ("dried", "dry"),
    ("roasted", "roast"),
    ("toasted", "toast"),
    ("smoked", "smoke"),
    ("minced", "mince"),
    ("chopped", "chop"),
    ("diced", "dice"),
    ("sliced", "slice"),
    ("shredded", "shred"),
    ("grated", "grate"),
    ("crushed", "crush"),
    ("peeled", "peel"),
    ("seeded", "seed"),
    ("pitted", "pit"),
    ("halved", "half"),
    ("quartered", "quarter"),
    ("cubed", "cube"),
    ("mashed", "mash"),
    ("pureed", "puree"),
    ("cloves", "clove"),
    ("heads", "head"),
    ("bulbs", "bulb"),
    ("stalks", "stalk"),
    ("leaves", "leaf"),
    ("sprigs", "sprig"),
    ("bunches", "bunch"),
    ("ribs", "rib"),
    ("ears", "ear"),
    ("strips", "strip"),
    ("pieces", "piece"),
];

static FORM_MODIFIERS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| FORM_MODIFIERS_RAW.iter().copied().collect());

static UNIT_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| UNIT_WORDS_RAW.iter().copied().collect());

static LEMMAS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| LEMMAS_RAW.iter().copied().collect());

// =============================================================================
// Classification
// =============================================================================

/// Role of a single token within an ingredient name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Identity-bearing word, kept verbatim.
    Base,
    /// Form modifier, carried as its lemma.
    Form,
    /// Measurement or container word, discarded.
    Unit,
}

/// Base and form tokens extracted from one ingredient string, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseAndForm {
    pub base: Vec<String>,
    pub form: Vec<String>,
}

/// Tokenize text into lowercase words.
///
/// Every character other than `[a-z0-9]`, whitespace and `-` becomes a
/// separator. Tokens shorter than two characters are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Canonical spelling of a token. Unmapped tokens are returned unchanged.
pub fn lemmatize(token: &str) -> &str {
    LEMMAS.get(token).copied().unwrap_or(token)
}

/// Classify a token. Form modifiers win over unit words.
pub fn classify(token: &str) -> TokenClass {
    if FORM_MODIFIERS.contains(token) || FORM_MODIFIERS.contains(lemmatize(token)) {
        TokenClass::Form
    } else if UNIT_WORDS.contains(token) {
        TokenClass::Unit
    } else {
        TokenClass::Base
    }
}

/// Split an ingredient string into base tokens and lemmatized form tokens.
pub fn extract_base_and_form(ingredient: &str) -> BaseAndForm {
    let mut out = BaseAndForm::default();

    for token in tokenize(ingredient) {
        match classify(&token) {
            TokenClass::Form => out.form.push(lemmatize(&token).to_string()),
            TokenClass::Base => out.base.push(token),
            TokenClass::Unit => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Fresh Garlic, crushed!"),
            vec!["fresh", "garlic", "crushed"]
        );
    }

    #[test]
    fn test_tokenize_keeps_hyphen_and_digits() {
        assert_eq!(tokenize("low-fat 2% milk"), vec!["low-fat", "milk"]);
        assert_eq!(tokenize("7-up soda"), vec!["7-up", "soda"]);
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(tokenize("a b cd e"), vec!["cd"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_non_ascii_is_separator() {
        assert_eq!(tokenize("jalapeño peppers"), vec!["jalape", "peppers"]);
    }

    #[test]
    fn test_lemmatize() {
        assert_eq!(lemmatize("powdered"), "powder");
        assert_eq!(lemmatize("cloves"), "clove");
        assert_eq!(lemmatize("garlic"), "garlic");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("ground"), TokenClass::Form);
        assert_eq!(classify("minced"), TokenClass::Form);
        assert_eq!(classify("cup"), TokenClass::Unit);
        assert_eq!(classify("cloves"), TokenClass::Unit);
        assert_eq!(classify("garlic"), TokenClass::Base);
    }

    #[test]
    fn test_form_wins_over_unit() {
        // "sliced" lemmatizes to "slice", which is also a unit word
        assert_eq!(classify("sliced"), TokenClass::Form);
        // "slice" itself is only a unit
        assert_eq!(classify("slice"), TokenClass::Unit);
    }

    #[test]
    fn test_extract_base_and_form() {
        let parts = extract_base_and_form("fresh garlic cloves, minced");
        assert_eq!(parts.base, vec!["garlic"]);
        assert_eq!(parts.form, vec!["fresh", "mince"]);
    }

    #[test]
    fn test_base_tokens_are_not_lemmatized() {
        let parts = extract_base_and_form("sun-dried tomatoes");
        assert_eq!(parts.base, vec!["sun-dried", "tomatoes"]);
        assert!(parts.form.is_empty());
    }

    #[test]
    fn test_only_modifiers_and_units() {
        let parts = extract_base_and_form("2 large cans, diced");
        assert!(parts.base.is_empty());
        assert_eq!(parts.form, vec!["large", "dice"]);
    }

    #[test]
    fn test_deterministic() {
        let a = extract_base_and_form("Powdered Sugar");
        let _ = extract_base_and_form("something else entirely");
        let b = extract_base_and_form("Powdered Sugar");
        assert_eq!(a, b);
    }
}
