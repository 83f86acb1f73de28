//! Slug and surface-form normalization.

/// Convert a display name to a URL-safe slug.
///
/// Lowercases, drops anything outside `[a-z0-9]`, whitespace and `-`,
/// turns whitespace runs into a single hyphen, collapses repeated hyphens
/// and trims hyphens from both ends.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut slug = String::with_capacity(lower.len());

    for c in lower.trim().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.trim_matches('-').to_string()
}

/// Lowercase and collapse whitespace, for storing surface forms.
pub fn normalize_surface(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-case a name: the first letter of every alphabetic run is uppercased,
/// the rest lowercased ("o'brien cheese" -> "O'Brien Cheese").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}
