//! Text normalization for loose comparisons
//!
//! Queries, keyword phrases and hotel fields all go through [`normalize`]
//! before any containment check, so matching is insensitive to case,
//! accents and punctuation.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, strip accents and turn punctuation into word breaks.
///
/// The result only contains ASCII letters, digits and single spaces:
/// "¡Económico, cerca del MAR!" becomes "economico cerca del mar".
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a URL slug from a display name.
///
/// "Hotel Caribe Plaza" becomes "hotel-caribe-plaza".
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        for c in c.to_lowercase() {
            if c.is_whitespace() || c == '-' {
                if !slug.is_empty() && !slug.ends_with('-') {
                    slug.push('-');
                }
            } else if c.is_ascii_alphanumeric() || c == '_' {
                slug.push(c);
            }
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}
