//! URL slugs for blog posts.
//!
//! A slug is derived from the post title and must be unique across all
//! posts. When the derived slug is taken, the smallest free numeric suffix
//! (`-1`, `-2`, ...) is appended.

use std::collections::HashSet;

/// Slug used when a title contains nothing slug-worthy.
pub const FALLBACK_SLUG: &str = "post";

/// Characters kept by [`slugify`] before separators are normalized.
fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c.is_whitespace()
}

/// Derive a slug from arbitrary text.
///
/// Lower-cases and trims the input, drops everything except ASCII word
/// characters, whitespace and hyphens, turns runs of whitespace, underscores
/// and hyphens into a single hyphen, and strips leading and trailing hyphens.
///
/// Applying `slugify` to its own output returns the same string.
///
/// # Examples
///
/// ```
/// use eisenbalm_core::slug::slugify;
///
/// assert_eq!(slugify("Stop. Breathe. Balm."), "stop-breathe-balm");
/// assert_eq!(slugify("  Human_First -- Lip Care! "), "human-first-lip-care");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());

    for c in lowered.trim().chars().filter(|c| is_slug_char(*c)) {
        let c = if c.is_whitespace() || c == '_' { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    slug.trim_matches('-').to_string()
}

/// Pick the first free slug for `base` given the slugs already in use.
///
/// `existing` only needs to contain slugs that start with `base`; anything
/// else is ignored. Returns `base` itself when it is free, otherwise
/// `base-N` for the smallest `N >= 1` not yet taken.
///
/// # Examples
///
/// ```
/// use eisenbalm_core::slug::next_available_slug;
///
/// assert_eq!(next_available_slug("post", ["post", "post-1"]), "post-2");
/// assert_eq!(next_available_slug("fresh", ["post"]), "fresh");
/// ```
#[must_use]
pub fn next_available_slug<'a, I>(base: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<&str> = existing
        .into_iter()
        .filter(|slug| slug.starts_with(base))
        .collect();

    if !taken.contains(base) {
        return base.to_string();
    }

    (1_u64..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}
