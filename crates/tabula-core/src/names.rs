//! Column-name matching.
//!
//! Two notions of equality are used across the workspace:
//! - *identity*: case-insensitive comparison, used for every table lookup.
//! - *normalized*: non-alphanumerics stripped and upper-cased, used by the
//!   binder so `"favorite fruit"` lines up with a `favorite_fruit` field.

/// Case-insensitive name identity.
pub fn same_name(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Position of `name` in `names` under case-insensitive identity.
pub fn position_of<S: AsRef<str>>(names: &[S], name: &str) -> Option<usize> {
    names.iter().position(|n| same_name(n.as_ref(), name))
}

/// Strip everything but letters/digits and upper-case the rest.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

/// First name in `names` that appears twice under case-insensitive identity.
pub fn first_duplicate<S: AsRef<str>>(names: &[S]) -> Option<&str> {
    names.iter().enumerate().find_map(|(i, n)| {
        names[..i]
            .iter()
            .any(|prev| same_name(prev.as_ref(), n.as_ref()))
            .then(|| n.as_ref())
    })
}
