//! English message catalog for flash messages.
//!
//! Messages use `:name` placeholders, filled by [`trans`].

const EN: &[(&str, &str)] = &[
    ("permission-create", "Successfully created permission :permission"),
    ("permission-updated", "Successfully updated permission :permission"),
    ("successDeletedItem", "Successfully deleted :type: :item"),
];

/// Look up `key` and substitute each `(name, value)` pair for `:name`.
/// Unknown keys come back verbatim.
pub fn trans(key: &str, replace: &[(&str, &str)]) -> String {
    let template = EN
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key);

    // Longest names first so `:item` never clobbers `:items`.
    let mut pairs: Vec<&(&str, &str)> = replace.iter().collect();
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    pairs.iter().fold(template.to_string(), |msg, (name, value)| {
        msg.replace(&format!(":{name}"), value)
    })
}
