/// Turn a disk name into a munin-safe field slug.
///
/// Munin field names only allow letters, digits and underscores, so every
/// run of other characters collapses into a single `_`. The result is
/// lowercased with no leading or trailing separator.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_sep = false;

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            slug.push(c.to_ascii_lowercase());
            pending_sep = false;
        } else {
            pending_sep = true;
        }
    }

    slug
}
