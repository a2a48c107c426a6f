//! URL slugs derived from display names.
//!
//! Lowercases the whole string and collapses every run of whitespace into a
//! single `-`. Non-ASCII letters are kept as-is, so Cyrillic names produce
//! Cyrillic slugs.

/// Derives a slug from a display name.
///
/// ```rust
/// use assorti_core::slug::slugify;
///
/// assert_eq!(slugify("Электроника"), "электроника");
/// assert_eq!(slugify("Home  and\tGarden"), "home-and-garden");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
        } else {
            slug.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Phone"), "phone");
        assert_eq!(slugify("Бытовая Техника"), "бытовая-техника");
        assert_eq!(slugify("a \t\n b"), "a-b");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for name in ["Phone Case", "  Leading", "ÄÖÜ Größe", "Дом и  сад", "x-y z"] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once, "not idempotent for {name:?}");
        }
    }
}
