//! Wire-format to internal attribute names.
//!
//! The REST surface uses the controller's camelCase attribute names
//! (`FIPUnderlay`, `domainVLANID`, `parentID`). Entities store attributes
//! under snake_case names (`fip_underlay`, `domain_vlanid`, `parent_id`).
//!
//! An underscore goes before an uppercase letter when either the letter
//! starts a capitalised word (`FIPUnderlay` → `fip_underlay`) or it follows a
//! lowercase letter or digit (`domainVLANID` → `domain_vlanid`). Runs of
//! capitals stay together.

/// Converts a wire-format attribute name to its internal form.
pub fn idiomatic_name(wire: &str) -> String {
    let chars: Vec<char> = wire.chars().collect();
    let mut out = String::with_capacity(wire.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let starts_word = next.is_some_and(|n| n.is_ascii_lowercase());
            let after_lower = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            if starts_word || after_lower {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acronym_then_word() {
        assert_eq!(idiomatic_name("FIPUnderlay"), "fip_underlay");
    }

    #[test]
    fn trailing_acronym() {
        assert_eq!(idiomatic_name("domainVLANID"), "domain_vlanid");
        assert_eq!(idiomatic_name("parentID"), "parent_id");
    }

    #[test]
    fn plain_camel_case() {
        assert_eq!(idiomatic_name("lastUpdatedDate"), "last_updated_date");
    }

    #[test]
    fn already_lowercase() {
        assert_eq!(idiomatic_name("name"), "name");
        assert_eq!(idiomatic_name("ID"), "id");
    }
}
