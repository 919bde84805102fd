// Author / address derivation from the creator ("From:") header.

use std::sync::LazyLock;

use regex_lite::Regex;

/// "Display Name <user@host>" — the display name keeps any trailing space.
static FULL_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)<(.+@.+)>$").expect("static regex"));

/// A bare "user@host".
static SIMPLE_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+@.+)$").expect("static regex"));

/// Author display name and email address split out of a creator header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub author: String,
    pub address: String,
}

impl Sender {
    /// Split a creator header into author and address.
    ///
    /// The full "Name <addr>" form is tried first, then a bare address.
    /// Anything else yields empty author and address.
    pub fn from_creator(creator: &str) -> Self {
        if let Some(caps) = FULL_ADDRESS.captures(creator) {
            return Self {
                author: caps[1].to_string(),
                address: caps[2].to_string(),
            };
        }

        if let Some(caps) = SIMPLE_ADDRESS.captures(creator) {
            return Self {
                author: String::new(),
                address: caps[1].to_string(),
            };
        }

        Self::default()
    }
}

/// Normalize an address into an entity key: trimmed and lower-cased.
pub fn entity_key(address: &str) -> String {
    address.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_form() {
        let s = Sender::from_creator("Jane Doe <jane@x.com>");
        assert_eq!(s.author, "Jane Doe ");
        assert_eq!(s.address, "jane@x.com");
    }

    #[test]
    fn test_bare_address() {
        let s = Sender::from_creator("jane@x.com");
        assert_eq!(s.author, "");
        assert_eq!(s.address, "jane@x.com");
    }

    #[test]
    fn test_no_match() {
        assert_eq!(Sender::from_creator("Jane Doe"), Sender::default());
        assert_eq!(Sender::from_creator(""), Sender::default());
    }

    #[test]
    fn test_entity_key() {
        assert_eq!(entity_key("  Jane@X.com "), "jane@x.com");
    }
}
