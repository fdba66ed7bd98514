//! EVM address and topic helpers.
//!
//! Format checks only: mixed-case checksums are not verified.

/// `0x` followed by 40 hex digits.
pub fn is_address(value: &str) -> bool {
    is_prefixed_hex(value, 20)
}

/// `0x` followed by 64 hex digits, the shape of a log topic.
pub fn is_topic_word(value: &str) -> bool {
    is_prefixed_hex(value, 32)
}

fn is_prefixed_hex(value: &str, bytes: usize) -> bool {
    match value.strip_prefix("0x") {
        Some(digits) if digits.len() == bytes * 2 => hex::decode(digits).is_ok(),
        _ => false,
    }
}

/// Indexed address arguments are left-padded to 32 bytes; returns the last 20 as `0x...`.
pub fn extract_address_from_topic(topic: &str) -> Option<String> {
    let clean = topic.to_lowercase();
    if !is_topic_word(&clean) {
        return None;
    }
    Some(format!("0x{}", &clean[clean.len() - 40..]))
}

/// `0x68b3...Fc45` style shortening for display.
pub fn shorten_address(address: &str) -> String {
    if address.chars().count() < 12 {
        return address.to_string();
    }
    let head: String = address.chars().take(6).collect();
    let tail: String = {
        let chars: Vec<char> = address.chars().collect();
        chars[chars.len() - 4..].iter().collect()
    };
    format!("{head}...{tail}")
}

/// Keeps the first `max` characters and marks the cut with `...`.
pub fn truncate_preview(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TARGET: &str = "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45";

    #[test]
    fn address_format() {
        assert!(is_address(TARGET));
        assert!(!is_address("0x68b3"));
        assert!(!is_address("68b3465833fb72A70ecDF485E0e4C7bD8665Fc4512"));
        assert!(!is_address("0xg8b3465833fb72A70ecDF485E0e4C7bD8665Fc45"));
    }

    #[test]
    fn topic_format() {
        let topic = format!("0x{}", "ab".repeat(32));
        assert!(is_topic_word(&topic));
        assert!(!is_topic_word(TARGET));
    }

    #[test]
    fn extracts_padded_address() {
        let topic = "0x00000000000000000000000068B3465833FB72A70ECDF485E0E4C7BD8665FC45";
        assert_eq!(
            extract_address_from_topic(topic).as_deref(),
            Some("0x68b3465833fb72a70ecdf485e0e4c7bd8665fc45")
        );
        assert_eq!(extract_address_from_topic("0x1234"), None);
    }

    #[test]
    fn shortening() {
        assert_eq!(shorten_address(""), "");
        assert_eq!(shorten_address("0x1234"), "0x1234");
        assert_eq!(shorten_address(TARGET), "0x68b3...Fc45");
    }

    #[test]
    fn previews() {
        assert_eq!(truncate_preview("0xabc", 14), "0xabc");
        assert_eq!(
            truncate_preview("0xddf252ad1be2c89b69c2b068fc", 14),
            "0xddf252ad1be2...",
        );
    }

    proptest! {
        #[test]
        fn any_twenty_bytes_is_an_address(bytes in proptest::array::uniform20(any::<u8>())) {
            let address = format!("0x{}", hex::encode(bytes));
            prop_assert!(is_address(&address));
            prop_assert_eq!(shorten_address(&address).len(), 13);
        }
    }
}
