pub const MAX_ROOM_ID_LENGTH: usize = 64;

/// Trims a client supplied room id and rejects ones that are empty, too long
/// or contain control characters.
pub fn parse_room_id(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.chars().count() > MAX_ROOM_ID_LENGTH
        || trimmed.chars().any(char::is_control)
    {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(parse_room_id("  lobby 1 ").as_deref(), Some("lobby 1"));
    }

    #[test]
    fn rejects_blank_and_control_characters() {
        assert_eq!(parse_room_id(""), None);
        assert_eq!(parse_room_id("   "), None);
        assert_eq!(parse_room_id("lob\u{0}by"), None);
    }

    #[test]
    fn length_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_ROOM_ID_LENGTH);
        assert_eq!(parse_room_id(&at_limit), Some(at_limit.clone()));
        let over = "a".repeat(MAX_ROOM_ID_LENGTH + 1);
        assert_eq!(parse_room_id(&over), None);
    }
}
