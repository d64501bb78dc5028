//! Utility functions for status-bridge
//! 
//! Common helper functions used throughout the application.

/// Truncate string to at most `max_chars` characters, with ellipsis
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Collapse a free-text message onto a single line for log output
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("ééééé", 4), "é...");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("disk\nlow  on /var"), "disk low on /var");
    }
}
