use humansize::{DECIMAL, format_size};

/// Format a byte count as "12.3 MB"
pub fn format_file_size(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert!(format_file_size(1_500_000).starts_with("1.5"));
        assert!(format_file_size(1_500_000).ends_with("MB"));
    }
}
