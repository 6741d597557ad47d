const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// 將位元組數轉為易讀格式（例如 "45.0 KB"）
#[must_use]
pub fn format_file_size(size_bytes: u64) -> String {
    match size_bytes {
        s if s < KB => format!("{s} B"),
        s if s < MB => format!("{:.1} KB", s as f64 / KB as f64),
        s if s < GB => format!("{:.1} MB", s as f64 / MB as f64),
        s => format!("{:.1} GB", s as f64 / GB as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(45 * 1024), "45.0 KB");
        assert_eq!(format_file_size(1536 * 1024), "1.5 MB");
        assert_eq!(format_file_size(3 * GB), "3.0 GB");
    }
}
