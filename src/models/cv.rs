use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded CV. The backend stores only the object URL; the original
/// file name is recovered from it for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cv {
    pub id: i64,
    pub file_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Cv {
    /// Display name for this CV, derived from the storage URL.
    /// Uploads are keyed as `<unix-timestamp>_<original name>`.
    pub fn file_name(&self) -> &str {
        let name = self.file_url.rsplit('/').next().unwrap_or(&self.file_url);
        match name.split_once('_') {
            Some((prefix, rest)) if !rest.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => {
                rest
            }
            _ => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cv(url: &str) -> Cv {
        Cv {
            id: 1,
            file_url: url.to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_file_name_strips_timestamp_prefix() {
        let cv = cv("https://bucket.s3.eu-west-1.amazonaws.com/user_cvs/12/1717230000_resume.pdf");
        assert_eq!(cv.file_name(), "resume.pdf");
    }

    #[test]
    fn test_file_name_without_prefix() {
        let cv = cv("https://example.com/files/resume.pdf");
        assert_eq!(cv.file_name(), "resume.pdf");
    }

    #[test]
    fn test_file_name_keeps_non_numeric_prefix() {
        // Underscore in the original name, no timestamp to strip
        let cv = cv("https://example.com/files/my_resume.pdf");
        assert_eq!(cv.file_name(), "my_resume.pdf");
    }
}
