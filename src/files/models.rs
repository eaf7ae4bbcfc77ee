//! Attachment models

use serde::Serialize;
use std::path::Path;

/// Largest accepted upload (10 MB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Upload types the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Jpeg,
    Png,
    Pdf,
}

impl FileKind {
    /// Match a declared content type, ignoring case and parameters
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(FileKind::Jpeg),
            "image/png" => Some(FileKind::Png),
            "application/pdf" => Some(FileKind::Pdf),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            FileKind::Jpeg => "image/jpeg",
            FileKind::Png => "image/png",
            FileKind::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Jpeg => "jpg",
            FileKind::Png => "png",
            FileKind::Pdf => "pdf",
        }
    }
}

/// Metadata row for a file written under the upload directory.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredFile {
    pub id: i64,
    /// Generated on-disk name (`<uuid>.<ext>`)
    pub file_name: String,
    pub original_name: String,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    /// User id of the uploader
    pub uploaded_by: String,
    pub uploaded_at: String,
}

/// Last path component of a client-supplied name; `"upload"` when nothing is left.
pub fn clean_original_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match Path::new(base).file_name().and_then(|n| n.to_str()) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => "upload".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_whitelist() {
        assert_eq!(FileKind::from_content_type("image/jpeg"), Some(FileKind::Jpeg));
        assert_eq!(FileKind::from_content_type("image/jpg"), Some(FileKind::Jpeg));
        assert_eq!(FileKind::from_content_type("IMAGE/PNG"), Some(FileKind::Png));
        assert_eq!(
            FileKind::from_content_type("application/pdf; name=cv.pdf"),
            Some(FileKind::Pdf)
        );

        assert_eq!(FileKind::from_content_type("image/gif"), None);
        assert_eq!(FileKind::from_content_type("text/html"), None);
        assert_eq!(FileKind::from_content_type(""), None);
    }

    #[test]
    fn test_clean_original_name() {
        assert_eq!(clean_original_name("cv.pdf"), "cv.pdf");
        assert_eq!(clean_original_name("../../etc/passwd"), "passwd");
        assert_eq!(clean_original_name("C:\\Users\\ayu\\photo.png"), "photo.png");
        assert_eq!(clean_original_name(".."), "upload");
        assert_eq!(clean_original_name("  "), "upload");
    }

    #[test]
    fn test_path_not_serialized() {
        let file = StoredFile {
            id: 1,
            file_name: "a.pdf".to_string(),
            original_name: "cv.pdf".to_string(),
            file_path: "/srv/uploads/a.pdf".to_string(),
            file_size: 3,
            file_type: "application/pdf".to_string(),
            uploaded_by: "1".to_string(),
            uploaded_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&file).unwrap();
        assert!(json.get("file_path").is_none());
        assert_eq!(json["original_name"], "cv.pdf");
    }
}
