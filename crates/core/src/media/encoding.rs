//! MIME detection and export file names.

use std::path::Path;

use crate::style::DesignStyle;

/// Guess an image MIME type from the file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => return None,
    };
    Some(mime)
}

/// File extension to use when exporting a payload of the given MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "image/heif" => "heif",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        _ => "bin",
    }
}

/// File name for an exported artifact, e.g. `redesign-02-mid-century-modern.png`.
///
/// `index` is zero based; names are numbered from 1.
pub fn artifact_file_name(index: usize, style: DesignStyle, mime_type: &str) -> String {
    let slug = style.display_name().to_ascii_lowercase().replace(' ', "-");
    format!(
        "redesign-{:02}-{}.{}",
        index + 1,
        slug,
        extension_for_mime(mime_type)
    )
}

/// File name for an exported video tour.
pub fn video_file_name(mime_type: &str) -> String {
    format!("apartment-tour.{}", extension_for_mime(mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(&PathBuf::from("room.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(&PathBuf::from("a/b/kitchen.webp")), Some("image/webp"));
        assert_eq!(mime_for_path(&PathBuf::from("notes.txt")), None);
        assert_eq!(mime_for_path(&PathBuf::from("no_extension")), None);
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("video/mp4"), "mp4");
        assert_eq!(extension_for_mime("application/octet-stream"), "bin");
    }

    #[test]
    fn test_export_file_names() {
        assert_eq!(
            artifact_file_name(1, DesignStyle::MidCenturyModern, "image/png"),
            "redesign-02-mid-century-modern.png"
        );
        assert_eq!(
            artifact_file_name(0, DesignStyle::Japandi, "image/jpeg"),
            "redesign-01-japandi.jpg"
        );
        assert_eq!(video_file_name("video/mp4"), "apartment-tour.mp4");
    }
}
