//! Blog image uploads.
//!
//! Only `image/*` content is accepted, up to [`MAX_UPLOAD_BYTES`]. Objects are
//! stored under `<unix-millis>-<random>.<ext>` so names never collide in
//! practice and never reveal the uploader's file name.

use axum::body::Bytes;
use rand::Rng;

use crate::error::AppError;

/// Largest accepted image, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Request body limit for the upload route; leaves room for multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// Length of the random part of an object name.
const RANDOM_SUFFIX_LEN: usize = 8;

const FALLBACK_EXTENSION: &str = "bin";

/// A validated image ready to be stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub object_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Validate an uploaded file and name it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the content type is not an image and
    /// `AppError::PayloadTooLarge` if the file exceeds [`MAX_UPLOAD_BYTES`].
    pub fn new(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<Self, AppError> {
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| is_image(ct))
            .ok_or_else(|| AppError::BadRequest("Only image files are allowed".to_string()))?;

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(too_large());
        }

        let millis = chrono::Utc::now().timestamp_millis();
        let ext = extension(file_name, content_type);

        Ok(Self {
            object_name: object_name(millis, &random_suffix(), &ext),
            content_type: content_type.to_string(),
            bytes,
        })
    }
}

/// The error returned for files over the limit.
#[must_use]
pub fn too_large() -> AppError {
    AppError::PayloadTooLarge("File too large. Maximum size is 10MB".to_string())
}

/// Whether `content_type` names an image type.
#[must_use]
pub fn is_image(content_type: &str) -> bool {
    content_type
        .split_once('/')
        .is_some_and(|(kind, sub)| kind.eq_ignore_ascii_case("image") && !sub.is_empty())
}

/// File extension for a stored object.
///
/// Taken from the uploaded file name when it has one, otherwise from the
/// MIME subtype.
#[must_use]
pub fn extension(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(ext) = from_name {
        return ext.to_ascii_lowercase();
    }

    let subtype = content_type
        .split_once('/')
        .map(|(_, sub)| sub.split(';').next().unwrap_or(sub).trim().to_ascii_lowercase());

    match subtype.as_deref() {
        Some("jpeg") => "jpg".to_string(),
        Some("svg+xml") => "svg".to_string(),
        Some(sub) if !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric()) => {
            sub.to_string()
        }
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

/// `<millis>-<suffix>.<ext>`
#[must_use]
pub fn object_name(millis: i64, suffix: &str, ext: &str) -> String {
    format!("{millis}-{suffix}.{ext}")
}

fn random_suffix() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..RANDOM_SUFFIX_LEN)
        .filter_map(|_| ALPHABET.get(rng.random_range(0..ALPHABET.len())))
        .map(|&b| char::from(b))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image() {
        assert!(is_image("image/png"));
        assert!(is_image("IMAGE/JPEG"));
        assert!(is_image("image/svg+xml"));
        assert!(!is_image("image/"));
        assert!(!is_image("text/plain"));
        assert!(!is_image("application/pdf"));
        assert!(!is_image("png"));
    }

    #[test]
    fn test_extension_prefers_file_name() {
        assert_eq!(extension(Some("Cover.PNG"), "image/jpeg"), "png");
        assert_eq!(extension(Some("archive.tar.gz"), "image/gif"), "gz");
    }

    #[test]
    fn test_extension_falls_back_to_mime() {
        assert_eq!(extension(None, "image/jpeg"), "jpg");
        assert_eq!(extension(Some("noext"), "image/webp"), "webp");
        assert_eq!(extension(Some("trailing."), "image/svg+xml"), "svg");
        assert_eq!(extension(None, "image/png; charset=binary"), "png");
        assert_eq!(extension(None, "image/x-weird.type"), "bin");
    }

    #[test]
    fn test_object_name_format() {
        assert_eq!(object_name(1_700_000_000_000, "abc123xy", "png"), "1700000000000-abc123xy.png");
    }

    #[test]
    fn test_new_names_object() {
        let upload =
            ImageUpload::new(Some("lip.png"), Some("image/png"), Bytes::from_static(b"png")).unwrap();

        let (millis, rest) = upload.object_name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        let (suffix, ext) = rest.split_once('.').unwrap();
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(ext, "png");
        assert_eq!(upload.content_type, "image/png");
    }

    #[test]
    fn test_new_rejects_non_image() {
        let err = ImageUpload::new(Some("a.txt"), Some("text/plain"), Bytes::from_static(b"hi"))
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = ImageUpload::new(Some("a.png"), None, Bytes::from_static(b"hi")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let at_limit = Bytes::from(vec![0u8; MAX_UPLOAD_BYTES]);
        assert!(ImageUpload::new(None, Some("image/png"), at_limit).is_ok());

        let over = Bytes::from(vec![0u8; MAX_UPLOAD_BYTES + 1]);
        let err = ImageUpload::new(None, Some("image/png"), over).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }
}
