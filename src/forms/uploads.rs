use std::io::{Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use thiserror::Error;

use crate::domain::auth::{AuthenticatedUser, Role};

/// Files accepted in one upload call.
pub const MAX_FILES_PER_UPLOAD: usize = 10;
/// Size ceiling for admin and moderator tokens.
pub const ELEVATED_MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
/// Size ceiling for every other role.
pub const DEFAULT_MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
/// Hard cap on a whole upload body: a full batch at the elevated ceiling plus form overhead.
pub const MAX_UPLOAD_BODY_BYTES: usize =
    MAX_FILES_PER_UPLOAD * ELEVATED_MAX_FILE_BYTES + 1024 * 1024;

const FILE_NAME_MAX_LEN: usize = 100;
const PUBLIC_ID_MAX_LEN: usize = 200;

/// Reasons a single uploaded file is rejected before reaching the media store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadFileError {
    #[error("file is empty")]
    Empty,
    #[error("unsupported content type `{0}`, only images are accepted")]
    NotAnImage(String),
    #[error("file is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid image public id `{0}`")]
pub struct InvalidPublicId(pub String);

/// An image received in a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Sanitized client file name; informational only.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: Option<&str>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: sanitize_file_name(file_name.unwrap_or_default()),
            content_type,
            bytes,
        }
    }

    /// Check content type and size against `limit`.
    pub fn validate(&self, limit: usize) -> Result<(), UploadFileError> {
        if self.bytes.is_empty() {
            return Err(UploadFileError::Empty);
        }

        let content_type = self.content_type.as_deref().unwrap_or_default();
        if !content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(UploadFileError::NotAnImage(content_type.to_string()));
        }

        if self.bytes.len() > limit {
            return Err(UploadFileError::TooLarge {
                size: self.bytes.len(),
                limit,
            });
        }

        Ok(())
    }
}

/// Multipart body of `PUT /api/products`.
///
/// The field limit equals [`MAX_UPLOAD_BODY_BYTES`]; per-file ceilings are applied by
/// [`ImageFile::validate`] so one oversized file does not reject the whole call.
#[derive(MultipartForm)]
pub struct UploadImagesForm {
    #[multipart(rename = "productId")]
    pub product_id: Option<Text<String>>,
    #[multipart(limit = "101MiB")]
    pub images: Vec<TempFile>,
}

impl UploadImagesForm {
    /// Raw product id plus the received files, read into memory.
    pub fn into_parts(self) -> (Option<String>, Vec<ImageFile>) {
        let product_id = self.product_id.map(|text| text.0);
        let files = self.images.into_iter().map(read_upload).collect();
        (product_id, files)
    }
}

fn read_upload(mut upload: TempFile) -> ImageFile {
    let mut bytes = Vec::with_capacity(upload.size);
    let read = upload
        .file
        .rewind()
        .and_then(|_| upload.file.read_to_end(&mut bytes));
    if let Err(err) = read {
        log::error!("Failed to read uploaded file {:?}: {err}", upload.file_name);
        bytes.clear();
    }

    ImageFile::new(
        upload.file_name.as_deref(),
        upload.content_type.map(|mime| mime.to_string()),
        bytes,
    )
}

/// Per-file size ceiling for `user`.
pub fn max_file_bytes(user: &AuthenticatedUser) -> usize {
    match user.role {
        Role::Admin | Role::Moderator => ELEVATED_MAX_FILE_BYTES,
        Role::Manager | Role::Customer => DEFAULT_MAX_FILE_BYTES,
    }
}

/// Strip path components, replace characters outside `[A-Za-z0-9._-]` and cap the length.
pub fn sanitize_file_name(input: &str) -> String {
    let base = input
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let sanitized: String = base
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                ch
            } else {
                '_'
            }
        })
        .take(FILE_NAME_MAX_LEN)
        .collect();

    let sanitized = sanitized.trim_start_matches('.').to_string();
    if sanitized.is_empty() {
        "image".to_string()
    } else {
        sanitized
    }
}

/// Validate a media-store identifier taken from the query string.
pub fn parse_public_id(input: &str) -> Result<String, InvalidPublicId> {
    let trimmed = input.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= PUBLIC_ID_MAX_LEN
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '/' | '-'));

    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(InvalidPublicId(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use actix_web::http::header::ContentType;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn file_names_lose_paths_and_unsafe_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\my pod (1).JPG"), "my_pod__1_.JPG");
        assert_eq!(sanitize_file_name(""), "image");
        assert_eq!(sanitize_file_name("..."), "image");
        assert_eq!(sanitize_file_name(&"a".repeat(300)).len(), 100);
    }

    #[test]
    fn image_validation_checks_type_and_size() {
        let file = ImageFile::new(Some("a.png"), Some("image/png".into()), vec![0; 10]);
        assert_eq!(file.validate(10), Ok(()));
        assert_eq!(
            file.validate(9),
            Err(UploadFileError::TooLarge { size: 10, limit: 9 })
        );

        let pdf = ImageFile::new(Some("a.pdf"), Some("application/pdf".into()), vec![1]);
        assert!(matches!(pdf.validate(10), Err(UploadFileError::NotAnImage(_))));

        let empty = ImageFile::new(None, Some("image/png".into()), Vec::new());
        assert_eq!(empty.validate(10), Err(UploadFileError::Empty));
    }

    #[test]
    fn upload_form_reads_files_and_sanitizes_names() {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(&[137, 80, 78, 71]).expect("write image");

        let form = UploadImagesForm {
            product_id: Some(Text("12".to_string())),
            images: vec![TempFile {
                file,
                content_type: Some(ContentType::png().0),
                file_name: Some("../my pod.png".to_string()),
                size: 4,
            }],
        };

        let (product_id, files) = form.into_parts();

        assert_eq!(product_id.as_deref(), Some("12"));
        assert_eq!(files[0].file_name, "my_pod.png");
        assert_eq!(files[0].content_type.as_deref(), Some("image/png"));
        assert_eq!(files[0].bytes, vec![137, 80, 78, 71]);
    }

    #[test]
    fn image_field_limit_matches_body_cap() {
        // Keep in sync with `#[multipart(limit = "101MiB")]` on `UploadImagesForm::images`.
        assert_eq!(MAX_UPLOAD_BODY_BYTES, 101 * 1024 * 1024);
        assert!(MAX_UPLOAD_BODY_BYTES > ELEVATED_MAX_FILE_BYTES);
    }

    #[test]
    fn public_ids_are_restricted() {
        assert_eq!(
            parse_public_id(" vapeshop/products/abc_123 ").as_deref(),
            Ok("vapeshop/products/abc_123")
        );
        assert!(parse_public_id("").is_err());
        assert!(parse_public_id("abc?x=1").is_err());
        assert!(parse_public_id(&"a".repeat(201)).is_err());
    }
}
