use std::path::Path;

use base64ct::{Base64, Encoding};
use bytes::Bytes;

use crate::error::{ClientError, ClientResult};

/// A photo picked from disk, before it is encoded for upload.
pub struct ImageUpload {
    pub body: Bytes,
    pub content_type: &'static str,
}

impl ImageUpload {
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            Base64::encode_string(&self.body)
        )
    }
}

/// How an image travels to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Fresh photo as a `data:` URI; the backend uploads it.
    Upload(String),
    /// Already hosted (e.g. copied from a favorite); the backend keeps it.
    Existing(String),
}

impl ImageSource {
    /// Anything starting with `http` is treated as an already-hosted URL.
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.starts_with("http") {
            ImageSource::Existing(value)
        } else {
            ImageSource::Upload(value)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageSource::Upload(v) | ImageSource::Existing(v) => v,
        }
    }

    pub fn upload(&self) -> Option<&str> {
        match self {
            ImageSource::Upload(v) => Some(v),
            ImageSource::Existing(_) => None,
        }
    }

    pub fn existing_url(&self) -> Option<&str> {
        match self {
            ImageSource::Existing(v) => Some(v),
            ImageSource::Upload(_) => None,
        }
    }
}

pub(crate) fn mime_from_ext(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Reads a local photo. Unknown extensions default to JPEG.
pub async fn load_image_file(path: &Path) -> ClientResult<ImageUpload> {
    let body = tokio::fs::read(path).await?;
    if body.is_empty() {
        return Err(ClientError::Validation(format!(
            "imagem vazia: {}",
            path.display()
        )));
    }
    let content_type = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(mime_from_ext)
        .unwrap_or("image/jpeg");
    Ok(ImageUpload {
        body: Bytes::from(body),
        content_type,
    })
}

/// `file://` URI for a local path, used as the cached image of a meal.
pub fn file_uri(path: &Path) -> String {
    let abs = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", abs.display())
}

#[cfg(test)]
mod image_tests {
    use super::*;

    #[test]
    fn test_mime_from_ext() {
        assert_eq!(mime_from_ext("jpg"), Some("image/jpeg"));
        assert_eq!(mime_from_ext("JPEG"), Some("image/jpeg"));
        assert_eq!(mime_from_ext("png"), Some("image/png"));
        assert_eq!(mime_from_ext("webp"), Some("image/webp"));
        assert_eq!(mime_from_ext("heic"), Some("image/heic"));
        assert_eq!(mime_from_ext("gif"), None);
    }

    #[test]
    fn routes_urls_and_data_uris() {
        assert_eq!(
            ImageSource::from_value("https://x/a.jpg"),
            ImageSource::Existing("https://x/a.jpg".into())
        );
        let upload = ImageSource::from_value("data:image/png;base64,AAAA");
        assert_eq!(upload.upload(), Some("data:image/png;base64,AAAA"));
        assert_eq!(upload.existing_url(), None);
    }

    #[tokio::test]
    async fn loads_file_as_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prato.png");
        tokio::fs::write(&path, b"abc").await.unwrap();

        let img = load_image_file(&path).await.unwrap();
        assert_eq!(img.content_type, "image/png");
        assert_eq!(img.to_data_uri(), "data:image/png;base64,YWJj");
        assert!(file_uri(&path).starts_with("file://"));
    }

    #[tokio::test]
    async fn rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vazio.jpg");
        tokio::fs::write(&path, b"").await.unwrap();
        assert!(matches!(
            load_image_file(&path).await,
            Err(ClientError::Validation(_))
        ));
    }
}
