use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct ServedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Serves uploaded files from a single directory by bare file name
#[derive(Debug, Clone)]
pub struct FileServer {
    root: PathBuf,
}

impl FileServer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a requested name onto the upload directory. Only plain names are
    /// accepted: no separators, no parent references, no hidden files. Quotes
    /// and control characters are refused so the name fits a quoted
    /// `Content-Disposition` filename.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, FileError> {
        let valid = !filename.is_empty()
            && !filename.starts_with('.')
            && !filename.contains(['/', '\\', '"'])
            && !filename.chars().any(char::is_control)
            && !filename.contains("..");
        if !valid {
            return Err(FileError::InvalidName(filename.to_string()));
        }
        Ok(self.root.join(filename))
    }

    pub async fn read(&self, filename: &str) -> Result<ServedFile, FileError> {
        let path = self.resolve(filename)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FileError::NotFound(filename.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ServedFile {
            name: filename.to_string(),
            content_type: content_type_for(filename),
            bytes,
        })
    }
}

/// MIME type inferred from the extension, `application/octet-stream` when unknown
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_and_hidden_names() {
        let server = FileServer::new("/srv/uploads");
        for bad in ["", "../secret", "a/b.pdf", "a\\b.pdf", ".env", "x..y", "a\"b.pdf", "a\nb.pdf", "a\0b.pdf"] {
            assert!(
                matches!(server.resolve(bad), Err(FileError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(
            server.resolve("report.pdf").unwrap(),
            PathBuf::from("/srv/uploads/report.pdf")
        );
    }

    #[test]
    fn infers_content_type_from_extension() {
        assert_eq!(content_type_for("report.pdf"), "application/pdf");
        assert_eq!(content_type_for("scan.PNG"), "image/png");
        assert_eq!(content_type_for("blob.unknownext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let server = FileServer::new(std::env::temp_dir().join("xti-files-missing"));
        assert!(matches!(server.read("nope.pdf").await, Err(FileError::NotFound(_))));
    }
}
