//! File selection

use audiodrop_core::validation::{file_extension, mime_hint_for_filename};
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// The file currently chosen for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSelection {
    filename: String,
    mime_hint: String,
    data: Bytes,
}

impl UploadSelection {
    /// Build a selection from in-memory content; the MIME hint follows the extension.
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let mime_hint = mime_hint_for_filename(&filename).to_string();
        Self {
            filename,
            mime_hint,
            data: data.into(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_hint(&self) -> &str {
        &self.mime_hint
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("'{filename}' is not an accepted file type (accepted: {accepted})")]
    NotAccepted { filename: String, accepted: String },

    #[error("'{0}' has no file name")]
    NoFileName(PathBuf),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File picker restricted to an extension allow-list.
///
/// The filter applies at selection time only; the client does not re-check
/// the selection before sending it.
#[derive(Clone, Debug)]
pub struct FilePicker {
    accept: Vec<String>,
}

impl FilePicker {
    /// `accept` holds extensions without the leading dot.
    pub fn new(accept: Vec<String>) -> Self {
        Self { accept }
    }

    pub fn accept(&self) -> &[String] {
        &self.accept
    }

    pub fn accepts(&self, filename: &str) -> bool {
        file_extension(filename).is_some_and(|ext| self.accept.contains(&ext))
    }

    /// Read `path` into a selection if its extension is accepted.
    pub async fn pick(&self, path: impl AsRef<Path>) -> Result<UploadSelection, SelectionError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SelectionError::NoFileName(path.to_path_buf()))?;

        if !self.accepts(filename) {
            return Err(SelectionError::NotAccepted {
                filename: filename.to_string(),
                accepted: self
                    .accept
                    .iter()
                    .map(|ext| format!(".{}", ext))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let data = tokio::fs::read(path)
            .await
            .map_err(|source| SelectionError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(filename = %filename, size_bytes = data.len(), "File selected");
        Ok(UploadSelection::new(filename, data))
    }
}

impl Default for FilePicker {
    fn default() -> Self {
        Self::new(vec!["mp3".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mime_hint_follows_extension() {
        assert_eq!(UploadSelection::new("track.mp3", vec![1u8]).mime_hint(), "audio/mpeg");
        assert_eq!(
            UploadSelection::new("track", vec![1u8]).mime_hint(),
            "application/octet-stream"
        );
    }

    #[test]
    fn picker_filters_by_extension() {
        let picker = FilePicker::default();
        assert!(picker.accepts("track.mp3"));
        assert!(picker.accepts("TRACK.MP3"));
        assert!(!picker.accepts("track.wav"));
        assert!(!picker.accepts("mp3"));
    }

    #[tokio::test]
    async fn pick_reads_accepted_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.mp3");
        std::fs::write(&path, b"ID3 data").unwrap();

        let selection = FilePicker::default().pick(&path).await.unwrap();
        assert_eq!(selection.filename(), "track.mp3");
        assert_eq!(selection.data().as_ref(), b"ID3 data");
    }

    #[tokio::test]
    async fn pick_rejects_other_types_without_reading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");

        let err = FilePicker::default().pick(&path).await.unwrap_err();
        assert!(matches!(err, SelectionError::NotAccepted { .. }));
    }

    #[tokio::test]
    async fn pick_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = FilePicker::default()
            .pick(dir.path().join("missing.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, SelectionError::Io { .. }));
    }
}
