use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracker_core::model::AppData;

use crate::repository::{DocumentRepository, StorageError};

/// Stores the document as one pretty-printed JSON file.
///
/// Writes go to a sibling temp file which is synced and then renamed over the
/// target, so a reader sees either the old or the new document in full.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document.json");
        let tmp = format!(".{name}.tmp.{}", uuid::Uuid::new_v4().simple());
        match self.path.parent() {
            Some(parent) => parent.join(tmp),
            None => PathBuf::from(tmp),
        }
    }
}

/// Serialized form written to disk: pretty JSON plus a trailing newline.
///
/// # Errors
///
/// Returns `StorageError::Parse` if the document cannot be serialized.
pub fn to_pretty_json(doc: &AppData) -> Result<Vec<u8>, StorageError> {
    let mut bytes = serde_json::to_vec_pretty(doc)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn io_error(path: &Path, err: &std::io::Error) -> StorageError {
    StorageError::Io(format!("{}: {err}", path.display()))
}

#[async_trait]
impl DocumentRepository for JsonFileRepository {
    async fn load(&self) -> Result<AppData, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(err) => return Err(io_error(&self.path, &err)),
        };
        let doc = serde_json::from_str(&raw)?;
        Ok(doc)
    }

    async fn replace(&self, doc: &AppData) -> Result<(), StorageError> {
        let bytes = to_pretty_json(doc)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, &e))?;
        }

        let tmp = self.temp_path();
        let written: std::io::Result<()> = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(err) = written {
            // best effort: the target is untouched, only the temp file may linger
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&self.path, &err));
        }
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "document replaced");
        Ok(())
    }

    async fn exists(&self) -> Result<bool, StorageError> {
        tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| io_error(&self.path, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_is_a_hidden_sibling() {
        let repo = JsonFileRepository::new("/srv/tracker/data.json");
        let tmp = repo.temp_path();
        assert_eq!(tmp.parent(), Some(Path::new("/srv/tracker")));
        let name = tmp.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".data.json.tmp."));
    }

    #[test]
    fn temp_names_are_unique() {
        let repo = JsonFileRepository::new("data.json");
        assert_ne!(repo.temp_path(), repo.temp_path());
    }

    #[test]
    fn pretty_json_ends_with_newline() {
        let bytes = to_pretty_json(&AppData::fallback("Suivi")).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\n  \"config\""));
    }
}
