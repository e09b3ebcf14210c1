use crate::error::Res;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Write a file by writing a sibling temporary file and renaming it over `path`, so that readers
/// see either the old or the new contents.
pub(crate) async fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    write(&tmp, contents).await?;
    rename(&tmp, path).await
}

/// Read a file to a `String`. Returns `None` if the file does not exist.
pub(crate) async fn read_if_exists(path: &Path) -> Res<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read file at {}", path.display())),
    }
}

/// Deserialize a JSON file into type `T`.
pub(crate) async fn deserialize<T>(path: &Path) -> Res<T>
where
    T: DeserializeOwned,
{
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}

/// Basically move a file. Renames `from` -> `to`.
pub(crate) async fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Res<()> {
    tokio::fs::rename(from.as_ref(), to.as_ref())
        .await
        .with_context(|| {
            format!(
                "Unable to move file from '{}' to '{}'",
                from.as_ref().to_string_lossy(),
                to.as_ref().to_string_lossy()
            )
        })
}

/// Create a directory and its parents if they do not exist.
pub(crate) async fn make_dir(p: &Path) -> Res<()> {
    tokio::fs::create_dir_all(p)
        .await
        .with_context(|| format!("Unable to create directory at {}", p.to_string_lossy()))
}

pub(crate) async fn canonicalize(p: &Path) -> Res<PathBuf> {
    tokio::fs::canonicalize(p)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", p.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("value.json");
        write_atomic(&path, "[1]").await.unwrap();
        write_atomic(&path, "[1,2]").await.unwrap();
        assert_eq!(read_if_exists(&path).await.unwrap().unwrap(), "[1,2]");
        assert!(!dir.path().join("value.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(read_if_exists(&missing).await.unwrap().is_none());
    }
}
