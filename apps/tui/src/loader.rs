use chord_core::{Dataset, LoadError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;

/// Reads the dataset document once and hands out the same handle afterwards.
///
/// Concurrent callers await the same in-flight read. A failed read is returned
/// to the caller that ran it and leaves the cell empty, so a caller that was
/// waiting, or a later one, reads the file again. The binary treats the first
/// failure as fatal and never asks twice.
#[derive(Debug)]
pub struct DatasetLoader {
    path: PathBuf,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Arc<Dataset>, LoadError> {
        self.cell
            .get_or_try_init(|| async { read_dataset(&self.path).await.map(Arc::new) })
            .await
            .cloned()
    }

    /// The dataset, if a load already completed.
    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.cell.get().cloned()
    }
}

async fn read_dataset(path: &Path) -> Result<Dataset, LoadError> {
    tracing::debug!(path = %path.display(), "loading chord dataset");

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let dataset = Dataset::from_json(&text)?;

    tracing::info!(
        path = %path.display(),
        modes = dataset.modes.len(),
        "chord dataset loaded"
    );
    Ok(dataset)
}

static SHARED: OnceLock<DatasetLoader> = OnceLock::new();

/// Process-wide loader, bound to the path of the first call.
pub fn shared_loader(path: &Path) -> &'static DatasetLoader {
    let loader = SHARED.get_or_init(|| DatasetLoader::new(path));
    if loader.path() != path {
        tracing::warn!(
            requested = %path.display(),
            active = %loader.path().display(),
            "dataset already bound to another path"
        );
    }
    loader
}

/// Loads through the process-wide loader.
pub async fn load(path: &Path) -> Result<Arc<Dataset>, LoadError> {
    shared_loader(path).load().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"{
        "modes": {
            "region_region": {
                "nodes": ["Asia", "Europe"],
                "dates": ["2020-03-31"],
                "matrices": { "2020-03-31": [[0, 1], [2, 0]] }
            }
        }
    }"#;

    fn dataset_file(contents: &str) -> Result<NamedTempFile, std::io::Error> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    #[tokio::test]
    async fn loads_once_and_shares_the_handle() -> Result<(), Box<dyn std::error::Error>> {
        let file = dataset_file(DOCUMENT)?;
        let loader = DatasetLoader::new(file.path());
        assert!(loader.get().is_none());

        let first = loader.load().await?;
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());

        let second = loader.load().await?;
        assert!(Arc::ptr_eq(&first, &second));
        assert!(loader.get().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_read() -> Result<(), Box<dyn std::error::Error>> {
        let file = dataset_file(DOCUMENT)?;
        let loader = DatasetLoader::new(file.path());

        let (a, b) = tokio::join!(loader.load(), loader.load());
        assert!(Arc::ptr_eq(&a?, &b?));
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let loader = DatasetLoader::new("/definitely/not/here.json");
        let err = loader.load().await.map(|_| ()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(loader.get().is_none());
    }

    #[tokio::test]
    async fn failed_read_is_not_cached() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("chord.json");
        let loader = DatasetLoader::new(&path);

        let err = loader.load().await.map(|_| ()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(loader.get().is_none());

        std::fs::write(&path, DOCUMENT)?;
        let dataset = loader.load().await?;
        assert_eq!(dataset.mode_names().count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_document_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let file = dataset_file(r#"{ "modes": { "m": { "nodes": ["A"] } } }"#)?;
        let err = DatasetLoader::new(file.path())
            .load()
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        Ok(())
    }

    #[tokio::test]
    async fn shape_violations_fail_the_load() -> Result<(), Box<dyn std::error::Error>> {
        let file = dataset_file(
            r#"{ "modes": { "m": { "nodes": ["A", "B"], "dates": ["p"], "matrices": { "p": [[1]] } } } }"#,
        )?;
        let err = DatasetLoader::new(file.path())
            .load()
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
        Ok(())
    }
}
