use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::ScrapeError;
use crate::model::RecipeRecord;

/// Append-only JSON lines sink shared by all workers.
///
/// Every record goes out as one `write_all` of a complete line followed by a
/// flush, both under the same lock, so concurrent writers never interleave.
pub struct JsonLinesWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesWriter {
    /// Open `path`, truncating it unless `append` is set.
    pub async fn open(path: impl AsRef<Path>, append: bool) -> Result<Self, ScrapeError> {
        let path = path.as_ref().to_path_buf();
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = options.open(&path).await?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, record: &RecipeRecord) -> Result<(), ScrapeError> {
        let line = record.to_json_line()?;
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Read a JSON lines file back into records.
pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<RecipeRecord>, ScrapeError> {
    let content = tokio::fs::read_to_string(path).await?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(ScrapeError::from))
        .collect()
}
