use crate::config::OutputMode;
use crate::error::{LegalchatError, Result};
use crate::prepare::dataset::FineTuneExample;
use crate::storage::SqliteStorage;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// JSONL output file mirrored into a store collection
///
/// Every example is written as one line and flushed before the matching
/// document is inserted, so the file never lags the collection by more than
/// the line being written.
pub struct ExampleSink<'a> {
    writer: BufWriter<File>,
    path: PathBuf,
    store: &'a SqliteStorage,
    collection: String,
    written: usize,
}

impl<'a> ExampleSink<'a> {
    /// Open `path` for writing according to `mode`
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be opened and `StorageUnavailable` if
    /// the collection cannot be prepared.
    pub fn open(
        path: &Path,
        mode: OutputMode,
        store: &'a SqliteStorage,
        collection: &str,
    ) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            OutputMode::Append => options.append(true),
            OutputMode::Truncate => options.write(true).truncate(true),
        };
        let file = options.open(path).map_err(LegalchatError::Io)?;

        // Fail before any model call if the collection is unusable.
        store.count_documents(collection)?;

        tracing::debug!(
            "Opened {} ({:?}) mirrored to collection {}",
            path.display(),
            mode,
            collection
        );

        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            store,
            collection: collection.to_string(),
            written: 0,
        })
    }

    /// Write one example line and insert it into the collection
    pub fn write(&mut self, example: &FineTuneExample) -> Result<()> {
        let line = example.to_json_line()?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        self.store
            .insert_document(&self.collection, &example.to_document()?)?;
        self.written += 1;
        Ok(())
    }

    /// Lines written through this sink
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}
