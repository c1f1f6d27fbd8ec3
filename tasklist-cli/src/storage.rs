//! todo.txt file storage adapter for TaskCollection
//!
//! Reads and writes the lines of a task list and appends completed tasks to
//! the archive file. All parsing happens in `tasklist_core`.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tasklist_core::{LoadError, TaskCollection};

use crate::error::{CliError, Result};

/// A todo.txt formatted file on disk
pub struct TodoFile {
    path: PathBuf,
}

impl TodoFile {
    /// Create a new storage adapter for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the storage path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create an empty file (and its directory) unless it already exists
    ///
    /// Returns whether a file was created.
    pub fn create_if_missing(&self) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| CliError::io(format!("creating {}", dir.display()), e))?;
        }
        File::create(&self.path)
            .map_err(|e| CliError::io(format!("creating {}", self.path.display()), e))?;
        tracing::info!(path = %self.path.display(), "created empty task list");
        Ok(true)
    }

    /// Read every line of the file
    pub fn read_lines(&self) -> Result<Vec<String>> {
        if !self.exists() {
            return Err(LoadError::NotFound(self.path.clone()).into());
        }
        let file = File::open(&self.path).map_err(|source| LoadError::Io { source })?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<String>>>()
            .map_err(|source| LoadError::Io { source })?;
        Ok(lines)
    }

    /// Load the file into a collection, replacing its contents
    ///
    /// On failure the collection keeps its previous contents.
    pub fn load_into(&self, collection: &mut TaskCollection) -> Result<()> {
        let lines = self.read_lines()?;
        collection.load(lines.into_iter().map(Ok))?;
        tracing::debug!(path = %self.path.display(), tasks = collection.len(), "loaded task list");
        Ok(())
    }

    /// Replace the file contents with the given lines
    pub fn write_lines(&self, lines: &[String]) -> Result<()> {
        let context = || format!("writing {}", self.path.display());
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| CliError::io(context(), e))?;

        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{}", line).map_err(|e| CliError::io(context(), e))?;
        }
        writer.flush().map_err(|e| CliError::io(context(), e))?;
        Ok(())
    }

    /// Save tasks to the file in storage order
    pub fn save(&self, collection: &TaskCollection) -> Result<()> {
        self.write_lines(&collection.render_all())?;
        tracing::info!(path = %self.path.display(), tasks = collection.len(), "saved task list");
        Ok(())
    }

    /// Append lines to the end of the file, creating it if needed
    ///
    /// A missing final newline in the existing file is repaired first so
    /// the new lines never merge into the last one.
    ///
    /// If the write fails partway the file is truncated back to its old
    /// length, so a retry does not duplicate lines.
    pub fn append_lines(&self, lines: &[String]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        let original_len = file.metadata()?.len();
        let mut writer = Vec::new();
        if original_len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                writer.push(b'\n');
            }
        }
        for line in lines {
            writer.extend_from_slice(line.as_bytes());
            writer.push(b'\n');
        }
        write_or_rewind(&mut file, &writer, |file| file.set_len(original_len))
    }
}

/// Write `buf` in full or undo the partial write with `rewind`
fn write_or_rewind<W: Write>(
    out: &mut W,
    buf: &[u8],
    rewind: impl FnOnce(&mut W) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let result = out.write_all(buf).and_then(|()| out.flush());
    if result.is_err()
        && let Err(error) = rewind(out)
    {
        tracing::warn!(%error, "could not undo partial append");
    }
    result
}

/// Move completed tasks from the collection into the archive file
///
/// Returns how many tasks were moved. If the archive cannot be written the
/// tasks are put back into the collection and the error is returned.
pub fn archive_completed(collection: &mut TaskCollection, archive: &TodoFile) -> Result<usize> {
    let batch = collection.archive_completed();
    if batch.is_empty() {
        return Ok(0);
    }

    let count = batch.count();
    match archive.append_lines(batch.lines()) {
        Ok(()) => {
            tracing::info!(
                count,
                archive = %archive.path().display(),
                "moved completed tasks to archive"
            );
            Ok(count)
        }
        Err(source) => {
            tracing::warn!(count, error = %source, "archive write failed, keeping tasks in list");
            collection.restore_archived(batch);
            Err(CliError::Archive {
                path: archive.path().to_path_buf(),
                count,
                source,
            })
        }
    }
}
