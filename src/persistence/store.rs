//! Checkpoint storage backends.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::checkpoint::{Checkpoint, write_checkpoint};
use super::progress::{ProgressLog, ProgressRecord};
use crate::compute::evolution::Population;
use crate::compute::{Canvas, Rgb};
use crate::schema::{ParseError, StorageConfig};

/// Storage errors. Every variant names the file it concerns.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl CheckpointError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn parse(path: &Path, source: ParseError) -> Self {
        CheckpointError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Durable state of a run.
///
/// `save` replaces the rolling checkpoint, `snapshot` keeps a
/// generation-tagged copy that is never overwritten by later saves.
pub trait CheckpointStore {
    /// Replace the rolling checkpoint.
    fn save(&mut self, generation: u64, population: &Population) -> Result<(), CheckpointError>;

    /// The rolling checkpoint, or `None` when no checkpoint exists yet.
    fn load(&mut self) -> Result<Option<Checkpoint>, CheckpointError>;

    /// Keep a copy of the population tagged with its generation.
    fn snapshot(&mut self, generation: u64, population: &Population)
    -> Result<(), CheckpointError>;

    /// Append one line to the progress log.
    fn append_progress(&mut self, record: &ProgressRecord) -> Result<(), CheckpointError>;
}

/// File-backed store laid out by [`StorageConfig`].
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    checkpoint_path: PathBuf,
    snapshot_dir: PathBuf,
    progress: ProgressLog,
    canvas: Canvas,
    background: Rgb,
}

impl FileCheckpointStore {
    /// `canvas` and `background` are attached to every genome decoded on load.
    pub fn new(storage: &StorageConfig, canvas: Canvas, background: Rgb) -> Self {
        Self {
            checkpoint_path: storage.checkpoint_path.clone(),
            snapshot_dir: storage.snapshot_dir.clone(),
            progress: ProgressLog::new(&storage.progress_log),
            canvas,
            background,
        }
    }

    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }

    pub fn progress_log(&self) -> &Path {
        self.progress.path()
    }

    /// Path of the snapshot for `generation`.
    pub fn snapshot_path(&self, generation: u64) -> PathBuf {
        self.snapshot_dir
            .join(format!("checkpoint_{generation}.txt"))
    }
}

/// Write to `<path>.tmp`, sync, then rename over `path`.
///
/// On failure the temporary file is removed and `path` is left untouched.
fn write_atomically(
    path: &Path,
    generation: u64,
    population: &Population,
) -> Result<(), CheckpointError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| CheckpointError::io(path, e))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let file = File::create(&tmp_path).map_err(|e| CheckpointError::io(path, e))?;
    let result = sync_and_replace(file, &tmp_path, path, generation, population);
    if result.is_err() {
        // Best effort: the write error is the one worth reporting.
        let _ = fs::remove_file(&tmp_path);
    }
    result.map_err(|e| CheckpointError::io(path, e))
}

fn sync_and_replace(
    file: File,
    tmp_path: &Path,
    path: &Path,
    generation: u64,
    population: &Population,
) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    write_checkpoint(&mut writer, generation, population)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp_path, path)
}

impl CheckpointStore for FileCheckpointStore {
    fn save(&mut self, generation: u64, population: &Population) -> Result<(), CheckpointError> {
        write_atomically(&self.checkpoint_path, generation, population)?;
        debug!(
            "Saved checkpoint for generation {} to {:?}",
            generation, self.checkpoint_path
        );
        Ok(())
    }

    fn load(&mut self) -> Result<Option<Checkpoint>, CheckpointError> {
        let path = &self.checkpoint_path;
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CheckpointError::io(path, e)),
        };

        let checkpoint = Checkpoint::decode(&text, self.canvas, self.background)
            .map_err(|e| CheckpointError::parse(path, e))?;
        info!(
            "Loaded checkpoint {:?}: generation {}, {} genomes",
            path,
            checkpoint.generation,
            checkpoint.population.len()
        );
        Ok(Some(checkpoint))
    }

    fn snapshot(
        &mut self,
        generation: u64,
        population: &Population,
    ) -> Result<(), CheckpointError> {
        let path = self.snapshot_path(generation);
        write_atomically(&path, generation, population)?;
        info!("Wrote snapshot {:?}", path);
        Ok(())
    }

    fn append_progress(&mut self, record: &ProgressRecord) -> Result<(), CheckpointError> {
        self.progress
            .append(record)
            .map_err(|e| CheckpointError::io(self.progress.path(), e))
    }
}

/// In-memory store. Checkpoints are kept in their encoded text form so the
/// same format is exercised as on disk.
#[derive(Debug, Clone)]
pub struct MemoryCheckpointStore {
    canvas: Canvas,
    background: Rgb,
    checkpoint: Option<String>,
    snapshots: Vec<(u64, String)>,
    progress: Vec<ProgressRecord>,
}

impl MemoryCheckpointStore {
    pub fn new(canvas: Canvas, background: Rgb) -> Self {
        Self {
            canvas,
            background,
            checkpoint: None,
            snapshots: Vec::new(),
            progress: Vec::new(),
        }
    }

    /// Encoded rolling checkpoint.
    pub fn checkpoint_text(&self) -> Option<&str> {
        self.checkpoint.as_deref()
    }

    /// Encoded snapshots in the order they were taken.
    pub fn snapshots(&self) -> &[(u64, String)] {
        &self.snapshots
    }

    pub fn progress(&self) -> &[ProgressRecord] {
        &self.progress
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&mut self, generation: u64, population: &Population) -> Result<(), CheckpointError> {
        self.checkpoint = Some(Checkpoint::new(generation, population.clone()).encode());
        Ok(())
    }

    fn load(&mut self) -> Result<Option<Checkpoint>, CheckpointError> {
        self.checkpoint
            .as_deref()
            .map(|text| {
                Checkpoint::decode(text, self.canvas, self.background)
                    .map_err(|e| CheckpointError::parse(Path::new("<memory>"), e))
            })
            .transpose()
    }

    fn snapshot(
        &mut self,
        generation: u64,
        population: &Population,
    ) -> Result<(), CheckpointError> {
        self.snapshots.push((
            generation,
            Checkpoint::new(generation, population.clone()).encode(),
        ));
        Ok(())
    }

    fn append_progress(&mut self, record: &ProgressRecord) -> Result<(), CheckpointError> {
        self.progress.push(record.clone());
        Ok(())
    }
}
