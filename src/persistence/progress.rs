//! Append-only progress log.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::store::CheckpointError;
use crate::compute::Genome;
use crate::schema::{PROGRESS_DELIMITER, ParseError};

/// One progress line, written at every checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub generation: u64,
    pub mean_fitness: f64,
    pub best_fitness: f64,
    /// Encoding of the best genome of the generation.
    pub best_genome: String,
}

impl fmt::Display for ProgressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = PROGRESS_DELIMITER;
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.generation, self.mean_fitness, self.best_fitness, self.best_genome
        )
    }
}

impl FromStr for ProgressRecord {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let columns: Vec<&str> = line.splitn(4, PROGRESS_DELIMITER).collect();
        let &[generation, mean, best, genome] = columns.as_slice() else {
            return Err(ParseError::ProgressArity {
                line: line.to_string(),
                found: columns.len(),
            });
        };

        Ok(Self {
            generation: parse_column("generation", generation)?,
            mean_fitness: parse_column("mean_fitness", mean)?,
            best_fitness: parse_column("best_fitness", best)?,
            best_genome: parse_genome(genome)?,
        })
    }
}

fn parse_column<T: FromStr>(column: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::ProgressColumn {
        column,
        value: value.to_string(),
    })
}

/// The genome column is kept as text but must decode.
fn parse_genome(value: &str) -> Result<String, ParseError> {
    Genome::decode_genes(value)
        .map(|_| value.to_string())
        .map_err(|_| ParseError::ProgressColumn {
            column: "best_genome",
            value: value.to_string(),
        })
}

/// Appends progress records to a text file, creating it on first use.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line.
    pub fn append(&self, record: &ProgressRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // Single write per record.
        file.write_all(format!("{record}\n").as_bytes())?;
        file.flush()
    }
}

/// Read every record of a progress log, in file order.
pub fn read_progress_log<P: AsRef<Path>>(path: P) -> Result<Vec<ProgressRecord>, CheckpointError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| CheckpointError::io(path, e))?;

    text.lines()
        .enumerate()
        .map(|(i, line)| {
            line.trim_end_matches('\r')
                .parse()
                .map_err(|e: ParseError| CheckpointError::parse(path, e.at_line(i + 1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(generation: u64) -> ProgressRecord {
        ProgressRecord {
            generation,
            mean_fitness: 71.25,
            best_fitness: 74.5,
            best_genome: "1,2,3,4,5;6,7,8,9,10;".to_string(),
        }
    }

    #[test]
    fn test_display_layout() {
        assert_eq!(
            record(20).to_string(),
            "20 71.25 74.5 1,2,3,4,5;6,7,8,9,10;"
        );
    }

    #[test]
    fn test_parse() {
        let parsed: ProgressRecord = "20 71.25 74.5 1,2,3,4,5;6,7,8,9,10;".parse().unwrap();
        assert_eq!(parsed, record(20));
    }

    #[test]
    fn test_parse_empty_genome() {
        let parsed: ProgressRecord = "10 50 60 ".parse().unwrap();
        assert_eq!(parsed.best_genome, "");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "10 50 60".parse::<ProgressRecord>(),
            Err(ParseError::ProgressArity { found: 3, .. })
        ));
        assert!(matches!(
            "ten 50 60 1,2,3,4,5;".parse::<ProgressRecord>(),
            Err(ParseError::ProgressColumn {
                column: "generation",
                ..
            })
        ));
    }

    #[test]
    fn test_append_and_read() {
        let dir = tempdir().unwrap();
        let log = ProgressLog::new(dir.path().join("logs").join("GAOutput.txt"));
        log.append(&record(10)).unwrap();
        log.append(&record(20)).unwrap();

        let records = read_progress_log(log.path()).unwrap();
        assert_eq!(records, vec![record(10), record(20)]);
    }

    #[test]
    fn test_read_reports_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("GAOutput.txt");
        fs::write(&path, "10 50 60 1,2,3,4,5;\nbroken\n").unwrap();

        let err = read_progress_log(&path).unwrap_err();
        assert!(matches!(
            err,
            CheckpointError::Parse {
                source: ParseError::Line { line: 2, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_read_rejects_malformed_genome() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("GAOutput.txt");
        fs::write(&path, "10 50 60 not-a-genome\n20 51 61 1,2,3,4,5;\n").unwrap();

        let err = read_progress_log(&path).unwrap_err();
        assert!(matches!(
            err,
            CheckpointError::Parse {
                source: ParseError::Line { line: 1, source },
                ..
            } if matches!(*source, ParseError::ProgressColumn { column: "best_genome", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_short_gene() {
        assert!(matches!(
            "10 50 60 1,2,3;".parse::<ProgressRecord>(),
            Err(ParseError::ProgressColumn {
                column: "best_genome",
                ..
            })
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_progress_log(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, CheckpointError::Io { .. }));
    }
}
