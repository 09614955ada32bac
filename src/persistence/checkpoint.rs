//! Checkpoint text format.

use std::fmt;
use std::io::{self, Write};

use crate::compute::evolution::Population;
use crate::compute::{Canvas, Genome, Rgb};
use crate::schema::{CHECKPOINT_HEADER, ParseError};

/// A decoded checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Last completed generation.
    pub generation: u64,
    pub population: Population,
}

/// Header line followed by one genome per line.
struct CheckpointText<'a> {
    generation: u64,
    population: &'a Population,
}

impl fmt::Display for CheckpointText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{CHECKPOINT_HEADER} {}", self.generation)?;
        for genome in self.population.iter() {
            writeln!(f, "{genome}")?;
        }
        Ok(())
    }
}

/// Write the header line followed by one genome per line.
pub fn write_checkpoint<W: Write>(
    writer: &mut W,
    generation: u64,
    population: &Population,
) -> io::Result<()> {
    write!(
        writer,
        "{}",
        CheckpointText {
            generation,
            population
        }
    )
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = CheckpointText {
            generation: self.generation,
            population: &self.population,
        };
        fmt::Display::fmt(&text, f)
    }
}

impl Checkpoint {
    pub fn new(generation: u64, population: Population) -> Self {
        Self {
            generation,
            population,
        }
    }

    /// Encode to the checkpoint text format.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode checkpoint text. Every line after the header is one genome;
    /// an empty line is a genome without genes.
    pub fn decode(text: &str, canvas: Canvas, background: Rgb) -> Result<Self, ParseError> {
        let mut lines = text.lines();
        let header = lines.next().unwrap_or_default();
        let generation = parse_header(header).map_err(|e| e.at_line(1))?;

        let population = lines
            .enumerate()
            .map(|(i, line)| {
                Genome::decode(line.trim_end(), canvas, background).map_err(|e| e.at_line(i + 2))
            })
            .collect::<Result<Population, _>>()?;

        Ok(Self {
            generation,
            population,
        })
    }
}

fn parse_header(line: &str) -> Result<u64, ParseError> {
    let header_error = || ParseError::Header {
        line: line.to_string(),
    };
    line.trim()
        .strip_prefix(CHECKPOINT_HEADER)
        .and_then(|rest| rest.trim().parse().ok())
        .ok_or_else(header_error)
}
