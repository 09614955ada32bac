//! Voronoi seed genes: a canvas position plus an opaque color.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{EncodingVersion, FIELD_DELIMITER, GENE_TERMINATOR, ParseError};

/// Maximum position shift per axis in one position mutation.
pub const MOVE_BOUND: i32 = 10;

/// Maximum shift per channel in one color mutation.
pub const COLOR_BOUND: i32 = 25;

/// Alpha of every gene color. Not mutable.
pub const OPAQUE: u8 = 255;

/// Canvas dimensions shared by every genome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels.
    #[inline]
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, OPAQUE])
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// One Voronoi seed point.
///
/// Genes are plain values: `Clone`/`Copy` produce fully independent copies,
/// so crossover and duplication never alias gene state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gene {
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
}

impl Gene {
    pub fn new(x: i32, y: i32, color: Rgb) -> Self {
        Self { x, y, color }
    }

    /// Uniform random position in `[0, width] x [0, height]` and uniform random color.
    pub fn random<R: Rng + ?Sized>(canvas: Canvas, rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(0..=canvas.width as i32),
            y: rng.gen_range(0..=canvas.height as i32),
            color: Rgb {
                r: rng.r#gen(),
                g: rng.r#gen(),
                b: rng.r#gen(),
            },
        }
    }

    /// Perturb either the position or the color, never both.
    ///
    /// Position jitter is kept inside the canvas bounds; color channels are
    /// clamped to `[0, 255]`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, canvas: Canvas, rng: &mut R) {
        if rng.gen_bool(0.5) {
            self.x = (self.x + rng.gen_range(-MOVE_BOUND..=MOVE_BOUND)).clamp(0, canvas.width as i32);
            self.y =
                (self.y + rng.gen_range(-MOVE_BOUND..=MOVE_BOUND)).clamp(0, canvas.height as i32);
        } else {
            self.color = Rgb {
                r: jitter_channel(self.color.r, rng),
                g: jitter_channel(self.color.g, rng),
                b: jitter_channel(self.color.b, rng),
            };
        }
    }

    /// Decode one `x,y,r,g,b` record. A trailing terminator is accepted.
    pub fn decode(record: &str) -> Result<Self, ParseError> {
        let body = record.strip_suffix(GENE_TERMINATOR).unwrap_or(record);
        let fields: Vec<&str> = body.split(FIELD_DELIMITER).collect();

        let version = EncodingVersion::from_arity(fields.len()).ok_or_else(|| {
            ParseError::Arity {
                record: record.to_string(),
                found: fields.len(),
                expected: EncodingVersion::CURRENT.arity(),
            }
        })?;

        match version {
            EncodingVersion::V1 => {
                let names = version.fields();
                Ok(Self {
                    x: parse_field(names[0], fields[0])?,
                    y: parse_field(names[1], fields[1])?,
                    color: Rgb {
                        r: parse_field(names[2], fields[2])?,
                        g: parse_field(names[3], fields[3])?,
                        b: parse_field(names[4], fields[4])?,
                    },
                })
            }
        }
    }

    /// Encode as `x,y,r,g,b;`.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = FIELD_DELIMITER;
        write!(
            f,
            "{}{d}{}{d}{}{d}{}{d}{}{GENE_TERMINATOR}",
            self.x, self.y, self.color.r, self.color.g, self.color.b
        )
    }
}

impl FromStr for Gene {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gene::decode(s)
    }
}

fn jitter_channel<R: Rng + ?Sized>(channel: u8, rng: &mut R) -> u8 {
    (channel as i32 + rng.gen_range(-COLOR_BOUND..=COLOR_BOUND)).clamp(0, 255) as u8
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidField {
        field,
        value: value.to_string(),
    })
}
