/// Static level geometry and the collision queries everything else runs against.
///
/// Blocks are axis-aligned rectangles in world pixels (y grows downward).  Once
/// a `Terrain` is built it is never mutated.
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Surface {
    #[default]
    Ground,
    Grass,
}

impl Surface {
    /// Unknown names fall back to `Ground`.
    pub fn from_name(name: &str) -> Surface {
        match name.trim().to_ascii_lowercase().as_str() {
            "grass" => Surface::Grass,
            _ => Surface::Ground,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub surface: Surface,
}

#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    /// The description parsed but contained no usable block.
    Empty,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "failed to read level: {e}"),
            LevelError::Empty => write!(f, "level contains no blocks"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io(e) => Some(e),
            LevelError::Empty => None,
        }
    }
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::Io(e)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Terrain {
    blocks: Vec<Block>,
    width: f32,
    height: f32,
}

impl Terrain {
    pub fn new(blocks: Vec<Block>, width: f32, height: f32) -> Terrain {
        Terrain {
            blocks,
            width,
            height,
        }
    }

    /// Parse rows of `surface,start_x,start_y,end_x,end_y`.  The first line is
    /// a header.  Rows that do not parse are skipped.
    pub fn from_rows(text: &str, width: f32, height: f32) -> Result<Terrain, LevelError> {
        let mut blocks = Vec::new();

        for (i, line) in text.lines().enumerate().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_row(line) {
                Some(block) => blocks.push(block),
                None => warn!(line = i + 1, row = line, "skipping malformed level row"),
            }
        }

        if blocks.is_empty() {
            return Err(LevelError::Empty);
        }
        debug!(blocks = blocks.len(), "level parsed");
        Ok(Terrain::new(blocks, width, height))
    }

    pub fn load(path: &Path, width: f32, height: f32) -> Result<Terrain, LevelError> {
        let text = std::fs::read_to_string(path)?;
        Terrain::from_rows(&text, width, height)
    }

    /// Generated strip of columns following a gentle sine profile, each column
    /// a grass cap over solid ground down to the bottom of the world.
    pub fn rolling_hills(width: f32, height: f32, column_width: f32) -> Terrain {
        let column_width = column_width.max(1.0);
        let grass_depth = 10.0;
        let mut blocks = Vec::new();

        let mut x = 0.0;
        while x < width {
            let top = hill_profile(x + column_width * 0.5, height).floor();
            blocks.push(Block {
                x,
                y: top,
                width: column_width,
                height: grass_depth,
                surface: Surface::Grass,
            });
            blocks.push(Block {
                x,
                y: top + grass_depth,
                width: column_width,
                height: (height - top - grass_depth).max(0.0),
                surface: Surface::Ground,
            });
            x += column_width;
        }

        Terrain::new(blocks, width, height)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// True if `(x, y)` lies inside any block (left/top edges inclusive).
    pub fn collides_point(&self, x: f32, y: f32) -> bool {
        self.blocks
            .iter()
            .any(|b| x >= b.x && x < b.x + b.width && y >= b.y && y < b.y + b.height)
    }

    pub fn collides_rect(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        self.blocks.iter().any(|b| {
            x < b.x + b.width && x + w > b.x && y < b.y + b.height && y + h > b.y
        })
    }

    /// Topmost block surface whose horizontal span contains `x`, or the world
    /// height when there is none.
    pub fn ground_level(&self, x: f32) -> f32 {
        self.blocks
            .iter()
            .filter(|b| x >= b.x && x < b.x + b.width)
            .map(|b| b.y)
            .fold(self.height, f32::min)
    }

    /// Like `ground_level`, but for a body `width` wide whose left edge is `x`.
    pub fn ground_level_span(&self, x: f32, width: f32) -> f32 {
        self.blocks
            .iter()
            .filter(|b| b.x < x + width && b.x + b.width > x)
            .map(|b| b.y)
            .fold(self.height, f32::min)
    }

    /// Blocks intersecting the `w`×`h` rectangle centred on `(cx, cy)`.
    pub fn query_region(&self, cx: f32, cy: f32, w: f32, h: f32) -> Vec<Block> {
        let left = cx - w * 0.5;
        let right = cx + w * 0.5;
        let top = cy - h * 0.5;
        let bottom = cy + h * 0.5;

        self.blocks
            .iter()
            .filter(|b| {
                b.x + b.width >= left && b.x <= right && b.y + b.height >= top && b.y <= bottom
            })
            .copied()
            .collect()
    }
}

fn parse_row(line: &str) -> Option<Block> {
    let mut fields = line.split(',').map(str::trim);
    let surface = Surface::from_name(fields.next()?);
    let start_x: f32 = fields.next()?.parse().ok()?;
    let start_y: f32 = fields.next()?.parse().ok()?;
    let end_x: f32 = fields.next()?.parse().ok()?;
    let end_y: f32 = fields.next()?.parse().ok()?;

    Some(Block {
        x: start_x,
        y: start_y,
        width: end_x - start_x,
        height: end_y - start_y,
        surface,
    })
}

/// Ground height for generated levels, kept between 50 and 300 px above the
/// bottom of the world.
fn hill_profile(x: f32, height: f32) -> f32 {
    let base = height - 150.0;
    let hills = (x * 0.01).sin() * 50.0;
    let wobble = ((x * 0.005).sin() + (x * 0.003).cos()) * 20.0;
    (base + hills + wobble).clamp(height - 300.0, height - 50.0)
}
