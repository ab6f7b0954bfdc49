use crate::config::LandscapeParams;
use crate::landscape::{Cell, Coord, Terrain};
use std::collections::BTreeSet;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    Empty,
    InconsistentRowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
    UnknownTerrain {
        code: char,
        row: usize,
        col: usize,
    },
    NonWaterBorder {
        row: usize,
        col: usize,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Empty => write!(f, "island map is empty"),
            MapError::InconsistentRowLength {
                row,
                expected,
                actual,
            } => write!(
                f,
                "row {row} has {actual} cells but the first row has {expected}"
            ),
            MapError::UnknownTerrain { code, row, col } => write!(
                f,
                "unknown terrain '{code}' at ({row}, {col}), expected one of W, D, H, L"
            ),
            MapError::NonWaterBorder { row, col } => {
                write!(f, "border cell ({row}, {col}) must be water")
            }
        }
    }
}

impl Error for MapError {}

/// The island grid. Cells are stored row-major; coordinates are 1-based.
#[derive(Clone, Debug)]
pub struct Island {
    rows: usize,
    cols: usize,
    pub(crate) cells: Vec<Cell>,
    illegal: BTreeSet<Coord>,
}

impl Island {
    /// Parse a multi-line map of `W`/`D`/`H`/`L` letters.
    ///
    /// Lines are trimmed and blank lines ignored, so indented string literals work.
    pub fn parse(map: &str, landscape: &LandscapeParams) -> Result<Self, MapError> {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let first = lines.first().ok_or(MapError::Empty)?;
        let cols = first.chars().count();
        let rows = lines.len();

        let mut cells = Vec::with_capacity(rows * cols);
        let mut illegal = BTreeSet::new();
        for (r, line) in lines.iter().enumerate() {
            let row = r + 1;
            let actual = line.chars().count();
            if actual != cols {
                return Err(MapError::InconsistentRowLength {
                    row,
                    expected: cols,
                    actual,
                });
            }
            for (c, code) in line.chars().enumerate() {
                let col = c + 1;
                let terrain =
                    Terrain::from_code(code).ok_or(MapError::UnknownTerrain { code, row, col })?;
                let on_border = row == 1 || row == rows || col == 1 || col == cols;
                if on_border && terrain != Terrain::Water {
                    return Err(MapError::NonWaterBorder { row, col });
                }
                if !terrain.is_passable() {
                    illegal.insert((row, col));
                }
                cells.push(Cell::new((row, col), terrain, landscape.capacity(terrain)));
            }
        }

        Ok(Self {
            rows,
            cols,
            cells,
            illegal,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn illegal_coords(&self) -> &BTreeSet<Coord> {
        &self.illegal
    }

    pub(crate) fn index_of(&self, (row, col): Coord) -> Option<usize> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            return None;
        }
        Some((row - 1) * self.cols + (col - 1))
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index_of(coord).map(|idx| &self.cells[idx])
    }

    pub(crate) fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        self.index_of(coord).map(move |idx| &mut self.cells[idx])
    }

    /// An animal may stand on `coord`: inside the map and not water.
    pub fn is_legal(&self, coord: Coord) -> bool {
        self.index_of(coord).is_some() && !self.illegal.contains(&coord)
    }

    pub(crate) fn population(&self) -> usize {
        self.cells.iter().map(Cell::population).sum()
    }
}
