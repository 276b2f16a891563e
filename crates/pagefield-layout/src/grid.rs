//! Table grid sub-model for table-kind fields.
//!
//! A [`TableGrid`] owns the row/column shape, per-column widths, per-row
//! heights, per-cell metadata and the optional selected cell of one table
//! field. Column widths and row heights resize independently; changing one
//! never redistributes its siblings.
//!
//! # Invariants
//!
//! 1. `1 <= rows <= MAX_GRID_ROWS` and `1 <= columns <= MAX_GRID_COLUMNS`.
//! 2. `cell_widths.len() == columns` and `cell_heights.len() == rows`.
//! 3. `cells` holds exactly one entry for every `(row, col)` pair.
//! 4. Every width is `>= MIN_CELL_WIDTH` and every height `>= MIN_CELL_HEIGHT`.
//! 5. `selected_cell`, when set, names an existing cell.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rows in a freshly created table.
pub const DEFAULT_GRID_ROWS: u32 = 4;
/// Columns in a freshly created table.
pub const DEFAULT_GRID_COLUMNS: u32 = 4;
/// Width of a new column in pixels.
pub const DEFAULT_CELL_WIDTH: u32 = 100;
/// Height of a new row in pixels.
pub const DEFAULT_CELL_HEIGHT: u32 = 30;
/// Floor applied to column widths during resize.
pub const MIN_CELL_WIDTH: u32 = 30;
/// Floor applied to row heights during resize.
pub const MIN_CELL_HEIGHT: u32 = 20;
/// Largest row count a table accepts.
pub const MAX_GRID_ROWS: u32 = 500;
/// Largest column count a table accepts.
pub const MAX_GRID_COLUMNS: u32 = 100;

/// Address of one cell, written `"row-col"` (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub row: u32,
    pub col: u32,
}

impl CellKey {
    /// Create a cell key.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Failure to parse a `"row-col"` cell key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellKeyParseError {
    input: String,
}

impl fmt::Display for CellKeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell key {:?} (expected \"row-col\")", self.input)
    }
}

impl std::error::Error for CellKeyParseError {}

impl FromStr for CellKey {
    type Err = CellKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CellKeyParseError {
            input: s.to_owned(),
        };
        let (row, col) = s.split_once('-').ok_or_else(err)?;
        let row = row.parse::<u32>().map_err(|_| err())?;
        let col = col.parse::<u32>().map_err(|_| err())?;
        Ok(Self { row, col })
    }
}

impl Serialize for CellKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Value type of one table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    #[default]
    Number,
    Text,
    Date,
}

/// Metadata of one table cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    #[serde(rename = "type")]
    pub cell_type: CellType,
    pub title: String,
}

/// Which grid axis an extent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridAxis {
    /// Column widths.
    Columns,
    /// Row heights.
    Rows,
}

/// Grid addressing and shape failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The cell key is outside the grid.
    CellOutOfRange {
        key: CellKey,
        rows: u32,
        columns: u32,
    },
    /// A column or row index is outside the grid.
    IndexOutOfRange {
        axis: GridAxis,
        index: u32,
        len: u32,
    },
    /// A replacement extent list has the wrong length.
    ExtentCountMismatch {
        axis: GridAxis,
        expected: u32,
        found: usize,
    },
    /// A requested row or column count exceeds the grid limit.
    DimensionTooLarge {
        axis: GridAxis,
        requested: u32,
        max: u32,
    },
    /// Structural invariant violated (only reachable through bugs).
    ShapeMismatch { detail: String },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellOutOfRange { key, rows, columns } => {
                write!(f, "cell {key} is outside the {rows}x{columns} grid")
            }
            Self::IndexOutOfRange { axis, index, len } => {
                write!(f, "{axis:?} index {index} out of range (len={len})")
            }
            Self::ExtentCountMismatch {
                axis,
                expected,
                found,
            } => write!(
                f,
                "{axis:?} extent list has {found} entries, grid needs {expected}"
            ),
            Self::DimensionTooLarge {
                axis,
                requested,
                max,
            } => write!(f, "{axis:?} count {requested} exceeds the limit of {max}"),
            Self::ShapeMismatch { detail } => write!(f, "grid shape mismatch: {detail}"),
        }
    }
}

impl std::error::Error for GridError {}

/// Row/column/cell sub-state of a table field.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    rows: u32,
    columns: u32,
    cell_widths: Vec<u32>,
    cell_heights: Vec<u32>,
    cells: BTreeMap<CellKey, Cell>,
    selected_cell: Option<CellKey>,
}

impl Default for TableGrid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_ROWS, DEFAULT_GRID_COLUMNS)
    }
}

impl TableGrid {
    /// Create a uniform grid. Dimensions are clamped to
    /// `1..=MAX_GRID_ROWS` and `1..=MAX_GRID_COLUMNS`.
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        let rows = rows.clamp(1, MAX_GRID_ROWS);
        let columns = columns.clamp(1, MAX_GRID_COLUMNS);
        let cells = (0..rows)
            .flat_map(|row| (0..columns).map(move |col| (CellKey::new(row, col), Cell::default())))
            .collect();
        Self {
            rows,
            columns,
            cell_widths: vec![DEFAULT_CELL_WIDTH; columns as usize],
            cell_heights: vec![DEFAULT_CELL_HEIGHT; rows as usize],
            cells,
            selected_cell: None,
        }
    }

    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    #[must_use]
    pub fn cell_widths(&self) -> &[u32] {
        &self.cell_widths
    }

    #[must_use]
    pub fn cell_heights(&self) -> &[u32] {
        &self.cell_heights
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &BTreeMap<CellKey, Cell> {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(&key)
    }

    /// Selected cell, or `None` when nothing (or a stale key) is selected.
    #[must_use]
    pub fn selected_cell(&self) -> Option<CellKey> {
        self.selected_cell.filter(|key| self.cells.contains_key(key))
    }

    /// Sum of column widths.
    #[must_use]
    pub fn total_width(&self) -> u64 {
        self.cell_widths.iter().map(|&w| u64::from(w)).sum()
    }

    /// Sum of row heights.
    #[must_use]
    pub fn total_height(&self) -> u64 {
        self.cell_heights.iter().map(|&h| u64::from(h)).sum()
    }

    /// Change the row count, appending default rows or dropping trailing ones.
    ///
    /// Zero is raised to 1; counts above [`MAX_GRID_ROWS`] are rejected and
    /// leave the grid unchanged.
    pub fn set_rows(&mut self, rows: u32) -> Result<(), GridError> {
        let rows = checked_dimension(GridAxis::Rows, rows, MAX_GRID_ROWS)?;
        if rows == self.rows {
            return Ok(());
        }
        if rows > self.rows {
            for row in self.rows..rows {
                for col in 0..self.columns {
                    self.cells.insert(CellKey::new(row, col), Cell::default());
                }
            }
        } else {
            self.cells.retain(|key, _| key.row < rows);
        }
        self.cell_heights.resize(rows as usize, DEFAULT_CELL_HEIGHT);
        self.rows = rows;
        self.drop_stale_selection();
        Ok(())
    }

    /// Change the column count, appending default columns or dropping
    /// trailing ones. Bounded by [`MAX_GRID_COLUMNS`] like [`Self::set_rows`].
    pub fn set_columns(&mut self, columns: u32) -> Result<(), GridError> {
        let columns = checked_dimension(GridAxis::Columns, columns, MAX_GRID_COLUMNS)?;
        if columns == self.columns {
            return Ok(());
        }
        if columns > self.columns {
            for row in 0..self.rows {
                for col in self.columns..columns {
                    self.cells.insert(CellKey::new(row, col), Cell::default());
                }
            }
        } else {
            self.cells.retain(|key, _| key.col < columns);
        }
        self.cell_widths.resize(columns as usize, DEFAULT_CELL_WIDTH);
        self.columns = columns;
        self.drop_stale_selection();
        Ok(())
    }

    /// Replace every column width. Entries are floored to [`MIN_CELL_WIDTH`].
    pub fn set_cell_widths(&mut self, widths: Vec<u32>) -> Result<(), GridError> {
        if widths.len() != self.columns as usize {
            return Err(GridError::ExtentCountMismatch {
                axis: GridAxis::Columns,
                expected: self.columns,
                found: widths.len(),
            });
        }
        self.cell_widths = widths.into_iter().map(|w| w.max(MIN_CELL_WIDTH)).collect();
        Ok(())
    }

    /// Replace every row height. Entries are floored to [`MIN_CELL_HEIGHT`].
    pub fn set_cell_heights(&mut self, heights: Vec<u32>) -> Result<(), GridError> {
        if heights.len() != self.rows as usize {
            return Err(GridError::ExtentCountMismatch {
                axis: GridAxis::Rows,
                expected: self.rows,
                found: heights.len(),
            });
        }
        self.cell_heights = heights
            .into_iter()
            .map(|h| h.max(MIN_CELL_HEIGHT))
            .collect();
        Ok(())
    }

    /// Set one column's width, floored to [`MIN_CELL_WIDTH`]. Returns the
    /// stored width.
    pub fn set_column_width(&mut self, col: u32, width: u32) -> Result<u32, GridError> {
        let len = self.columns;
        let slot = self
            .cell_widths
            .get_mut(col as usize)
            .ok_or(GridError::IndexOutOfRange {
                axis: GridAxis::Columns,
                index: col,
                len,
            })?;
        *slot = width.max(MIN_CELL_WIDTH);
        Ok(*slot)
    }

    /// Set one row's height, floored to [`MIN_CELL_HEIGHT`]. Returns the
    /// stored height.
    pub fn set_row_height(&mut self, row: u32, height: u32) -> Result<u32, GridError> {
        let len = self.rows;
        let slot = self
            .cell_heights
            .get_mut(row as usize)
            .ok_or(GridError::IndexOutOfRange {
                axis: GridAxis::Rows,
                index: row,
                len,
            })?;
        *slot = height.max(MIN_CELL_HEIGHT);
        Ok(*slot)
    }

    /// Width of one column.
    #[must_use]
    pub fn column_width(&self, col: u32) -> Option<u32> {
        self.cell_widths.get(col as usize).copied()
    }

    /// Height of one row.
    #[must_use]
    pub fn row_height(&self, row: u32) -> Option<u32> {
        self.cell_heights.get(row as usize).copied()
    }

    pub fn set_cell_title(&mut self, key: CellKey, title: impl Into<String>) -> Result<(), GridError> {
        self.cell_mut(key)?.title = title.into();
        Ok(())
    }

    pub fn set_cell_type(&mut self, key: CellKey, cell_type: CellType) -> Result<(), GridError> {
        self.cell_mut(key)?.cell_type = cell_type;
        Ok(())
    }

    /// Mark `key` as the selected cell.
    pub fn select_cell(&mut self, key: CellKey) -> Result<(), GridError> {
        self.cell_mut(key)?;
        self.selected_cell = Some(key);
        Ok(())
    }

    pub fn clear_cell_selection(&mut self) {
        self.selected_cell = None;
    }

    /// Verify the structural invariants listed in the module docs.
    pub fn check_invariants(&self) -> Result<(), GridError> {
        let shape_err = |detail: String| Err(GridError::ShapeMismatch { detail });
        if self.rows == 0 || self.columns == 0 {
            return shape_err(format!("empty grid {}x{}", self.rows, self.columns));
        }
        if self.rows > MAX_GRID_ROWS || self.columns > MAX_GRID_COLUMNS {
            return shape_err(format!("oversized grid {}x{}", self.rows, self.columns));
        }
        if self.cell_widths.len() != self.columns as usize {
            return shape_err(format!(
                "{} widths for {} columns",
                self.cell_widths.len(),
                self.columns
            ));
        }
        if self.cell_heights.len() != self.rows as usize {
            return shape_err(format!(
                "{} heights for {} rows",
                self.cell_heights.len(),
                self.rows
            ));
        }
        let expected = u64::from(self.rows) * u64::from(self.columns);
        if self.cells.len() as u64 != expected {
            return shape_err(format!("{} cells, expected {expected}", self.cells.len()));
        }
        if let Some(key) = self
            .cells
            .keys()
            .find(|k| k.row >= self.rows || k.col >= self.columns)
        {
            return shape_err(format!("cell {key} outside grid"));
        }
        if self.cell_widths.iter().any(|&w| w < MIN_CELL_WIDTH)
            || self.cell_heights.iter().any(|&h| h < MIN_CELL_HEIGHT)
        {
            return shape_err("extent below minimum".to_owned());
        }
        if let Some(key) = self.selected_cell
            && !self.cells.contains_key(&key)
        {
            return shape_err(format!("selected cell {key} missing"));
        }
        Ok(())
    }

    fn cell_mut(&mut self, key: CellKey) -> Result<&mut Cell, GridError> {
        let (rows, columns) = (self.rows, self.columns);
        self.cells
            .get_mut(&key)
            .ok_or(GridError::CellOutOfRange { key, rows, columns })
    }

    fn drop_stale_selection(&mut self) {
        if let Some(key) = self.selected_cell
            && !self.cells.contains_key(&key)
        {
            self.selected_cell = None;
        }
    }
}

fn checked_dimension(axis: GridAxis, requested: u32, max: u32) -> Result<u32, GridError> {
    if requested > max {
        return Err(GridError::DimensionTooLarge {
            axis,
            requested,
            max,
        });
    }
    Ok(requested.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_uniform_four_by_four() {
        let grid = TableGrid::default();
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.cell_widths(), &[100, 100, 100, 100]);
        assert_eq!(grid.cell_heights(), &[30, 30, 30, 30]);
        assert_eq!(grid.cells().len(), 16);
        assert!(grid.cells().values().all(|c| *c == Cell::default()));
        assert_eq!(Cell::default().cell_type, CellType::Number);
        assert!(grid.selected_cell().is_none());
        grid.check_invariants().unwrap();
    }

    #[test]
    fn cell_key_text_form() {
        let key: CellKey = "2-3".parse().unwrap();
        assert_eq!(key, CellKey::new(2, 3));
        assert_eq!(key.to_string(), "2-3");
        assert!("2".parse::<CellKey>().is_err());
        assert!("a-1".parse::<CellKey>().is_err());
        assert!("1-".parse::<CellKey>().is_err());
        assert!("-1-2".parse::<CellKey>().is_err());
    }

    #[test]
    fn column_width_floors_and_leaves_siblings() {
        let mut grid = TableGrid::default();
        assert_eq!(grid.set_column_width(2, 0), Ok(MIN_CELL_WIDTH));
        assert_eq!(grid.cell_widths(), &[100, 100, 30, 100]);
        assert!(matches!(
            grid.set_column_width(4, 50),
            Err(GridError::IndexOutOfRange { index: 4, len: 4, .. })
        ));
    }

    #[test]
    fn row_height_floors_at_twenty() {
        let mut grid = TableGrid::default();
        assert_eq!(grid.set_row_height(0, 5), Ok(MIN_CELL_HEIGHT));
        assert_eq!(grid.set_row_height(3, 75), Ok(75));
        assert_eq!(grid.cell_heights(), &[20, 30, 30, 75]);
    }

    #[test]
    fn growing_appends_default_cells() {
        let mut grid = TableGrid::default();
        grid.set_column_width(0, 150).unwrap();
        grid.set_rows(6).unwrap();
        grid.set_columns(5).unwrap();
        assert_eq!(grid.cells().len(), 30);
        assert_eq!(grid.cell_widths(), &[150, 100, 100, 100, 100]);
        assert_eq!(grid.cell_heights().len(), 6);
        assert_eq!(grid.cell(CellKey::new(5, 4)), Some(&Cell::default()));
        grid.check_invariants().unwrap();
    }

    #[test]
    fn shrinking_drops_cells_and_stale_selection() {
        let mut grid = TableGrid::default();
        grid.select_cell(CellKey::new(3, 3)).unwrap();
        grid.set_cell_title(CellKey::new(0, 0), "Qty").unwrap();
        grid.set_rows(2).unwrap();
        assert_eq!(grid.selected_cell(), None);
        grid.set_columns(1).unwrap();
        assert_eq!(grid.cells().len(), 2);
        assert_eq!(grid.cell(CellKey::new(0, 0)).unwrap().title, "Qty");
        grid.check_invariants().unwrap();
    }

    #[test]
    fn zero_dimensions_raise_to_one() {
        let mut grid = TableGrid::new(0, 0);
        assert_eq!((grid.rows(), grid.columns()), (1, 1));
        grid.set_rows(0).unwrap();
        grid.set_columns(0).unwrap();
        assert_eq!(grid.cells().len(), 1);
        grid.check_invariants().unwrap();
    }

    #[test]
    fn oversized_dimensions_are_rejected_without_change() {
        let mut grid = TableGrid::default();
        assert_eq!(
            grid.set_rows(u32::MAX),
            Err(GridError::DimensionTooLarge {
                axis: GridAxis::Rows,
                requested: u32::MAX,
                max: MAX_GRID_ROWS
            })
        );
        assert!(matches!(
            grid.set_columns(MAX_GRID_COLUMNS + 1),
            Err(GridError::DimensionTooLarge { axis: GridAxis::Columns, .. })
        ));
        assert_eq!(grid, TableGrid::default());

        grid.set_rows(MAX_GRID_ROWS).unwrap();
        grid.set_columns(MAX_GRID_COLUMNS).unwrap();
        assert_eq!(grid.cells().len(), (MAX_GRID_ROWS * MAX_GRID_COLUMNS) as usize);
        grid.check_invariants().unwrap();

        let clamped = TableGrid::new(u32::MAX, u32::MAX);
        assert_eq!((clamped.rows(), clamped.columns()), (MAX_GRID_ROWS, MAX_GRID_COLUMNS));
    }

    #[test]
    fn selection_requires_existing_cell() {
        let mut grid = TableGrid::default();
        assert!(grid.select_cell(CellKey::new(9, 0)).is_err());
        grid.select_cell(CellKey::new(1, 2)).unwrap();
        assert_eq!(grid.selected_cell(), Some(CellKey::new(1, 2)));
        grid.clear_cell_selection();
        assert_eq!(grid.selected_cell(), None);
    }

    #[test]
    fn replacing_extents_checks_length() {
        let mut grid = TableGrid::default();
        assert!(matches!(
            grid.set_cell_widths(vec![50; 3]),
            Err(GridError::ExtentCountMismatch { expected: 4, found: 3, .. })
        ));
        grid.set_cell_widths(vec![10, 40, 60, 80]).unwrap();
        assert_eq!(grid.cell_widths(), &[30, 40, 60, 80]);
        grid.set_cell_heights(vec![1, 2, 3, 40]).unwrap();
        assert_eq!(grid.cell_heights(), &[20, 20, 20, 40]);
        assert_eq!(grid.total_width(), 210);
        assert_eq!(grid.total_height(), 100);
    }

    #[test]
    fn cell_edits() {
        let mut grid = TableGrid::default();
        let key = CellKey::new(1, 1);
        grid.set_cell_title(key, "Date of birth").unwrap();
        grid.set_cell_type(key, CellType::Date).unwrap();
        let cell = grid.cell(key).unwrap();
        assert_eq!(cell.title, "Date of birth");
        assert_eq!(cell.cell_type, CellType::Date);
        assert!(grid.set_cell_type(CellKey::new(4, 0), CellType::Text).is_err());
    }

    #[test]
    fn cells_serialize_with_string_keys() {
        let mut grid = TableGrid::new(1, 2);
        grid.set_cell_type(CellKey::new(0, 1), CellType::Text).unwrap();
        let json = serde_json::to_value(grid.cells()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "0-0": { "type": "number", "title": "" },
                "0-1": { "type": "text", "title": "" },
            })
        );
    }
}
