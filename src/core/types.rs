use serde::{Serialize, Serializer};

use super::error::LifeGridError;

pub const MONTHS_PER_YEAR: u32 = 12;
pub const YEARS_PER_ROW: u32 = 3;
pub const GRID_COLUMNS: usize = (MONTHS_PER_YEAR * YEARS_PER_ROW) as usize;

pub const MIN_LIFESPAN_YEARS: u32 = 50;
pub const MAX_LIFESPAN_YEARS: u32 = 120;
pub const DEFAULT_LIFESPAN_YEARS: u32 = 90;
pub const DEFAULT_CURRENT_AGE_YEARS: u32 = 30;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum CellStatus {
    #[default]
    Future = 0,
    Lived = 1,
    Current = 2,
}

impl CellStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Serialize for CellStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LifeSpanParameters {
    expected_lifespan_years: u32,
    current_age_years: u32,
}

impl LifeSpanParameters {
    pub fn new(
        expected_lifespan_years: u32,
        current_age_years: u32,
    ) -> Result<Self, LifeGridError> {
        if !(MIN_LIFESPAN_YEARS..=MAX_LIFESPAN_YEARS).contains(&expected_lifespan_years) {
            return Err(LifeGridError::InvalidParameter(format!(
                "expected lifespan must be between {MIN_LIFESPAN_YEARS} and {MAX_LIFESPAN_YEARS}, got {expected_lifespan_years}"
            )));
        }
        if current_age_years > expected_lifespan_years {
            return Err(LifeGridError::InvalidParameter(format!(
                "current age must be between 0 and {expected_lifespan_years}, got {current_age_years}"
            )));
        }
        Ok(Self {
            expected_lifespan_years,
            current_age_years,
        })
    }

    pub fn expected_lifespan_years(&self) -> u32 {
        self.expected_lifespan_years
    }

    pub fn current_age_years(&self) -> u32 {
        self.current_age_years
    }
}

impl Default for LifeSpanParameters {
    fn default() -> Self {
        Self {
            expected_lifespan_years: DEFAULT_LIFESPAN_YEARS,
            current_age_years: DEFAULT_CURRENT_AGE_YEARS,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CellPosition {
    pub row: usize,
    pub column: usize,
}

impl CellPosition {
    pub fn from_linear(index: usize) -> Self {
        Self {
            row: index / GRID_COLUMNS,
            column: index % GRID_COLUMNS,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthGrid {
    cells: Vec<Vec<CellStatus>>,
}

impl MonthGrid {
    pub(super) fn from_rows(cells: Vec<Vec<CellStatus>>) -> Self {
        Self { cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        GRID_COLUMNS
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<CellStatus> {
        self.cells.get(row).and_then(|r| r.get(column)).copied()
    }

    pub fn cell_at(&self, linear_index: usize) -> Option<CellStatus> {
        let pos = CellPosition::from_linear(linear_index);
        self.cell(pos.row, pos.column)
    }

    pub fn current_cell(&self) -> Option<CellPosition> {
        self.iter_rows().enumerate().find_map(|(row, cells)| {
            cells
                .iter()
                .position(|&status| status == CellStatus::Current)
                .map(|column| CellPosition { row, column })
        })
    }

    pub fn count(&self, status: CellStatus) -> usize {
        self.iter_cells().filter(|&s| s == status).count()
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[CellStatus]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = CellStatus> + '_ {
        self.cells.iter().flatten().copied()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeMetrics {
    pub months_lived: u32,
    pub months_total: u32,
    pub percentage_lived: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LifeSnapshot {
    pub params: LifeSpanParameters,
    pub grid: MonthGrid,
    pub metrics: LifeMetrics,
}
