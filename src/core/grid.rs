use super::error::LifeGridError;
use super::types::{
    CellPosition, CellStatus, GRID_COLUMNS, MONTHS_PER_YEAR, MonthGrid, YEARS_PER_ROW,
};

pub fn grid_rows(expected_lifespan_years: u32) -> usize {
    (expected_lifespan_years / YEARS_PER_ROW) as usize + 1
}

pub fn build_grid(
    expected_lifespan_years: u32,
    current_age_years: u32,
) -> Result<MonthGrid, LifeGridError> {
    if expected_lifespan_years < 1 {
        return Err(LifeGridError::InvalidParameter(
            "expected lifespan must be >= 1".to_string(),
        ));
    }
    if expected_lifespan_years.checked_mul(MONTHS_PER_YEAR).is_none() {
        return Err(LifeGridError::InvalidParameter(format!(
            "expected lifespan ({expected_lifespan_years}) is out of range"
        )));
    }
    if current_age_years > expected_lifespan_years {
        return Err(LifeGridError::InvalidParameter(format!(
            "current age ({current_age_years}) must be <= expected lifespan ({expected_lifespan_years})"
        )));
    }

    let mut cells =
        vec![vec![CellStatus::Future; GRID_COLUMNS]; grid_rows(expected_lifespan_years)];
    let months_lived = current_age_years as usize * MONTHS_PER_YEAR as usize;

    for month in 0..months_lived {
        let pos = CellPosition::from_linear(month);
        cells[pos.row][pos.column] = CellStatus::Lived;
    }

    // Age 0 has no lived month to highlight.
    if let Some(last_index) = months_lived.checked_sub(1) {
        let pos = CellPosition::from_linear(last_index);
        cells[pos.row][pos.column] = CellStatus::Current;
    }

    Ok(MonthGrid::from_rows(cells))
}
