mod error;
mod grid;
mod metrics;
mod types;

pub use error::LifeGridError;
pub use grid::{build_grid, grid_rows};
pub use metrics::compute_metrics;
pub use types::{
    CellPosition, CellStatus, DEFAULT_CURRENT_AGE_YEARS, DEFAULT_LIFESPAN_YEARS, GRID_COLUMNS,
    LifeMetrics, LifeSnapshot, LifeSpanParameters, MAX_LIFESPAN_YEARS, MIN_LIFESPAN_YEARS,
    MONTHS_PER_YEAR, MonthGrid, YEARS_PER_ROW,
};

pub fn build_snapshot(params: LifeSpanParameters) -> Result<LifeSnapshot, LifeGridError> {
    let lifespan = params.expected_lifespan_years();
    let age = params.current_age_years();
    let grid = build_grid(lifespan, age)?;
    let metrics = compute_metrics(lifespan, age)?;
    Ok(LifeSnapshot {
        params,
        grid,
        metrics,
    })
}
