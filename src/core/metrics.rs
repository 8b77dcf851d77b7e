use super::error::LifeGridError;
use super::types::{LifeMetrics, MONTHS_PER_YEAR};

pub fn compute_metrics(
    expected_lifespan_years: u32,
    current_age_years: u32,
) -> Result<LifeMetrics, LifeGridError> {
    let months_total = expected_lifespan_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| {
            LifeGridError::InvalidParameter(format!(
                "expected lifespan ({expected_lifespan_years}) is out of range"
            ))
        })?;

    if months_total == 0 {
        return Err(LifeGridError::DivisionByZero);
    }
    if current_age_years > expected_lifespan_years {
        return Err(LifeGridError::InvalidParameter(format!(
            "current age ({current_age_years}) must be <= expected lifespan ({expected_lifespan_years})"
        )));
    }
    let months_lived = current_age_years * MONTHS_PER_YEAR;

    Ok(LifeMetrics {
        months_lived,
        months_total,
        percentage_lived: f64::from(months_lived) / f64::from(months_total) * 100.0,
    })
}
