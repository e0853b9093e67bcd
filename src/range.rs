use chrono::{Duration, NaiveDate};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RangeError {
    #[error("days_to_look_back must be positive, got {0}")]
    NonPositiveLookBack(i64),

    #[error("days_to_ignore must not be negative, got {0}")]
    NegativeIgnore(i64),

    #[error("days_to_ignore ({ignore}) must be smaller than days_to_look_back ({look_back})")]
    EmptyRange { look_back: i64, ignore: i64 },
}

/// Compute the inclusive, ascending list of dates to process.
///
/// The window covers `days_to_look_back` calendar days ending at `today`.
/// The `days_to_ignore` most recent days are trimmed from the end of the
/// window, because the store may not have finished delivering logs for them.
///
/// # Arguments
/// * `days_to_look_back` - window size in days, counting back from `today` inclusive
/// * `days_to_ignore` - number of trailing days to exclude
/// * `today` - the reference date, normally the current wall-clock date
pub fn date_range(
    days_to_look_back: i64,
    days_to_ignore: i64,
    today: NaiveDate,
) -> Result<Vec<NaiveDate>, RangeError> {
    if days_to_look_back < 1 {
        return Err(RangeError::NonPositiveLookBack(days_to_look_back));
    }
    if days_to_ignore < 0 {
        return Err(RangeError::NegativeIgnore(days_to_ignore));
    }
    if days_to_ignore >= days_to_look_back {
        return Err(RangeError::EmptyRange {
            look_back: days_to_look_back,
            ignore: days_to_ignore,
        });
    }

    let start = today - Duration::days(days_to_look_back - 1);
    let end = today - Duration::days(days_to_ignore);

    let mut dates = Vec::with_capacity((days_to_look_back - days_to_ignore) as usize);
    let mut date = start;
    while date <= end {
        dates.push(date);
        date += Duration::days(1);
    }

    Ok(dates)
}
