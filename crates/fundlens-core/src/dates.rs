//! Calendar date handling for warehouse values and user input.

use serde::Serializer;
use time::macros::format_description;
use time::Date;

use crate::CoreError;

/// Coerce a warehouse date or timestamp string to its calendar date.
///
/// Accepts `YYYY-MM-DD`, optionally followed by a time of day separated by a
/// space or `T`. The time of day is discarded.
pub fn normalize_date(value: &str) -> Result<Date, CoreError> {
    let trimmed = value.trim();
    let invalid = || CoreError::InvalidDate {
        value: value.to_string(),
    };

    let date_part = match trimmed.get(10..) {
        None => trimmed,
        Some("") => trimmed,
        Some(rest) if rest.starts_with(' ') || rest.starts_with('T') => &trimmed[..10],
        Some(_) => return Err(invalid()),
    };

    Date::parse(date_part, format_description!("[year]-[month]-[day]")).map_err(|_| invalid())
}

/// Serialize a `Date` as `YYYY-MM-DD`.
pub(crate) fn serialize_iso<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn drops_time_of_day() {
        assert_eq!(normalize_date("2024-03-08").unwrap(), date!(2024 - 03 - 08));
        assert_eq!(
            normalize_date("2024-03-08 00:00:00").unwrap(),
            date!(2024 - 03 - 08)
        );
        assert_eq!(
            normalize_date("2024-03-08T16:30:00.125").unwrap(),
            date!(2024 - 03 - 08)
        );
    }

    #[test]
    fn rejects_other_shapes() {
        for value in ["", "03/08/2024", "2024-3-8", "2024-03-08x", "2024-02-30"] {
            assert!(
                matches!(normalize_date(value), Err(CoreError::InvalidDate { .. })),
                "{value:?} must be rejected"
            );
        }
    }
}
