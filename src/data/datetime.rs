use chrono::{Datelike, NaiveDate};

/// January 1st of `year`, the date every yearly sample is plotted at.
pub fn year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

fn days_in_year(year: i32) -> f64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    }
}

/// Map a date onto the time axis, measured in fractional years.
/// January 1st of a year maps exactly onto the year number.
pub fn date_to_year_fraction(date: NaiveDate) -> f64 {
    let year = date.year();
    year as f64 + date.ordinal0() as f64 / days_in_year(year)
}

/// Inverse of [`date_to_year_fraction`], truncated to whole days.
pub fn year_fraction_to_date(value: f64) -> Option<NaiveDate> {
    if !value.is_finite() {
        return None;
    }
    let year = value.floor();
    if year < i32::MIN as f64 || year > i32::MAX as f64 {
        return None;
    }
    let year = year as i32;
    let day = ((value - year as f64) * days_in_year(year)).floor() as u32;
    NaiveDate::from_yo_opt(year, day + 1)
}

/// Label for a time-axis tick. Steps of a year or more show the year only;
/// finer steps show month and year.
pub fn format_time_tick(value: f64, step: f64) -> String {
    let Some(date) = year_fraction_to_date(value) else {
        return format!("{value:.2}");
    };
    if step >= 1.0 - 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        date.format("%b %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn january_first_is_whole_year() {
        let d = year_start(1951).unwrap();
        assert_eq!(date_to_year_fraction(d), 1951.0);
    }

    #[test]
    fn fraction_round_trips_on_day_boundaries() {
        let d = NaiveDate::from_ymd_opt(2000, 7, 1).unwrap();
        let x = date_to_year_fraction(d);
        assert!(x > 2000.49 && x < 2000.5);
        assert_eq!(year_fraction_to_date(x + 1e-9), Some(d));
    }

    #[test]
    fn tick_labels_depend_on_step() {
        assert_eq!(format_time_tick(1940.0, 20.0), "1940");
        assert_eq!(format_time_tick(1940.0, 1.0), "1940");
        assert_eq!(format_time_tick(1940.5, 0.25), "Jul 1940");
        assert_eq!(format_time_tick(f64::NAN, 1.0), "NaN");
    }
}
