use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};

/// Short month/day label used when listing days, for example `3/7`.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%-m/%-d").to_string()
}

/// Returns start of the next local day. Midnight can be skipped by a daylight saving transition, in
/// which case the first valid moment after it is used.
pub fn next_day_start(date: DateTime<Local>) -> DateTime<Local> {
    let mut midnight = (date.date_naive() + Duration::days(1)).and_time(NaiveTime::MIN);
    loop {
        if let Some(start) = Local.from_local_datetime(&midnight).earliest() {
            return start;
        }
        midnight += Duration::minutes(30);
    }
}

/// Time left until the next local midnight. Never negative.
pub fn until_next_midnight(now: DateTime<Local>) -> std::time::Duration {
    (next_day_start(now) - now)
        .to_std()
        .unwrap_or(std::time::Duration::ZERO)
}
