//! Conversions between epoch milliseconds and zoned calendar values.

use chrono::{DateTime, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone};

/// Converts epoch milliseconds into a date-time in `tz`.
///
/// Returns `None` when the instant, or its wall-clock reading in `tz`, is
/// outside the representable range.
pub fn epoch_ms_to_zoned<Tz: TimeZone>(epoch_ms: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    let utc = DateTime::from_timestamp_millis(epoch_ms)?.naive_utc();
    let offset = tz.offset_from_utc_datetime(&utc).fix();
    utc.checked_add_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))?;
    Some(tz.from_utc_datetime(&utc))
}

/// Combines a calendar date with an optional wall-clock time in `tz`.
///
/// A missing time means the start of the day. Ambiguous local times (DST
/// fall-back) resolve to the earlier instant; nonexistent local times (DST
/// spring-forward gap) return `None`.
pub fn local_to_epoch_ms<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    time: Option<NaiveTime>,
) -> Option<i64> {
    let naive = date.and_time(time.unwrap_or(NaiveTime::MIN));
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|zoned| zoned.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::{epoch_ms_to_zoned, local_to_epoch_ms};
    use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike, Utc};

    #[test]
    fn combines_date_and_time_in_zone() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let time = NaiveTime::from_hms_opt(9, 30, 0);

        let ms = local_to_epoch_ms(&tz, date, time).unwrap();
        let back = epoch_ms_to_zoned(ms, &tz).unwrap();
        assert_eq!(back.day(), 15);
        assert_eq!(back.hour(), 9);
        assert_eq!(back.minute(), 30);
    }

    #[test]
    fn missing_time_means_start_of_day() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(local_to_epoch_ms(&tz, date, None), Some(1_718_409_600_000));
    }

    #[test]
    fn out_of_range_epoch_is_rejected() {
        let tz = FixedOffset::east_opt(0).unwrap();
        assert!(epoch_ms_to_zoned(i64::MAX, &tz).is_none());
    }

    #[test]
    fn instant_whose_local_reading_overflows_is_rejected() {
        let east = FixedOffset::east_opt(14 * 3600).unwrap();
        let west = FixedOffset::west_opt(12 * 3600).unwrap();
        let max = DateTime::<Utc>::MAX_UTC.timestamp_millis();
        let min = DateTime::<Utc>::MIN_UTC.timestamp_millis();

        assert!(epoch_ms_to_zoned(max, &east).is_none());
        assert!(epoch_ms_to_zoned(min, &west).is_none());
        assert!(epoch_ms_to_zoned(max, &west).is_some());
        assert!(epoch_ms_to_zoned(min, &east).is_some());
    }
}
