use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use time::{Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

/// Shift an instant so its wall-clock fields read as local time in `tz`.
pub fn localized_datetime(time: OffsetDateTime, tz: Tz) -> OffsetDateTime {
    let utc = time.to_offset(UtcOffset::UTC);
    let naive = DateTime::<Utc>::from_timestamp(utc.unix_timestamp(), utc.nanosecond())
        .map(|value| value.naive_utc());
    let Some(naive) = naive else {
        return utc;
    };
    let seconds = tz.offset_from_utc_datetime(&naive).fix().local_minus_utc();
    time.to_offset(UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC))
}

pub fn localized_date(time: OffsetDateTime, tz: Tz) -> Date {
    localized_datetime(time, tz).date()
}

pub fn today(tz: Tz) -> Date {
    localized_date(OffsetDateTime::now_utc(), tz)
}

/// First instant of `date` in `tz` (local 00:00:00).
pub fn start_of_day(date: Date, tz: Tz) -> OffsetDateTime {
    let offset = local_offset(date, NaiveTime::MIN, tz);
    date.midnight().assume_offset(offset)
}

/// Last instant of `date` in `tz` (local 23:59:59.999999999).
pub fn end_of_day(date: Date, tz: Tz) -> OffsetDateTime {
    let wall = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    let offset = local_offset(date, wall, tz);
    match date.with_hms_nano(23, 59, 59, 999_999_999) {
        Ok(value) => value.assume_offset(offset),
        Err(_) => date.midnight().assume_offset(offset),
    }
}

/// Human-readable local timestamp used in tables.
pub fn format_display(time: OffsetDateTime, tz: Tz) -> String {
    let local = localized_datetime(time, tz);
    let format = time::macros::format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    );
    local
        .format(&format)
        .unwrap_or_else(|_| local.unix_timestamp().to_string())
}

/// RFC 3339 timestamp carrying the local offset of `tz`.
pub fn format_rfc3339(time: OffsetDateTime, tz: Tz) -> String {
    let local = localized_datetime(time, tz);
    local
        .format(&Rfc3339)
        .unwrap_or_else(|_| local.unix_timestamp().to_string())
}

fn local_offset(date: Date, wall: NaiveTime, tz: Tz) -> UtcOffset {
    let Some(naive_date) = NaiveDate::from_ymd_opt(
        date.year(),
        u32::from(u8::from(date.month())),
        u32::from(date.day()),
    ) else {
        return UtcOffset::UTC;
    };
    let naive = NaiveDateTime::new(naive_date, wall);

    // Wall times skipped by a DST transition fall back to the offset in force
    // at the same UTC reading.
    let fixed = tz
        .offset_from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.offset_from_utc_datetime(&naive))
        .fix();

    UtcOffset::from_whole_seconds(fixed.local_minus_utc()).unwrap_or(UtcOffset::UTC)
}
