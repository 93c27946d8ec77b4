//! Temporal conversions.
//!
//! Zones are given as `Z`, `UTC`, `GMT` or a `±HH:MM` offset; an absent zone
//! means the local zone. `Long` values are epoch milliseconds, except for
//! `Time` where they count milliseconds since midnight. Converting a
//! `DateTime` to a zone-less type keeps its own offset unless a zone is
//! given.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};

use super::{Concern, ConversionMatrix, Failure};
use crate::model::{FieldType, Value};

const NONE: &[Concern] = &[];
const LOSS: &[Concern] = &[Concern::Loss];
const ZONE: &[Concern] = &[Concern::Timezone];
const ZONE_LOSS: &[Concern] = &[Concern::Timezone, Concern::Loss];
const RANGE: &[Concern] = &[Concern::Range];
const RANGE_ZONE: &[Concern] = &[Concern::Range, Concern::Timezone];
const FORMAT: &[Concern] = &[Concern::Format];
const FORMAT_ZONE: &[Concern] = &[Concern::Format, Concern::Timezone];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];
const LOCAL_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const MILLIS_PER_DAY: i64 = 86_400_000;

pub(super) fn register(matrix: &mut ConversionMatrix) {
    use FieldType::*;

    matrix.add(String, Date, FORMAT, parse_date);
    matrix.add(String, Time, FORMAT, parse_time);
    matrix.add(String, DateTime, FORMAT_ZONE, parse_date_time);
    matrix.add(String, LocalDateTime, FORMAT, parse_local_date_time);

    matrix.add(Date, DateTime, ZONE, to_date_time);
    matrix.add(Date, LocalDateTime, NONE, to_local_date_time);
    matrix.add(Date, Long, ZONE, to_epoch_millis);

    matrix.add(Time, Long, NONE, to_epoch_millis);

    matrix.add(DateTime, Date, ZONE_LOSS, to_date);
    matrix.add(DateTime, Time, ZONE_LOSS, to_time);
    matrix.add(DateTime, LocalDateTime, ZONE_LOSS, to_local_date_time);
    matrix.add(DateTime, Long, LOSS, to_epoch_millis);

    matrix.add(LocalDateTime, Date, LOSS, to_date);
    matrix.add(LocalDateTime, Time, LOSS, to_time);
    matrix.add(LocalDateTime, DateTime, ZONE, to_date_time);
    matrix.add(LocalDateTime, Long, ZONE_LOSS, to_epoch_millis);

    matrix.add(Long, Date, RANGE_ZONE, to_date);
    matrix.add(Long, Time, RANGE, to_time);
    matrix.add(Long, DateTime, RANGE_ZONE, to_date_time);
    matrix.add(Long, LocalDateTime, RANGE_ZONE, to_local_date_time);
}

// ============================================================================
// Zones
// ============================================================================

enum Zone {
    Local,
    Fixed(FixedOffset),
}

fn zone(name: Option<&str>) -> Result<Zone, Failure> {
    let Some(name) = name.map(str::trim) else {
        return Ok(Zone::Local);
    };
    let utc = || FixedOffset::east_opt(0).map(Zone::Fixed);
    let parsed = match name.to_ascii_uppercase().as_str() {
        "Z" | "UTC" | "GMT" => utc(),
        _ => name.parse::<FixedOffset>().ok().map(Zone::Fixed),
    };
    parsed.ok_or_else(|| Failure::timezone(format!("unknown timezone '{name}'")))
}

impl Zone {
    /// Interpret a wall-clock time in this zone.
    fn attach(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>, Failure> {
        let attached = match self {
            Zone::Local => Local.from_local_datetime(&naive).earliest().map(|dt| dt.fixed_offset()),
            Zone::Fixed(offset) => offset.from_local_datetime(&naive).single(),
        };
        attached.ok_or_else(|| Failure::timezone(format!("{naive} does not exist in the target zone")))
    }

    /// View an instant in this zone.
    fn view(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => instant.with_timezone(&Local).fixed_offset(),
            Zone::Fixed(offset) => instant.with_timezone(offset),
        }
    }
}

// ============================================================================
// Normalisation
// ============================================================================

/// Any temporal or epoch-millis source as an offset date-time.
fn instant(value: &Value, tz: Option<&str>) -> Result<DateTime<FixedOffset>, Failure> {
    match value {
        Value::DateTime(dt) => Ok(match tz {
            Some(_) => zone(tz)?.view(dt.with_timezone(&Utc)),
            None => *dt,
        }),
        Value::LocalDateTime(naive) => zone(tz)?.attach(*naive),
        Value::Date(date) => zone(tz)?.attach(date.and_time(NaiveTime::MIN)),
        Value::Long(millis) => {
            let utc = DateTime::<Utc>::from_timestamp_millis(*millis)
                .ok_or_else(|| Failure::range(format!("{millis} ms is outside the supported range")))?;
            Ok(zone(tz)?.view(utc))
        }
        other => Err(Failure::unsupported(other)),
    }
}

/// Wall-clock date-time of any temporal source.
fn wall_clock(value: &Value, tz: Option<&str>) -> Result<NaiveDateTime, Failure> {
    match value {
        Value::LocalDateTime(naive) => Ok(*naive),
        Value::Date(date) => Ok(date.and_time(NaiveTime::MIN)),
        other => instant(other, tz).map(|dt| dt.naive_local()),
    }
}

// ============================================================================
// Targets
// ============================================================================

fn to_date(value: &Value, tz: Option<&str>) -> Result<Value, Failure> {
    wall_clock(value, tz).map(|dt| Value::Date(dt.date()))
}

fn to_time(value: &Value, tz: Option<&str>) -> Result<Value, Failure> {
    match value {
        Value::Long(millis) => {
            if !(0..MILLIS_PER_DAY).contains(millis) {
                return Err(Failure::range(format!("{millis} ms is not a time of day")));
            }
            let secs = (millis / 1000) as u32;
            let nanos = ((millis % 1000) * 1_000_000) as u32;
            NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                .map(Value::Time)
                .ok_or_else(|| Failure::range(format!("{millis} ms is not a time of day")))
        }
        other => wall_clock(other, tz).map(|dt| Value::Time(dt.time())),
    }
}

fn to_date_time(value: &Value, tz: Option<&str>) -> Result<Value, Failure> {
    instant(value, tz).map(Value::DateTime)
}

fn to_local_date_time(value: &Value, tz: Option<&str>) -> Result<Value, Failure> {
    wall_clock(value, tz).map(Value::LocalDateTime)
}

fn to_epoch_millis(value: &Value, tz: Option<&str>) -> Result<Value, Failure> {
    match value {
        Value::Time(t) => Ok(Value::Long(
            t.num_seconds_from_midnight() as i64 * 1000 + (t.nanosecond() / 1_000_000) as i64,
        )),
        other => instant(other, tz).map(|dt| Value::Long(dt.timestamp_millis())),
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn text(value: &Value) -> Result<&str, Failure> {
    value.as_str().map(str::trim).ok_or_else(|| Failure::unsupported(value))
}

fn parse_date(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    let s = text(value)?;
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(Value::Date)
        .map_err(|e| Failure::format(format!("'{s}' is not a date: {e}")))
}

fn parse_time(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    let s = text(value)?;
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .map(Value::Time)
        .ok_or_else(|| Failure::format(format!("'{s}' is not a time")))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    LOCAL_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_local_date_time(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    let s = text(value)?;
    parse_naive(s)
        .map(Value::LocalDateTime)
        .ok_or_else(|| Failure::format(format!("'{s}' is not a local date-time")))
}

/// RFC 3339 first; a zone-less date-time is interpreted in the given zone.
fn parse_date_time(value: &Value, tz: Option<&str>) -> Result<Value, Failure> {
    let s = text(value)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Value::DateTime(dt));
    }
    let naive = parse_naive(s).ok_or_else(|| Failure::format(format!("'{s}' is not a date-time")))?;
    zone(tz)?.attach(naive).map(Value::DateTime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConversionError;

    fn conv(value: Value, target: FieldType, tz: &str) -> Result<Value, ConversionError> {
        ConversionMatrix::global().convert_with_zone(&value, None, target, Some(tz))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zone_names() {
        assert!(matches!(zone(Some("utc")), Ok(Zone::Fixed(o)) if o.local_minus_utc() == 0));
        assert!(matches!(zone(Some("+02:00")), Ok(Zone::Fixed(o)) if o.local_minus_utc() == 7200));
        assert!(matches!(zone(None), Ok(Zone::Local)));
        assert!(zone(Some("Mars/Olympus")).is_err());
    }

    #[test]
    fn test_string_to_temporal() {
        assert_eq!(conv(Value::from("2024-02-29"), FieldType::Date, "Z").unwrap(), Value::Date(date(2024, 2, 29)));
        assert_eq!(conv(Value::from("2024-02-30"), FieldType::Date, "Z").unwrap_err().concern, Concern::Format);
        let dt = conv(Value::from("2024-01-01T10:00:00+02:00"), FieldType::DateTime, "Z").unwrap();
        assert_eq!(conv(dt, FieldType::Long, "Z").unwrap(), Value::Long(1_704_096_000_000));
        let t = conv(Value::from("07:30"), FieldType::Time, "Z").unwrap();
        assert_eq!(t, Value::Time(NaiveTime::from_hms_opt(7, 30, 0).unwrap()));
    }

    #[test]
    fn test_zone_less_string_uses_given_zone() {
        let dt = conv(Value::from("2024-01-01T00:00:00"), FieldType::DateTime, "+01:00").unwrap();
        assert_eq!(conv(dt, FieldType::Long, "Z").unwrap(), Value::Long(1_704_063_600_000));
    }

    #[test]
    fn test_epoch_millis() {
        let d = conv(Value::Long(0), FieldType::Date, "UTC").unwrap();
        assert_eq!(d, Value::Date(date(1970, 1, 1)));
        let local = conv(Value::Long(3_600_000), FieldType::LocalDateTime, "+02:00").unwrap();
        assert_eq!(local, Value::LocalDateTime(date(1970, 1, 1).and_hms_opt(3, 0, 0).unwrap()));
        assert_eq!(conv(Value::Date(date(1970, 1, 2)), FieldType::Long, "UTC").unwrap(), Value::Long(MILLIS_PER_DAY));
    }

    #[test]
    fn test_time_of_day_millis() {
        let t = conv(Value::Long(3_723_004), FieldType::Time, "Z").unwrap();
        assert_eq!(t, Value::Time(NaiveTime::from_hms_milli_opt(1, 2, 3, 4).unwrap()));
        assert_eq!(conv(t, FieldType::Long, "Z").unwrap(), Value::Long(3_723_004));
        assert_eq!(conv(Value::Long(-1), FieldType::Time, "Z").unwrap_err().concern, Concern::Range);
    }

    #[test]
    fn test_unknown_zone_fails() {
        let err = conv(Value::LocalDateTime(date(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap()), FieldType::DateTime, "nowhere")
            .unwrap_err();
        assert_eq!(err.concern, Concern::Timezone);
    }

    #[test]
    fn test_local_date_time_string_round_trip() {
        let m = ConversionMatrix::global();
        let ldt = Value::LocalDateTime(date(2023, 7, 14).and_hms_milli_opt(8, 5, 9, 250).unwrap());
        let s = m.convert(&ldt, None, FieldType::String).unwrap();
        assert_eq!(m.convert(&s, None, FieldType::LocalDateTime).unwrap(), ldt);
    }
}
