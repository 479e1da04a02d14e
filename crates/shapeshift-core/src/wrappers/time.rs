//! Timestamps, nullable timestamps and UUIDs
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::Wrapper;
use crate::config::MapperConfig;
use crate::error::{Error, Result};
use crate::reflect::{mismatch, Reflect};
use crate::types::{Kind, Type};
use crate::value::{Data, Value};
use chrono::format::Parsed;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

const TIME_FIELD: &str = "time";

/// A UTC instant whose default is the zero timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Option<DateTime<Utc>>);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(None);

    pub fn new(instant: DateTime<Utc>) -> Self {
        Timestamp(Some(instant))
    }

    pub fn get(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Timestamp::new(instant)
    }
}

impl Reflect for Timestamp {
    fn reflect_type() -> Type {
        Type::timestamp()
    }

    fn to_value(&self) -> Value {
        Value::from_parts(Self::reflect_type(), Data::Timestamp(self.0))
    }

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_timestamp()
            .map(Timestamp)
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))
    }
}

crate::reflect_struct! {
    /// A timestamp that may be unset
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct NullTime {
        pub time: Timestamp,
    }
}

impl NullTime {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            time: Timestamp::new(instant),
        }
    }
}

/// Parse `text` with the configured layouts
///
/// Datetime layouts are tried first, then date-only layouts (midnight UTC),
/// then RFC 3339 when enabled. The error of the last attempt is returned;
/// with nothing to try, the error is chrono's `NotEnough`.
pub fn parse_timestamp(
    text: &str,
    config: &MapperConfig,
) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    let mut failure = None;

    for layout in &config.datetime_layouts {
        match NaiveDateTime::parse_from_str(text, layout) {
            Ok(stamp) => return Ok(stamp.and_utc()),
            Err(e) => failure = Some(e),
        }
    }

    for layout in &config.date_layouts {
        match NaiveDate::parse_from_str(text, layout) {
            Ok(date) => return Ok(date.and_time(NaiveTime::MIN).and_utc()),
            Err(e) => failure = Some(e),
        }
    }

    if config.accept_rfc3339 {
        return DateTime::parse_from_rfc3339(text).map(|stamp| stamp.with_timezone(&Utc));
    }

    match failure {
        Some(e) => Err(e),
        // An empty parse state never resolves to a date
        None => Parsed::new()
            .to_naive_date()
            .map(|date| date.and_time(NaiveTime::MIN).and_utc()),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimestampWrapper;

impl Wrapper for TimestampWrapper {
    fn parse(&self, target: &Type, text: &str, config: &MapperConfig) -> Option<Result<Value>> {
        if target.kind() != Kind::Timestamp {
            return None;
        }

        let parsed = parse_timestamp(text, config)
            .map(|stamp| Value::from_parts(target.clone(), Data::Timestamp(Some(stamp))))
            .map_err(|e| Error::parse(target, text, e));
        Some(parsed)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NullTimeWrapper;

impl NullTimeWrapper {
    fn with_time(target: &Value, stamp: Value) -> Option<Value> {
        let slot_type = target.field(TIME_FIELD)?.ty().clone();
        let mut next = target.clone();
        *next.field_mut(TIME_FIELD)? = stamp.retag(slot_type);
        Some(next)
    }
}

impl Wrapper for NullTimeWrapper {
    fn absorb(&self, target: &Value, source: &Value) -> Option<Value> {
        if source.kind() != Kind::Timestamp {
            return None;
        }
        Self::with_time(target, source.clone())
    }

    fn parse(&self, target: &Type, text: &str, config: &MapperConfig) -> Option<Result<Value>> {
        let stamp = match parse_timestamp(text, config) {
            Ok(stamp) => stamp,
            Err(e) => return Some(Err(Error::parse(target, text, e))),
        };

        let time = Value::from_parts(Type::timestamp(), Data::Timestamp(Some(stamp)));
        Self::with_time(&Value::zero(target), time).map(Ok)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UuidWrapper;

impl Wrapper for UuidWrapper {
    fn parse(&self, target: &Type, text: &str, _config: &MapperConfig) -> Option<Result<Value>> {
        if target.kind() != Kind::Uuid {
            return None;
        }

        let parsed = Uuid::parse_str(text)
            .map(|id| Value::from_parts(target.clone(), Data::Uuid(id)))
            .map_err(|e| Error::parse(target, text, e));
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datetime_with_fraction() {
        let stamp = parse_timestamp("2023-12-12T09:10:11.2341", &MapperConfig::default()).unwrap();
        let expected = Utc.with_ymd_and_hms(2023, 12, 12, 9, 10, 11).unwrap()
            + chrono::Duration::microseconds(234_100);
        assert_eq!(stamp, expected);
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        let stamp = parse_timestamp("2023-12-12", &MapperConfig::default()).unwrap();
        assert_eq!(stamp, Utc.with_ymd_and_hms(2023, 12, 12, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_toggle() {
        let text = "2023-12-12T09:10:11+02:00";
        let stamp = parse_timestamp(text, &MapperConfig::default()).unwrap();
        assert_eq!(stamp, Utc.with_ymd_and_hms(2023, 12, 12, 7, 10, 11).unwrap());

        let strict = MapperConfig {
            accept_rfc3339: false,
            ..MapperConfig::default()
        };
        assert!(parse_timestamp(text, &strict).is_err());
    }

    #[test]
    fn test_parse_without_layouts_or_rfc3339_fails() {
        let config = MapperConfig {
            datetime_layouts: Vec::new(),
            date_layouts: Vec::new(),
            accept_rfc3339: false,
            ..MapperConfig::default()
        };
        let err = parse_timestamp("2023-12-12T09:10:11Z", &config).unwrap_err();
        assert_eq!(err.kind(), chrono::format::ParseErrorKind::NotEnough);

        let rfc3339_only = MapperConfig {
            accept_rfc3339: true,
            ..config
        };
        let stamp = parse_timestamp("2023-12-12T09:10:11Z", &rfc3339_only).unwrap();
        assert_eq!(stamp, Utc.with_ymd_and_hms(2023, 12, 12, 9, 10, 11).unwrap());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_timestamp("yesterday", &MapperConfig::default()).is_err());
    }

    #[test]
    fn test_null_time_absorbs_timestamp() {
        let instant = Utc.with_ymd_and_hms(2020, 7, 14, 0, 0, 0).unwrap();
        let target = NullTime::default().to_value();
        let next = NullTimeWrapper
            .absorb(&target, &Timestamp::new(instant).to_value())
            .unwrap();
        assert_eq!(NullTime::from_value(&next).unwrap(), NullTime::new(instant));

        assert!(NullTimeWrapper.absorb(&target, &Value::string("x")).is_none());
    }

    #[test]
    fn test_null_time_parses_text() {
        let parsed = NullTimeWrapper
            .parse(&NullTime::reflect_type(), "2023-12-12", &MapperConfig::default())
            .unwrap()
            .unwrap();
        let expected = NullTime::new(Utc.with_ymd_and_hms(2023, 12, 12, 0, 0, 0).unwrap());
        assert_eq!(NullTime::from_value(&parsed).unwrap(), expected);
    }

    #[test]
    fn test_uuid_parse() {
        let id = Uuid::new_v4();
        let parsed = UuidWrapper
            .parse(&Type::uuid(), &id.to_string(), &MapperConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(parsed.as_uuid(), Some(id));

        let err = UuidWrapper
            .parse(&Type::uuid(), "not-a-uuid", &MapperConfig::default())
            .unwrap()
            .unwrap_err();
        assert!(err.is_parse());
    }
}
