//! [`DateSpecification`] adapters for the [`time`] crate types.
//!
//! [`time`] counts years astronomically: its year 0 is the XML Schema year -1.

use crate::date::DateValue;
use crate::decimal::Decimal;
use crate::error::{DateTimeError, InvalidStateKind};
use crate::specification::{DateFlags, DateSpecification};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

fn xsd_year(astronomical_year: i32) -> i32 {
    if astronomical_year <= 0 {
        astronomical_year - 1
    } else {
        astronomical_year
    }
}

fn nanosecond_fraction(nanosecond: u32) -> Decimal {
    Decimal::new(nanosecond, 9).strip_trailing_zeros()
}

fn offset_minutes(offset: UtcOffset) -> i16 {
    offset.whole_minutes()
}

fn offset_sign(offset: UtcOffset) -> i8 {
    match offset_minutes(offset).signum() {
        -1 => -1,
        0 => 0,
        _ => 1,
    }
}

fn offset_hour(offset: UtcOffset) -> u8 {
    u8::try_from(offset_minutes(offset).unsigned_abs() / 60).unwrap_or(u8::MAX)
}

fn offset_minute(offset: UtcOffset) -> u8 {
    u8::try_from(offset_minutes(offset).unsigned_abs() % 60).unwrap_or(u8::MAX)
}

/// Offsets beyond ±14:00 make the value [invalid](DateSpecification::is_valid).
impl DateSpecification for OffsetDateTime {
    #[inline]
    fn flags(&self) -> DateFlags {
        DateFlags::ALL
    }

    #[inline]
    fn year(&self) -> i32 {
        xsd_year(OffsetDateTime::year(*self))
    }

    #[inline]
    fn month(&self) -> u8 {
        u8::from(OffsetDateTime::month(*self))
    }

    #[inline]
    fn day(&self) -> u8 {
        OffsetDateTime::day(*self)
    }

    #[inline]
    fn hour(&self) -> u8 {
        OffsetDateTime::hour(*self)
    }

    #[inline]
    fn minute(&self) -> u8 {
        OffsetDateTime::minute(*self)
    }

    #[inline]
    fn second(&self) -> u8 {
        OffsetDateTime::second(*self)
    }

    #[inline]
    fn fraction(&self) -> Decimal {
        nanosecond_fraction(OffsetDateTime::nanosecond(*self))
    }

    #[inline]
    fn timezone_sign(&self) -> i8 {
        offset_sign(self.offset())
    }

    #[inline]
    fn timezone_hour(&self) -> u8 {
        offset_hour(self.offset())
    }

    #[inline]
    fn timezone_minute(&self) -> u8 {
        offset_minute(self.offset())
    }
}

impl DateSpecification for PrimitiveDateTime {
    #[inline]
    fn flags(&self) -> DateFlags {
        DateFlags::DATE | DateFlags::TIME
    }

    #[inline]
    fn year(&self) -> i32 {
        xsd_year(PrimitiveDateTime::year(*self))
    }

    #[inline]
    fn month(&self) -> u8 {
        u8::from(PrimitiveDateTime::month(*self))
    }

    #[inline]
    fn day(&self) -> u8 {
        PrimitiveDateTime::day(*self)
    }

    #[inline]
    fn hour(&self) -> u8 {
        PrimitiveDateTime::hour(*self)
    }

    #[inline]
    fn minute(&self) -> u8 {
        PrimitiveDateTime::minute(*self)
    }

    #[inline]
    fn second(&self) -> u8 {
        PrimitiveDateTime::second(*self)
    }

    #[inline]
    fn fraction(&self) -> Decimal {
        nanosecond_fraction(PrimitiveDateTime::nanosecond(*self))
    }

    #[inline]
    fn timezone_sign(&self) -> i8 {
        0
    }

    #[inline]
    fn timezone_hour(&self) -> u8 {
        0
    }

    #[inline]
    fn timezone_minute(&self) -> u8 {
        0
    }
}

impl DateSpecification for Date {
    #[inline]
    fn flags(&self) -> DateFlags {
        DateFlags::DATE
    }

    #[inline]
    fn year(&self) -> i32 {
        xsd_year(Date::year(*self))
    }

    #[inline]
    fn month(&self) -> u8 {
        u8::from(Date::month(*self))
    }

    #[inline]
    fn day(&self) -> u8 {
        Date::day(*self)
    }

    #[inline]
    fn hour(&self) -> u8 {
        0
    }

    #[inline]
    fn minute(&self) -> u8 {
        0
    }

    #[inline]
    fn second(&self) -> u8 {
        0
    }

    #[inline]
    fn fraction(&self) -> Decimal {
        Decimal::default()
    }

    #[inline]
    fn timezone_sign(&self) -> i8 {
        0
    }

    #[inline]
    fn timezone_hour(&self) -> u8 {
        0
    }

    #[inline]
    fn timezone_minute(&self) -> u8 {
        0
    }
}

impl DateSpecification for Time {
    #[inline]
    fn flags(&self) -> DateFlags {
        DateFlags::TIME
    }

    #[inline]
    fn year(&self) -> i32 {
        0
    }

    #[inline]
    fn month(&self) -> u8 {
        0
    }

    #[inline]
    fn day(&self) -> u8 {
        0
    }

    #[inline]
    fn hour(&self) -> u8 {
        Time::hour(*self)
    }

    #[inline]
    fn minute(&self) -> u8 {
        Time::minute(*self)
    }

    #[inline]
    fn second(&self) -> u8 {
        Time::second(*self)
    }

    #[inline]
    fn fraction(&self) -> Decimal {
        nanosecond_fraction(Time::nanosecond(*self))
    }

    #[inline]
    fn timezone_sign(&self) -> i8 {
        0
    }

    #[inline]
    fn timezone_hour(&self) -> u8 {
        0
    }

    #[inline]
    fn timezone_minute(&self) -> u8 {
        0
    }
}

/// The date must be complete. An absent time is midnight and an absent time zone is UTC.
/// Fractions finer than the nanosecond are truncated.
impl TryFrom<&DateValue> for OffsetDateTime {
    type Error = DateTimeError;

    fn try_from(value: &DateValue) -> Result<Self, DateTimeError> {
        if !value.has_date() {
            return Err(InvalidStateKind::IncompleteDate.into());
        }
        let year = if value.year() < 0 {
            value.year() + 1
        } else {
            value.year()
        };
        let month =
            Month::try_from(value.month()).map_err(|_| InvalidStateKind::IncompleteDate)?;
        let date = Date::from_calendar_date(year, month, value.day())
            .map_err(|_| InvalidStateKind::YearOutOfRange)?;
        let nanosecond = value
            .fraction()
            .scale_by_power_of_ten(9)
            .floor()
            .to_i64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(InvalidStateKind::Overflow)?;
        let time = Time::from_hms_nano(value.hour(), value.minute(), value.second(), nanosecond)
            .map_err(|_| InvalidStateKind::Overflow)?;
        let offset = match value.timezone() {
            Some(timezone) => {
                let sign = timezone.sign();
                UtcOffset::from_hms(
                    sign * i8::try_from(timezone.hour()).map_err(|_| InvalidStateKind::Overflow)?,
                    sign * i8::try_from(timezone.minute())
                        .map_err(|_| InvalidStateKind::Overflow)?,
                    0,
                )
                .map_err(|_| InvalidStateKind::Overflow)?
            }
            None => UtcOffset::UTC,
        };
        Ok(PrimitiveDateTime::new(date, time).assume_offset(offset))
    }
}
