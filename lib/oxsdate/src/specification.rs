use crate::builder::is_valid_date;
use crate::decimal::Decimal;
use crate::error::{DateField, DateLexicalErrorKind, InvalidFieldError, ParseDateTimeError};
use crate::format::two_digit;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor};
use std::str::FromStr;

/// The set of fields present in a date/time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DateFlags(u8);

impl DateFlags {
    pub const TIMEZONE: Self = Self(1);
    pub const YEAR: Self = Self(2);
    pub const MONTH: Self = Self(4);
    pub const DAY: Self = Self(8);
    pub const TIME: Self = Self(16);
    /// Year, month and day.
    pub const DATE: Self = Self(2 | 4 | 8);
    pub const ALL: Self = Self(31);

    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `None` if unknown bits are set.
    #[inline]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[inline]
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline]
    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl BitOr for DateFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitAnd for DateFlags {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl BitXor for DateFlags {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

/// The eight shapes of date/time value that are named [XML Schema datatypes](https://www.w3.org/TR/xmlschema-2/#built-in-primitive-datatypes).
///
/// The time zone is optional in all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// `gYear`, e.g. `2001`
    GYear,
    /// `gYearMonth`, e.g. `2001-08`
    GYearMonth,
    /// `gMonth`, e.g. `--08`
    GMonth,
    /// `gMonthDay`, e.g. `--08-06`
    GMonthDay,
    /// `gDay`, e.g. `---06`
    GDay,
    /// `date`, e.g. `2001-08-06`
    Date,
    /// `dateTime`, e.g. `2001-08-06T10:00:00`
    DateTime,
    /// `time`, e.g. `10:00:00`
    Time,
}

impl BuiltinType {
    const YEAR_MONTH: DateFlags = DateFlags::YEAR.union(DateFlags::MONTH);
    const MONTH_DAY: DateFlags = DateFlags::MONTH.union(DateFlags::DAY);
    const DATE_TIME: DateFlags = DateFlags::DATE.union(DateFlags::TIME);

    /// The named type whose shape matches the given fields, if any.
    pub const fn from_flags(flags: DateFlags) -> Option<Self> {
        match flags.difference(DateFlags::TIMEZONE) {
            DateFlags::YEAR => Some(Self::GYear),
            Self::YEAR_MONTH => Some(Self::GYearMonth),
            DateFlags::MONTH => Some(Self::GMonth),
            Self::MONTH_DAY => Some(Self::GMonthDay),
            DateFlags::DAY => Some(Self::GDay),
            DateFlags::DATE => Some(Self::Date),
            Self::DATE_TIME => Some(Self::DateTime),
            DateFlags::TIME => Some(Self::Time),
            _ => None,
        }
    }

    /// The fields a value of this type has, the time zone excluded.
    pub const fn flags(self) -> DateFlags {
        match self {
            Self::GYear => DateFlags::YEAR,
            Self::GYearMonth => Self::YEAR_MONTH,
            Self::GMonth => DateFlags::MONTH,
            Self::GMonthDay => Self::MONTH_DAY,
            Self::GDay => DateFlags::DAY,
            Self::Date => DateFlags::DATE,
            Self::DateTime => Self::DATE_TIME,
            Self::Time => DateFlags::TIME,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::GYear => "gYear",
            Self::GYearMonth => "gYearMonth",
            Self::GMonth => "gMonth",
            Self::GMonthDay => "gMonthDay",
            Self::GDay => "gDay",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for BuiltinType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A time zone: either `Z` or a signed offset in hours and minutes from UTC.
///
/// `Z` and `+00:00` denote the same offset but are distinct values.
/// Offsets range from -14:00 to +14:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimezoneOffset {
    sign: i8,
    hour: u8,
    minute: u8,
}

impl TimezoneOffset {
    pub const UTC: Self = Self {
        sign: 0,
        hour: 0,
        minute: 0,
    };
    pub const MAX: Self = Self {
        sign: 1,
        hour: 14,
        minute: 0,
    };
    pub const MIN: Self = Self {
        sign: -1,
        hour: 14,
        minute: 0,
    };

    /// A sign of 0 is `Z` and requires zero hours and minutes.
    pub fn new(sign: i8, hour: u8, minute: u8) -> Result<Self, InvalidFieldError> {
        let valid = match sign {
            0 => hour == 0 && minute == 0,
            -1 | 1 => (hour == 14 && minute == 0) || (hour < 14 && minute < 60),
            _ => false,
        };
        if valid {
            Ok(Self { sign, hour, minute })
        } else {
            Err(InvalidFieldError::new(
                DateField::Timezone,
                "the offset must be Z or between -14:00 and +14:00",
            ))
        }
    }

    /// From an offset in minutes with respect to UTC. Zero gives `Z`.
    pub fn from_minutes(offset_in_minutes: i32) -> Result<Self, InvalidFieldError> {
        let out_of_range = || {
            InvalidFieldError::new(
                DateField::Timezone,
                "the offset must be between -840 and 840 minutes",
            )
        };
        let magnitude = u16::try_from(offset_in_minutes.unsigned_abs())
            .ok()
            .filter(|m| *m <= 14 * 60)
            .ok_or_else(out_of_range)?;
        let sign = match offset_in_minutes.signum() {
            -1 => -1,
            0 => 0,
            _ => 1,
        };
        Self::new(
            sign,
            u8::try_from(magnitude / 60).map_err(|_| out_of_range())?,
            u8::try_from(magnitude % 60).map_err(|_| out_of_range())?,
        )
    }

    /// -1, 0 for `Z`, or 1.
    #[inline]
    pub const fn sign(self) -> i8 {
        self.sign
    }

    #[inline]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    #[inline]
    pub const fn minute(self) -> u8 {
        self.minute
    }

    #[inline]
    pub fn total_minutes(self) -> i32 {
        i32::from(self.sign) * (i32::from(self.hour) * 60 + i32::from(self.minute))
    }
}

impl FromStr for TimezoneOffset {
    type Err = ParseDateTimeError;

    fn from_str(input: &str) -> Result<Self, ParseDateTimeError> {
        let input = input.as_bytes();
        if input == b"Z" {
            return Ok(Self::UTC);
        }
        let sign = match input.first() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Err(DateLexicalErrorKind::TimezoneHour.into()),
        };
        if input.len() != 6 || input[3] != b':' {
            return Err(DateLexicalErrorKind::TimezoneHour.into());
        }
        let hour = two_digit(input, 1)
            .filter(|h| *h <= 14)
            .ok_or(DateLexicalErrorKind::TimezoneHour)?;
        let minute = two_digit(input, 4)
            .filter(|m| *m <= 59)
            .ok_or(DateLexicalErrorKind::TimezoneMinute)?;
        Self::new(sign, hour, minute).map_err(|_| DateLexicalErrorKind::TimezoneHour.into())
    }
}

impl fmt::Display for TimezoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign == 0 {
            return f.write_str("Z");
        }
        let sign = if self.sign < 0 { '-' } else { '+' };
        write!(f, "{sign}{:02}:{:02}", self.hour, self.minute)
    }
}

/// Read access to the fields of a Gregorian date/time value.
///
/// It is implemented by [`DateValue`](crate::DateValue), [`DateBuilder`](crate::DateBuilder)
/// and, with the `time` feature, by the types of the [`time`](https://docs.rs/time) crate.
/// Any implementation can be copied into a [`DateBuilder`](crate::DateBuilder) or compared with
/// [`compare_dates`](crate::compare_dates).
///
/// The getters of absent fields return zero.
/// [`year`](Self::year) never returns zero for a present year: the year before 1 is -1.
pub trait DateSpecification {
    fn flags(&self) -> DateFlags;

    fn year(&self) -> i32;

    fn month(&self) -> u8;

    fn day(&self) -> u8;

    fn hour(&self) -> u8;

    fn minute(&self) -> u8;

    fn second(&self) -> u8;

    /// The fractional second, in `[0, 1)`.
    fn fraction(&self) -> Decimal;

    fn timezone_sign(&self) -> i8;

    fn timezone_hour(&self) -> u8;

    fn timezone_minute(&self) -> u8;

    #[inline]
    fn has_year(&self) -> bool {
        self.flags().contains(DateFlags::YEAR)
    }

    #[inline]
    fn has_month(&self) -> bool {
        self.flags().contains(DateFlags::MONTH)
    }

    #[inline]
    fn has_day(&self) -> bool {
        self.flags().contains(DateFlags::DAY)
    }

    #[inline]
    fn has_time(&self) -> bool {
        self.flags().contains(DateFlags::TIME)
    }

    #[inline]
    fn has_timezone(&self) -> bool {
        self.flags().contains(DateFlags::TIMEZONE)
    }

    /// Checks if year, month and day are all present.
    #[inline]
    fn has_date(&self) -> bool {
        self.flags().contains(DateFlags::DATE)
    }

    fn timezone(&self) -> Option<TimezoneOffset> {
        if !self.has_timezone() {
            return None;
        }
        TimezoneOffset::new(
            self.timezone_sign(),
            self.timezone_hour(),
            self.timezone_minute(),
        )
        .ok()
    }

    /// The fractional second truncated to milliseconds.
    fn millisecond(&self) -> u16 {
        self.fraction()
            .scale_by_power_of_ten(3)
            .floor()
            .to_i64()
            .and_then(|ms| u16::try_from(ms).ok())
            .unwrap_or(0)
    }

    fn builtin_type(&self) -> Option<BuiltinType> {
        BuiltinType::from_flags(self.flags())
    }

    /// Checks that every present field is in range and that the fields fit together.
    fn is_valid(&self) -> bool {
        is_valid_date(self)
    }
}
