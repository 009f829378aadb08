use std::fmt;

/// An error raised when parsing a date/time lexical value.
///
/// [`kind`](Self::kind) tells which lexical rule was broken.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid date/time lexical value: {kind}")]
pub struct ParseDateTimeError {
    kind: DateLexicalErrorKind,
}

impl ParseDateTimeError {
    #[inline]
    pub const fn kind(&self) -> DateLexicalErrorKind {
        self.kind
    }
}

impl From<DateLexicalErrorKind> for ParseDateTimeError {
    #[inline]
    fn from(kind: DateLexicalErrorKind) -> Self {
        Self { kind }
    }
}

/// The lexical rule broken by a date/time string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum DateLexicalErrorKind {
    #[error("time zone hour must be two digits between -14 and +14")]
    TimezoneHour,
    #[error("time zone minute must be two digits between 00 and 59")]
    TimezoneMinute,
    #[error("a year starting with zero must have at most four digits")]
    YearLeadingZero,
    #[error("a year must have at most nine digits")]
    YearTooLong,
    #[error("a year must have at least four digits")]
    YearTooShort,
    #[error("year zero does not exist")]
    YearZero,
    #[error("the year is out of the supported range")]
    YearOutOfRange,
    #[error("a leading minus must be followed by a year")]
    LoneMinus,
    #[error("a minus after a year must be followed by a month")]
    MissingMonth,
    #[error("a minus after a month must be followed by a day")]
    MissingDay,
    #[error("a time following a date must start with 'T'")]
    MissingTimeSeparator,
    #[error("a time must be written hh:mm:ss")]
    MalformedTime,
    #[error("hour must be between 00 and 24")]
    HourOutOfRange,
    #[error("minute must be between 00 and 59")]
    MinuteOutOfRange,
    #[error("second must be between 00 and 59")]
    SecondOutOfRange,
    #[error("fractional seconds must be a '.' followed by digits")]
    MalformedFraction,
    #[error("hour 24 is only allowed as 24:00:00")]
    InvalidHour24,
    #[error("the fields do not form a valid date")]
    InvalidDate,
}

/// An error raised when parsing a duration lexical value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid duration lexical value: {kind}")]
pub struct ParseDurationError {
    kind: DurationLexicalErrorKind,
}

impl ParseDurationError {
    #[inline]
    pub const fn kind(&self) -> DurationLexicalErrorKind {
        self.kind
    }
}

impl From<DurationLexicalErrorKind> for ParseDurationError {
    #[inline]
    fn from(kind: DurationLexicalErrorKind) -> Self {
        Self { kind }
    }
}

/// The lexical rule broken by a duration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum DurationLexicalErrorKind {
    #[error("a duration must start with 'P'")]
    MissingLeadingP,
    #[error("a duration must have at most one 'T'")]
    DuplicateTimeSeparator,
    #[error("each duration field must start with a digit")]
    MissingDigits,
    #[error("a duration field must end with a designator")]
    MissingDesignator,
    #[error("unexpected character in duration")]
    UnexpectedChar,
    #[error("duration fields must follow the Y M D T H M S order")]
    OutOfOrder,
    #[error("only seconds may have a fractional part")]
    UnexpectedFraction,
    #[error("a 'T' must be followed by an hour, minute or second field")]
    EmptyTimeSection,
    #[error("a duration must have at least one field")]
    Empty,
    #[error("a duration field is too large")]
    Overflow,
}

/// A field of a date/time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DateField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Fraction,
    Timezone,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Fraction => "fractional second",
            Self::Timezone => "time zone",
        })
    }
}

/// A field value is outside of its allowed range, or the fields do not fit together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct InvalidFieldError {
    field: DateField,
    reason: &'static str,
}

impl InvalidFieldError {
    #[inline]
    pub(crate) const fn new(field: DateField, reason: &'static str) -> Self {
        Self { field, reason }
    }

    #[inline]
    pub const fn field(&self) -> DateField {
        self.field
    }
}

/// An operation was called on a value that lacks what it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(transparent)]
pub struct InvalidStateError {
    kind: InvalidStateKind,
}

impl InvalidStateError {
    #[inline]
    pub const fn kind(&self) -> InvalidStateKind {
        self.kind
    }
}

impl From<InvalidStateKind> for InvalidStateError {
    #[inline]
    fn from(kind: InvalidStateKind) -> Self {
        Self { kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidStateKind {
    #[error("the operation needs a complete date")]
    IncompleteDate,
    #[error("the operation needs a complete time")]
    MissingTime,
    #[error("the operation needs a time zone")]
    MissingTimezone,
    #[error("the date is before the start of the Julian day count")]
    BeforeJulianEpoch,
    #[error("the resulting year is out of the supported range")]
    YearOutOfRange,
    #[error("the duration has month and day-time parts of opposite signs")]
    MixedSignDuration,
    #[error("arithmetic overflow")]
    Overflow,
}

/// Any error raised by this crate.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum DateTimeError {
    #[error(transparent)]
    ParseDateTime(#[from] ParseDateTimeError),
    #[error(transparent)]
    ParseDuration(#[from] ParseDurationError),
    #[error(transparent)]
    InvalidField(#[from] InvalidFieldError),
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
}

impl From<InvalidStateKind> for DateTimeError {
    #[inline]
    fn from(kind: InvalidStateKind) -> Self {
        Self::InvalidState(kind.into())
    }
}
