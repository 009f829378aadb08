#![expect(clippy::expect_used)]

use crate::builder::DateBuilder;
use crate::decimal::Decimal;
use crate::duration::DurationValue;
use crate::error::{
    DateField, DateTimeError, InvalidFieldError, InvalidStateError, InvalidStateKind,
    ParseDateTimeError,
};
use crate::format::write_natural;
use crate::parser::parse_date;
use crate::specification::{DateFlags, DateSpecification, TimezoneOffset};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::SystemTime;

/// An immutable Gregorian date/time value of the [XML Schema](https://www.w3.org/TR/xmlschema-2/#dateTime)
/// `dateTime`, `time`, `date`, `gYearMonth`, `gYear`, `gMonthDay`, `gDay` and `gMonth` datatypes,
/// or any other combination of their fields.
///
/// A value is always [valid](DateSpecification::is_valid) and never holds hour 24.
/// Two values are equal if they have the same [canonical form](Self::canonical_string),
/// so `2000-01-01T12:00:00+01:00` equals `2000-01-01T11:00:00Z`.
/// Values are only partially ordered, see [`compare_to_date`](Self::compare_to_date).
///
/// ```
/// use oxsdate::{BuiltinType, DateSpecification, DateValue};
/// use std::str::FromStr;
///
/// let value = DateValue::from_str("2000-01-01T12:00:00.50+01:00")?;
/// assert_eq!(value.builtin_type(), Some(BuiltinType::DateTime));
/// assert_eq!(value.to_string(), "2000-01-01T12:00:00.50+01:00");
/// assert_eq!(value.canonical_string(), "2000-01-01T11:00:00.5Z");
/// assert_eq!(value, DateValue::from_str("2000-01-01T11:00:00.5Z")?);
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct DateValue {
    fields: DateBuilder,
    canonical: OnceLock<String>,
}

impl DateValue {
    /// A date/time without time zone.
    ///
    /// Hour 24 is accepted as `24:00:00` and becomes the start of the next day.
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: Option<Decimal>,
    ) -> Result<Self, InvalidFieldError> {
        let mut builder = DateBuilder::new();
        builder.set_year(year)?;
        builder.set_month(month)?;
        builder.set_day(day)?;
        builder.set_time(hour, minute, second, fraction)?;
        Self::try_from(builder)
    }

    /// A date/time with a time zone.
    #[expect(clippy::too_many_arguments)]
    pub fn new_with_timezone(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: Option<Decimal>,
        timezone: TimezoneOffset,
    ) -> Result<Self, InvalidFieldError> {
        let mut builder = DateBuilder::new();
        builder.set_year(year)?;
        builder.set_month(month)?;
        builder.set_day(day)?;
        builder.set_time(hour, minute, second, fraction)?;
        builder.set_timezone(timezone);
        Self::try_from(builder)
    }

    /// Copies and validates any [`DateSpecification`] implementation.
    pub fn from_specification(
        value: &(impl DateSpecification + ?Sized),
    ) -> Result<Self, InvalidFieldError> {
        Self::try_from(DateBuilder::from_specification(value)?)
    }

    /// The current instant in UTC, with a millisecond precision.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("System time before UNIX epoch")
            .as_millis();
        Self::from_epoch_millis(
            i64::try_from(millis)
                .expect("The current time seems way in the future, it's strange"),
            TimezoneOffset::UTC,
        )
        .expect("The current time seems way in the future, it's strange")
    }

    /// The instant `epoch_millis` milliseconds after 1970-01-01T00:00:00Z, seen from `timezone`.
    ///
    /// ```
    /// use oxsdate::{DateValue, TimezoneOffset};
    ///
    /// let timezone = TimezoneOffset::from_minutes(-300)?;
    /// let value = DateValue::from_epoch_millis(1_000_000_000_123, timezone)?;
    /// assert_eq!(value.to_string(), "2001-09-08T20:46:40.123-05:00");
    /// assert_eq!(value.to_epoch_millis()?, 1_000_000_000_123);
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_epoch_millis(
        epoch_millis: i64,
        timezone: TimezoneOffset,
    ) -> Result<Self, DateTimeError> {
        let mut builder = DateBuilder::new();
        builder.set_epoch_millis(epoch_millis, timezone)?;
        Ok(Self::try_from(builder)?)
    }

    /// Milliseconds since 1970-01-01T00:00:00Z, the fraction being truncated.
    ///
    /// The date must be complete. An absent time is midnight and an absent time zone is UTC.
    #[inline]
    pub fn to_epoch_millis(&self) -> Result<i64, InvalidStateError> {
        self.fields.epoch_millis()
    }

    /// The [Julian day number](https://en.wikipedia.org/wiki/Julian_day) of a complete date.
    #[inline]
    pub fn julian_day(&self) -> Result<i64, InvalidStateError> {
        self.fields.julian_day()
    }

    /// The canonical lexical form, computed once.
    ///
    /// Date-times and times with a non-`Z` time zone are moved to UTC
    /// and trailing zeros of the fraction are removed.
    /// Other values keep their natural form.
    #[inline]
    pub fn canonical_string(&self) -> &str {
        self.canonical
            .get_or_init(|| self.fields.canonical_string())
    }

    /// Compares with another value following the
    /// [XML Schema order relation](https://www.w3.org/TR/xmlschema-2/#dateTime-order).
    ///
    /// `Ok(None)` means the values are incomparable.
    ///
    /// ```
    /// use oxsdate::DateValue;
    /// use std::cmp::Ordering;
    /// use std::str::FromStr;
    ///
    /// let value = DateValue::from_str("2000-02-28")?;
    /// assert_eq!(
    ///     value.compare_to_date(&DateValue::from_str("2000-03-01+10:00")?)?,
    ///     Some(Ordering::Less)
    /// );
    /// assert_eq!(value.compare_to_date(&DateValue::from_str("2000-02-28Z")?)?, None);
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn compare_to_date(
        &self,
        other: &(impl DateSpecification + ?Sized),
    ) -> Result<Option<Ordering>, DateTimeError> {
        self.fields.compare_to_date(other)
    }

    /// Adds a duration, see [`DateBuilder::add_duration`].
    ///
    /// ```
    /// use oxsdate::{DateValue, DurationValue};
    /// use std::str::FromStr;
    ///
    /// let value = DateValue::from_str("2000-01-31T23:00:00Z")?;
    /// let later = value.add_duration(&DurationValue::from_str("P1MT2H")?)?;
    /// assert_eq!(later.to_string(), "2000-03-01T01:00:00Z");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn add_duration(&self, duration: &DurationValue) -> Result<Self, DateTimeError> {
        let mut builder = self.to_builder();
        builder.add_duration(duration)?;
        Ok(Self::try_from(builder)?)
    }

    pub fn subtract_duration(&self, duration: &DurationValue) -> Result<Self, DateTimeError> {
        let mut builder = self.to_builder();
        builder.subtract_duration(duration)?;
        Ok(Self::try_from(builder)?)
    }

    /// The same instant expressed in another time zone.
    ///
    /// The value needs a time, a time zone, and either a complete date or no date at all.
    pub fn adjust_to_timezone(&self, timezone: TimezoneOffset) -> Result<Self, DateTimeError> {
        let mut builder = self.to_builder();
        builder.normalize_to_timezone(timezone)?;
        Ok(Self::try_from(builder)?)
    }

    #[inline]
    pub fn to_builder(&self) -> DateBuilder {
        self.fields.clone()
    }

    #[inline]
    pub fn into_builder(self) -> DateBuilder {
        self.fields
    }
}

impl TryFrom<DateBuilder> for DateValue {
    type Error = InvalidFieldError;

    /// Validates the builder fields. Hour 24 becomes hour 0 of the next day.
    fn try_from(mut fields: DateBuilder) -> Result<Self, InvalidFieldError> {
        if !fields.is_valid() {
            return Err(invalid_combination(&fields));
        }
        fields.normalize_24h().map_err(|e| match e.kind() {
            InvalidStateKind::BeforeJulianEpoch => InvalidFieldError::new(
                DateField::Day,
                "the next day is before the start of the Julian day count",
            ),
            _ => InvalidFieldError::new(DateField::Year, "the year is out of the supported range"),
        })?;
        if !fields.is_valid() {
            return Err(invalid_combination(&fields));
        }
        Ok(Self {
            fields,
            canonical: OnceLock::new(),
        })
    }
}

/// The setters check each field alone so only the day can be at fault.
fn invalid_combination(fields: &DateBuilder) -> InvalidFieldError {
    if fields.flags().contains(DateFlags::DAY) {
        InvalidFieldError::new(DateField::Day, "the day does not exist in this month")
    } else {
        InvalidFieldError::new(DateField::Year, "the fields do not form a valid date")
    }
}

impl DateSpecification for DateValue {
    #[inline]
    fn flags(&self) -> DateFlags {
        self.fields.flags()
    }

    #[inline]
    fn year(&self) -> i32 {
        self.fields.year()
    }

    #[inline]
    fn month(&self) -> u8 {
        self.fields.month()
    }

    #[inline]
    fn day(&self) -> u8 {
        self.fields.day()
    }

    #[inline]
    fn hour(&self) -> u8 {
        self.fields.hour()
    }

    #[inline]
    fn minute(&self) -> u8 {
        self.fields.minute()
    }

    #[inline]
    fn second(&self) -> u8 {
        self.fields.second()
    }

    #[inline]
    fn fraction(&self) -> Decimal {
        self.fields.fraction()
    }

    #[inline]
    fn timezone_sign(&self) -> i8 {
        self.fields.timezone_sign()
    }

    #[inline]
    fn timezone_hour(&self) -> u8 {
        self.fields.timezone_hour()
    }

    #[inline]
    fn timezone_minute(&self) -> u8 {
        self.fields.timezone_minute()
    }

    #[inline]
    fn timezone(&self) -> Option<TimezoneOffset> {
        self.fields.timezone()
    }

    #[inline]
    fn is_valid(&self) -> bool {
        true
    }
}

impl FromStr for DateValue {
    type Err = ParseDateTimeError;

    /// Parses any of the date/time lexical forms, surrounding XML whitespace included.
    fn from_str(input: &str) -> Result<Self, ParseDateTimeError> {
        Ok(Self {
            fields: parse_date(input)?,
            canonical: OnceLock::new(),
        })
    }
}

impl fmt::Display for DateValue {
    /// Writes the natural lexical form, fractional digits included as they were given.
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_natural(f, &self.fields)
    }
}

impl PartialEq for DateValue {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.canonical_string() == other.canonical_string()
    }
}

impl Eq for DateValue {}

impl Hash for DateValue {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_string().hash(state)
    }
}

/// A random valid value holding exactly the given fields.
#[cfg(test)]
pub(crate) fn random_date_value(flags: DateFlags) -> Result<DateValue, InvalidFieldError> {
    use rand::random;

    let mut builder = DateBuilder::new();
    if flags.contains(DateFlags::YEAR) {
        // Within the Julian day count so that any time zone shift succeeds
        let year = i32::from(random::<u16>() % 4000) + 1;
        builder.set_year(if random::<bool>() { year } else { -year })?;
    }
    if flags.contains(DateFlags::MONTH) {
        builder.set_month(random::<u8>() % 12 + 1)?;
    }
    if flags.contains(DateFlags::DAY) {
        builder.set_day(random::<u8>() % 28 + 1)?;
    }
    if flags.contains(DateFlags::TIME) {
        let fraction = random::<bool>().then(|| {
            let scale = random::<u32>() % 6 + 1;
            Decimal::new(random::<u32>() % 10_u32.pow(scale), scale)
        });
        builder.set_time(
            random::<u8>() % 24,
            random::<u8>() % 60,
            random::<u8>() % 60,
            fraction,
        )?;
    }
    if flags.contains(DateFlags::TIMEZONE) {
        builder.set_timezone(TimezoneOffset::from_minutes(i32::from(random::<i16>() % 841))?);
    }
    DateValue::try_from(builder)
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use crate::BuiltinType;
    use std::collections::HashSet;
    use std::error::Error;

    #[test]
    fn valid_lexical() -> Result<(), ParseDateTimeError> {
        for input in [
            "",
            "Z",
            "-14:00",
            "999999-12-31T23:59:59.999Z",
            "-4712-01-01T00:00:00Z",
            "1554--31",
            "--02-29",
            "--12-14:00",
            "1970-12-01:00",
            "2010T23:59:59",
            "---31T00:00:00-14:00",
            "1996-02-29T24:00:00Z",
            "24:00:00Z",
            "--02--",
        ] {
            let value = DateValue::from_str(input)?;
            assert!(value.is_valid(), "{input}");
        }
        Ok(())
    }

    #[test]
    fn invalid_lexical() {
        for input in [
            "96-02-28T00:00:00Z",
            "0000-01-01",
            "2100-02-29",
            "--02-30",
            "---32",
            "24:01:00Z",
            "1900-02-08T00:00Z",
            "1996-02-29T00:00:00+14:01",
            "-999999999-02-28T00:00:00Z",
            "X",
            "T",
            "-",
            "0",
            "T00:00:00Z",
            "-00:00:00Z",
        ] {
            assert!(DateValue::from_str(input).is_err(), "{input}");
        }
    }

    #[test]
    fn constructors() -> Result<(), Box<dyn Error>> {
        let value = DateValue::new(2000, 2, 29, 24, 0, 0, None)?;
        assert_eq!(value.to_string(), "2000-03-01T00:00:00");
        assert_eq!(value.builtin_type(), Some(BuiltinType::DateTime));
        let value = DateValue::new_with_timezone(
            -1,
            12,
            31,
            23,
            59,
            59,
            Some(Decimal::from_str("0.25")?),
            TimezoneOffset::MIN,
        )?;
        assert_eq!(value.to_string(), "-0001-12-31T23:59:59.25-14:00");
        assert_eq!(value.millisecond(), 250);
        assert_eq!(
            DateValue::new(2001, 2, 29, 0, 0, 0, None).map_err(|e| e.field()),
            Err(DateField::Day)
        );
        assert_eq!(
            DateValue::new(0, 1, 1, 0, 0, 0, None).map_err(|e| e.field()),
            Err(DateField::Year)
        );
        assert!(DateValue::new(2000, 1, 1, 0, 0, 0, Some(Decimal::from(1))).is_err());
        let error = DateValue::new(-5000, 12, 31, 24, 0, 0, None)
            .err()
            .ok_or("a day before the Julian epoch should be rejected")?;
        assert_eq!(error.field(), DateField::Day);
        assert!(error.to_string().contains("Julian"), "{error}");
        Ok(())
    }

    #[test]
    fn from_builder() -> Result<(), Box<dyn Error>> {
        let mut builder = DateBuilder::new();
        builder.set_month(4)?;
        builder.set_day(31)?;
        assert_eq!(
            DateValue::try_from(builder.clone()).map_err(|e| e.field()),
            Err(DateField::Day)
        );
        builder.set_day(30)?;
        let value = builder.to_date_value()?;
        assert_eq!(value.to_string(), "--04-30");
        assert_eq!(DateValue::from_specification(&value)?, value);
        Ok(())
    }

    #[test]
    fn canonical_string() -> Result<(), ParseDateTimeError> {
        for (input, canonical) in [
            ("2000-01-01T12:00:00+01:00", "2000-01-01T11:00:00Z"),
            ("2000-01-01T12:00:00.000Z", "2000-01-01T12:00:00Z"),
            ("2000-01-01T00:30:00+01:00", "1999-12-31T23:30:00Z"),
            ("12:00:00.50+13:00", "23:00:00.5Z"),
            ("2000-01-01+01:00", "2000-01-01+01:00"),
            ("--01-01T10:00:00-05:00", "--01-01T10:00:00-05:00"),
            ("2000-01-01T12:00:00", "2000-01-01T12:00:00"),
            ("2000-01-01T12:00:00+00:00", "2000-01-01T12:00:00Z"),
            ("10:00:00-00:00", "10:00:00Z"),
        ] {
            let value = DateValue::from_str(input)?;
            assert_eq!(value.canonical_string(), canonical, "{input}");
            assert_eq!(DateValue::from_str(canonical)?, value, "{input}");
        }
        Ok(())
    }

    #[test]
    fn canonical_round_trip() -> Result<(), Box<dyn Error>> {
        for _ in 0..1000 {
            let millis = rand::random::<i64>() % 100_000_000_000_000;
            let timezone = TimezoneOffset::from_minutes(rand::random::<i32>() % 841)?;
            let value = DateValue::from_epoch_millis(millis, timezone)?;
            assert_eq!(value.to_epoch_millis()?, millis);
            assert_eq!(DateValue::from_str(&value.to_string())?, value);
            let canonical = DateValue::from_str(value.canonical_string())?;
            assert_eq!(canonical, value);
            assert_eq!(canonical.canonical_string(), value.canonical_string());
        }
        Ok(())
    }

    #[test]
    fn partial_shapes_round_trip() -> Result<(), Box<dyn Error>> {
        for bits in 0..32 {
            let flags = DateFlags::from_bits(bits).ok_or("unknown field flags")?;
            for _ in 0..100 {
                let value = random_date_value(flags)?;
                let natural = value.to_string();
                let parsed = DateValue::from_str(&natural)?;
                assert_eq!(parsed.flags(), flags, "{natural}");
                assert_eq!(parsed.to_string(), natural);
                assert_eq!(parsed, value, "{natural}");
                let canonical = DateValue::from_str(value.canonical_string())?;
                assert_eq!(canonical.flags(), flags, "{natural}");
                assert_eq!(canonical, value, "{natural}");
                assert_eq!(canonical.canonical_string(), value.canonical_string());
            }
        }
        Ok(())
    }

    #[test]
    fn hour_24_without_day() -> Result<(), ParseDateTimeError> {
        // Without a day there is nothing to carry into
        assert_eq!(DateValue::from_str("2001T24:00:00")?.to_string(), "2001T00:00:00");
        assert_eq!(DateValue::from_str("2001-05T24:00:00Z")?.to_string(), "2001-05T00:00:00Z");
        Ok(())
    }

    #[test]
    fn equality_and_hash() -> Result<(), ParseDateTimeError> {
        let set = [
            "2000-01-01T12:00:00+01:00",
            "2000-01-01T11:00:00Z",
            "2000-01-01T11:00:00.000Z",
            "2000-01-01T06:00:00-05:00",
        ]
        .into_iter()
        .map(DateValue::from_str)
        .collect::<Result<HashSet<_>, _>>()?;
        assert_eq!(set.len(), 1);
        assert_ne!(
            DateValue::from_str("2000-01-01+01:00")?,
            DateValue::from_str("2000-01-01Z")?
        );
        assert_ne!(
            DateValue::from_str("2000-01-01T11:00:00")?,
            DateValue::from_str("2000-01-01T11:00:00Z")?
        );
        Ok(())
    }

    #[test]
    fn arithmetic() -> Result<(), Box<dyn Error>> {
        let value = DateValue::from_str("2000-01-31T00:00:00Z")?;
        let duration = DurationValue::from_str("P1M")?;
        let later = value.add_duration(&duration)?;
        assert_eq!(later.to_string(), "2000-02-29T00:00:00Z");
        assert_eq!(later.subtract_duration(&duration)?.to_string(), "2000-01-29T00:00:00Z");
        assert!(
            DateValue::from_str("--01-31")?
                .add_duration(&DurationValue::from_str("P1D")?)
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn adjust_to_timezone() -> Result<(), Box<dyn Error>> {
        let value = DateValue::from_str("2000-01-01T00:00:00Z")?;
        let adjusted = value.adjust_to_timezone(TimezoneOffset::from_str("+05:30")?)?;
        assert_eq!(adjusted.to_string(), "2000-01-01T05:30:00+05:30");
        assert_eq!(adjusted, value);
        assert!(
            DateValue::from_str("2000-01-01T00:00:00")?
                .adjust_to_timezone(TimezoneOffset::UTC)
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn epoch_and_julian() -> Result<(), Box<dyn Error>> {
        let value = DateValue::from_str("1970-01-02")?;
        assert_eq!(value.to_epoch_millis()?, 86_400_000);
        assert_eq!(value.julian_day()?, 2_440_589);
        assert!(DateValue::from_str("1970-01")?.julian_day().is_err());
        let now = DateValue::now();
        assert!(now.has_date() && now.has_time());
        assert_eq!(now.timezone(), Some(TimezoneOffset::UTC));
        Ok(())
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DateValue>();
        assert_send_sync::<DurationValue>();
    }
}
