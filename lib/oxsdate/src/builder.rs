use crate::compare::compare_dates;
use crate::date::DateValue;
use crate::decimal::Decimal;
use crate::duration::DurationValue;
use crate::error::{
    DateField, DateTimeError, InvalidFieldError, InvalidStateError, InvalidStateKind,
    ParseDateTimeError,
};
use crate::format::write_natural;
use crate::specification::{BuiltinType, DateFlags, DateSpecification, TimezoneOffset};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The greatest supported year, the last one representable in milliseconds since 1970.
pub const MAX_YEAR: i32 = 292_277_265;
/// The smallest supported year, the first one representable in milliseconds since 1970.
pub const MIN_YEAR: i32 = -292_275_295;

/// Julian day number of 1970-01-01.
const UNIX_EPOCH_JULIAN_DAY: i64 = 2_440_588;

/// A mutable Gregorian date/time with any subset of year, month, day, time and time zone.
///
/// Setters only check that each field is within its own range, so a builder can hold
/// a combination that is not a valid date (e.g. February 31).
/// [`is_valid`](DateSpecification::is_valid) tells if it is,
/// and converting to a [`DateValue`] fails if it is not.
///
/// ```
/// use oxsdate::{DateBuilder, DateSpecification, DurationValue};
/// use std::str::FromStr;
///
/// let mut builder = DateBuilder::from_str("2000-02-29")?;
/// builder.add_duration(&DurationValue::from_str("P1Y")?)?;
/// assert_eq!(builder.to_string(), "2001-02-28");
/// assert!(builder.is_valid());
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct DateBuilder {
    flags: DateFlags,
    /// Astronomical year: 1 BC is 0, 2 BC is -1...
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    fraction: Decimal,
    timezone: TimezoneOffset,
}

impl DateBuilder {
    /// A builder without any field.
    #[inline]
    pub fn new() -> Self {
        Self {
            flags: DateFlags::empty(),
            year: 0,
            month: 0,
            day: 0,
            hour: 0,
            minute: 0,
            second: 0,
            fraction: Decimal::default(),
            timezone: TimezoneOffset::UTC,
        }
    }

    /// Copies the fields of any [`DateSpecification`] implementation.
    pub fn from_specification(
        value: &(impl DateSpecification + ?Sized),
    ) -> Result<Self, InvalidFieldError> {
        let mut builder = Self::new();
        if value.has_year() {
            builder.set_year(value.year())?;
        }
        if value.has_month() {
            builder.set_month(value.month())?;
        }
        if value.has_day() {
            builder.set_day(value.day())?;
        }
        if value.has_time() {
            builder.set_time(
                value.hour(),
                value.minute(),
                value.second(),
                Some(value.fraction()),
            )?;
        }
        if value.has_timezone() {
            builder.set_timezone(TimezoneOffset::new(
                value.timezone_sign(),
                value.timezone_hour(),
                value.timezone_minute(),
            )?);
        }
        Ok(builder)
    }

    /// Sets the year. There is no year zero: the year before 1 is -1.
    pub fn set_year(&mut self, year: i32) -> Result<(), InvalidFieldError> {
        if year == 0 {
            return Err(InvalidFieldError::new(
                DateField::Year,
                "year zero does not exist",
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(InvalidFieldError::new(
                DateField::Year,
                "the year is out of the supported range",
            ));
        }
        self.year = to_astronomical(year);
        self.flags.set(DateFlags::YEAR, true);
        Ok(())
    }

    pub fn set_month(&mut self, month: u8) -> Result<(), InvalidFieldError> {
        if !(1..=12).contains(&month) {
            return Err(InvalidFieldError::new(
                DateField::Month,
                "the month must be between 1 and 12",
            ));
        }
        self.month = month;
        self.flags.set(DateFlags::MONTH, true);
        Ok(())
    }

    /// Sets the day of month. It is only checked against the 31 days limit.
    pub fn set_day(&mut self, day: u8) -> Result<(), InvalidFieldError> {
        if !(1..=31).contains(&day) {
            return Err(InvalidFieldError::new(
                DateField::Day,
                "the day must be between 1 and 31",
            ));
        }
        self.day = day;
        self.flags.set(DateFlags::DAY, true);
        Ok(())
    }

    /// Sets the time of day.
    ///
    /// The fraction must be in `[0, 1)`.
    /// Hour 24 is only accepted as `24:00:00` with a zero fraction.
    pub fn set_time(
        &mut self,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: Option<Decimal>,
    ) -> Result<(), InvalidFieldError> {
        let fraction = fraction.unwrap_or_default();
        if hour > 24 {
            return Err(InvalidFieldError::new(
                DateField::Hour,
                "the hour must be between 0 and 24",
            ));
        }
        if minute > 59 {
            return Err(InvalidFieldError::new(
                DateField::Minute,
                "the minute must be between 0 and 59",
            ));
        }
        if second > 59 {
            return Err(InvalidFieldError::new(
                DateField::Second,
                "the second must be between 0 and 59",
            ));
        }
        if !fraction.is_fraction_of_unit() {
            return Err(InvalidFieldError::new(
                DateField::Fraction,
                "the fraction must be at least 0 and less than 1",
            ));
        }
        if hour == 24 && (minute != 0 || second != 0 || !fraction.is_zero()) {
            return Err(InvalidFieldError::new(
                DateField::Hour,
                "hour 24 is only allowed as 24:00:00",
            ));
        }
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self.fraction = fraction;
        self.flags.set(DateFlags::TIME, true);
        Ok(())
    }

    #[inline]
    pub fn set_timezone(&mut self, timezone: TimezoneOffset) {
        self.timezone = timezone;
        self.flags.set(DateFlags::TIMEZONE, true);
    }

    /// Sets the time zone from an offset in minutes, 0 being `Z`.
    pub fn set_timezone_minutes(
        &mut self,
        offset_in_minutes: i32,
    ) -> Result<(), InvalidFieldError> {
        self.set_timezone(TimezoneOffset::from_minutes(offset_in_minutes)?);
        Ok(())
    }

    pub fn clear_year(&mut self) {
        self.year = 0;
        self.flags.set(DateFlags::YEAR, false);
    }

    pub fn clear_month(&mut self) {
        self.month = 0;
        self.flags.set(DateFlags::MONTH, false);
    }

    pub fn clear_day(&mut self) {
        self.day = 0;
        self.flags.set(DateFlags::DAY, false);
    }

    pub fn clear_time(&mut self) {
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
        self.fraction = Decimal::default();
        self.flags.set(DateFlags::TIME, false);
    }

    pub fn clear_timezone(&mut self) {
        self.timezone = TimezoneOffset::UTC;
        self.flags.set(DateFlags::TIMEZONE, false);
    }

    /// Clears the fields a value of the given type does not have.
    ///
    /// The time zone is kept.
    pub fn set_builtin_type(&mut self, builtin: BuiltinType) {
        let kept = builtin.flags();
        if !kept.contains(DateFlags::YEAR) {
            self.clear_year();
        }
        if !kept.contains(DateFlags::MONTH) {
            self.clear_month();
        }
        if !kept.contains(DateFlags::DAY) {
            self.clear_day();
        }
        if !kept.contains(DateFlags::TIME) {
            self.clear_time();
        }
    }

    /// Brings every field into its normal range.
    ///
    /// Hour 24 becomes hour 0 of the next day and trailing zeros of the fraction are removed.
    /// If there is a time and a time zone, and the date is either complete or absent,
    /// the value is also moved to UTC.
    pub fn normalize(&mut self) -> Result<(), InvalidStateError> {
        self.normalize_time_and_date()?;
        if self.has_uniform_date() && self.has_timezone() && self.has_time() {
            self.normalize_to_timezone(TimezoneOffset::UTC)?;
        }
        if self.has_time() {
            self.fraction = self.fraction.strip_trailing_zeros();
        }
        Ok(())
    }

    /// Turns `24:00:00` into `00:00:00` of the next day.
    ///
    /// The day carry is lost if there is no day.
    pub(crate) fn normalize_24h(&mut self) -> Result<(), InvalidStateError> {
        if self.has_time() && self.hour == 24 {
            self.normalize_time_and_date()?;
        }
        Ok(())
    }

    fn normalize_time_and_date(&mut self) -> Result<(), InvalidStateError> {
        let carry = if self.has_time() {
            self.normalize_time(
                i64::from(self.hour),
                i64::from(self.minute),
                i64::from(self.second),
            )?
        } else {
            0
        };
        if self.has_date() {
            self.normalize_date(i64::from(self.day) + carry)?;
        } else if self.has_day() && carry != 0 {
            // Without a month the day can't wrap, it is left for validation to reject.
            self.day = u8::try_from(i64::from(self.day) + carry)
                .map_err(|_| InvalidStateKind::Overflow)?;
        }
        Ok(())
    }

    /// Expresses the same instant in another time zone.
    ///
    /// The value needs a time, a time zone, and either a complete date or no date at all.
    pub fn normalize_to_timezone(
        &mut self,
        timezone: TimezoneOffset,
    ) -> Result<(), InvalidStateError> {
        if !self.has_timezone() {
            return Err(InvalidStateKind::MissingTimezone.into());
        }
        if !self.has_time() {
            return Err(InvalidStateKind::MissingTime.into());
        }
        if !self.has_uniform_date() {
            return Err(InvalidStateKind::IncompleteDate.into());
        }
        let shift = timezone.total_minutes() - self.timezone.total_minutes();
        self.timezone = timezone;
        self.apply_duration(
            1,
            &DurationValue::new(1, 0, 0, 0, 0, shift, 0, Decimal::default()),
        )
    }

    /// Same as [`normalize_to_timezone`](Self::normalize_to_timezone) with an offset in minutes.
    pub fn normalize_to_timezone_minutes(
        &mut self,
        offset_in_minutes: i32,
    ) -> Result<(), DateTimeError> {
        Ok(self.normalize_to_timezone(TimezoneOffset::from_minutes(offset_in_minutes)?)?)
    }

    /// Adds a duration.
    ///
    /// Years and months are added first, the day being pegged to the last day of a shorter month.
    /// Then the day-time part is added with carries.
    /// Durations with a day-time part need a time, and a complete date if there is a day.
    pub fn add_duration(&mut self, duration: &DurationValue) -> Result<(), InvalidStateError> {
        self.apply_duration(1, duration)
    }

    pub fn subtract_duration(&mut self, duration: &DurationValue) -> Result<(), InvalidStateError> {
        self.apply_duration(-1, duration)
    }

    fn apply_duration(
        &mut self,
        sign: i64,
        duration: &DurationValue,
    ) -> Result<(), InvalidStateError> {
        let sign = sign * i64::from(duration.sign());
        let fraction = duration.fraction();
        let time_math = duration.hours() != 0
            || duration.minutes() != 0
            || duration.seconds() != 0
            || !fraction.is_zero();
        if time_math && !self.has_time() {
            return Err(InvalidStateKind::MissingTime.into());
        }
        let date_math = self.has_day() && (duration.days() != 0 || time_math);
        if date_math && !self.has_date() {
            return Err(InvalidStateKind::IncompleteDate.into());
        }

        if duration.years() != 0 || duration.months() != 0 {
            if self.has_date() {
                self.normalize_date(i64::from(self.day))?;
            }
            let months = sign * (i64::from(duration.years()) * 12 + i64::from(duration.months()));
            let month = if self.has_month() {
                i64::from(self.month) - 1 + months
            } else {
                months
            };
            if self.has_month() {
                self.month = to_u8(month.rem_euclid(12) + 1)?;
            }
            if self.has_year() {
                self.set_astronomical_year(i64::from(self.year) + month.div_euclid(12))?;
            }
            if self.has_day() && self.has_month() {
                let year = self.has_year().then_some(self.year);
                self.day = self.day.min(max_day_in_month(year, self.month));
            }
        }

        let mut carry = 0;
        if time_math {
            self.fraction = if sign < 0 {
                &self.fraction - fraction
            } else {
                &self.fraction + fraction
            };
            carry = self.normalize_time(
                i64::from(self.hour) + sign * i64::from(duration.hours()),
                i64::from(self.minute) + sign * i64::from(duration.minutes()),
                i64::from(self.second) + sign * i64::from(duration.seconds()),
            )?;
        }
        if date_math {
            self.normalize_date(i64::from(self.day) + sign * i64::from(duration.days()) + carry)?;
        }
        Ok(())
    }

    /// Stores the given time fields wrapped into their ranges and returns the days carried out.
    ///
    /// The fraction is wrapped into `[0, 1)` first, its integer part going to the seconds.
    fn normalize_time(
        &mut self,
        hour: i64,
        minute: i64,
        second: i64,
    ) -> Result<i64, InvalidStateError> {
        let mut second = second;
        if !self.fraction.is_fraction_of_unit() {
            let carry = self.fraction.floor();
            self.fraction = &self.fraction - &carry;
            second = carry
                .to_i64()
                .and_then(|carry| second.checked_add(carry))
                .ok_or(InvalidStateKind::Overflow)?;
        }
        let minute = minute + second.div_euclid(60);
        let hour = hour + minute.div_euclid(60);
        self.second = to_u8(second.rem_euclid(60))?;
        self.minute = to_u8(minute.rem_euclid(60))?;
        self.hour = to_u8(hour.rem_euclid(24))?;
        Ok(hour.div_euclid(24))
    }

    /// Stores the given day of the current month, going through the Julian day if it overflows.
    fn normalize_date(&mut self, day: i64) -> Result<(), InvalidStateError> {
        let max = i64::from(max_day_in_month(Some(self.year), self.month));
        if (1..=max).contains(&day) {
            self.day = to_u8(day)?;
            return Ok(());
        }
        let first = julian_day_of(self.year, self.month, 1)?;
        self.set_julian_day(
            first
                .checked_add(day - 1)
                .ok_or(InvalidStateKind::Overflow)?,
        )
    }

    /// The [Julian day number](https://en.wikipedia.org/wiki/Julian_day) of the date.
    pub fn julian_day(&self) -> Result<i64, InvalidStateError> {
        if !self.has_date() {
            return Err(InvalidStateKind::IncompleteDate.into());
        }
        julian_day_of(self.year, self.month, self.day)
    }

    /// Sets year, month and day from a Julian day number.
    pub fn set_julian_day(&mut self, julian_day: i64) -> Result<(), InvalidStateError> {
        let (year, month, day) = civil_from_julian_day(julian_day)?;
        self.set_astronomical_year(year)?;
        self.month = month;
        self.day = day;
        self.flags.set(DateFlags::DATE, true);
        Ok(())
    }

    fn set_astronomical_year(&mut self, year: i64) -> Result<(), InvalidStateError> {
        let year = i32::try_from(year)
            .ok()
            .filter(|y| (to_astronomical(MIN_YEAR)..=MAX_YEAR).contains(y))
            .ok_or(InvalidStateKind::YearOutOfRange)?;
        self.year = year;
        self.flags.set(DateFlags::YEAR, true);
        Ok(())
    }

    /// Milliseconds since 1970-01-01T00:00:00Z.
    ///
    /// The date must be complete. An absent time is midnight and an absent time zone is UTC.
    pub fn epoch_millis(&self) -> Result<i64, InvalidStateError> {
        let days = self.julian_day()? - UNIX_EPOCH_JULIAN_DAY;
        let minutes = i64::from(self.hour) * 60 + i64::from(self.minute)
            - i64::from(self.timezone.total_minutes());
        let millis = (minutes * 60 + i64::from(self.second)) * 1000 + i64::from(self.millisecond());
        days.checked_mul(86_400_000)
            .and_then(|days| days.checked_add(millis))
            .ok_or_else(|| InvalidStateKind::Overflow.into())
    }

    /// Sets the date and time to the instant `epoch_millis` milliseconds after
    /// 1970-01-01T00:00:00Z, seen from `timezone`.
    pub fn set_epoch_millis(
        &mut self,
        epoch_millis: i64,
        timezone: TimezoneOffset,
    ) -> Result<(), InvalidStateError> {
        self.set_timezone(timezone);
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
        self.fraction = Decimal::default();
        self.flags.set(DateFlags::TIME, true);
        self.set_julian_day(UNIX_EPOCH_JULIAN_DAY)?;
        let local_millis = epoch_millis
            .checked_add(i64::from(timezone.total_minutes()) * 60_000)
            .ok_or(InvalidStateKind::Overflow)?;
        self.add_duration(&DurationValue::new(
            1,
            0,
            0,
            0,
            0,
            0,
            0,
            Decimal::new(local_millis, 3),
        ))?;
        self.fraction = self.fraction.strip_trailing_zeros();
        Ok(())
    }

    /// Compares with another value. `None` means the two are incomparable.
    pub fn compare_to_date(
        &self,
        other: &(impl DateSpecification + ?Sized),
    ) -> Result<Option<Ordering>, DateTimeError> {
        compare_dates(self, other)
    }

    /// The canonical lexical form.
    ///
    /// Date-times and times with a non-`Z` time zone are moved to UTC
    /// and trailing zeros of the fraction are removed.
    pub fn canonical_string(&self) -> String {
        let to_utc = self.has_timezone()
            && self.timezone.sign() != 0
            && self.has_time()
            && self.has_uniform_date();
        if !to_utc && !self.fraction.has_trailing_zero() {
            return self.to_string();
        }
        let mut canonical = self.clone();
        if canonical.normalize().is_err() {
            // The UTC instant is out of the supported range
            canonical = self.clone();
            canonical.fraction = self.fraction.strip_trailing_zeros();
        }
        canonical.to_string()
    }

    /// Validates the fields and builds an immutable value.
    pub fn to_date_value(&self) -> Result<DateValue, InvalidFieldError> {
        DateValue::try_from(self.clone())
    }

    /// Fills the absent fields with the first instant of 1584, the first full Gregorian leap year.
    pub(crate) fn set_to_first_moment(&mut self) {
        if !self.has_year() {
            self.year = 1584;
        }
        if !self.has_month() {
            self.month = 1;
        }
        if !self.has_day() {
            self.day = 1;
        }
        if !self.has_time() {
            self.hour = 0;
            self.minute = 0;
            self.second = 0;
            self.fraction = Decimal::default();
        }
        self.flags.set(DateFlags::DATE | DateFlags::TIME, true);
    }

    /// Year, month and day are either all present or all absent.
    fn has_uniform_date(&self) -> bool {
        let date = self.flags & DateFlags::DATE;
        date.is_empty() || date == DateFlags::DATE
    }
}

impl Default for DateBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DateSpecification for DateBuilder {
    #[inline]
    fn flags(&self) -> DateFlags {
        self.flags
    }

    #[inline]
    fn year(&self) -> i32 {
        if self.has_year() {
            from_astronomical(self.year)
        } else {
            0
        }
    }

    #[inline]
    fn month(&self) -> u8 {
        self.month
    }

    #[inline]
    fn day(&self) -> u8 {
        self.day
    }

    #[inline]
    fn hour(&self) -> u8 {
        self.hour
    }

    #[inline]
    fn minute(&self) -> u8 {
        self.minute
    }

    #[inline]
    fn second(&self) -> u8 {
        self.second
    }

    #[inline]
    fn fraction(&self) -> Decimal {
        self.fraction.clone()
    }

    #[inline]
    fn timezone_sign(&self) -> i8 {
        if self.has_timezone() {
            self.timezone.sign()
        } else {
            0
        }
    }

    #[inline]
    fn timezone_hour(&self) -> u8 {
        if self.has_timezone() {
            self.timezone.hour()
        } else {
            0
        }
    }

    #[inline]
    fn timezone_minute(&self) -> u8 {
        if self.has_timezone() {
            self.timezone.minute()
        } else {
            0
        }
    }

    #[inline]
    fn timezone(&self) -> Option<TimezoneOffset> {
        self.has_timezone().then_some(self.timezone)
    }
}

impl From<DateValue> for DateBuilder {
    #[inline]
    fn from(value: DateValue) -> Self {
        value.into_builder()
    }
}

impl From<&DateValue> for DateBuilder {
    #[inline]
    fn from(value: &DateValue) -> Self {
        value.to_builder()
    }
}

impl FromStr for DateBuilder {
    type Err = ParseDateTimeError;

    /// Parses like [`DateValue`], so the result is always valid.
    #[inline]
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(DateValue::from_str(input)?.into_builder())
    }
}

impl fmt::Display for DateBuilder {
    /// Writes the natural lexical form.
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_natural(f, self)
    }
}

/// Checks the field ranges and their combination:
/// the day must exist in the month (of the year if known, February having 29 days otherwise),
/// the time must be in range with `24:00:00` allowed, and the time zone within ±14:00.
pub(crate) fn is_valid_date(value: &(impl DateSpecification + ?Sized)) -> bool {
    if value.has_year() && value.year() == 0 {
        return false;
    }
    if value.has_month() && !(1..=12).contains(&value.month()) {
        return false;
    }
    if value.has_day() {
        let max = if value.has_month() {
            max_day_in_month(
                value.has_year().then(|| to_astronomical(value.year())),
                value.month(),
            )
        } else {
            31
        };
        if !(1..=max).contains(&value.day()) {
            return false;
        }
    }
    if value.has_time() {
        let fraction = value.fraction();
        if !fraction.is_fraction_of_unit() {
            return false;
        }
        let midnight = value.hour() == 24
            && value.minute() == 0
            && value.second() == 0
            && fraction.is_zero();
        if !midnight && (value.hour() > 23 || value.minute() > 59 || value.second() > 59) {
            return false;
        }
    }
    if value.has_timezone()
        && TimezoneOffset::new(
            value.timezone_sign(),
            value.timezone_hour(),
            value.timezone_minute(),
        )
        .is_err()
    {
        return false;
    }
    true
}

/// Converts a Gregorian date to its [Julian day number](https://en.wikipedia.org/wiki/Julian_day).
///
/// The year has no zero: 1 BC is -1.
/// Dates before the start of the count (November 24, 4714 BC) are rejected.
///
/// ```
/// assert_eq!(oxsdate::gregorian_to_julian(1970, 1, 1)?, 2_440_588);
/// # Ok::<_, oxsdate::DateTimeError>(())
/// ```
pub fn gregorian_to_julian(year: i32, month: u8, day: u8) -> Result<i64, DateTimeError> {
    if year == 0 {
        return Err(InvalidFieldError::new(DateField::Year, "year zero does not exist").into());
    }
    Ok(julian_day_of(to_astronomical(year), month, day)?)
}

/// Converts a [Julian day number](https://en.wikipedia.org/wiki/Julian_day) to a Gregorian
/// `(year, month, day)`, the year having no zero.
pub fn julian_to_gregorian(julian_day: i64) -> Result<(i32, u8, u8), InvalidStateError> {
    let (year, month, day) = civil_from_julian_day(julian_day)?;
    let year = i32::try_from(year).map_err(|_| InvalidStateKind::YearOutOfRange)?;
    Ok((from_astronomical(year), month, day))
}

/// Fliegel & Van Flandern algorithm, on an astronomical year.
fn julian_day_of(year: i32, month: u8, day: u8) -> Result<i64, InvalidStateError> {
    let (y, m, d) = (i64::from(year), i64::from(month), i64::from(day));
    let julian_day = d - 32_075 + 1461 * (y + 4800 + (m - 14) / 12) / 4
        + 367 * (m - 2 - (m - 14) / 12 * 12) / 12
        - 3 * ((y + 4900 + (m - 14) / 12) / 100) / 4;
    if julian_day < 0 {
        return Err(InvalidStateKind::BeforeJulianEpoch.into());
    }
    Ok(julian_day)
}

/// Inverse of [`julian_day_of`]
fn civil_from_julian_day(julian_day: i64) -> Result<(i64, u8, u8), InvalidStateError> {
    if julian_day < 0 {
        return Err(InvalidStateKind::BeforeJulianEpoch.into());
    }
    if julian_day > 1 << 40 {
        // Far beyond the greatest supported year
        return Err(InvalidStateKind::YearOutOfRange.into());
    }
    let mut temp = julian_day + 68_569;
    let century = 4 * temp / 146_097;
    temp -= (146_097 * century + 3) / 4;
    let mut year = 4000 * (temp + 1) / 1_461_001;
    temp = temp - 1461 * year / 4 + 31;
    let mut month = 80 * temp / 2447;
    let day = temp - 2447 * month / 80;
    temp = month / 11;
    month = month + 2 - 12 * temp;
    year = 100 * (century - 49) + year + temp;
    Ok((year, to_u8(month)?, to_u8(day)?))
}

/// The number of days of a month, February having 29 days when the year is unknown.
///
/// The year is astronomical.
fn max_day_in_month(year: Option<i32>, month: u8) -> u8 {
    match month {
        2 => match year {
            Some(y) if y % 4 != 0 || (y % 100 == 0 && y % 400 != 0) => 28,
            _ => 29,
        },
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

#[inline]
const fn to_astronomical(year: i32) -> i32 {
    if year > 0 { year } else { year + 1 }
}

#[inline]
const fn from_astronomical(year: i32) -> i32 {
    if year > 0 { year } else { year - 1 }
}

#[inline]
fn to_u8(value: i64) -> Result<u8, InvalidStateError> {
    u8::try_from(value).map_err(|_| InvalidStateKind::Overflow.into())
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use std::error::Error;

    fn add(date: &str, duration: &str) -> Result<String, Box<dyn Error>> {
        let mut builder = DateBuilder::from_str(date)?;
        builder.add_duration(&DurationValue::from_str(duration)?)?;
        Ok(builder.to_string())
    }

    fn subtract(date: &str, duration: &str) -> Result<String, Box<dyn Error>> {
        let mut builder = DateBuilder::from_str(date)?;
        builder.subtract_duration(&DurationValue::from_str(duration)?)?;
        Ok(builder.to_string())
    }

    #[test]
    fn setters() -> Result<(), InvalidFieldError> {
        let mut builder = DateBuilder::new();
        builder.set_year(-1)?;
        builder.set_month(2)?;
        builder.set_day(29)?;
        assert_eq!(builder.year(), -1);
        assert!(builder.is_valid());
        assert_eq!(builder.to_string(), "-0001-02-29");
        builder.set_year(1)?;
        assert!(!builder.is_valid());

        assert_eq!(
            builder.set_year(0).map_err(|e| e.field()),
            Err(DateField::Year)
        );
        assert!(builder.set_year(MAX_YEAR + 1).is_err());
        assert!(builder.set_year(MIN_YEAR).is_ok());
        assert!(builder.set_month(13).is_err());
        assert!(builder.set_day(0).is_err());
        assert!(builder.set_time(24, 0, 1, None).is_err());
        assert!(builder.set_time(23, 60, 0, None).is_err());
        assert!(
            builder
                .set_time(23, 0, 0, Some(Decimal::new(10, 1)))
                .is_err()
        );
        assert!(builder.set_time(24, 0, 0, None).is_ok());
        assert!(builder.set_timezone_minutes(900).is_err());
        builder.set_timezone_minutes(-90)?;
        assert_eq!(
            builder.timezone().map(|tz| tz.to_string()).as_deref(),
            Some("-01:30")
        );
        Ok(())
    }

    #[test]
    fn clear_and_builtin_type() -> Result<(), Box<dyn Error>> {
        let mut builder = DateBuilder::from_str("2001-08-06T10:00:00+02:00")?;
        assert_eq!(builder.builtin_type(), Some(BuiltinType::DateTime));
        builder.set_builtin_type(BuiltinType::GMonthDay);
        assert_eq!(builder.to_string(), "--08-06+02:00");
        builder.clear_timezone();
        builder.clear_month();
        assert_eq!(builder.to_string(), "---06");
        assert_eq!(builder.builtin_type(), Some(BuiltinType::GDay));
        builder.set_year(1554)?;
        assert_eq!(builder.to_string(), "1554--06");
        assert_eq!(builder.builtin_type(), None);
        Ok(())
    }

    #[test]
    fn validity() -> Result<(), Box<dyn Error>> {
        let mut builder = DateBuilder::new();
        builder.set_month(2)?;
        builder.set_day(29)?;
        assert!(builder.is_valid());
        builder.set_day(30)?;
        assert!(!builder.is_valid());
        builder.set_month(4)?;
        builder.set_day(31)?;
        assert!(!builder.is_valid());
        builder.clear_month();
        assert!(builder.is_valid());
        for (year, leap) in [
            (2000, true),
            (1900, false),
            (2004, true),
            (-1, true),
            (-5, true),
            (-2, false),
        ] {
            let mut builder = DateBuilder::new();
            builder.set_year(year)?;
            builder.set_month(2)?;
            builder.set_day(29)?;
            assert_eq!(builder.is_valid(), leap, "{year}");
        }
        Ok(())
    }

    #[test]
    fn julian_days() -> Result<(), Box<dyn Error>> {
        assert_eq!(gregorian_to_julian(1970, 1, 1)?, UNIX_EPOCH_JULIAN_DAY);
        assert_eq!(gregorian_to_julian(2000, 1, 1)?, 2_451_545);
        assert_eq!(gregorian_to_julian(-4714, 11, 24)?, 0);
        assert_eq!(julian_to_gregorian(0)?, (-4714, 11, 24));
        assert_eq!(julian_to_gregorian(2_451_545)?, (2000, 1, 1));
        assert_eq!(
            gregorian_to_julian(-4714, 11, 23).map_err(|e| e.to_string()).err(),
            Some("the date is before the start of the Julian day count".to_owned())
        );
        assert_eq!(
            julian_to_gregorian(-1).map_err(|e| e.kind()),
            Err(InvalidStateKind::BeforeJulianEpoch)
        );
        assert!(gregorian_to_julian(0, 1, 1).is_err());
        assert_eq!(
            DateBuilder::from_str("--02-28")?.julian_day().map_err(|e| e.kind()),
            Err(InvalidStateKind::IncompleteDate)
        );
        Ok(())
    }

    #[test]
    fn julian_round_trip() -> Result<(), Box<dyn Error>> {
        for _ in 0..1000 {
            let julian_day = i64::from(rand::random::<u32>() % 100_000_000);
            let (year, month, day) = julian_to_gregorian(julian_day)?;
            assert_eq!(gregorian_to_julian(year, month, day)?, julian_day);
        }
        let mut builder = DateBuilder::new();
        builder.set_julian_day(2_299_161)?;
        assert_eq!(builder.to_string(), "1582-10-15");
        Ok(())
    }

    #[test]
    fn add_duration() -> Result<(), Box<dyn Error>> {
        assert_eq!(add("-0001-01-01", "P3Y")?, "0003-01-01");
        assert_eq!(add("-0001-01-01", "P1Y")?, "0001-01-01");
        assert_eq!(add("0001-01-01", "-P1Y")?, "-0001-01-01");
        assert_eq!(add("2000-02-29", "P1Y")?, "2001-02-28");
        assert_eq!(add("2000-01-31", "P1M")?, "2000-02-29");
        assert_eq!(add("2000-01-31", "P1M1D")?, "2000-03-01");
        assert_eq!(add("2000-12-15", "P1M")?, "2001-01-15");
        assert_eq!(
            add("1970-01-01T00:00:00", "-P1Y1M1DT1H1M1.1S")?,
            "1968-11-29T22:58:58.9"
        );
        assert_eq!(
            add("0001-01-01T00:00:00", "-P1Y1M1DT1H1M1.1S")?,
            "-0002-11-29T22:58:58.9"
        );
        assert_eq!(
            add("1999-12-31T23:59:59.5Z", "PT0.5S")?,
            "2000-01-01T00:00:00.0Z"
        );
        assert_eq!(add("2000-03-01T00:00:00", "PT86400S")?, "2000-03-02T00:00:00");
        assert_eq!(add("23:00:00", "PT2H")?, "01:00:00");
        assert_eq!(add("--12-15", "P1M")?, "--01-15");
        assert_eq!(add("--01-31", "P1M")?, "--02-29");
        assert_eq!(add("2000", "P13M")?, "2001");
        assert_eq!(add("2000-12", "P1M")?, "2001-01");
        assert_eq!(add("---15", "P2M")?, "---15");
        Ok(())
    }

    #[test]
    fn subtract_duration() -> Result<(), Box<dyn Error>> {
        assert_eq!(subtract("2000-03-01", "P1D")?, "2000-02-29");
        assert_eq!(subtract("2001-03-31", "P1M")?, "2001-02-28");
        // A missing month counts as January when carrying into the year
        assert_eq!(subtract("2000", "P1M")?, "1999");
        assert_eq!(add("2000", "P1M")?, "2000");
        assert_eq!(subtract("2000-05Z", "P5M")?, "1999-12Z");
        assert_eq!(subtract("2000-01-01T00:00:00Z", "PT0.001S")?, "1999-12-31T23:59:59.999Z");
        assert_eq!(
            subtract("1970-01-01T00:00:00", "-P1Y1M1DT1H1M1.1S")?,
            "1971-02-02T01:01:01.1"
        );
        Ok(())
    }

    #[test]
    fn add_duration_errors() -> Result<(), Box<dyn Error>> {
        let mut builder = DateBuilder::from_str("2000-01-01")?;
        assert_eq!(
            builder
                .add_duration(&DurationValue::from_str("PT1H")?)
                .map_err(|e| e.kind()),
            Err(InvalidStateKind::MissingTime)
        );
        let mut builder = DateBuilder::from_str("--02-28T10:00:00")?;
        assert_eq!(
            builder
                .add_duration(&DurationValue::from_str("P1D")?)
                .map_err(|e| e.kind()),
            Err(InvalidStateKind::IncompleteDate)
        );
        let mut builder = DateBuilder::from_str("292277265-12-31")?;
        assert_eq!(
            builder
                .add_duration(&DurationValue::from_str("P1D")?)
                .map_err(|e| e.kind()),
            Err(InvalidStateKind::YearOutOfRange)
        );
        Ok(())
    }

    #[test]
    fn normalize_to_timezone() -> Result<(), Box<dyn Error>> {
        let mut builder = DateBuilder::from_str("2000-03-01T01:00:00+02:00")?;
        builder.normalize_to_timezone(TimezoneOffset::UTC)?;
        assert_eq!(builder.to_string(), "2000-02-29T23:00:00Z");
        builder.normalize_to_timezone(TimezoneOffset::MIN)?;
        assert_eq!(builder.to_string(), "2000-02-29T09:00:00-14:00");
        builder.normalize_to_timezone_minutes(330)?;
        assert_eq!(builder.to_string(), "2000-03-01T04:30:00+05:30");

        let mut builder = DateBuilder::from_str("01:00:00+02:00")?;
        builder.normalize_to_timezone(TimezoneOffset::UTC)?;
        assert_eq!(builder.to_string(), "23:00:00Z");

        let mut builder = DateBuilder::from_str("2000-03-01T01:00:00")?;
        assert_eq!(
            builder
                .normalize_to_timezone(TimezoneOffset::UTC)
                .map_err(|e| e.kind()),
            Err(InvalidStateKind::MissingTimezone)
        );
        let mut builder = DateBuilder::from_str("--03-01T01:00:00Z")?;
        assert_eq!(
            builder
                .normalize_to_timezone(TimezoneOffset::MAX)
                .map_err(|e| e.kind()),
            Err(InvalidStateKind::IncompleteDate)
        );
        let mut builder = DateBuilder::from_str("2000-03-01Z")?;
        assert_eq!(
            builder
                .normalize_to_timezone(TimezoneOffset::MAX)
                .map_err(|e| e.kind()),
            Err(InvalidStateKind::MissingTime)
        );
        Ok(())
    }

    #[test]
    fn normalize() -> Result<(), Box<dyn Error>> {
        let mut builder = DateBuilder::new();
        builder.set_year(1999)?;
        builder.set_month(12)?;
        builder.set_day(31)?;
        builder.set_time(24, 0, 0, Some(Decimal::new(0, 2)))?;
        builder.normalize()?;
        assert_eq!(builder.to_string(), "2000-01-01T00:00:00");

        let mut builder = DateBuilder::from_str("2000-01-01T10:00:00.1500-05:00")?;
        builder.normalize()?;
        assert_eq!(builder.to_string(), "2000-01-01T15:00:00.15Z");

        let mut builder = DateBuilder::from_str("--01-01T10:00:00.000-05:00")?;
        builder.normalize()?;
        assert_eq!(builder.to_string(), "--01-01T10:00:00-05:00");
        Ok(())
    }

    #[test]
    fn canonical_string() -> Result<(), Box<dyn Error>> {
        assert_eq!(
            DateBuilder::from_str("2000-01-01T10:00:00.500+01:00")?.canonical_string(),
            "2000-01-01T09:00:00.5Z"
        );
        assert_eq!(
            DateBuilder::from_str("2000-01-01+01:00")?.canonical_string(),
            "2000-01-01+01:00"
        );
        assert_eq!(
            DateBuilder::from_str("-292275295-01-01T00:00:00+01:00")?.canonical_string(),
            "-292275295-01-01T00:00:00+01:00"
        );
        Ok(())
    }

    #[test]
    fn epoch_millis() -> Result<(), Box<dyn Error>> {
        assert_eq!(DateBuilder::from_str("1970-01-01T00:00:00Z")?.epoch_millis()?, 0);
        assert_eq!(
            DateBuilder::from_str("1970-01-01T01:00:00.1234+01:00")?.epoch_millis()?,
            123
        );
        assert_eq!(DateBuilder::from_str("1969-12-31")?.epoch_millis()?, -86_400_000);
        assert_eq!(
            DateBuilder::from_str("2001-09-09T01:46:40Z")?.epoch_millis()?,
            1_000_000_000_000
        );

        let mut builder = DateBuilder::new();
        builder.set_epoch_millis(1_000_000_000_123, TimezoneOffset::UTC)?;
        assert_eq!(builder.to_string(), "2001-09-09T01:46:40.123Z");
        builder.set_epoch_millis(-1, TimezoneOffset::from_minutes(60)?)?;
        assert_eq!(builder.to_string(), "1970-01-01T00:59:59.999+01:00");
        builder.set_epoch_millis(0, TimezoneOffset::UTC)?;
        assert_eq!(builder.to_string(), "1970-01-01T00:00:00Z");
        Ok(())
    }
}
