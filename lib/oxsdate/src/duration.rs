use crate::builder::DateBuilder;
use crate::decimal::Decimal;
use crate::error::{DateTimeError, InvalidStateError, InvalidStateKind, ParseDurationError};
use crate::parser::parse_duration;
use crate::specification::TimezoneOffset;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// Start points of the [XML Schema duration order relation](https://www.w3.org/TR/xmlschema-2/#duration-order).
const REFERENCE_DATES: [(i32, u8); 4] = [(1696, 9), (1697, 2), (1903, 3), (1903, 7)];

const SECONDS_IN_28_DAYS: i64 = 28 * 24 * 60 * 60;

/// An [XML Schema duration](https://www.w3.org/TR/xmlschema-2/#duration):
/// a sign and seven fields, years to fractional seconds.
///
/// Fields are kept as written: `PT3600S` is not `PT1H` for [equality](PartialEq),
/// only for [`compare_to_duration`](Self::compare_to_duration).
/// Arithmetic is fieldwise and never normalizes, so fields may become negative.
/// [`is_valid`](Self::is_valid) tells if they are all non-negative.
///
/// ```
/// use oxsdate::DurationValue;
/// use std::str::FromStr;
///
/// let duration = DurationValue::from_str("-P1Y2M3DT4H5M6.7S")?;
/// assert_eq!(duration.sign(), -1);
/// assert_eq!(duration.days(), 3);
/// assert_eq!(duration.fraction().to_string(), "0.7");
/// assert_eq!(duration.to_string(), "-P1Y2M3DT4H5M6.7S");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DurationValue {
    sign: i8,
    years: i32,
    months: i32,
    days: i32,
    hours: i32,
    minutes: i32,
    seconds: i32,
    fraction: Decimal,
}

impl DurationValue {
    /// Builds a duration from raw fields.
    ///
    /// A non-negative `sign` is positive. No range is enforced on the fields.
    #[expect(clippy::too_many_arguments)]
    #[inline]
    pub fn new(
        sign: i8,
        years: i32,
        months: i32,
        days: i32,
        hours: i32,
        minutes: i32,
        seconds: i32,
        fraction: Decimal,
    ) -> Self {
        Self {
            sign: if sign < 0 { -1 } else { 1 },
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
            fraction,
        }
    }

    /// Either 1 or -1.
    #[inline]
    pub fn sign(&self) -> i8 {
        self.sign
    }

    #[inline]
    pub fn years(&self) -> i32 {
        self.years
    }

    #[inline]
    pub fn months(&self) -> i32 {
        self.months
    }

    #[inline]
    pub fn days(&self) -> i32 {
        self.days
    }

    #[inline]
    pub fn hours(&self) -> i32 {
        self.hours
    }

    #[inline]
    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    #[inline]
    pub fn seconds(&self) -> i32 {
        self.seconds
    }

    /// The fractional part of the seconds.
    #[inline]
    pub fn fraction(&self) -> &Decimal {
        &self.fraction
    }

    /// Checks that no field is negative and that the fraction is in `[0, 1)`.
    pub fn is_valid(&self) -> bool {
        self.years >= 0
            && self.months >= 0
            && self.days >= 0
            && self.hours >= 0
            && self.minutes >= 0
            && self.seconds >= 0
            && self.fraction.is_fraction_of_unit()
    }

    /// Checks if all fields are zero, whatever the sign.
    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
            && self.fraction.is_zero()
    }

    /// Fieldwise sum. The result keeps the sign of `self`.
    ///
    /// Returns `None` on overflow.
    ///
    /// ```
    /// use oxsdate::DurationValue;
    /// use std::str::FromStr;
    ///
    /// let sum = DurationValue::from_str("PT50M")?
    ///     .checked_add(&DurationValue::from_str("PT20M")?)
    ///     .unwrap();
    /// assert_eq!(sum.to_string(), "PT70M");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        self.fieldwise(self.sign * rhs.sign, rhs)
    }

    /// Fieldwise difference. The result keeps the sign of `self`.
    ///
    /// Returns `None` on overflow.
    pub fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        self.fieldwise(-self.sign * rhs.sign, rhs)
    }

    fn fieldwise(&self, sign: i8, rhs: &Self) -> Option<Self> {
        let combine = |left: i32, right: i32| {
            if sign < 0 {
                left.checked_sub(right)
            } else {
                left.checked_add(right)
            }
        };
        Some(Self {
            sign: self.sign,
            years: combine(self.years, rhs.years)?,
            months: combine(self.months, rhs.months)?,
            days: combine(self.days, rhs.days)?,
            hours: combine(self.hours, rhs.hours)?,
            minutes: combine(self.minutes, rhs.minutes)?,
            seconds: combine(self.seconds, rhs.seconds)?,
            fraction: if rhs.fraction.is_zero() {
                self.fraction.clone()
            } else if sign < 0 {
                &self.fraction - &rhs.fraction
            } else {
                &self.fraction + &rhs.fraction
            },
        })
    }

    /// Compares with the [XML Schema duration order relation](https://www.w3.org/TR/xmlschema-2/#duration-order).
    ///
    /// `P1M` and `P30D` are incomparable, so `Ok(None)` is returned for them.
    /// The two durations are added to four reference date/times and must give the same order for all of them.
    ///
    /// ```
    /// use oxsdate::DurationValue;
    /// use std::cmp::Ordering;
    /// use std::str::FromStr;
    ///
    /// let month = DurationValue::from_str("P1M")?;
    /// assert_eq!(month.compare_to_duration(&DurationValue::from_str("P30D")?)?, None);
    /// assert_eq!(
    ///     month.compare_to_duration(&DurationValue::from_str("P27D")?)?,
    ///     Some(Ordering::Greater)
    /// );
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn compare_to_duration(&self, other: &Self) -> Result<Option<Ordering>, DateTimeError> {
        if self.fraction.is_zero() && other.fraction.is_zero() {
            let (months, seconds) = self.totals();
            let (other_months, other_seconds) = other.totals();
            if months == other_months {
                return Ok(Some(seconds.cmp(&other_seconds)));
            }
            // A month is at least 28 days long
            if months < other_months && seconds - other_seconds < SECONDS_IN_28_DAYS {
                return Ok(Some(Ordering::Less));
            }
            if months > other_months && other_seconds - seconds < SECONDS_IN_28_DAYS {
                return Ok(Some(Ordering::Greater));
            }
        }

        let mut result = None;
        for (year, month) in REFERENCE_DATES {
            let mut start = DateBuilder::new();
            start.set_year(year)?;
            start.set_month(month)?;
            start.set_day(1)?;
            start.set_time(0, 0, 0, None)?;
            start.set_timezone(TimezoneOffset::UTC);
            let mut left = start.clone();
            left.add_duration(self)?;
            let mut right = start;
            right.add_duration(other)?;
            let ordering = left.compare_to_date(&right)?;
            if ordering.is_none() || result.is_some_and(|r| Some(r) != ordering) {
                return Ok(None);
            }
            result = ordering;
        }
        Ok(result)
    }

    /// Signed `(months, seconds)` totals, the fraction ignored.
    fn totals(&self) -> (i64, i64) {
        let sign = i64::from(self.sign);
        let months = i64::from(self.years) * 12 + i64::from(self.months);
        let seconds = ((i64::from(self.days) * 24 + i64::from(self.hours)) * 60
            + i64::from(self.minutes))
            * 60
            + i64::from(self.seconds);
        (sign * months, sign * seconds)
    }

    /// The same duration with every field in its usual range:
    /// months below 12, hours below 24, minutes and seconds below 60, and a positive fraction below 1.
    ///
    /// The year-month and day-time parts must not have opposite signs.
    ///
    /// ```
    /// use oxsdate::DurationValue;
    /// use std::str::FromStr;
    ///
    /// let duration = DurationValue::from_str("P14MT3601.5S")?;
    /// assert_eq!(duration.normalized()?.to_string(), "P1Y2MT1H1.5S");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn normalized(&self) -> Result<Self, InvalidStateError> {
        let (months, seconds) = self.totals();
        let fraction = if self.sign < 0 {
            -&self.fraction
        } else {
            self.fraction.clone()
        };
        let seconds = &Decimal::from(seconds) + &fraction;
        if months.signum() * i64::from(seconds.signum()) < 0 {
            return Err(InvalidStateKind::MixedSignDuration.into());
        }
        let negative = months < 0 || seconds.is_negative();
        let (months, seconds) = if negative {
            (-months, -seconds)
        } else {
            (months, seconds)
        };
        let whole = seconds.floor();
        let fraction = (&seconds - &whole).strip_trailing_zeros();
        let whole = whole.to_i64().ok_or(InvalidStateKind::Overflow)?;
        let field = |value: i64| i32::try_from(value).map_err(|_| InvalidStateKind::Overflow);
        Ok(Self {
            sign: if negative { -1 } else { 1 },
            years: field(months / 12)?,
            months: field(months % 12)?,
            days: field(whole / 86_400)?,
            hours: field(whole % 86_400 / 3600)?,
            minutes: field(whole % 3600 / 60)?,
            seconds: field(whole % 60)?,
            fraction,
        })
    }
}

impl Default for DurationValue {
    /// `PT0S`
    #[inline]
    fn default() -> Self {
        Self::new(1, 0, 0, 0, 0, 0, 0, Decimal::default())
    }
}

impl Neg for DurationValue {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            sign: -self.sign,
            ..self
        }
    }
}

impl Neg for &DurationValue {
    type Output = DurationValue;

    #[inline]
    fn neg(self) -> DurationValue {
        -self.clone()
    }
}

impl FromStr for DurationValue {
    type Err = ParseDurationError;

    fn from_str(input: &str) -> Result<Self, ParseDurationError> {
        parse_duration(input)
    }
}

impl fmt::Display for DurationValue {
    /// Writes the fields that are not zero, or `PT0S` if there are none.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign < 0 {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        if self.is_zero() {
            return f.write_str("T0S");
        }
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours != 0 || self.minutes != 0 || self.seconds != 0 || !self.fraction.is_zero() {
            f.write_str("T")?;
        }
        if self.hours != 0 {
            write!(f, "{}H", self.hours)?;
        }
        if self.minutes != 0 {
            write!(f, "{}M", self.minutes)?;
        }
        if self.fraction.is_zero() {
            if self.seconds != 0 {
                write!(f, "{}S", self.seconds)?;
            }
        } else {
            write!(f, "{}S", &Decimal::from(self.seconds) + &self.fraction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use crate::error::DurationLexicalErrorKind;
    use std::error::Error;

    fn duration(input: &str) -> Result<DurationValue, ParseDurationError> {
        DurationValue::from_str(input)
    }

    fn compare(left: &str, right: &str) -> Result<Option<Ordering>, Box<dyn Error>> {
        Ok(duration(left)?.compare_to_duration(&duration(right)?)?)
    }

    #[test]
    fn from_str() -> Result<(), ParseDurationError> {
        let value = duration("P1Y2M3DT4H5M6S")?;
        assert_eq!(
            value,
            DurationValue::new(1, 1, 2, 3, 4, 5, 6, Decimal::default())
        );
        let value = duration("-PT30M")?;
        assert_eq!(value.sign(), -1);
        assert_eq!(value.minutes(), 30);
        assert_eq!(value.hours(), 0);
        assert!(value.is_valid());
        Ok(())
    }

    #[test]
    fn to_string() -> Result<(), ParseDurationError> {
        for input in [
            "PT0S",
            "-PT0S",
            "P1Y1M1DT1H1M1.1S",
            "-PT0.1415926S",
            "PT3600S",
            "P1Y365D",
            "PT1H",
            "P1D",
            "PT0.50S",
        ] {
            assert_eq!(duration(input)?.to_string(), input);
        }
        assert_eq!(duration("P0Y0M")?.to_string(), "PT0S");
        assert_eq!(duration("P0YT1.0S")?.to_string(), "PT1S");
        assert_eq!(duration(" PT1H\n")?.to_string(), "PT1H");
        assert_eq!(duration("PT0.0S")?.to_string(), "PT0S");
        Ok(())
    }

    #[test]
    fn invalid_lexical() {
        for (input, kind) in [
            ("P1Y-364D", DurationLexicalErrorKind::MissingDigits),
            ("-PT-0S", DurationLexicalErrorKind::MissingDigits),
            ("1Y", DurationLexicalErrorKind::MissingLeadingP),
            ("P", DurationLexicalErrorKind::Empty),
            ("-P", DurationLexicalErrorKind::Empty),
            ("P1YT", DurationLexicalErrorKind::EmptyTimeSection),
            ("PT", DurationLexicalErrorKind::EmptyTimeSection),
            ("P1DT1H2H", DurationLexicalErrorKind::OutOfOrder),
            ("P1M1Y", DurationLexicalErrorKind::OutOfOrder),
            ("P1H", DurationLexicalErrorKind::UnexpectedChar),
            ("PT1D", DurationLexicalErrorKind::UnexpectedChar),
            ("P1X", DurationLexicalErrorKind::UnexpectedChar),
            ("P1.5Y", DurationLexicalErrorKind::UnexpectedFraction),
            ("PT1.5M", DurationLexicalErrorKind::UnexpectedFraction),
            ("P1", DurationLexicalErrorKind::MissingDesignator),
            ("PT1HT1M", DurationLexicalErrorKind::DuplicateTimeSeparator),
            ("P99999999999Y", DurationLexicalErrorKind::Overflow),
            ("P1Y 2M", DurationLexicalErrorKind::MissingDigits),
            ("P.5D", DurationLexicalErrorKind::MissingDigits),
        ] {
            assert_eq!(
                DurationValue::from_str(input).map_err(|e| e.kind()),
                Err(kind),
                "{input}"
            );
        }
    }

    #[test]
    fn fieldwise_arithmetic() -> Result<(), ParseDurationError> {
        let a = duration("P1Y2M3DT4H5M6.5S")?;
        let b = duration("-P2YT10M0.75S")?;
        let sum = a.checked_add(&b).unwrap_or_default();
        assert_eq!(sum.years(), -1);
        assert_eq!(sum.minutes(), -5);
        assert_eq!(sum.fraction().to_string(), "-0.25");
        assert!(!sum.is_valid());
        assert_eq!(sum.checked_sub(&b), Some(a.clone()));
        assert_eq!(
            duration("-PT1H")?.checked_add(&duration("PT1H")?),
            Some(duration("-PT0H")?)
        );
        assert_eq!(
            duration("-PT1H")?.checked_sub(&duration("PT1H")?),
            Some(duration("-PT2H")?)
        );
        assert_eq!(
            DurationValue::new(1, i32::MAX, 0, 0, 0, 0, 0, Decimal::default())
                .checked_add(&duration("P1Y")?),
            None
        );
        Ok(())
    }

    #[test]
    fn neg() -> Result<(), ParseDurationError> {
        assert_eq!(-duration("P1D")?, duration("-P1D")?);
        assert_eq!(-&duration("-PT1.5S")?, duration("PT1.5S")?);
        assert_eq!(DurationValue::default().to_string(), "PT0S");
        Ok(())
    }

    #[test]
    fn compare_fast_path() -> Result<(), Box<dyn Error>> {
        assert_eq!(compare("PT3600S", "PT1H")?, Some(Ordering::Equal));
        assert_eq!(compare("P1Y", "P12M")?, Some(Ordering::Equal));
        assert_eq!(compare("P1D", "PT25H")?, Some(Ordering::Less));
        assert_eq!(compare("P1M", "P27D")?, Some(Ordering::Greater));
        assert_eq!(compare("P1M", "P28D")?, None);
        assert_eq!(compare("-P1M", "P0D")?, Some(Ordering::Less));
        assert_eq!(compare("PT0S", "-PT0S")?, Some(Ordering::Equal));
        Ok(())
    }

    #[test]
    fn compare_on_reference_dates() -> Result<(), Box<dyn Error>> {
        assert_eq!(compare("P1M", "P29D")?, None);
        assert_eq!(compare("P1M", "P30D")?, None);
        assert_eq!(compare("P1M", "P31D")?, None);
        assert_eq!(compare("P1M", "P32D")?, Some(Ordering::Less));
        assert_eq!(compare("P1Y", "P365D")?, None);
        assert_eq!(compare("P1Y", "P367D")?, Some(Ordering::Less));
        assert_eq!(compare("P5M", "P153D")?, None);
        assert_eq!(compare("PT1.5S", "PT1.25S")?, Some(Ordering::Greater));
        assert_eq!(compare("PT1.50S", "PT1.5S")?, Some(Ordering::Equal));
        Ok(())
    }

    #[test]
    fn normalized() -> Result<(), Box<dyn Error>> {
        assert_eq!(duration("PT3600S")?.normalized()?.to_string(), "PT1H");
        assert_eq!(duration("P13M")?.normalized()?.to_string(), "P1Y1M");
        assert_eq!(duration("-PT90000.50S")?.normalized()?.to_string(), "-P1DT1H0.5S");
        assert_eq!(
            DurationValue::new(1, 0, 1, 0, 0, 0, -1, Decimal::default())
                .normalized()
                .map_err(|e| e.kind()),
            Err(InvalidStateKind::MixedSignDuration)
        );
        assert_eq!(
            DurationValue::new(1, 1, -12, 0, 0, 0, -1, Decimal::default())
                .normalized()?
                .to_string(),
            "-PT1S"
        );
        Ok(())
    }
}
