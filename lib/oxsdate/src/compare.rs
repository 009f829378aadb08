use crate::builder::DateBuilder;
use crate::error::DateTimeError;
use crate::specification::{DateFlags, DateSpecification, TimezoneOffset};
use std::cmp::Ordering;

/// Compares two date/time values following the
/// [XML Schema order relation](https://www.w3.org/TR/xmlschema-2/#dateTime-order).
///
/// Returns `Ok(None)` if the values are incomparable: they do not have the same fields,
/// or only one of them has a time zone and the ±14:00 window around it does not settle the order.
/// Values with the same fields and different time zones are compared as instants.
///
/// An error is only returned when moving a value to the other time zone leaves the supported range.
///
/// ```
/// use oxsdate::{compare_dates, DateValue};
/// use std::cmp::Ordering;
/// use std::str::FromStr;
///
/// let a = DateValue::from_str("09:00:00-05:00")?;
/// let b = DateValue::from_str("09:00:00-08:00")?;
/// assert_eq!(compare_dates(&a, &b)?, Some(Ordering::Less));
/// let c = DateValue::from_str("2001-08-06")?;
/// let d = DateValue::from_str("2001-08-06Z")?;
/// assert_eq!(compare_dates(&c, &d)?, None);
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn compare_dates(
    left: &(impl DateSpecification + ?Sized),
    right: &(impl DateSpecification + ?Sized),
) -> Result<Option<Ordering>, DateTimeError> {
    compare(left, right)
}

fn compare<L: DateSpecification + ?Sized, R: DateSpecification + ?Sized>(
    left: &L,
    right: &R,
) -> Result<Option<Ordering>, DateTimeError> {
    let difference = left.flags() ^ right.flags();

    if difference.is_empty() {
        let Some(timezone) = left.timezone() else {
            return Ok(Some(fieldwise_compare(left, right)));
        };
        if right.timezone() == Some(timezone) {
            return Ok(Some(fieldwise_compare(left, right)));
        }
        let mut right = DateBuilder::from_specification(right)?;
        if !left.has_date() || !left.has_time() {
            // Partial values are compared through the first instant they denote
            let mut left = DateBuilder::from_specification(left)?;
            left.set_to_first_moment();
            right.set_to_first_moment();
            right.normalize_to_timezone(timezone)?;
            return Ok(Some(fieldwise_compare(&left, &right)));
        }
        right.normalize_to_timezone(timezone)?;
        return Ok(Some(fieldwise_compare(left, &right)));
    }

    if difference.intersects(DateFlags::DATE | DateFlags::TIME) {
        return Ok(None);
    }

    // Exactly one of the two has a time zone
    let Some(timezone) = left.timezone() else {
        return Ok(compare(right, left)?.map(Ordering::reverse));
    };

    let mut shifted = DateBuilder::from_specification(left)?;
    if left.flags() & DateFlags::DATE == DateFlags::MONTH | DateFlags::DAY {
        // Brings --02-28 and --03-01 one day closer, as if the year were not a leap year
        if (left.month(), left.day()) == (2, 28) {
            if (right.month(), right.day()) == (3, 1) {
                shifted.set_day(29)?;
            }
        } else if (right.month(), right.day()) == (2, 28) && (left.month(), left.day()) == (3, 1)
        {
            shifted.set_month(2)?;
            shifted.set_day(29)?;
        }
    }
    shifted.set_to_first_moment();

    if fieldwise_compare(&shifted, &at_extreme_timezone(right, TimezoneOffset::MAX, timezone)?)
        == Ordering::Less
    {
        return Ok(Some(Ordering::Less));
    }
    if fieldwise_compare(&shifted, &at_extreme_timezone(right, TimezoneOffset::MIN, timezone)?)
        == Ordering::Greater
    {
        return Ok(Some(Ordering::Greater));
    }
    Ok(None)
}

/// The first instant of a value without time zone, read in `assumed` and moved to `target`.
fn at_extreme_timezone(
    value: &(impl DateSpecification + ?Sized),
    assumed: TimezoneOffset,
    target: TimezoneOffset,
) -> Result<DateBuilder, DateTimeError> {
    let mut value = DateBuilder::from_specification(value)?;
    value.set_to_first_moment();
    value.set_timezone(assumed);
    value.normalize_to_timezone(target)?;
    Ok(value)
}

/// Compares the fields present in `left`, most significant first, ignoring time zones.
fn fieldwise_compare(
    left: &(impl DateSpecification + ?Sized),
    right: &(impl DateSpecification + ?Sized),
) -> Ordering {
    let mut ordering = Ordering::Equal;
    if left.has_year() {
        ordering = ordering.then(left.year().cmp(&right.year()));
    }
    if left.has_month() {
        ordering = ordering.then(left.month().cmp(&right.month()));
    }
    if left.has_day() {
        ordering = ordering.then(left.day().cmp(&right.day()));
    }
    if left.has_time() && ordering == Ordering::Equal {
        ordering = (left.hour(), left.minute(), left.second())
            .cmp(&(right.hour(), right.minute(), right.second()))
            .then_with(|| left.fraction().cmp(&right.fraction()));
    }
    ordering
}
