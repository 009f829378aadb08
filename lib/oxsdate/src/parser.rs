use crate::builder::{DateBuilder, MAX_YEAR, MIN_YEAR};
use crate::decimal::Decimal;
use crate::duration::DurationValue;
use crate::error::{
    DateLexicalErrorKind, DurationLexicalErrorKind, ParseDateTimeError, ParseDurationError,
};
use crate::format::two_digit;
use crate::specification::{DateSpecification, TimezoneOffset};
use std::str::FromStr;

const XML_WHITESPACE: &[char] = &[' ', '\t', '\n', '\r'];

// Union of the date/time lexical spaces:
//   date?  ('T'? time)?  timezone?
//   date     ::= ('-'? year)? ('-' month?)? ('-' day)?
//   year     ::= [0-9]{4,9} with no leading zero beyond four digits
//   time     ::= hh ':' mm ':' ss ('.' [0-9]+)?
//   timezone ::= 'Z' | ('+' | '-') hh ':' mm
// The 'T' is required if and only if a date field is present.
// `--MM--` is accepted as a month, following the erratum of XML Schema 1.0.

/// Parses any date/time lexical form into a valid builder.
///
/// Hour 24 is already turned into hour 0, of the next day if there is a day.
pub(crate) fn parse_date(input: &str) -> Result<DateBuilder, ParseDateTimeError> {
    let input = input.trim_matches(XML_WHITESPACE);
    let mut builder = DateBuilder::new();

    let (input, timezone) = timezone_suffix(input)?;
    if let Some(timezone) = timezone {
        builder.set_timezone(timezone);
    }

    let mut rest = input;
    if !rest.is_empty() && rest.as_bytes().get(2) != Some(&b':') {
        rest = date_fields(rest, &mut builder)?;
    }

    if !rest.is_empty() {
        if builder.has_year() || builder.has_month() || builder.has_day() {
            rest = rest
                .strip_prefix('T')
                .ok_or(DateLexicalErrorKind::MissingTimeSeparator)?;
        }
        time_fields(rest, &mut builder)?;
    }

    builder
        .normalize_24h()
        .map_err(|_| DateLexicalErrorKind::YearOutOfRange)?;
    if !builder.is_valid() {
        return Err(DateLexicalErrorKind::InvalidDate.into());
    }
    Ok(builder)
}

/// Splits a trailing `Z` or `±hh:mm` off the input.
fn timezone_suffix(input: &str) -> Result<(&str, Option<TimezoneOffset>), ParseDateTimeError> {
    if let Some(rest) = input.strip_suffix('Z') {
        return Ok((rest, Some(TimezoneOffset::UTC)));
    }
    let bytes = input.as_bytes();
    let len = bytes.len();
    if len >= 6 && bytes[len - 3] == b':' && matches!(bytes[len - 6], b'+' | b'-') {
        let (rest, timezone) = input.split_at(len - 6);
        return Ok((rest, Some(TimezoneOffset::from_str(timezone)?)));
    }
    Ok((input, None))
}

/// Reads the year, month and day fields that are present and returns what follows them.
fn date_fields<'a>(
    input: &'a str,
    builder: &mut DateBuilder,
) -> Result<&'a str, ParseDateTimeError> {
    let bytes = input.as_bytes();
    let negative = bytes.first() == Some(&b'-');
    let mut cursor = usize::from(negative);

    let starts_with_zero = bytes.get(cursor) == Some(&b'0');
    let mut year = 0_i64;
    let mut digits = 0_usize;
    while let Some(c) = bytes.get(cursor).filter(|c| c.is_ascii_digit()) {
        if starts_with_zero && digits >= 4 {
            return Err(DateLexicalErrorKind::YearLeadingZero.into());
        }
        if digits >= 9 {
            return Err(DateLexicalErrorKind::YearTooLong.into());
        }
        year = year * 10 + i64::from(c - b'0');
        digits += 1;
        cursor += 1;
    }
    match digits {
        0 => (),
        1..=3 => return Err(DateLexicalErrorKind::YearTooShort.into()),
        _ => {
            if year == 0 {
                return Err(DateLexicalErrorKind::YearZero.into());
            }
            let year = if negative { -year } else { year };
            let year = i32::try_from(year)
                .ok()
                .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
                .ok_or(DateLexicalErrorKind::YearOutOfRange)?;
            builder
                .set_year(year)
                .map_err(|_| DateLexicalErrorKind::YearOutOfRange)?;
        }
    }

    if bytes.get(cursor) != Some(&b'-') {
        if negative && !builder.has_year() {
            return Err(DateLexicalErrorKind::LoneMinus.into());
        }
        return Ok(&input[cursor..]);
    }
    cursor += 1;

    if let Some(month) = two_digit(bytes, cursor).filter(|m| (1..=12).contains(m)) {
        builder
            .set_month(month)
            .map_err(|_| DateLexicalErrorKind::MissingMonth)?;
        cursor += 2;
    }

    if bytes.get(cursor) != Some(&b'-') {
        if !builder.has_month() {
            return Err(DateLexicalErrorKind::MissingMonth.into());
        }
        return Ok(&input[cursor..]);
    }
    cursor += 1;

    if let Some(day) = two_digit(bytes, cursor).filter(|d| (1..=31).contains(d)) {
        builder
            .set_day(day)
            .map_err(|_| DateLexicalErrorKind::MissingDay)?;
        cursor += 2;
        return Ok(&input[cursor..]);
    }

    if builder.has_month() && !builder.has_year() && bytes.get(cursor) == Some(&b'-') {
        // --MM--
        return Ok(&input[cursor + 1..]);
    }
    Err(DateLexicalErrorKind::MissingDay.into())
}

/// Reads `hh:mm:ss(.s+)?`, which must be the whole input.
fn time_fields(input: &str, builder: &mut DateBuilder) -> Result<(), ParseDateTimeError> {
    let bytes = input.as_bytes();
    if bytes.len() < 8 || bytes[2] != b':' || bytes[5] != b':' {
        return Err(DateLexicalErrorKind::MalformedTime.into());
    }
    let hour = two_digit(bytes, 0)
        .filter(|h| *h <= 24)
        .ok_or(DateLexicalErrorKind::HourOutOfRange)?;
    let minute = two_digit(bytes, 3)
        .filter(|m| *m < 60)
        .ok_or(DateLexicalErrorKind::MinuteOutOfRange)?;
    let second = two_digit(bytes, 6)
        .filter(|s| *s < 60)
        .ok_or(DateLexicalErrorKind::SecondOutOfRange)?;

    let fraction = &input[8..];
    let fraction = if fraction.is_empty() {
        None
    } else {
        let digits = fraction
            .strip_prefix('.')
            .ok_or(DateLexicalErrorKind::MalformedFraction)?;
        if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
            return Err(DateLexicalErrorKind::MalformedFraction.into());
        }
        Some(Decimal::from_str(fraction).map_err(|_| DateLexicalErrorKind::MalformedFraction)?)
    };

    builder
        .set_time(hour, minute, second, fraction)
        .map_err(|_| DateLexicalErrorKind::InvalidHour24.into())
}

// [6]   duYearFrag ::= unsignedNoDecimalPtNumeral 'Y'
// [7]   duMonthFrag ::= unsignedNoDecimalPtNumeral 'M'
// [8]   duDayFrag ::= unsignedNoDecimalPtNumeral 'D'
// [9]   duHourFrag ::= unsignedNoDecimalPtNumeral 'H'
// [10]   duMinuteFrag ::= unsignedNoDecimalPtNumeral 'M'
// [11]   duSecondFrag ::= (unsignedNoDecimalPtNumeral | unsignedDecimalPtNumeral) 'S'
// [12]   duYearMonthFrag ::= (duYearFrag duMonthFrag?) | duMonthFrag
// [13]   duTimeFrag ::= 'T' ((duHourFrag duMinuteFrag? duSecondFrag?) | (duMinuteFrag duSecondFrag?) | duSecondFrag)
// [14]   duDayTimeFrag ::= (duDayFrag duTimeFrag?) | duTimeFrag
// [15]   durationLexicalRep ::= '-'? 'P' ((duYearMonthFrag duDayTimeFrag?) | duDayTimeFrag)
pub(crate) fn parse_duration(input: &str) -> Result<DurationValue, ParseDurationError> {
    // States
    const START: u32 = 0;
    const AFTER_YEAR: u32 = 1;
    const AFTER_MONTH: u32 = 2;
    const AFTER_DAY: u32 = 3;
    const AFTER_T: u32 = 4;
    const AFTER_HOUR: u32 = 5;
    const AFTER_MINUTE: u32 = 6;
    const AFTER_SECOND: u32 = 7;

    let input = input.trim_matches(XML_WHITESPACE);
    let (sign, input) = if let Some(left) = input.strip_prefix('-') {
        (-1, left)
    } else {
        (1, input)
    };
    let mut input = input
        .strip_prefix('P')
        .ok_or(DurationLexicalErrorKind::MissingLeadingP)?;

    let mut state = START;
    let mut fields = [0_i32; 6];
    let mut fraction = Decimal::default();
    let mut empty = true;
    while !input.is_empty() {
        if let Some(left) = input.strip_prefix('T') {
            if state >= AFTER_T {
                return Err(DurationLexicalErrorKind::DuplicateTimeSeparator.into());
            }
            state = AFTER_T;
            input = left;
            continue;
        }

        let (number, decimals, left) = duration_number(input)?;
        let (field, next_state) = match (left.chars().next(), state >= AFTER_T) {
            (Some('Y'), false) => (0, AFTER_YEAR),
            (Some('M'), false) => (1, AFTER_MONTH),
            (Some('D'), false) => (2, AFTER_DAY),
            (Some('H'), true) => (3, AFTER_HOUR),
            (Some('M'), true) => (4, AFTER_MINUTE),
            (Some('S'), true) => (5, AFTER_SECOND),
            (Some(_), _) => return Err(DurationLexicalErrorKind::UnexpectedChar.into()),
            (None, _) => return Err(DurationLexicalErrorKind::MissingDesignator.into()),
        };
        if next_state <= state {
            return Err(DurationLexicalErrorKind::OutOfOrder.into());
        }
        if let Some(decimals) = decimals {
            if next_state != AFTER_SECOND {
                return Err(DurationLexicalErrorKind::UnexpectedFraction.into());
            }
            fraction = decimals;
        }
        fields[field] = number;
        state = next_state;
        empty = false;
        input = &left[1..];
    }

    if state == AFTER_T {
        return Err(DurationLexicalErrorKind::EmptyTimeSection.into());
    }
    if empty {
        return Err(DurationLexicalErrorKind::Empty.into());
    }
    let [years, months, days, hours, minutes, seconds] = fields;
    Ok(DurationValue::new(
        sign, years, months, days, hours, minutes, seconds, fraction,
    ))
}

/// Reads `[0-9]+ ('.' [0-9]*)?` and returns the integer part, the fractional part if there is a '.', and what follows.
fn duration_number(input: &str) -> Result<(i32, Option<Decimal>, &str), ParseDurationError> {
    let end = input
        .bytes()
        .position(|c| !c.is_ascii_digit())
        .unwrap_or(input.len());
    if end == 0 {
        return Err(DurationLexicalErrorKind::MissingDigits.into());
    }
    let number = input[..end]
        .parse()
        .map_err(|_| DurationLexicalErrorKind::Overflow)?;
    let left = &input[end..];
    let Some(after_dot) = left.strip_prefix('.') else {
        return Ok((number, None, left));
    };
    let digits = after_dot
        .bytes()
        .position(|c| !c.is_ascii_digit())
        .unwrap_or(after_dot.len());
    let fraction = Decimal::new(
        after_dot[..digits]
            .parse::<num_bigint::BigInt>()
            .unwrap_or_default(),
        u32::try_from(digits).map_err(|_| DurationLexicalErrorKind::Overflow)?,
    );
    Ok((number, Some(fraction), &after_dot[digits..]))
}
