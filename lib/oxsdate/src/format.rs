use crate::specification::DateSpecification;
use std::fmt;
use std::fmt::Write;

const DIGIT_PAIRS: &[u8; 200] = b"0001020304050607080910111213141516171819\
2021222324252627282930313233343536373839\
4041424344454647484950515253545556575859\
6061626364656667686970717273747576777879\
8081828384858687888990919293949596979899";

/// Reads the two ASCII digits starting at `index`.
pub(crate) fn two_digit(input: &[u8], index: usize) -> Option<u8> {
    let tens = digit(*input.get(index)?)?;
    let ones = digit(*input.get(index + 1)?)?;
    Some(tens * 10 + ones)
}

#[inline]
fn digit(c: u8) -> Option<u8> {
    c.is_ascii_digit().then(|| c - b'0')
}

/// Writes `value % 100` as exactly two digits.
pub(crate) fn write_two_digits(f: &mut impl Write, value: u8) -> fmt::Result {
    let i = usize::from(value % 100) * 2;
    f.write_char(char::from(DIGIT_PAIRS[i]))?;
    f.write_char(char::from(DIGIT_PAIRS[i + 1]))
}

/// Writes a year with at least four digits, and a leading `-` before Christ.
pub(crate) fn write_year(f: &mut impl Write, year: i32) -> fmt::Result {
    if year < 0 {
        f.write_char('-')?;
    }
    let year = year.unsigned_abs();
    if year >= 10_000 {
        return write!(f, "{year}");
    }
    write_two_digits(f, u8::try_from(year / 100).map_err(|_| fmt::Error)?)?;
    write_two_digits(f, u8::try_from(year % 100).map_err(|_| fmt::Error)?)
}

/// Writes the natural lexical form of a value, keeping the fractional digits as they are.
///
/// Absent leading fields are written as `-`, so a day alone is `---DD`,
/// a month alone `--MM` and a year with a day but no month `YYYY--DD`.
pub(crate) fn write_natural(
    f: &mut impl Write,
    value: &(impl DateSpecification + ?Sized),
) -> fmt::Result {
    if value.has_year() || value.has_month() || value.has_day() {
        if value.has_year() {
            write_year(f, value.year())?;
        } else {
            f.write_char('-')?;
        }
        if value.has_month() || value.has_day() {
            f.write_char('-')?;
            if value.has_month() {
                write_two_digits(f, value.month())?;
            }
            if value.has_day() {
                f.write_char('-')?;
                write_two_digits(f, value.day())?;
            }
        }
        if value.has_time() {
            f.write_char('T')?;
        }
    }
    if value.has_time() {
        write_two_digits(f, value.hour())?;
        f.write_char(':')?;
        write_two_digits(f, value.minute())?;
        f.write_char(':')?;
        write_two_digits(f, value.second())?;
        let fraction = value.fraction().to_string();
        if let Some(dot) = fraction.find('.') {
            f.write_str(&fraction[dot..])?;
        }
    }
    if value.has_timezone() {
        if value.timezone_sign() == 0 {
            f.write_char('Z')?;
        } else {
            f.write_char(if value.timezone_sign() < 0 { '-' } else { '+' })?;
            write_two_digits(f, value.timezone_hour())?;
            f.write_char(':')?;
            write_two_digits(f, value.timezone_minute())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_two_digits() {
        assert_eq!(two_digit(b"12", 0), Some(12));
        assert_eq!(two_digit(b"x07", 1), Some(7));
        assert_eq!(two_digit(b"1a", 0), None);
        assert_eq!(two_digit(b"1", 0), None);
        assert_eq!(two_digit(b"12", 1), None);
    }

    #[test]
    fn write_digits() -> fmt::Result {
        let mut out = String::new();
        write_two_digits(&mut out, 7)?;
        write_two_digits(&mut out, 42)?;
        assert_eq!(out, "0742");
        Ok(())
    }

    #[test]
    fn write_years() -> fmt::Result {
        for (year, expected) in [
            (1, "0001"),
            (-1, "-0001"),
            (1999, "1999"),
            (-4712, "-4712"),
            (12345, "12345"),
            (-292_275_295, "-292275295"),
        ] {
            let mut out = String::new();
            write_year(&mut out, year)?;
            assert_eq!(out, expected);
        }
        Ok(())
    }
}
