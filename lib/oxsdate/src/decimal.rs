use num_bigint::{BigInt, Sign};
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// Arbitrary precision decimal number, used for fractional seconds.
///
/// The value is `unscaled × 10^-scale`.
/// The scale is kept: `0.50` and `0.5` are [equal](PartialEq) and hash the same
/// but are not written the same way.
/// This is what lets a parsed date keep the fractional digits it was written with.
#[derive(Debug, Clone, Default)]
pub struct Decimal {
    unscaled: BigInt,
    scale: u32,
}

impl Decimal {
    /// Constructs the decimal `unscaled / 10^scale`
    #[inline]
    pub fn new(unscaled: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            unscaled: unscaled.into(),
            scale,
        }
    }

    #[inline]
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// Number of digits after the decimal point.
    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    #[inline]
    pub fn signum(&self) -> i8 {
        match self.unscaled.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.unscaled.sign() == Sign::NoSign
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.unscaled.sign() == Sign::Minus
    }

    /// Checks if the value is in `[0, 1)`.
    pub fn is_fraction_of_unit(&self) -> bool {
        !self.is_negative() && self.unscaled < pow10(self.scale)
    }

    /// [fn:floor](https://www.w3.org/TR/xpath-functions/#func-floor)
    ///
    /// The result has a scale of 0.
    pub fn floor(&self) -> Self {
        let pow = pow10(self.scale);
        let quotient = &self.unscaled / &pow;
        let quotient = if self.is_negative() && &quotient * &pow != self.unscaled {
            quotient - BigInt::from(1)
        } else {
            quotient
        };
        Self::new(quotient, 0)
    }

    /// Drops the digits after the `scale`-th fractional digit, rounding toward zero.
    pub fn truncate(&self, scale: u32) -> Self {
        if scale >= self.scale {
            return self.clone();
        }
        Self::new(&self.unscaled / pow10(self.scale - scale), scale)
    }

    /// Removes the trailing zeros of the fractional part.
    ///
    /// Zero always becomes a plain `0` with no fractional digits.
    pub fn strip_trailing_zeros(&self) -> Self {
        if self.is_zero() {
            return Self::default();
        }
        let ten = BigInt::from(10);
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;
        while scale > 0 && (&unscaled % &ten).sign() == Sign::NoSign {
            unscaled = unscaled / &ten;
            scale -= 1;
        }
        Self { unscaled, scale }
    }

    /// Checks if the written form ends with a `0` after the decimal point.
    pub fn has_trailing_zero(&self) -> bool {
        self.scale > 0 && (&self.unscaled % BigInt::from(10)).sign() == Sign::NoSign
    }

    /// Multiplies the value by `10^n`.
    pub fn scale_by_power_of_ten(&self, n: u32) -> Self {
        if self.scale >= n {
            Self::new(self.unscaled.clone(), self.scale - n)
        } else {
            Self::new(&self.unscaled * pow10(n - self.scale), 0)
        }
    }

    /// Returns the value if it is an integer fitting in an [`i64`].
    pub fn to_i64(&self) -> Option<i64> {
        let pow = pow10(self.scale);
        if (&self.unscaled % &pow).sign() != Sign::NoSign {
            return None;
        }
        i64::try_from(&(&self.unscaled / &pow)).ok()
    }

    fn rescaled(&self, scale: u32) -> BigInt {
        debug_assert!(scale >= self.scale, "rescaling can only add digits");
        &self.unscaled * pow10(scale - self.scale)
    }
}

fn pow10(exponent: u32) -> BigInt {
    BigInt::from(10_u32).pow(exponent)
}

impl From<u8> for Decimal {
    #[inline]
    fn from(value: u8) -> Self {
        Self::new(value, 0)
    }
}

impl From<i32> for Decimal {
    #[inline]
    fn from(value: i32) -> Self {
        Self::new(value, 0)
    }
}

impl From<i64> for Decimal {
    #[inline]
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}

impl PartialEq for Decimal {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.unscaled.cmp(&other.unscaled);
        }
        let scale = self.scale.max(other.scale);
        self.rescaled(scale).cmp(&other.rescaled(scale))
    }
}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let normalized = self.strip_trailing_zeros();
        normalized.unscaled.hash(state);
        normalized.scale.hash(state);
    }
}

impl Add<&Decimal> for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        Decimal::new(self.rescaled(scale) + rhs.rescaled(scale), scale)
    }
}

impl Add for Decimal {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        &self + &rhs
    }
}

impl Sub<&Decimal> for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        Decimal::new(self.rescaled(scale) - rhs.rescaled(scale), scale)
    }
}

impl Sub for Decimal {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        &self - &rhs
    }
}

impl Neg for Decimal {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            unscaled: -self.unscaled,
            scale: self.scale,
        }
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    #[inline]
    fn neg(self) -> Decimal {
        -self.clone()
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Parses decimals lexical mapping, keeping the number of fractional digits
    fn from_str(input: &str) -> Result<Self, ParseDecimalError> {
        // (\+|-)?([0-9]+(\.[0-9]*)?|\.[0-9]+)
        let input = input.as_bytes();
        if input.is_empty() {
            return Err(DecimalParseErrorKind::UnexpectedEnd.into());
        }

        let (negative, mut cursor) = match input.first() {
            Some(b'+') => (false, 1),
            Some(b'-') => (true, 1),
            _ => (false, 0),
        };

        let mut digits = String::with_capacity(input.len() + 1);
        if negative {
            digits.push('-');
        }
        let mut with_before_dot = false;
        while let Some(c) = input.get(cursor).filter(|c| c.is_ascii_digit()) {
            digits.push(char::from(*c));
            cursor += 1;
            with_before_dot = true;
        }

        let mut scale = 0_u32;
        if input.len() > cursor {
            if input[cursor] != b'.' {
                return Err(DecimalParseErrorKind::UnexpectedChar.into());
            }
            cursor += 1;

            while let Some(c) = input.get(cursor).filter(|c| c.is_ascii_digit()) {
                digits.push(char::from(*c));
                cursor += 1;
                scale = scale
                    .checked_add(1)
                    .ok_or(DecimalParseErrorKind::Overflow)?;
            }

            if !with_before_dot && scale == 0 {
                // We only have a dot
                return Err(DecimalParseErrorKind::UnexpectedEnd.into());
            }
            if input.len() > cursor {
                return Err(DecimalParseErrorKind::UnexpectedChar.into());
            }
        } else if !with_before_dot {
            // It's empty
            return Err(DecimalParseErrorKind::UnexpectedEnd.into());
        }

        Ok(Self {
            unscaled: digits
                .parse()
                .map_err(|_| DecimalParseErrorKind::UnexpectedChar)?,
            scale,
        })
    }
}

impl fmt::Display for Decimal {
    /// Writes the decimal in plain notation with exactly [`scale`](Self::scale) fractional digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_char('-')?;
        }
        let digits = self.unscaled.magnitude().to_string();
        let scale = usize::try_from(self.scale).map_err(|_| fmt::Error)?;
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (integer, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{integer}.{fraction}")
        } else {
            f.write_str("0.")?;
            for _ in digits.len()..scale {
                f.write_char('0')?;
            }
            f.write_str(&digits)
        }
    }
}

/// An error when parsing a [`Decimal`].
#[derive(Debug, Clone, thiserror::Error)]
#[error(transparent)]
pub struct ParseDecimalError(#[from] DecimalParseErrorKind);

#[derive(Debug, Clone, thiserror::Error)]
enum DecimalParseErrorKind {
    #[error("Too many fractional digits")]
    Overflow,
    #[error("Unexpected character")]
    UnexpectedChar,
    #[error("Unexpected end of string")]
    UnexpectedEnd,
}
