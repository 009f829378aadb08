#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![allow(clippy::return_self_not_must_use)]

mod builder;
#[cfg(feature = "time")]
mod calendar;
mod compare;
mod date;
mod decimal;
mod duration;
mod error;
mod format;
mod parser;
mod specification;

pub use self::builder::{DateBuilder, MAX_YEAR, MIN_YEAR, gregorian_to_julian, julian_to_gregorian};
pub use self::compare::compare_dates;
pub use self::date::DateValue;
pub use self::decimal::{Decimal, ParseDecimalError};
pub use self::duration::DurationValue;
pub use self::error::{
    DateField, DateLexicalErrorKind, DateTimeError, DurationLexicalErrorKind, InvalidFieldError,
    InvalidStateError, InvalidStateKind, ParseDateTimeError, ParseDurationError,
};
pub use self::specification::{BuiltinType, DateFlags, DateSpecification, TimezoneOffset};
