use crate::cli::{Args, Command, LogFormat, OutputFormat};
use anyhow::Context;
use clap::Parser;
use oxsdate::{BuiltinType, DateSpecification, DateValue, DurationValue, TimezoneOffset};
use serde::Serialize;
use std::cmp::Ordering;
use std::io::{self, Write};
use std::str::FromStr;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);
    let mut stdout = io::stdout().lock();
    match args.command {
        Command::Parse { value, format } => {
            let date = parse_date(&value)?;
            let report = DateReport::new(&value, &date);
            match format {
                OutputFormat::Text => report.write_text(&mut stdout)?,
                OutputFormat::Json => {
                    serde_json::to_writer(&mut stdout, &report)?;
                    writeln!(stdout)?;
                }
            }
        }
        Command::Canonical { value } => {
            let date = parse_date(&value)?;
            writeln!(stdout, "{}", date.canonical_string())?;
        }
        Command::Compare { left, right } => {
            let left = parse_date(&left)?;
            let right = parse_date(&right)?;
            let ordering = left
                .compare_to_date(&right)
                .context("The values could not be compared")?;
            info!(
                left = left.canonical_string(),
                right = right.canonical_string(),
                outcome = ordering_name(ordering),
                "Compared date/time values"
            );
            writeln!(stdout, "{}", ordering_name(ordering))?;
        }
        Command::Add { value, duration } => {
            let date = parse_date(&value)?;
            let duration = parse_duration(&duration)?;
            let result = date
                .add_duration(&duration)
                .with_context(|| format!("Unable to add {duration} to {date}"))?;
            info!(value = %date, duration = %duration, result = %result, "Added duration");
            writeln!(stdout, "{result}")?;
        }
        Command::Subtract { value, duration } => {
            let date = parse_date(&value)?;
            let duration = parse_duration(&duration)?;
            let result = date
                .subtract_duration(&duration)
                .with_context(|| format!("Unable to subtract {duration} from {date}"))?;
            info!(value = %date, duration = %duration, result = %result, "Subtracted duration");
            writeln!(stdout, "{result}")?;
        }
        Command::Adjust { value, timezone } => {
            let date = parse_date(&value)?;
            let timezone = TimezoneOffset::from_str(&timezone)
                .with_context(|| format!("Invalid time zone '{timezone}'"))?;
            let result = date
                .adjust_to_timezone(timezone)
                .with_context(|| format!("Unable to express {date} in time zone {timezone}"))?;
            info!(value = %date, timezone = %timezone, result = %result, "Adjusted time zone");
            writeln!(stdout, "{result}")?;
        }
        Command::Julian { value } => {
            let date = parse_date(&value)?;
            let julian_day = date
                .julian_day()
                .with_context(|| format!("{date} has no Julian day number"))?;
            writeln!(stdout, "{julian_day}")?;
        }
        Command::Duration {
            value,
            normalize,
            format,
        } => {
            let mut duration = parse_duration(&value)?;
            if normalize {
                duration = duration
                    .normalized()
                    .with_context(|| format!("Unable to normalize {duration}"))?;
                debug!(normalized = %duration, "Normalized duration");
            }
            let report = DurationReport::new(&value, &duration);
            match format {
                OutputFormat::Text => report.write_text(&mut stdout)?,
                OutputFormat::Json => {
                    serde_json::to_writer(&mut stdout, &report)?;
                    writeln!(stdout)?;
                }
            }
        }
        Command::CompareDurations { left, right } => {
            let left = parse_duration(&left)?;
            let right = parse_duration(&right)?;
            let ordering = left
                .compare_to_duration(&right)
                .context("The durations could not be compared")?;
            info!(
                left = %left,
                right = %right,
                outcome = ordering_name(ordering),
                "Compared durations"
            );
            writeln!(stdout, "{}", ordering_name(ordering))?;
        }
    }
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

fn parse_date(input: &str) -> anyhow::Result<DateValue> {
    debug!(input, "Parsing date/time value");
    let value = DateValue::from_str(input)
        .with_context(|| format!("Invalid date/time value '{input}'"))?;
    info!(
        input,
        shape = value.builtin_type().map_or("custom", BuiltinType::name),
        canonical = value.canonical_string(),
        "Parsed date/time value"
    );
    Ok(value)
}

fn parse_duration(input: &str) -> anyhow::Result<DurationValue> {
    debug!(input, "Parsing duration");
    let value =
        DurationValue::from_str(input).with_context(|| format!("Invalid duration '{input}'"))?;
    info!(input, canonical = %value, "Parsed duration");
    Ok(value)
}

fn ordering_name(ordering: Option<Ordering>) -> &'static str {
    match ordering {
        Some(Ordering::Less) => "less",
        Some(Ordering::Equal) => "equal",
        Some(Ordering::Greater) => "greater",
        None => "incomparable",
    }
}

#[derive(Serialize)]
struct DateReport<'a> {
    input: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    builtin_type: Option<&'static str>,
    natural: String,
    canonical: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    day: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hour: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minute: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    second: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fraction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    epoch_millis: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    julian_day: Option<i64>,
}

impl<'a> DateReport<'a> {
    fn new(input: &'a str, value: &'a DateValue) -> Self {
        let fraction = value.fraction();
        Self {
            input,
            builtin_type: value.builtin_type().map(BuiltinType::name),
            natural: value.to_string(),
            canonical: value.canonical_string(),
            year: value.has_year().then(|| value.year()),
            month: value.has_month().then(|| value.month()),
            day: value.has_day().then(|| value.day()),
            hour: value.has_time().then(|| value.hour()),
            minute: value.has_time().then(|| value.minute()),
            second: value.has_time().then(|| value.second()),
            fraction: (value.has_time() && !fraction.is_zero()).then(|| fraction.to_string()),
            timezone: value.timezone().map(|timezone| timezone.to_string()),
            epoch_millis: value.has_date().then(|| value.to_epoch_millis().ok()).flatten(),
            julian_day: value.has_date().then(|| value.julian_day().ok()).flatten(),
        }
    }

    fn write_text(&self, mut output: impl Write) -> io::Result<()> {
        writeln!(output, "input: {}", self.input)?;
        writeln!(output, "type: {}", self.builtin_type.unwrap_or("none"))?;
        writeln!(output, "natural: {}", self.natural)?;
        writeln!(output, "canonical: {}", self.canonical)?;
        if let Some(year) = self.year {
            writeln!(output, "year: {year}")?;
        }
        if let Some(month) = self.month {
            writeln!(output, "month: {month}")?;
        }
        if let Some(day) = self.day {
            writeln!(output, "day: {day}")?;
        }
        if let (Some(hour), Some(minute), Some(second)) = (self.hour, self.minute, self.second) {
            writeln!(output, "hour: {hour}")?;
            writeln!(output, "minute: {minute}")?;
            writeln!(output, "second: {second}")?;
        }
        if let Some(fraction) = &self.fraction {
            writeln!(output, "fraction: {fraction}")?;
        }
        if let Some(timezone) = &self.timezone {
            writeln!(output, "timezone: {timezone}")?;
        }
        if let Some(epoch_millis) = self.epoch_millis {
            writeln!(output, "epoch millis: {epoch_millis}")?;
        }
        if let Some(julian_day) = self.julian_day {
            writeln!(output, "julian day: {julian_day}")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct DurationReport<'a> {
    input: &'a str,
    canonical: String,
    negative: bool,
    years: i32,
    months: i32,
    days: i32,
    hours: i32,
    minutes: i32,
    seconds: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    fraction: Option<String>,
}

impl<'a> DurationReport<'a> {
    fn new(input: &'a str, value: &DurationValue) -> Self {
        Self {
            input,
            canonical: value.to_string(),
            negative: value.sign() < 0,
            years: value.years(),
            months: value.months(),
            days: value.days(),
            hours: value.hours(),
            minutes: value.minutes(),
            seconds: value.seconds(),
            fraction: (!value.fraction().is_zero()).then(|| value.fraction().to_string()),
        }
    }

    fn write_text(&self, mut output: impl Write) -> io::Result<()> {
        writeln!(output, "input: {}", self.input)?;
        writeln!(output, "canonical: {}", self.canonical)?;
        writeln!(output, "negative: {}", self.negative)?;
        writeln!(output, "years: {}", self.years)?;
        writeln!(output, "months: {}", self.months)?;
        writeln!(output, "days: {}", self.days)?;
        writeln!(output, "hours: {}", self.hours)?;
        writeln!(output, "minutes: {}", self.minutes)?;
        writeln!(output, "seconds: {}", self.seconds)?;
        if let Some(fraction) = &self.fraction {
            writeln!(output, "fraction: {fraction}")?;
        }
        Ok(())
    }
}
