use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(about, version, name = "oxsdate")]
/// Parse, compare and compute XML Schema dates, times and durations
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
    /// Format of the log lines written to stderr
    ///
    /// The verbosity is set with the RUST_LOG environment variable and defaults to "warn".
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a date/time value and describe its fields
    ///
    /// Any of the dateTime, time, date, gYearMonth, gYear, gMonthDay, gDay and gMonth lexical forms is accepted.
    Parse {
        /// The value to parse, e.g. "2001-08-06T10:00:00+02:00" or "--08-06"
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// The output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the canonical lexical form of a date/time value
    ///
    /// Values with a time and a time zone are expressed in UTC.
    Canonical {
        /// The value to canonicalize
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Compare two date/time values
    ///
    /// Prints "less", "equal", "greater" or "incomparable".
    /// A value without time zone may be incomparable to a value with one.
    Compare {
        /// The left operand
        #[arg(allow_hyphen_values = true)]
        left: String,
        /// The right operand
        #[arg(allow_hyphen_values = true)]
        right: String,
    },
    /// Add a duration to a date/time value
    Add {
        /// The date/time value
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// The duration to add, e.g. "P1Y2M" or "-PT36H"
        #[arg(allow_hyphen_values = true)]
        duration: String,
    },
    /// Subtract a duration from a date/time value
    Subtract {
        /// The date/time value
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// The duration to subtract, e.g. "P1Y2M" or "-PT36H"
        #[arg(allow_hyphen_values = true)]
        duration: String,
    },
    /// Express a date/time value in another time zone
    ///
    /// The value must have a time, a time zone, and either a complete date or no date at all.
    Adjust {
        /// The date/time value
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// The target time zone, "Z" or an offset like "-05:00"
        #[arg(allow_hyphen_values = true)]
        timezone: String,
    },
    /// Print the Julian day number of a date
    ///
    /// The date must have a year, a month and a day.
    Julian {
        /// The date/time value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Parse a duration and describe its fields
    Duration {
        /// The duration to parse, e.g. "P1Y2M3DT4H5M6.7S"
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Carry the fields into their usual ranges before printing
        #[arg(long)]
        normalize: bool,
        /// The output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Compare two durations
    ///
    /// Prints "less", "equal", "greater" or "incomparable".
    /// Durations mixing months and days may be incomparable, e.g. "P1M" and "P30D".
    CompareDurations {
        /// The left operand
        #[arg(allow_hyphen_values = true)]
        left: String,
        /// The right operand
        #[arg(allow_hyphen_values = true)]
        right: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// One "key: value" line per field
    Text,
    /// A single JSON object
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per line
    Json,
}
