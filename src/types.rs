//! Core types shared across the catalog, codec, and query engine.
//!
//! Every option enum carries an explicit name table. The first table is the
//! canonical spelling used for display; `ALIASES` holds the extra spellings
//! accepted when parsing, such as the camelCase spellings.

use crate::error::ApiError;
use std::fmt;
use std::str::FromStr;

/// Width of a hex digest field in a record.
pub const DIGEST_LEN: usize = 32;

/// Width of a `YYYY-MM-DD HH:MM:SS` timestamp field in a record.
pub const TIME_LEN: usize = 19;

/// Timestamp layout used for the `modified` field.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator between device label and path in a record key.
pub const KEY_SEPARATOR: char = ':';

fn lookup<T: Copy>(
    names: &[(T, &'static str)],
    aliases: &[(T, &'static str)],
    s: &str,
) -> Option<T> {
    names
        .iter()
        .chain(aliases.iter())
        .find(|(_, name)| name.eq_ignore_ascii_case(s.trim()))
        .map(|(value, _)| *value)
}

fn unknown(kind: &str, value: &str, names: &[&str]) -> ApiError {
    ApiError::InvalidArgument(format!(
        "unknown {} {:?} (expected one of: {})",
        kind,
        value,
        names.join(", ")
    ))
}

/// Record field a query matches or sorts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Path = 0,
    Digest = 1,
    Size = 2,
    Time = 3,
}

impl Field {
    pub const NAMES: &'static [(Field, &'static str)] = &[
        (Field::Path, "path"),
        (Field::Digest, "digest"),
        (Field::Size, "size"),
        (Field::Time, "time"),
    ];
    pub const ALIASES: &'static [(Field, &'static str)] = &[
        (Field::Digest, "md5"),
        (Field::Time, "modified"),
        (Field::Time, "fileModificationTime"),
    ];

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize].1
    }
}

/// Comparison applied between a record field and the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    Contain = 0,
    StartWith = 1,
    EndWith = 2,
    Regex = 3,
    Eq = 4,
    Lt = 5,
    Gt = 6,
}

impl MatchMethod {
    pub const NAMES: &'static [(MatchMethod, &'static str)] = &[
        (MatchMethod::Contain, "contain"),
        (MatchMethod::StartWith, "startwith"),
        (MatchMethod::EndWith, "endwith"),
        (MatchMethod::Regex, "regex"),
        (MatchMethod::Eq, "eq"),
        (MatchMethod::Lt, "lt"),
        (MatchMethod::Gt, "gt"),
    ];
    pub const ALIASES: &'static [(MatchMethod, &'static str)] = &[
        (MatchMethod::Contain, "contains"),
        (MatchMethod::StartWith, "start-with"),
        (MatchMethod::EndWith, "end-with"),
    ];

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize].1
    }
}

/// Output format for `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv = 0,
    Json = 1,
}

impl ExportFormat {
    pub const NAMES: &'static [(ExportFormat, &'static str)] =
        &[(ExportFormat::Csv, "csv"), (ExportFormat::Json, "json")];
    pub const ALIASES: &'static [(ExportFormat, &'static str)] = &[];

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize].1
    }
}

/// Key rewrite applied by `alter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlterMode {
    DeviceName = 0,
    DriveLetter = 1,
}

impl AlterMode {
    pub const NAMES: &'static [(AlterMode, &'static str)] = &[
        (AlterMode::DeviceName, "device-name"),
        (AlterMode::DriveLetter, "drive-letter"),
    ];
    pub const ALIASES: &'static [(AlterMode, &'static str)] = &[
        (AlterMode::DeviceName, "DeviceName"),
        (AlterMode::DriveLetter, "DriveLetter"),
    ];

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize].1
    }
}

/// Log verbosity accepted on the command line and in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub const NAMES: &'static [(LogLevel, &'static str)] = &[
        (LogLevel::Off, "off"),
        (LogLevel::Error, "error"),
        (LogLevel::Warn, "warn"),
        (LogLevel::Info, "info"),
        (LogLevel::Debug, "debug"),
        (LogLevel::Trace, "trace"),
    ];
    pub const ALIASES: &'static [(LogLevel, &'static str)] =
        &[(LogLevel::Off, "none"), (LogLevel::Warn, "warning")];

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize].1
    }
}

macro_rules! name_table_traits {
    ($($ty:ident => $kind:literal),* $(,)?) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                lookup(Self::NAMES, Self::ALIASES, s).ok_or_else(|| {
                    let names: Vec<&str> = Self::NAMES.iter().map(|(_, n)| *n).collect();
                    unknown($kind, s, &names)
                })
            }
        }
    )*};
}

name_table_traits! {
    Field => "field",
    MatchMethod => "match method",
    ExportFormat => "export format",
    AlterMode => "alter mode",
    LogLevel => "log level",
}
