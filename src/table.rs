use std::collections::BTreeMap;
use std::fmt;

use num_traits::Num;

use crate::error::{CommandLineError, Radix};

pub const NORMAL_PRIORITY_CLASS: u32 = 0x0000_0020;
pub const THREAD_PRIORITY_NORMAL: i32 = 0;

/// Integer types usable as scheduling codes.
pub trait Code: Copy + Eq + Num + fmt::Display + fmt::LowerHex {}

impl<T> Code for T where T: Copy + Eq + Num + fmt::Display + fmt::LowerHex {}

/// Symbolic names for the codes of one scheduling domain.
///
/// Entries are kept sorted by name, so iteration (and therefore help output
/// and inverse lookups) is deterministic.
#[derive(Clone, Debug)]
pub struct NamedCodeTable<C> {
    domain: &'static str,
    entries: BTreeMap<&'static str, C>,
}

impl<C: Code> NamedCodeTable<C> {
    /// Builds a table for `domain`. A name given twice keeps its last code.
    pub fn new<I>(domain: &'static str, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, C)>,
    {
        Self {
            domain,
            entries: entries.into_iter().collect(),
        }
    }

    /// Human readable name of the domain, used in error messages
    pub fn domain(&self) -> &'static str {
        self.domain
    }

    pub fn get(&self, name: &str) -> Option<C> {
        self.entries.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, C)> + '_ {
        self.entries.iter().map(|(&name, &code)| (name, code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width of the widest name, used to align help columns.
    pub fn max_name_len(&self) -> usize {
        self.entries.keys().map(|name| name.len()).max().unwrap_or(0)
    }

    /// Returns the alphabetically-first name mapped to `code`.
    pub fn name_for_code(&self, code: C) -> Result<&'static str, CommandLineError> {
        self.iter()
            .find(|&(_, candidate)| candidate == code)
            .map(|(name, _)| name)
            .ok_or_else(|| CommandLineError::UnknownCode {
                domain: self.domain,
                hex: format!("{code:08x}"),
                decimal: code.to_string(),
            })
    }

    /// Resolves a command line value: a known name first, then a `0x`
    /// literal, then a decimal literal.
    pub fn resolve(&self, literal: &str) -> Result<C, CommandLineError> {
        match self.get(literal) {
            Some(code) => Ok(code),
            None => parse_literal(literal),
        }
    }
}

/// Parses `0x`/`0X` prefixed hexadecimal or plain decimal text.
///
/// Hexadecimal digits carry no sign; decimal text may only start with `-`.
pub fn parse_literal<C: Code>(literal: &str) -> Result<C, CommandLineError> {
    let hex_digits = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
        .filter(|digits| !digits.is_empty());

    match hex_digits {
        Some(digits) if digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
            C::from_str_radix(digits, 16).map_err(|_| invalid(literal, Radix::Hexadecimal))
        }
        Some(_) => Err(invalid(literal, Radix::Hexadecimal)),
        None => parse_decimal(literal),
    }
}

/// Parses decimal text, optionally negative. A leading `+` is rejected.
pub fn parse_decimal<C: Code>(literal: &str) -> Result<C, CommandLineError> {
    let magnitude = literal.strip_prefix('-').unwrap_or(literal);
    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(literal, Radix::Decimal));
    }
    C::from_str_radix(literal, 10).map_err(|_| invalid(literal, Radix::Decimal))
}

fn invalid(literal: &str, radix: Radix) -> CommandLineError {
    CommandLineError::InvalidLiteral {
        literal: literal.to_owned(),
        radix,
    }
}

pub fn priority_classes() -> NamedCodeTable<u32> {
    NamedCodeTable::new(
        "priority class",
        [
            ("ABOVE_NORMAL_PRIORITY_CLASS", 0x0000_8000),
            ("BELOW_NORMAL_PRIORITY_CLASS", 0x0000_4000),
            ("HIGH_PRIORITY_CLASS", 0x0000_0080),
            ("IDLE_PRIORITY_CLASS", 0x0000_0040),
            ("NORMAL_PRIORITY_CLASS", NORMAL_PRIORITY_CLASS),
            ("PROCESS_MODE_BACKGROUND_BEGIN", 0x0010_0000),
            ("PROCESS_MODE_BACKGROUND_END", 0x0020_0000),
            ("REALTIME_PRIORITY_CLASS", 0x0000_0100),
        ],
    )
}

pub fn thread_priorities() -> NamedCodeTable<i32> {
    NamedCodeTable::new(
        "thread priority",
        [
            ("THREAD_MODE_BACKGROUND_BEGIN", 0x0001_0000),
            ("THREAD_MODE_BACKGROUND_END", 0x0002_0000),
            ("THREAD_PRIORITY_ABOVE_NORMAL", 1),
            ("THREAD_PRIORITY_BELOW_NORMAL", -1),
            ("THREAD_PRIORITY_HIGHEST", 2),
            ("THREAD_PRIORITY_IDLE", -15),
            ("THREAD_PRIORITY_LOWEST", -2),
            ("THREAD_PRIORITY_NORMAL", THREAD_PRIORITY_NORMAL),
            ("THREAD_PRIORITY_TIME_CRITICAL", 15),
        ],
    )
}

/// Both lookup tables, built once at startup and shared by reference.
#[derive(Clone, Debug)]
pub struct Tables {
    pub classes: NamedCodeTable<u32>,
    pub threads: NamedCodeTable<i32>,
}

impl Tables {
    pub fn load() -> Self {
        Self {
            classes: priority_classes(),
            threads: thread_priorities(),
        }
    }
}
