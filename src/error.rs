use thiserror::Error;

/// Everything that can go wrong while turning the command line into a
/// [`ParsedConfig`](crate::args::ParsedConfig).
///
/// All variants are one kind of failure (an invalid command line); they only
/// differ in the message they render.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandLineError {
    #[error("Unknown flag: {0}.")]
    UnknownFlag(String),
    #[error("No value for the flag '{0}'.")]
    MissingValue(String),
    #[error("The flag {short} or {long} given more than once.")]
    Duplicate {
        short: &'static str,
        long: &'static str,
    },
    #[error("Could not parse '{literal}' as a valid {radix} value.")]
    InvalidLiteral { literal: String, radix: Radix },
    #[error("Unknown {domain}: 0x{hex} = {decimal}.")]
    UnknownCode {
        domain: &'static str,
        hex: String,
        decimal: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Hexadecimal,
}

impl std::fmt::Display for Radix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Radix::Decimal => f.write_str("decimal"),
            Radix::Hexadecimal => f.write_str("hexadecimal"),
        }
    }
}
