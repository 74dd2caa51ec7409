use tracing::debug;

use crate::error::CommandLineError;
use crate::table::{parse_decimal, Tables, NORMAL_PRIORITY_CLASS, THREAD_PRIORITY_NORMAL};

pub const DEFAULT_ITERATIONS: u64 = 10 * 1000 * 1000;

/// A flag the program understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Help,
    Iterations,
    PriorityClass,
    ThreadPriority,
}

impl Flag {
    /// Every flag, in the order the usage line lists them.
    pub const ALL: [Flag; 4] = [
        Flag::PriorityClass,
        Flag::ThreadPriority,
        Flag::Iterations,
        Flag::Help,
    ];

    pub fn long(self) -> &'static str {
        match self {
            Flag::Help => "--help",
            Flag::Iterations => "--iterations",
            Flag::PriorityClass => "--priority-class",
            Flag::ThreadPriority => "--thread-priority",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Flag::Help => "-h",
            Flag::Iterations => "-i",
            Flag::PriorityClass => "-p",
            Flag::ThreadPriority => "-t",
        }
    }

    /// Placeholder for the value the flag consumes, `None` for `--help`.
    pub fn value_name(self) -> Option<&'static str> {
        match self {
            Flag::Help => None,
            Flag::Iterations => Some("<ITERATIONS>"),
            Flag::PriorityClass => Some("<CLASS>"),
            Flag::ThreadPriority => Some("<THREAD>"),
        }
    }

    pub fn from_token(token: &str) -> Option<Flag> {
        Flag::ALL
            .into_iter()
            .find(|flag| flag.long() == token || flag.short() == token)
    }

    /// The value this flag sets, `None` for `--help`.
    fn setting(self) -> Option<Setting> {
        match self {
            Flag::Help => None,
            Flag::Iterations => Some(Setting::Iterations),
            Flag::PriorityClass => Some(Setting::PriorityClass),
            Flag::ThreadPriority => Some(Setting::ThreadPriority),
        }
    }

    fn duplicate(self) -> CommandLineError {
        CommandLineError::Duplicate {
            short: self.short(),
            long: self.long(),
        }
    }
}

/// The values used for anything the command line leaves out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Defaults {
    pub iterations: u64,
    pub priority_class: u32,
    pub thread_priority: i32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            priority_class: NORMAL_PRIORITY_CLASS,
            thread_priority: THREAD_PRIORITY_NORMAL,
        }
    }
}

/// The validated result of parsing a command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedConfig {
    /// Loop counter for the drift measurement
    pub iterations: u64,
    /// Process priority class code
    pub priority_class: u32,
    /// Thread priority code, relative to the process class
    pub thread_priority: i32,
    /// When set, the other fields hold defaults and should be ignored
    pub help_requested: bool,
}

impl From<Defaults> for ParsedConfig {
    fn from(defaults: Defaults) -> Self {
        Self {
            iterations: defaults.iterations,
            priority_class: defaults.priority_class,
            thread_priority: defaults.thread_priority,
            help_requested: false,
        }
    }
}

impl Default for ParsedConfig {
    fn default() -> Self {
        Defaults::default().into()
    }
}

/// Turns command line tokens into a [`ParsedConfig`].
pub struct FlagParser<'a> {
    tables: &'a Tables,
    defaults: Defaults,
}

impl<'a> FlagParser<'a> {
    pub fn new(tables: &'a Tables) -> Self {
        Self {
            tables,
            defaults: Defaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Parses `tokens`, which must not include the program name.
    ///
    /// A help flag stops the scan: anything after it is ignored, even
    /// tokens that would otherwise be rejected.
    pub fn parse<I, S>(&self, tokens: I) -> Result<ParsedConfig, CommandLineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = ParsedConfig::from(self.defaults);
        let mut seen = Seen::default();
        let mut tokens = tokens.into_iter();

        while let Some(token) = tokens.next() {
            let token = token.as_ref();
            let flag = Flag::from_token(token)
                .ok_or_else(|| CommandLineError::UnknownFlag(token.to_owned()))?;

            let Some(setting) = flag.setting() else {
                debug!("help requested, ignoring the remaining arguments");
                config.help_requested = true;
                return Ok(config);
            };

            let value = tokens
                .next()
                .ok_or_else(|| CommandLineError::MissingValue(token.to_owned()))?;
            seen.mark(setting)?;
            self.apply(setting, value.as_ref(), &mut config)?;
        }

        debug!(?config, "parsed command line");
        Ok(config)
    }

    fn apply(
        &self,
        setting: Setting,
        value: &str,
        config: &mut ParsedConfig,
    ) -> Result<(), CommandLineError> {
        match setting {
            Setting::Iterations => config.iterations = parse_decimal(value)?,
            Setting::PriorityClass => config.priority_class = self.tables.classes.resolve(value)?,
            Setting::ThreadPriority => config.thread_priority = self.tables.threads.resolve(value)?,
        }
        Ok(())
    }
}

/// The flags that take a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Setting {
    Iterations,
    PriorityClass,
    ThreadPriority,
}

impl Setting {
    fn flag(self) -> Flag {
        match self {
            Setting::Iterations => Flag::Iterations,
            Setting::PriorityClass => Flag::PriorityClass,
            Setting::ThreadPriority => Flag::ThreadPriority,
        }
    }
}

#[derive(Default)]
struct Seen {
    iterations: bool,
    priority_class: bool,
    thread_priority: bool,
}

impl Seen {
    fn mark(&mut self, setting: Setting) -> Result<(), CommandLineError> {
        let slot = match setting {
            Setting::Iterations => &mut self.iterations,
            Setting::PriorityClass => &mut self.priority_class,
            Setting::ThreadPriority => &mut self.thread_priority,
        };
        if *slot {
            return Err(setting.flag().duplicate());
        }
        *slot = true;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::{Defaults, Flag, FlagParser, ParsedConfig, Setting, DEFAULT_ITERATIONS};
    use crate::error::{CommandLineError, Radix};
    use crate::table::Tables;

    fn parse(tokens: &[&str]) -> Result<ParsedConfig, CommandLineError> {
        let tables = Tables::load();
        FlagParser::new(&tables).parse(tokens)
    }

    #[test]
    fn no_flags_yield_the_documented_defaults() {
        let config = parse(&[]).unwrap();

        assert_eq!(
            config,
            ParsedConfig {
                iterations: 10_000_000,
                priority_class: 0x20,
                thread_priority: 0,
                help_requested: false,
            }
        );
        assert_eq!(config, ParsedConfig::default());
    }

    #[test]
    fn long_and_short_forms_set_every_field() {
        let long = parse(&[
            "--iterations",
            "42",
            "--priority-class",
            "HIGH_PRIORITY_CLASS",
            "--thread-priority",
            "THREAD_PRIORITY_IDLE",
        ])
        .unwrap();
        let short = parse(&[
            "-t",
            "THREAD_PRIORITY_IDLE",
            "-i",
            "42",
            "-p",
            "HIGH_PRIORITY_CLASS",
        ])
        .unwrap();

        assert_eq!(long, short);
        assert_eq!(long.iterations, 42);
        assert_eq!(long.priority_class, 0x80);
        assert_eq!(long.thread_priority, -15);
        assert!(!long.help_requested);
    }

    #[test]
    fn help_short_circuits_anywhere() {
        for tokens in [
            vec!["--help"],
            vec!["-h"],
            vec!["-i", "5", "-h", "--bogus", "-i"],
            vec!["--iterations", "5", "--help", "-p"],
        ] {
            let config = parse(&tokens).unwrap();
            assert!(config.help_requested, "{tokens:?}");
        }
    }

    #[test]
    fn errors_before_help_still_win() {
        assert_eq!(
            parse(&["--bogus", "-h"]),
            Err(CommandLineError::UnknownFlag("--bogus".into()))
        );
    }

    #[test]
    fn repeated_flags_are_rejected_in_any_form() {
        let cases = [
            (["-i", "1", "-i", "2"], Flag::Iterations),
            (["--iterations", "1", "-i", "2"], Flag::Iterations),
            (["-p", "32", "--priority-class", "32"], Flag::PriorityClass),
            (["--priority-class", "32", "--priority-class", "32"], Flag::PriorityClass),
            (["-t", "0", "-t", "0"], Flag::ThreadPriority),
            (["--thread-priority", "0", "-t", "1"], Flag::ThreadPriority),
        ];

        for (tokens, flag) in cases {
            let err = parse(&tokens).unwrap_err();
            assert_eq!(
                err,
                CommandLineError::Duplicate {
                    short: flag.short(),
                    long: flag.long(),
                }
            );
            assert_eq!(
                err.to_string(),
                format!("The flag {} or {} given more than once.", flag.short(), flag.long())
            );
        }
    }

    #[test]
    fn unknown_flags_are_named_in_the_error() {
        let err = parse(&["--bogus"]).unwrap_err();

        assert_eq!(err, CommandLineError::UnknownFlag("--bogus".into()));
        assert!(err.to_string().contains("--bogus"));
    }

    #[test]
    fn bare_values_are_unknown_flags() {
        assert_eq!(parse(&["42"]), Err(CommandLineError::UnknownFlag("42".into())));
    }

    #[test]
    fn trailing_value_flags_need_a_value() {
        for flag in ["-i", "--iterations", "-p", "--priority-class", "-t", "--thread-priority"] {
            let err = parse(&[flag]).unwrap_err();
            assert_eq!(err, CommandLineError::MissingValue(flag.into()));
            assert!(err.to_string().contains(flag));
        }
        // A repeated flag without a value is reported as missing its value.
        assert_eq!(
            parse(&["-i", "3", "-i"]),
            Err(CommandLineError::MissingValue("-i".into()))
        );
    }

    #[test]
    fn class_names_hex_and_decimal_agree() {
        let by_hex = parse(&["--priority-class", "0x20"]).unwrap();
        let by_decimal = parse(&["--priority-class", "32"]).unwrap();
        let by_name = parse(&["--priority-class", "NORMAL_PRIORITY_CLASS"]).unwrap();

        assert_eq!(by_hex.priority_class, 32);
        assert_eq!(by_decimal.priority_class, 32);
        assert_eq!(by_name.priority_class, 32);
    }

    #[test]
    fn unparseable_class_literals_quote_the_text() {
        let err = parse(&["--priority-class", "not-a-number"]).unwrap_err();

        assert_eq!(
            err,
            CommandLineError::InvalidLiteral {
                literal: "not-a-number".into(),
                radix: Radix::Decimal,
            }
        );
        assert!(err.to_string().contains("not-a-number"));
    }

    #[test]
    fn values_may_look_like_flags() {
        let config = parse(&["-t", "-2", "-i", "-h"]);

        assert_eq!(
            config,
            Err(CommandLineError::InvalidLiteral {
                literal: "-h".into(),
                radix: Radix::Decimal,
            })
        );
        assert_eq!(parse(&["-t", "-2"]).unwrap().thread_priority, -2);
    }

    #[test]
    fn iteration_counts_are_parsed_strictly() {
        assert_eq!(parse(&["-i", "0"]).unwrap().iterations, 0);
        for bad in ["ten", "12x", "-1", "0x10", "", "+5", " 5"] {
            assert_eq!(
                parse(&["-i", bad]),
                Err(CommandLineError::InvalidLiteral {
                    literal: bad.into(),
                    radix: Radix::Decimal,
                })
            );
        }
    }

    #[test]
    fn custom_defaults_fill_the_gaps() {
        let tables = Tables::load();
        let defaults = Defaults {
            iterations: 7,
            priority_class: 0x80,
            thread_priority: 2,
        };
        let parser = FlagParser::new(&tables).with_defaults(defaults);

        let config = parser.parse(["-i", "9"]).unwrap();

        assert_eq!(config.iterations, 9);
        assert_eq!(config.priority_class, 0x80);
        assert_eq!(config.thread_priority, 2);
        assert_eq!(parser.parse(Vec::<String>::new()).unwrap(), ParsedConfig::from(defaults));
        assert_eq!(Defaults::default().iterations, DEFAULT_ITERATIONS);
    }

    #[test]
    fn every_flag_is_recognized_by_both_forms() {
        for flag in Flag::ALL {
            assert_eq!(Flag::from_token(flag.long()), Some(flag));
            assert_eq!(Flag::from_token(flag.short()), Some(flag));
            assert_eq!(flag.value_name().is_none(), flag == Flag::Help);
            assert_eq!(flag.setting().is_none(), flag == Flag::Help);
        }
        assert_eq!(Flag::from_token("--Help"), None);
    }

    #[test]
    fn value_flags_map_back_to_themselves() {
        for setting in [Setting::Iterations, Setting::PriorityClass, Setting::ThreadPriority] {
            assert_eq!(setting.flag().setting(), Some(setting));
        }
    }

    #[test]
    fn signed_literals_are_rejected_after_a_hex_prefix() {
        for (tokens, literal) in [
            (["-p", "0x+20"], "0x+20"),
            (["-t", "0x-1"], "0x-1"),
        ] {
            assert_eq!(
                parse(&tokens),
                Err(CommandLineError::InvalidLiteral {
                    literal: literal.into(),
                    radix: Radix::Hexadecimal,
                })
            );
        }
        assert_eq!(
            parse(&["-p", "+32"]),
            Err(CommandLineError::InvalidLiteral {
                literal: "+32".into(),
                radix: Radix::Decimal,
            })
        );
    }

    proptest! {
        #[test]
        fn any_iteration_count_is_accepted(iterations in any::<u64>()) {
            let config = parse(&["--iterations", iterations.to_string().as_str()]).unwrap();
            prop_assert_eq!(config.iterations, iterations);
        }

        #[test]
        fn resolved_threads_map_back_to_a_name_with_the_same_code(
            name in prop::sample::select(
                Tables::load().threads.iter().map(|(name, _)| name).collect::<Vec<_>>()
            )
        ) {
            let tables = Tables::load();
            let config = FlagParser::new(&tables).parse(["-t", name]).unwrap();
            let back = tables.threads.name_for_code(config.thread_priority).unwrap();
            prop_assert_eq!(tables.threads.get(back), Some(config.thread_priority));
        }
    }
}
