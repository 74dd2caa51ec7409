use std::io::Write;

use tracing::warn;

use crate::app;
use crate::args::{Defaults, FlagParser};
use crate::config::Config;
use crate::drift::{self, MonotonicClock};
use crate::report::{self, Requested};
use crate::scheduler::{self, Scheduler};
use crate::table::Tables;
use crate::Result;

/// Runs the program against `tokens` (argv without the program name).
///
/// `config` is handed in unresolved: a broken configuration never stops
/// `--help`, which falls back to the built-in defaults.
pub fn run<I, S, P, W>(
    program: &str,
    tokens: I,
    config: Result<Config>,
    process: &P,
    out: &mut W,
) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    P: Scheduler,
    W: Write,
{
    let tables = Tables::load();
    let defaults = config.and_then(|config| config.defaults(&tables));

    let parsed = FlagParser::new(&tables)
        .with_defaults(defaults.as_ref().map_or_else(|_| Defaults::default(), |d| *d))
        .parse(tokens)?;

    if parsed.help_requested {
        let defaults = match &defaults {
            Ok(defaults) => *defaults,
            Err(err) => {
                warn!("ignoring configuration: {err}");
                Defaults::default()
            }
        };
        app::write_help(out, program, &tables, &defaults)?;
        return Ok(());
    }
    defaults?;

    Requested::new(&parsed, &tables)?.write(out)?;
    out.flush()?;

    scheduler::apply(process, &parsed);
    report::write_effective(out, &scheduler::effective(process, &tables)?)?;
    out.flush()?;

    let measured = drift::measure(&mut MonotonicClock::new(), parsed.iterations);
    Ok(report::write_drift(out, &measured)?)
}
