use std::io::{self, Write};

use itertools::Itertools;

use crate::args::{Defaults, Flag};
use crate::table::{Code, NamedCodeTable, Tables};

/// `[-p|--priority-class <CLASS>] ... [-h|--help]`
pub(crate) fn usage(program: &str) -> String {
    let flags = Flag::ALL
        .into_iter()
        .map(|flag| match flag.value_name() {
            Some(value) => format!("[{}|{} {}]", flag.short(), flag.long(), value),
            None => format!("[{}|{}]", flag.short(), flag.long()),
        })
        .join(" ");
    format!("{program} {flags}")
}

/// Writes the help screen: the usage line followed by one table per
/// scheduling domain, with the current default marked.
pub fn write_help<W: Write>(
    out: &mut W,
    program: &str,
    tables: &Tables,
    defaults: &Defaults,
) -> io::Result<()> {
    writeln!(out, "{}", usage(program))?;
    writeln!(out, "where:")?;
    writeln!(out)?;
    writeln!(out, "  <CLASS> is one of:")?;
    write_table(out, &tables.classes, "Sets the process class to", defaults.priority_class)?;
    writeln!(out)?;
    writeln!(out, "  <THREAD> is one of:")?;
    write_table(out, &tables.threads, "Sets the thread priority to", defaults.thread_priority)?;
    writeln!(out)
}

fn write_table<W: Write, C: Code>(
    out: &mut W,
    table: &NamedCodeTable<C>,
    action: &str,
    default: C,
) -> io::Result<()> {
    let width = table.max_name_len();
    for (name, code) in table.iter() {
        let marker = if code == default { " (default)" } else { "" };
        writeln!(out, "    {name:<width$} -- {action} 0x{code:08x} = {code}{marker}")?;
    }
    Ok(())
}
