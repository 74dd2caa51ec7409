use std::io::{self, Write};

use crate::args::ParsedConfig;
use crate::drift::DriftReport;
use crate::error::CommandLineError;
use crate::scheduler::Effective;
use crate::table::Tables;

/// The requested settings, by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Requested {
    pub iterations: u64,
    pub priority_class: (&'static str, u32),
    pub thread_priority: (&'static str, i32),
}

impl Requested {
    /// Fails when a code given as a literal has no name in its table.
    pub fn new(config: &ParsedConfig, tables: &Tables) -> Result<Self, CommandLineError> {
        let class_name = tables.classes.name_for_code(config.priority_class)?;
        let thread_name = tables.threads.name_for_code(config.thread_priority)?;
        Ok(Self {
            iterations: config.iterations,
            priority_class: (class_name, config.priority_class),
            thread_priority: (thread_name, config.thread_priority),
        })
    }

    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let (class_name, class) = self.priority_class;
        let (thread_name, thread) = self.thread_priority;
        let width = class_name.len().max(thread_name.len());

        writeln!(out, "Number of iterations:           {}", self.iterations)?;
        writeln!(
            out,
            "Requested priority class:       {class_name:<width$} (0x{class:08x} = {class})"
        )?;
        writeln!(
            out,
            "Requested thread priority:      {thread_name:<width$} (0x{thread:08x} = {thread})"
        )
    }
}

pub fn write_effective<W: Write>(out: &mut W, effective: &Effective) -> io::Result<()> {
    if let Some(name) = effective.priority_class {
        writeln!(out, "Effective priority class:       {name}")?;
    }
    if let Some(name) = effective.thread_priority {
        writeln!(out, "Effective thread priority:      {name}")?;
    }
    Ok(())
}

pub fn write_drift<W: Write>(out: &mut W, drift: &DriftReport) -> io::Result<()> {
    writeln!(out, "Maximum elapsed time (ms):      {}", drift.max_elapsed)?;
    writeln!(out, "Maximum tick step (ms):         {}", drift.max_step)
}
