//! Applying the parsed codes to the running process.
//!
//! Codes are Windows priority classes and thread priorities and are handed
//! to the platform untranslated. Elsewhere every call fails with
//! [`io::ErrorKind::Unsupported`].

use std::io;

use tracing::{debug, warn};

use crate::args::ParsedConfig;
use crate::table::Tables;

/// Process and thread scheduling controls of the current process.
pub trait Scheduler {
    fn set_priority_class(&self, code: u32) -> io::Result<()>;
    fn set_thread_priority(&self, code: i32) -> io::Result<()>;
    fn priority_class(&self) -> io::Result<u32>;
    fn thread_priority(&self) -> io::Result<i32>;
}

/// Which of the two requests the platform accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Applied {
    pub priority_class: bool,
    pub thread_priority: bool,
}

/// Requests the configured class and thread priority. Refusals are logged
/// and reported, never fatal.
pub fn apply<S: Scheduler>(scheduler: &S, config: &ParsedConfig) -> Applied {
    let priority_class = match scheduler.set_priority_class(config.priority_class) {
        Ok(()) => true,
        Err(err) => {
            warn!("could not set the process priority class: {err}");
            false
        }
    };
    let thread_priority = match scheduler.set_thread_priority(config.thread_priority) {
        Ok(()) => true,
        Err(err) => {
            warn!("could not set the thread priority: {err}");
            false
        }
    };
    debug!(priority_class, thread_priority, "applied scheduling request");
    Applied { priority_class, thread_priority }
}

/// Names of the class and thread priority actually in effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effective {
    pub priority_class: Option<&'static str>,
    pub thread_priority: Option<&'static str>,
}

/// Queries the effective settings. A query the platform refuses is left
/// out; a code missing from the tables is an error.
pub fn effective<S: Scheduler>(scheduler: &S, tables: &Tables) -> crate::Result<Effective> {
    let priority_class = match scheduler.priority_class() {
        Ok(code) => Some(tables.classes.name_for_code(code)?),
        Err(err) => {
            warn!("could not query the process priority class: {err}");
            None
        }
    };
    let thread_priority = match scheduler.thread_priority() {
        Ok(code) => Some(tables.threads.name_for_code(code)?),
        Err(err) => {
            warn!("could not query the thread priority: {err}");
            None
        }
    };
    Ok(Effective { priority_class, thread_priority })
}

#[cfg(windows)]
pub use self::windows::CurrentProcess;

#[cfg(not(windows))]
pub use self::unsupported::CurrentProcess;

#[cfg(windows)]
mod windows {
    use std::io;

    use windows_sys::Win32::System::Threading::{
        GetCurrentProcess, GetCurrentThread, GetPriorityClass, GetThreadPriority, SetPriorityClass,
        SetThreadPriority, THREAD_PRIORITY_ERROR_RETURN,
    };

    use super::Scheduler;

    /// The calling process and thread.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct CurrentProcess;

    impl Scheduler for CurrentProcess {
        fn set_priority_class(&self, code: u32) -> io::Result<()> {
            // SAFETY: the pseudo handle of the current process is always valid.
            if unsafe { SetPriorityClass(GetCurrentProcess(), code) } == 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }

        fn set_thread_priority(&self, code: i32) -> io::Result<()> {
            // SAFETY: the pseudo handle of the current thread is always valid.
            if unsafe { SetThreadPriority(GetCurrentThread(), code) } == 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }

        fn priority_class(&self) -> io::Result<u32> {
            // SAFETY: as above.
            match unsafe { GetPriorityClass(GetCurrentProcess()) } {
                0 => Err(io::Error::last_os_error()),
                code => Ok(code),
            }
        }

        fn thread_priority(&self) -> io::Result<i32> {
            // SAFETY: as above.
            let code = unsafe { GetThreadPriority(GetCurrentThread()) };
            if code == THREAD_PRIORITY_ERROR_RETURN as i32 {
                return Err(io::Error::last_os_error());
            }
            Ok(code)
        }
    }
}

#[cfg(not(windows))]
mod unsupported {
    use std::io;

    use super::Scheduler;

    /// The calling process and thread.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct CurrentProcess;

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "priority classes and thread priorities are only available on Windows",
        )
    }

    impl Scheduler for CurrentProcess {
        fn set_priority_class(&self, _code: u32) -> io::Result<()> {
            Err(unsupported())
        }

        fn set_thread_priority(&self, _code: i32) -> io::Result<()> {
            Err(unsupported())
        }

        fn priority_class(&self) -> io::Result<u32> {
            Err(unsupported())
        }

        fn thread_priority(&self) -> io::Result<i32> {
            Err(unsupported())
        }
    }
}
