use std::env;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use priority_drift::cli;
use priority_drift::config::Config;
use priority_drift::logging;
use priority_drift::scheduler::CurrentProcess;

fn main() -> ExitCode {
    let config = Config::from_env();
    logging::init(config.as_ref().ok().and_then(|config| config.log.as_deref()));

    let mut args = env::args_os().map(|arg| arg.to_string_lossy().into_owned());
    let program = args
        .next()
        .as_deref()
        .and_then(|path| Path::new(path).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());

    let stdout = io::stdout();
    match cli::run(&program, args, config, &CurrentProcess, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}
