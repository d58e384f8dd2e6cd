// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, set up logging, build the context and
//   hand it to the command dispatcher.
// - Errors are printed once here; the exit code comes from their class.

use std::process::ExitCode;

use canvas_cli::{
    cli::Cli,
    commands::dispatch,
    config::{ConfigScope, ConfigStore},
    context::{AppContext, Settings},
    error::{exit_code_for, CliError},
    logging::init_tracing,
};
use clap::Parser;

fn run(cli: Cli) -> anyhow::Result<()> {
    let store = ConfigStore::discover().map_err(CliError::from)?;
    tracing::debug!(
        local = %store.path(ConfigScope::Local).display(),
        global = %store.path(ConfigScope::Global).display(),
        "config files"
    );
    let settings = Settings {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    let mut ctx = AppContext::new(settings, store);
    dispatch(&mut ctx, cli.command)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(command = ?cli.command, "starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code_for(&err);
            if matches!(err.downcast_ref::<CliError>(), Some(CliError::Cancelled)) {
                eprintln!("{err}");
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
