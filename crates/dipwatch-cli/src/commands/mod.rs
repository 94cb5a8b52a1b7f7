mod calendar;
mod common;
mod run;
mod validate;

use std::path::PathBuf;

pub enum Command {
    Run {
        config: Option<PathBuf>,
        dry_run: bool,
        at: Option<String>,
        json: bool,
    },
    Validate {
        config: PathBuf,
    },
    Calendar {
        config: Option<PathBuf>,
        date: Option<String>,
        at: Option<String>,
    },
}

pub fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Run {
            config,
            dry_run,
            at,
            json,
        } => run::run_check(config, dry_run, at, json),
        Command::Validate { config } => validate::run_validate(config),
        Command::Calendar { config, date, at } => calendar::run_calendar(config, date, at),
    }
}
