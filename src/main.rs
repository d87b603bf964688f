mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod sudo;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// `db2ls` location from `--db2ls` / `DB2CTL_DB2LS`
    pub db2ls: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        db2ls: cli.db2ls,
    };

    match run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&ctx, &err);
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Facts(args) => commands::facts::run(ctx, args),
        Command::Instance(args) => commands::instance::run(ctx, args),
        Command::Apply(args) => commands::apply::run(ctx, args),
        Command::Exec(args) => commands::exec::run(ctx, args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "db2ctl", &mut io::stdout());
            Ok(())
        }
    }
}

fn report(ctx: &Context, err: &anyhow::Error) {
    match err.downcast_ref::<db2kit::Error>() {
        Some(db2_err) => {
            // Outer context, e.g. which file was being applied
            let outer = err.to_string();
            if outer != db2_err.to_string() {
                ui::error(&outer);
            }
            ui::db2_error(db2_err);
        }
        None => ui::error(&format!("{err:#}")),
    }

    if ctx.verbose > 1 {
        for cause in err.chain().skip(1) {
            ui::ekv("caused by", &cause.to_string());
        }
    }
}
