//! `db2ctl exec`: run a statement or statement file as the instance owner.

use anyhow::{Result, bail};
use db2kit::ExecRequest;

use crate::Context;
use crate::cli::ExecArgs;
use crate::commands;
use crate::config;
use crate::sudo::SudoContext;
use crate::ui;

pub fn run(ctx: &Context, args: ExecArgs) -> Result<()> {
    let request = request_from_args(args)?;
    let client = commands::client(config::inventory_config(ctx.db2ls.as_deref(), None));

    let _sudo = SudoContext::for_owners(&client, [request.instance.as_str()])?;

    let outcome = client.exec(&request)?;
    log::debug!("{}", outcome.command_line);

    print!("{}", outcome.stdout);
    if !outcome.stderr.is_empty() {
        eprint!("{}", outcome.stderr);
    }
    for warning in &outcome.warnings {
        ui::warn(warning);
    }
    if !ctx.quiet && !outcome.sqlcodes.is_empty() {
        let codes: Vec<String> = outcome
            .sqlcodes
            .iter()
            .map(|(code, count)| format!("{code} x{count}"))
            .collect();
        ui::info(&format!("SQL codes: {}", codes.join(", ")));
    }
    Ok(())
}

/// Build the execution request; a given statement file must exist.
pub(crate) fn request_from_args(args: ExecArgs) -> Result<ExecRequest> {
    let command_or_file = match (args.command, args.file) {
        (Some(command), None) => command,
        (None, Some(file)) => {
            if !file.is_file() {
                bail!("Statement file {} does not exist", file.display());
            }
            file.display().to_string()
        }
        _ => bail!("Exactly one of --command or --file is required"),
    };

    Ok(ExecRequest {
        instance: args.instance,
        database: args.database,
        command_or_file,
        logfile: args.logfile,
        ignorable_sqlcodes: args.ignore_sqlcodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn parse(args: &[&str]) -> ExecArgs {
        match Cli::try_parse_from(args).unwrap().command {
            Command::Exec(args) => args,
            _ => panic!("expected exec command"),
        }
    }

    #[test]
    fn test_request_from_statement() {
        let request = request_from_args(parse(&[
            "db2ctl", "exec", "-i", "db2inst1", "-d", "SAMPLE", "-c", "SELECT 1 FROM SYSIBM.SYSDUMMY1",
        ]))
        .unwrap();
        assert_eq!(request.instance, "db2inst1");
        assert_eq!(request.database.as_deref(), Some("SAMPLE"));
        assert_eq!(request.command_or_file, "SELECT 1 FROM SYSIBM.SYSDUMMY1");
        assert!(request.ignorable_sqlcodes.is_none());
    }

    #[test]
    fn test_request_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ddl.sql");
        std::fs::write(&file, "CREATE TABLE T (ID INT);\n").unwrap();

        let request = request_from_args(parse(&[
            "db2ctl",
            "exec",
            "-i",
            "db2inst1",
            "-f",
            file.to_str().unwrap(),
        ]))
        .unwrap();
        assert_eq!(request.command_or_file, file.display().to_string());

        let missing = dir.path().join("missing.sql");
        let err = request_from_args(parse(&[
            "db2ctl",
            "exec",
            "-i",
            "db2inst1",
            "-f",
            missing.to_str().unwrap(),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
