use std::{io::Write, process::ExitCode};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use codeowners_gate::{parse_file, CheckReport, OwnershipTable};

use crate::{
    config::{Cli, Command},
    github::GitHubClient,
};

mod config;
mod event;
mod github;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_error(err),
    };
    init_logging(cli.verbose);

    if let Some(Command::Owners { paths }) = &cli.command {
        return match print_owners(&cli, paths) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {:#}", err);
                ExitCode::FAILURE
            }
        };
    }

    let report = match check(&cli) {
        Ok(report) => report,
        Err(err) => {
            log::error!("{:#}", err);
            CheckReport::error(format!("{:#}", err))
        }
    };
    finish(&report)
}

// Help and version output keep clap's behaviour. Anything else is a
// configuration error and gets the same JSON report as every other failure.
fn usage_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
        _ => {
            let rendered = err.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ");
            finish(&CheckReport::error(format!(
                "invalid configuration: {}",
                message
            )))
        }
    }
}

fn finish(report: &CheckReport) -> ExitCode {
    print_summary(report);
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("error: failed to serialize report: {}", err);
            return ExitCode::FAILURE;
        }
    }

    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn check(cli: &Cli) -> Result<CheckReport> {
    let settings = cli.settings()?;
    log::info!(
        "Checking code owner approvals for {}#{}",
        settings.repository,
        settings.pr_number
    );

    let client = GitHubClient::new(
        settings.api_url,
        settings.repository,
        settings.token,
        settings.pr_number,
    )
    .context("failed to set up GitHub client")?;

    Ok(codeowners_gate::run(&settings.check, &client))
}

fn print_owners(cli: &Cli, paths: &[String]) -> Result<()> {
    let table: OwnershipTable = parse_file(&cli.codeowners_file)?.into_table();
    for invalid in &table.diagnostics().invalid_patterns {
        log::warn!(
            "invalid CODEOWNERS pattern `{}`: {}",
            invalid.pattern.escape_debug(),
            invalid.message
        );
    }

    let mut out = std::io::stdout().lock();
    for path in paths {
        writeln!(out, "{}", path)?;
        let matching = table.matching_entries(path);
        if matching.is_empty() {
            writeln!(out, "    (unowned)")?;
            continue;
        }
        for (idx, entry) in matching {
            writeln!(
                out,
                "    #{:<4} {:<40} {}",
                idx + 1,
                entry.pattern,
                owner_handles(&entry.owners)
            )?;
        }
        let required = table.required_owners(&[path.as_str()]);
        writeln!(out, "    required: {}", owner_handles(required.iter()))?;
    }
    Ok(())
}

fn owner_handles<I, S>(owners: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    owners
        .into_iter()
        .map(|owner| format!("@{}", owner.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn print_summary(report: &CheckReport) {
    let status = if report.success { "PASS" } else { "FAIL" };
    let text = report
        .message
        .as_deref()
        .or(report.error.as_deref())
        .unwrap_or_default();
    eprintln!("{}: {}", status, text);

    let diagnostics = &report.diagnostics;
    for skipped in &diagnostics.skipped_lines {
        eprintln!(
            "warning: CODEOWNERS line {} has no owners and was ignored: {}",
            skipped.line, skipped.text
        );
    }
    for invalid in &diagnostics.invalid_patterns {
        eprintln!(
            "warning: invalid CODEOWNERS pattern `{}`: {}",
            invalid.pattern.escape_debug(),
            invalid.message
        );
    }
}
