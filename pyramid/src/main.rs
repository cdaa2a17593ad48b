//! Pyramid chart builder, interactive shell.
//!
//! Builds organizational pyramid charts from the terminal: manage a roster
//! of people and photos, assign them to pyramid positions, save and reload
//! charts, and export the result to PDF.
//!
//! ```bash
//! pyramid --rows 4
//! pyramid --people 8 --roster team-roster.json
//! ```

mod shell;

use pyramid_core::{Chart, PyramidLayout, Roster};
use std::path::PathBuf;
use std::process::ExitCode;

use shell::Shell;

/// Rows used when neither --rows nor --people is given.
const DEFAULT_ROWS: usize = 4;

#[derive(Debug)]
struct Options {
    layout: PyramidLayout,
    roster_path: PathBuf,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("Run with --help for usage.");
            return ExitCode::FAILURE;
        }
    };

    let roster = match Roster::load(&options.roster_path) {
        Ok(roster) => roster,
        Err(e) => {
            // A broken roster file should not block the session; warn and
            // start empty instead.
            eprintln!(
                "Warning: could not load roster from {}: {e}",
                options.roster_path.display()
            );
            Roster::new()
        }
    };

    let chart = Chart::new(options.layout);
    let mut shell = Shell::new(chart, roster, options.roster_path);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    match shell.run(&mut stdin.lock(), &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut rows: Option<usize> = None;
    let mut people: Option<usize> = None;
    let mut roster_path: Option<PathBuf> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--rows" => {
                let value = iter.next().ok_or("--rows needs a number")?;
                rows = Some(value.parse().map_err(|_| format!("bad row count: {value}"))?);
            }
            "--people" => {
                let value = iter.next().ok_or("--people needs a number")?;
                people = Some(
                    value
                        .parse()
                        .map_err(|_| format!("bad head count: {value}"))?,
                );
            }
            "--roster" => {
                let value = iter.next().ok_or("--roster needs a path")?;
                roster_path = Some(PathBuf::from(value));
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    let layout = match (rows, people) {
        (Some(_), Some(_)) => return Err("--rows and --people are mutually exclusive".into()),
        (Some(rows), None) => PyramidLayout::new(rows).map_err(|e| e.to_string())?,
        (None, Some(people)) => PyramidLayout::with_capacity(people).map_err(|e| e.to_string())?,
        (None, None) => PyramidLayout::new(DEFAULT_ROWS).map_err(|e| e.to_string())?,
    };

    Ok(Options {
        layout,
        roster_path: roster_path.unwrap_or_else(Roster::default_path),
    })
}

fn print_help() {
    println!("pyramid - interactive pyramid chart builder");
    println!();
    println!("USAGE:");
    println!("    pyramid [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --rows N       Complete pyramid with N rows (default {DEFAULT_ROWS})");
    println!("    --people N     Pyramid sized for N people; last row may be partial");
    println!("    --roster PATH  Roster file location (default: per-user data dir)");
    println!("    --help, -h     Show this help");
    println!();
    println!("Type 'help' inside the shell for the command list.");
}
