//! The interactive command loop.
//!
//! One command per line over stdin/stdout. Every command error is printed
//! and the loop continues; the session only ends on `quit` or end of input.
//! The roster is written back after every mutation and again on exit, so a
//! killed session never loses people.

use pyramid_core::{
    list_saves, render_text, Chart, PdfExporter, Position, PyramidLayout, Roster, SavedChart,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Whether the loop should keep going after a command.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Continue,
    Quit,
}

pub struct Shell {
    chart: Chart,
    roster: Roster,
    roster_path: PathBuf,
}

impl Shell {
    pub fn new(chart: Chart, roster: Roster, roster_path: PathBuf) -> Self {
        Self {
            chart,
            roster,
            roster_path,
        }
    }

    /// Drive the loop until `quit` or end of input.
    pub fn run(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> std::io::Result<()> {
        writeln!(output, "Pyramid chart: {}", self.chart.layout())?;
        writeln!(output, "Type 'help' for commands.")?;

        let mut line = String::new();
        loop {
            write!(output, "> ")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break; // end of input
            }

            let (reply, outcome) = self.handle(line.trim());
            if !reply.is_empty() {
                writeln!(output, "{reply}")?;
            }
            if outcome == Outcome::Quit {
                break;
            }
        }

        if let Err(e) = self.roster.save(&self.roster_path) {
            writeln!(output, "Warning: could not save roster: {e}")?;
        }
        Ok(())
    }

    /// Execute one command line and return the text to print.
    fn handle(&mut self, line: &str) -> (String, Outcome) {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let reply = match command {
            "" => String::new(),
            "help" => help_text(),
            "quit" | "exit" => return ("Bye.".to_string(), Outcome::Quit),
            "show" => self.cmd_show(),
            "names" => self.cmd_names(),
            "add" => self.cmd_add(rest),
            "remove" => self.cmd_remove(rest),
            "assign" => self.cmd_assign(rest),
            "unassign" => self.cmd_unassign(rest),
            "new" => self.cmd_new(rest),
            "save" => self.cmd_save(rest),
            "load" => self.cmd_load(rest),
            "saves" => self.cmd_saves(rest),
            "export" => self.cmd_export(rest),
            other => format!("Unknown command '{other}'. Type 'help'."),
        };
        (reply, Outcome::Continue)
    }

    fn cmd_show(&self) -> String {
        format!(
            "{}assigned {}/{}",
            render_text(&self.chart, &self.roster),
            self.chart.assigned_count(),
            self.chart.layout().total_positions()
        )
    }

    fn cmd_names(&self) -> String {
        if self.roster.is_empty() {
            return "Roster is empty. Use: add NAME [= PHOTO]".to_string();
        }
        let mut lines = Vec::with_capacity(self.roster.len());
        for (name, photo) in self.roster.iter() {
            let where_at = self
                .chart
                .position_of(name)
                .map(|p| format!(" @ position {p}"))
                .unwrap_or_default();
            match photo {
                Some(photo) => lines.push(format!("{name} ({}){where_at}", photo.display())),
                None => lines.push(format!("{name} (no photo){where_at}")),
            }
        }
        lines.join("\n")
    }

    /// `add NAME` or `add NAME = PHOTO`. The '=' keeps names with spaces
    /// unambiguous.
    fn cmd_add(&mut self, rest: &str) -> String {
        let (name, photo) = match rest.split_once('=') {
            Some((name, photo)) => (name.trim(), Some(PathBuf::from(photo.trim()))),
            None => (rest, None),
        };
        if name.is_empty() {
            return "Usage: add NAME [= PHOTO]".to_string();
        }
        let replaced = self.roster.add(name, photo);
        let note = if replaced { " (replaced)" } else { "" };
        format!("Added {name}{note}.{}", self.flush_roster())
    }

    fn cmd_remove(&mut self, name: &str) -> String {
        if name.is_empty() {
            return "Usage: remove NAME".to_string();
        }
        if !self.roster.remove(name) {
            return format!("No such person: {name}");
        }
        format!("Removed {name}.{}", self.flush_roster())
    }

    /// `assign POS NAME` — the click-then-pick flow, one line.
    fn cmd_assign(&mut self, rest: &str) -> String {
        let (position, name) = match rest.split_once(char::is_whitespace) {
            Some((position, name)) => (position, name.trim()),
            None => return "Usage: assign POSITION NAME".to_string(),
        };
        let position = match position.parse::<usize>() {
            Ok(index) => Position(index),
            Err(_) => return format!("Not a position number: {position}"),
        };
        if !self.roster.contains(name) {
            return format!("{name} is not in the roster. Use: add {name}");
        }
        match self.chart.assign(position, name) {
            Ok(Some(vacated)) => format!("{name} moved from position {vacated} to {position}."),
            Ok(None) => format!("{name} assigned to position {position}."),
            Err(e) => format!("Error: {e}"),
        }
    }

    fn cmd_unassign(&mut self, rest: &str) -> String {
        let position = match rest.parse::<usize>() {
            Ok(index) => Position(index),
            Err(_) => return "Usage: unassign POSITION".to_string(),
        };
        match self.chart.unassign(position) {
            Ok(Some(name)) => format!("Position {position} cleared ({name})."),
            Ok(None) => format!("Position {position} was already empty."),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Start over with a fresh pyramid; unsaved assignments are discarded.
    fn cmd_new(&mut self, rest: &str) -> String {
        let rows = match rest.parse::<usize>() {
            Ok(rows) => rows,
            Err(_) => return "Usage: new ROWS".to_string(),
        };
        match PyramidLayout::new(rows) {
            Ok(layout) => {
                self.chart = Chart::new(layout);
                format!("New chart: {}", self.chart.layout())
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    fn cmd_save(&mut self, path: &str) -> String {
        if path.is_empty() {
            return "Usage: save PATH".to_string();
        }
        match SavedChart::new(&self.chart, &self.roster).save(path) {
            Ok(()) => format!("Saved to {path}."),
            Err(e) => format!("Error: {e}"),
        }
    }

    fn cmd_load(&mut self, path: &str) -> String {
        if path.is_empty() {
            return "Usage: load PATH".to_string();
        }
        // Validate fully before touching the live chart
        let loaded = SavedChart::load(path).and_then(SavedChart::into_parts);
        match loaded {
            Ok((chart, roster)) => {
                self.chart = chart;
                self.roster = roster;
                format!(
                    "Loaded {}: {}, {} assigned, {} people.{}",
                    path,
                    self.chart.layout(),
                    self.chart.assigned_count(),
                    self.roster.len(),
                    self.flush_roster()
                )
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    fn cmd_saves(&self, dir: &str) -> String {
        let dir = if dir.is_empty() { "." } else { dir };
        match list_saves(dir) {
            Ok(saves) if saves.is_empty() => format!("No saves in {dir}."),
            Ok(saves) => saves
                .iter()
                .map(|save| {
                    format!(
                        "{} - {} rows, {} assigned, {} people ({})",
                        save.path.display(),
                        save.metadata.rows,
                        save.metadata.assigned,
                        save.metadata.people,
                        save.metadata.saved_at
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => format!("Error: {e}"),
        }
    }

    fn cmd_export(&self, path: &str) -> String {
        if path.is_empty() {
            return "Usage: export PATH".to_string();
        }
        match PdfExporter::new().export(&self.chart, &self.roster, path) {
            Ok(report) => {
                let mut lines: Vec<String> =
                    report.warnings.iter().map(|w| format!("Warning: {w}")).collect();
                lines.push(format!(
                    "Exported {} positions to {path}.",
                    report.positions_drawn
                ));
                lines.join("\n")
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Persist the roster after a mutation. Failures are reported inline
    /// rather than aborting the session.
    fn flush_roster(&self) -> String {
        match self.roster.save(&self.roster_path) {
            Ok(()) => String::new(),
            Err(e) => format!("\nWarning: could not save roster: {e}"),
        }
    }
}

fn help_text() -> String {
    [
        "Commands:",
        "  show                   Draw the pyramid",
        "  names                  List the roster",
        "  add NAME [= PHOTO]     Add a person (or replace their photo)",
        "  remove NAME            Remove a person from the roster",
        "  assign POS NAME        Put a person at a position",
        "  unassign POS           Empty a position",
        "  new ROWS               Start a fresh pyramid (discards assignments)",
        "  save PATH              Save chart + roster to a JSON file",
        "  load PATH              Load a saved chart",
        "  saves [DIR]            List save files in a directory",
        "  export PATH            Export the chart to PDF",
        "  quit                   Save the roster and exit",
    ]
    .join("\n")
}
