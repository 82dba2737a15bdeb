use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::draft::Field;
use crate::wizard::{GenerationKind, Step};

pub fn header(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n{}", "┏━━━━━━━━━━━━━━━━━━━━━━━━ PromptGen ━━━━━━━━━━━━━━━━━━━━━━━━┓".bold())?;
    writeln!(out, "  Craft high-performance AI prompts with the 4-D method.")?;
    writeln!(out, "{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold())
}

/// One line with every step: completed ones ticked, the current one
/// highlighted, upcoming ones dimmed.
pub fn step_indicator(out: &mut impl Write, current: Step) -> io::Result<()> {
    let parts: Vec<String> = Step::all()
        .iter()
        .map(|s| {
            let label = format!("{} {}", s.number(), s.title());
            if *s < current {
                format!("✓ {}", label).green().to_string()
            } else if *s == current {
                format!("[{}]", label).cyan().bold().to_string()
            } else {
                label.dimmed().to_string()
            }
        })
        .collect();
    writeln!(out, "\n{}", parts.join("  ›  "))
}

pub fn step_heading(out: &mut impl Write, step: Step) -> io::Result<()> {
    writeln!(out, "\n{}", format!("Step {}: {}", step.number(), step.title()).bold())?;
    writeln!(out, "{}", step.description().dimmed())
}

pub fn field_prompt(out: &mut impl Write, field: Field, current: &str) -> io::Result<()> {
    let marker = if field.required() { " *".red().to_string() } else { String::new() };
    writeln!(out, "\n{}{}", field.label().bold(), marker)?;
    if current.is_empty() {
        writeln!(out, "  {}", field.placeholder().dimmed())?;
    } else {
        writeln!(out, "  current: {}", current)?;
    }
    write!(out, "> ")?;
    out.flush()
}

pub fn missing_fields(out: &mut impl Write, missing: &[Field]) -> io::Result<()> {
    let names: Vec<&str> = missing.iter().map(|f| f.label()).collect();
    writeln!(
        out,
        "\n{} {}",
        "Required:".yellow().bold(),
        names.join(", ")
    )
}

pub fn result(out: &mut impl Write, kind: GenerationKind, text: &str) -> io::Result<()> {
    let heading = match kind {
        GenerationKind::Diagnose => "Suggested Improvements",
        GenerationKind::Develop => "Final Prompt",
    };
    writeln!(out, "\n{}", heading.green().bold())?;
    writeln!(out, "{}", indent(text, 2))
}

pub fn error(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "\n{} {}", "Error:".red().bold(), message)?;
    writeln!(out, "  {} Try again", "[r]".bold())
}

/// The final prompt exactly as generated or edited, with no decoration.
pub fn deliver(out: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(out, "\n{}", "Your prompt is ready".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{}", text)
}

pub fn actions(out: &mut impl Write, actions: &[(&str, &str)]) -> io::Result<()> {
    let hints: Vec<String> = actions
        .iter()
        .map(|(key, label)| format!("{} {}", format!("[{}]", key).bold(), label))
        .collect();
    write!(out, "\n{}\n> ", hints.join("  "))?;
    out.flush()
}

pub fn notice(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.yellow())
}

pub fn success(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.green())
}

pub fn loading_message(kind: GenerationKind) -> &'static str {
    match kind {
        GenerationKind::Diagnose => "Diagnosing prompt...",
        GenerationKind::Develop => "Generating final prompt...",
    }
}

/// A ticking spinner on stderr, or `None` when progress output is off.
pub fn spinner(kind: GenerationKind, enabled: bool) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(loading_message(kind));
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Next line without its line ending; `None` at end of input.
pub fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

pub fn indent(s: &str, n: usize) -> String {
    let pad = " ".repeat(n);
    s.lines()
        .map(|l| format!("{}{}", pad, l))
        .collect::<Vec<_>>()
        .join("\n")
}
