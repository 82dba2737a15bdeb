//! The interactive terminal loop around [`WizardController`], plus the
//! unattended run used by `--auto-approve`.

use anyhow::{bail, Context, Result};
use fs_err as fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::clipboard::Clipboard;
use crate::draft::{DraftUpdate, Field};
use crate::ux;
use crate::wizard::{Step, WizardController};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Back,
    Retry,
    Edit,
    Copy,
    StartOver,
    Quit,
}

impl Action {
    fn parse(input: &str) -> Option<Action> {
        match input.trim().to_lowercase().as_str() {
            "n" | "next" => Some(Action::Next),
            "b" | "back" => Some(Action::Back),
            "r" | "retry" => Some(Action::Retry),
            "e" | "edit" => Some(Action::Edit),
            "c" | "copy" => Some(Action::Copy),
            "s" | "start over" | "restart" => Some(Action::StartOver),
            "q" | "quit" | "exit" => Some(Action::Quit),
            _ => None,
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct Session<R, W, C> {
    controller: WizardController,
    input: R,
    out: W,
    clipboard: C,
    progress: bool,
    out_file: Option<PathBuf>,
}

impl<R: BufRead, W: Write, C: Clipboard> Session<R, W, C> {
    pub fn new(controller: WizardController, input: R, out: W, clipboard: C) -> Self {
        Self {
            controller,
            input,
            out,
            clipboard,
            progress: false,
            out_file: None,
        }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// File the final prompt is written to each time Deliver is reached. A
    /// failed write is reported and the session goes on.
    pub fn with_out_file(mut self, path: Option<PathBuf>) -> Self {
        self.out_file = path;
        self
    }

    pub async fn run(&mut self) -> Result<()> {
        ux::header(&mut self.out)?;
        loop {
            let step = self.controller.step();
            ux::step_indicator(&mut self.out, step)?;
            ux::step_heading(&mut self.out, step)?;
            let flow = match step {
                Step::Deconstruct => self.deconstruct().await?,
                Step::Diagnose | Step::Develop => self.review().await?,
                Step::Deliver => self.deliver()?,
            };
            if let Flow::Quit = flow {
                info!(step = ?self.controller.step(), "session ended");
                return Ok(());
            }
        }
    }

    async fn deconstruct(&mut self) -> Result<Flow> {
        for field in Field::all() {
            let current = self.controller.state().draft().get(*field).to_string();
            ux::field_prompt(&mut self.out, *field, &current)?;
            let Some(line) = ux::read_line(&mut self.input)? else {
                return Ok(Flow::Quit);
            };
            let value = match line.trim() {
                "" => continue,
                "-" => String::new(),
                v => v.to_string(),
            };
            self.controller.update_draft(DraftUpdate::field(*field, value));
        }

        let missing = self.controller.state().draft().missing();
        if !missing.is_empty() {
            ux::missing_fields(&mut self.out, &missing)?;
            return Ok(Flow::Continue);
        }
        self.advance().await?;
        Ok(Flow::Continue)
    }

    /// Diagnose and Develop share one screen shape: the result or the error,
    /// then the step's actions.
    async fn review(&mut self) -> Result<Flow> {
        let state = self.controller.state();
        let step = state.step();
        if let Some(kind) = step.generation() {
            if let Some(message) = state.error() {
                ux::error(&mut self.out, message)?;
            } else if let Some(text) = state.result(kind) {
                ux::result(&mut self.out, kind, text)?;
            }
        }

        let mut actions = vec![("n", "Next"), ("b", "Back"), ("r", "Retry")];
        if step == Step::Develop {
            actions.push(("e", "Edit"));
        }
        actions.push(("q", "Quit"));
        ux::actions(&mut self.out, &actions)?;

        let Some(line) = ux::read_line(&mut self.input)? else {
            return Ok(Flow::Quit);
        };
        match Action::parse(&line) {
            Some(Action::Next) => {
                if !self.advance().await? {
                    ux::notice(&mut self.out, "Not ready to continue yet.")?;
                }
            }
            Some(Action::Back) => {
                self.controller.back().await;
            }
            Some(Action::Retry) => self.retry().await,
            Some(Action::Edit) if step == Step::Develop => self.edit()?,
            Some(Action::Quit) => return Ok(Flow::Quit),
            _ => ux::notice(&mut self.out, &format!("Unknown action: {}", line.trim()))?,
        }
        Ok(Flow::Continue)
    }

    fn deliver(&mut self) -> Result<Flow> {
        let text = self.controller.state().final_prompt().unwrap_or_default().to_string();
        ux::deliver(&mut self.out, &text)?;
        ux::actions(&mut self.out, &[("c", "Copy"), ("s", "Start over"), ("q", "Quit")])?;

        let Some(line) = ux::read_line(&mut self.input)? else {
            return Ok(Flow::Quit);
        };
        match Action::parse(&line) {
            Some(Action::Copy) => match self.clipboard.copy(&text) {
                Ok(()) => ux::success(&mut self.out, "Copied!")?,
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "clipboard copy failed");
                    ux::notice(&mut self.out, &format!("Could not copy to clipboard: {e:#}"))?;
                }
            },
            Some(Action::StartOver) => self.controller.start_over(),
            Some(Action::Quit) => return Ok(Flow::Quit),
            _ => ux::notice(&mut self.out, &format!("Unknown action: {}", line.trim()))?,
        }
        Ok(Flow::Continue)
    }

    fn edit(&mut self) -> Result<()> {
        if self.controller.state().final_prompt().is_none() {
            ux::notice(&mut self.out, "Nothing to edit yet.")?;
            return Ok(());
        }
        writeln!(self.out, "Enter the new prompt. Finish with a line containing only '.'")?;
        let mut lines = Vec::new();
        loop {
            match ux::read_line(&mut self.input)? {
                Some(line) if line == "." => break,
                Some(line) => lines.push(line),
                None => break,
            }
        }
        self.controller.edit_final_prompt(lines.join("\n"));
        Ok(())
    }

    /// `next`, with a spinner when entering a step that still has to fetch
    /// its result. Writes the out file on arrival at Deliver.
    async fn advance(&mut self) -> Result<bool> {
        let state = self.controller.state();
        let due = if state.can_advance() {
            state
                .step()
                .next()
                .and_then(|s| s.generation())
                .filter(|kind| state.result(*kind).is_none())
        } else {
            None
        };

        let spinner = due.and_then(|kind| ux::spinner(kind, self.progress));
        let moved = self.controller.next().await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        if moved && self.controller.step() == Step::Deliver {
            self.write_out_file()?;
        }
        Ok(moved)
    }

    async fn retry(&mut self) {
        let state = self.controller.state();
        let due = state
            .generation_due()
            .or_else(|| state.error().and(state.step().generation()));

        let spinner = due.and_then(|kind| ux::spinner(kind, self.progress));
        self.controller.retry().await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
    }

    fn write_out_file(&mut self) -> Result<()> {
        let (Some(path), Some(text)) = (&self.out_file, self.controller.state().final_prompt()) else {
            return Ok(());
        };
        match fs::write(path, text) {
            Ok(()) => {
                info!(path = %path.display(), "final prompt written");
                ux::success(&mut self.out, &format!("Saved to {}", path.display()))?;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not write final prompt");
                ux::notice(&mut self.out, &format!("Could not save the prompt: {e}"))?;
            }
        }
        Ok(())
    }
}

/// Drives the wizard from Deconstruct to Deliver without asking anything.
/// Fails on the first missing field or failed generation.
pub async fn run_unattended(controller: &mut WizardController) -> Result<String> {
    while controller.step() != Step::Deliver {
        if controller.next().await {
            continue;
        }
        let state = controller.state();
        if let Some(message) = state.error() {
            bail!("{} failed: {}", state.step().title(), message);
        }
        let missing = state.draft().missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.label()).collect();
            bail!("missing required fields: {}", names.join(", "));
        }
        bail!("cannot continue past {}", state.step().title());
    }
    controller
        .state()
        .final_prompt()
        .map(str::to_owned)
        .context("no final prompt was produced")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::generation::{GenerationClient, DEVELOP_FAILED, DIAGNOSE_FAILED};
    use crate::provider::scripted::ScriptedProvider;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::Arc;

    type TestSession = Session<Cursor<String>, Vec<u8>, MemoryClipboard>;

    fn session(provider: &Arc<ScriptedProvider>, input: &str) -> TestSession {
        colored::control::set_override(false);
        let controller = WizardController::new(GenerationClient::new(provider.clone()));
        Session::new(controller, Cursor::new(input.to_string()), Vec::new(), MemoryClipboard::default())
    }

    fn output(s: &TestSession) -> String {
        String::from_utf8(s.out.clone()).unwrap()
    }

    // raw prompt, core task, output, inputs, features
    const FORM: &str = "\nSummarize an article\n3 bullet points\n\n\n";

    #[tokio::test]
    async fn end_to_end_copy_delivers_exact_text() {
        let provider = ScriptedProvider::new()
            .reply("- Add length constraint")
            .reply("**Role**...**Task**...")
            .shared();
        let mut s = session(&provider, &format!("{FORM}n\nn\nc\nq\n"));
        s.run().await.unwrap();

        assert_eq!(provider.calls(), 2);
        assert!(provider.instructions()[1].contains("- Add length constraint"));
        assert_eq!(s.clipboard.copied, vec!["**Role**...**Task**...".to_string()]);

        let out = output(&s);
        assert!(out.contains("Suggested Improvements"));
        assert!(out.contains("\n**Role**...**Task**...\n"));
        assert!(out.contains("Copied!"));
    }

    #[tokio::test]
    async fn form_repeats_until_required_fields_are_set() {
        let provider = ScriptedProvider::new().reply("- tip").shared();
        let input = "\n\n3 bullet points\n\n\n\nSummarize an article\n\n\n\nq\n";
        let mut s = session(&provider, input);
        s.run().await.unwrap();

        let out = output(&s);
        assert!(out.contains("Required: Core Task"));
        assert!(out.contains("current: 3 bullet points"));
        assert_eq!(s.controller.step(), Step::Diagnose);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn dash_clears_a_field() {
        let provider = ScriptedProvider::new().shared();
        let mut s = session(&provider, "\n\n\n-\n\n");
        s.controller.update_draft(DraftUpdate::field(Field::Inputs, "an article"));
        s.deconstruct().await.unwrap();
        assert!(output(&s).contains("current: an article"));
        assert_eq!(s.controller.state().draft().inputs, "");
    }

    #[tokio::test]
    async fn diagnose_failure_shows_error_then_retry_recovers() {
        let provider = ScriptedProvider::new()
            .fail("API key not valid")
            .reply("- Add length constraint")
            .shared();
        let mut s = session(&provider, &format!("{FORM}n\nr\nq\n"));
        s.run().await.unwrap();

        let out = output(&s);
        assert!(out.contains(DIAGNOSE_FAILED));
        assert!(out.contains("[r] Try again"));
        assert!(out.contains("Not ready to continue yet."));
        assert!(!out.contains("API key not valid"));
        assert_eq!(s.controller.state().improvements(), Some("- Add length constraint"));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn develop_edit_replaces_final_prompt() {
        let provider = ScriptedProvider::new()
            .reply("- tip")
            .reply("**Role** draft")
            .shared();
        let input = format!("{FORM}n\ne\n**Role** edited\nline two\n.\nn\nq\n");
        let mut s = session(&provider, &input);
        s.run().await.unwrap();

        assert_eq!(s.controller.step(), Step::Deliver);
        assert_eq!(s.controller.state().final_prompt(), Some("**Role** edited\nline two"));
        assert!(output(&s).contains("\n**Role** edited\nline two\n"));
    }

    #[tokio::test]
    async fn develop_failure_keeps_user_on_step() {
        let provider = ScriptedProvider::new().reply("- tip").fail("503").shared();
        let mut s = session(&provider, &format!("{FORM}n\nn\nq\n"));
        s.run().await.unwrap();

        assert!(output(&s).contains(DEVELOP_FAILED));
        assert_eq!(s.controller.step(), Step::Develop);
    }

    #[tokio::test]
    async fn clipboard_failure_does_not_end_session() {
        let provider = ScriptedProvider::new().reply("- tip").reply("**Role**").shared();
        let mut s = session(&provider, &format!("{FORM}n\nn\nc\ns\n"));
        s.clipboard.fail = true;
        s.run().await.unwrap();

        let out = output(&s);
        assert!(out.contains("Could not copy to clipboard: no display"));
        assert_eq!(s.controller.step(), Step::Deconstruct);
        assert_eq!(s.controller.state().final_prompt(), None);
    }

    #[tokio::test]
    async fn end_of_input_quits_cleanly() {
        let provider = ScriptedProvider::new().shared();
        let mut s = session(&provider, "only one line\n");
        s.run().await.unwrap();
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn out_file_is_written_on_delivery() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        let provider = ScriptedProvider::new().reply("- tip").reply("**Role**...").shared();
        let mut s = session(&provider, &format!("{FORM}n\nn\nq\n")).with_out_file(Some(path.clone()));
        s.run().await.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "**Role**...");
    }

    #[tokio::test]
    async fn out_file_failure_is_reported_and_session_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("prompt.md");
        let provider = ScriptedProvider::new().reply("- tip").reply("**Role**...").shared();
        let mut s = session(&provider, &format!("{FORM}n\nn\nc\nq\n")).with_out_file(Some(path.clone()));
        s.run().await.unwrap();

        let out = output(&s);
        assert!(out.contains("Could not save the prompt"));
        assert!(!path.exists());
        assert_eq!(s.clipboard.copied, vec!["**Role**...".to_string()]);
    }

    #[tokio::test]
    async fn unattended_runs_to_deliver() {
        let provider = ScriptedProvider::new()
            .reply("- Add length constraint")
            .reply("**Role**...**Task**...")
            .shared();
        let mut c = WizardController::new(GenerationClient::new(provider.clone()));
        c.update_draft(DraftUpdate {
            core_task: Some("Summarize an article".into()),
            output: Some("3 bullet points".into()),
            ..Default::default()
        });
        assert_eq!(run_unattended(&mut c).await.unwrap(), "**Role**...**Task**...");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn unattended_reports_missing_fields_and_failures() {
        let provider = ScriptedProvider::new().fail("boom").shared();
        let mut c = WizardController::new(GenerationClient::new(provider.clone()));
        let err = run_unattended(&mut c).await.unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: Core Task, Desired Output");

        c.update_draft(DraftUpdate {
            core_task: Some("t".into()),
            output: Some("o".into()),
            ..Default::default()
        });
        let err = run_unattended(&mut c).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Diagnose failed: {DIAGNOSE_FAILED}"));
    }

    #[test]
    fn parses_actions() {
        assert_eq!(Action::parse(" N "), Some(Action::Next));
        assert_eq!(Action::parse("start over"), Some(Action::StartOver));
        assert_eq!(Action::parse("x"), None);
    }
}
