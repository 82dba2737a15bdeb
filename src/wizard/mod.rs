//! The four-step wizard as an owned value with pure transitions.
//!
//! Every transition consumes the current [`WizardState`] and returns the next
//! one. Generation calls are bracketed by [`WizardState::begin_generation`] and
//! [`WizardState::complete_generation`]; the [`Ticket`] handed out by the first
//! must match the outstanding one for the second to have any effect.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::draft::{DraftUpdate, PromptDraft};
use crate::errors::GenerationError;

mod controller;

pub use controller::WizardController;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    #[default]
    Deconstruct,
    Diagnose,
    Develop,
    Deliver,
}

impl Step {
    pub fn all() -> &'static [Step] {
        &[Step::Deconstruct, Step::Diagnose, Step::Develop, Step::Deliver]
    }

    /// 1-based position.
    pub fn number(&self) -> usize {
        match self {
            Step::Deconstruct => 1,
            Step::Diagnose => 2,
            Step::Develop => 3,
            Step::Deliver => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Deconstruct => "Deconstruct",
            Step::Diagnose => "Diagnose",
            Step::Develop => "Develop",
            Step::Deliver => "Deliver",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Step::Deconstruct => "Break down your idea. The more specific you are, the better the result.",
            Step::Diagnose => "Let's get an AI-powered second opinion to find areas for improvement.",
            Step::Develop => "Now we synthesize everything into a final, structured prompt. You can edit it.",
            Step::Deliver => "Use this structured prompt in your favorite AI tool for better results.",
        }
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::Deconstruct => Some(Step::Diagnose),
            Step::Diagnose => Some(Step::Develop),
            Step::Develop => Some(Step::Deliver),
            Step::Deliver => None,
        }
    }

    pub fn previous(&self) -> Option<Step> {
        match self {
            Step::Deconstruct => None,
            Step::Diagnose => Some(Step::Deconstruct),
            Step::Develop => Some(Step::Diagnose),
            Step::Deliver => Some(Step::Develop),
        }
    }

    /// The generation call whose result this step shows, if any.
    pub fn generation(&self) -> Option<GenerationKind> {
        match self {
            Step::Diagnose => Some(GenerationKind::Diagnose),
            Step::Develop => Some(GenerationKind::Develop),
            Step::Deconstruct | Step::Deliver => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationKind {
    Diagnose,
    Develop,
}

impl GenerationKind {
    pub fn step(&self) -> Step {
        match self {
            GenerationKind::Diagnose => Step::Diagnose,
            GenerationKind::Develop => Step::Develop,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Diagnose => "diagnose",
            GenerationKind::Develop => "develop",
        }
    }
}

/// Handle of one outstanding generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: GenerationKind,
    id: u64,
}

impl Ticket {
    fn issue(kind: GenerationKind) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self { kind, id: NEXT.fetch_add(1, Ordering::Relaxed) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Step entry: only fires when the step has no result, no error and
    /// nothing in flight.
    Ensure,
    /// User-requested: clears the step's error first, then as `Ensure`.
    Retry,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    step: Step,
    draft: PromptDraft,
    improvements: Option<String>,
    final_prompt: Option<String>,
    pending: Option<Ticket>,
    error: Option<(GenerationKind, String)>,
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &PromptDraft {
        &self.draft
    }

    pub fn improvements(&self) -> Option<&str> {
        self.improvements.as_deref()
    }

    pub fn final_prompt(&self) -> Option<&str> {
        self.final_prompt.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Error of the current step's generation call.
    pub fn error(&self) -> Option<&str> {
        self.step.generation().and_then(|kind| self.error_for(kind))
    }

    pub fn error_for(&self, kind: GenerationKind) -> Option<&str> {
        match &self.error {
            Some((k, message)) if *k == kind => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn result(&self, kind: GenerationKind) -> Option<&str> {
        match kind {
            GenerationKind::Diagnose => self.improvements(),
            GenerationKind::Develop => self.final_prompt(),
        }
    }

    /// Whether `next` would leave the current step.
    pub fn can_advance(&self) -> bool {
        match self.step {
            Step::Deconstruct => self.draft.is_ready(),
            Step::Diagnose => !self.is_loading() && self.error().is_none() && has_text(&self.improvements),
            Step::Develop => !self.is_loading() && self.error().is_none() && has_text(&self.final_prompt),
            Step::Deliver => false,
        }
    }

    /// The generation `Ensure` would start for the current step.
    pub fn generation_due(&self) -> Option<GenerationKind> {
        let kind = self.step.generation()?;
        let due = !self.is_loading() && self.error_for(kind).is_none() && self.result(kind).is_none();
        due.then_some(kind)
    }

    pub fn update_draft(mut self, update: DraftUpdate) -> Self {
        if self.step != Step::Deconstruct {
            debug!(step = ?self.step, "draft edit ignored outside Deconstruct");
            return self;
        }
        self.draft.update(update);
        self
    }

    pub fn next(mut self) -> Self {
        if !self.can_advance() {
            return self;
        }
        if let Some(to) = self.step.next() {
            debug!(from = ?self.step, to = ?to, "step forward");
            self.step = to;
        }
        self
    }

    /// Moves one step back. Fetched results stay; a request still in flight is
    /// abandoned and its late completion discarded.
    pub fn back(mut self) -> Self {
        if let Some(to) = self.step.previous() {
            debug!(from = ?self.step, to = ?to, "step back");
            if let Some(ticket) = self.pending.take() {
                debug!(kind = ticket.kind.as_str(), "abandoning in-flight generation");
            }
            self.step = to;
        }
        self
    }

    pub fn start_over(self) -> Self {
        debug!("start over");
        Self::default()
    }

    pub fn edit_final_prompt(mut self, text: String) -> Self {
        if self.step != Step::Develop || self.final_prompt.is_none() || self.is_loading() {
            debug!(step = ?self.step, "final prompt edit ignored");
            return self;
        }
        self.final_prompt = Some(text);
        self
    }

    /// Starts a generation call for `kind` when the step allows it. Returns the
    /// ticket to complete it with, or `None` when nothing should be sent.
    pub fn begin_generation(mut self, kind: GenerationKind, trigger: Trigger) -> (Self, Option<Ticket>) {
        if self.step != kind.step() || self.is_loading() {
            return (self, None);
        }
        if trigger == Trigger::Retry && self.error_for(kind).is_some() {
            self.error = None;
        }
        if self.error_for(kind).is_some() || self.result(kind).is_some() {
            return (self, None);
        }
        if kind == GenerationKind::Develop && !has_text(&self.improvements) {
            warn!("develop requested without improvements");
            return (self, None);
        }
        let ticket = Ticket::issue(kind);
        self.error = None;
        self.pending = Some(ticket);
        (self, Some(ticket))
    }

    /// Applies the outcome of `ticket`'s call, unless the ticket is no longer
    /// the outstanding one.
    pub fn complete_generation(mut self, ticket: Ticket, outcome: Result<String, GenerationError>) -> Self {
        if self.pending != Some(ticket) {
            debug!(kind = ticket.kind.as_str(), "discarding stale generation result");
            return self;
        }
        self.pending = None;
        match (ticket.kind, outcome) {
            (GenerationKind::Diagnose, Ok(text)) => self.improvements = Some(text),
            (GenerationKind::Develop, Ok(text)) => self.final_prompt = Some(text),
            (kind, Err(e)) => self.error = Some((kind, e.message)),
        }
        self
    }
}
