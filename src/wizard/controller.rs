use crate::draft::DraftUpdate;
use crate::generation::GenerationClient;

use super::{GenerationKind, Step, Trigger, WizardState};

/// Owns the wizard state and the generation client, and runs the step's
/// generation call on entry.
pub struct WizardController {
    state: WizardState,
    client: GenerationClient,
}

impl WizardController {
    pub fn new(client: GenerationClient) -> Self {
        Self { state: WizardState::new(), client }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step()
    }

    pub fn update_draft(&mut self, update: DraftUpdate) {
        self.transition(|s| s.update_draft(update));
    }

    /// Advances when the step's precondition holds, then makes sure the new
    /// step has its result. Returns whether the step changed.
    pub async fn next(&mut self) -> bool {
        let before = self.state.step();
        self.transition(WizardState::next);
        let moved = self.state.step() != before;
        if moved {
            self.ensure_result().await;
        }
        moved
    }

    pub async fn back(&mut self) -> bool {
        let before = self.state.step();
        self.transition(WizardState::back);
        let moved = self.state.step() != before;
        if moved {
            self.ensure_result().await;
        }
        moved
    }

    pub fn start_over(&mut self) {
        self.transition(WizardState::start_over);
    }

    pub fn edit_final_prompt(&mut self, text: String) {
        self.transition(|s| s.edit_final_prompt(text));
    }

    /// Runs the current step's generation call if its result is missing and
    /// nothing is loading or failed. Idempotent.
    pub async fn ensure_result(&mut self) {
        self.run(Trigger::Ensure).await;
    }

    /// Clears the current step's error and runs its generation call again.
    pub async fn retry(&mut self) {
        self.run(Trigger::Retry).await;
    }

    async fn run(&mut self, trigger: Trigger) {
        let Some(kind) = self.state.step().generation() else {
            return;
        };
        let (state, ticket) = std::mem::take(&mut self.state).begin_generation(kind, trigger);
        self.state = state;
        let Some(ticket) = ticket else {
            return;
        };

        let draft = self.state.draft();
        let outcome = match kind {
            GenerationKind::Diagnose => self.client.diagnose(draft).await,
            GenerationKind::Develop => {
                let improvements = self.state.improvements().unwrap_or_default();
                self.client.develop(draft, improvements).await
            }
        };
        self.transition(|s| s.complete_generation(ticket, outcome));
    }

    fn transition(&mut self, f: impl FnOnce(WizardState) -> WizardState) {
        let state = std::mem::take(&mut self.state);
        self.state = f(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{DEVELOP_FAILED, DIAGNOSE_FAILED};
    use crate::provider::scripted::ScriptedProvider;
    use std::sync::Arc;

    fn controller(provider: &Arc<ScriptedProvider>) -> WizardController {
        let mut c = WizardController::new(GenerationClient::new(provider.clone()));
        c.update_draft(DraftUpdate {
            core_task: Some("Summarize an article".into()),
            output: Some("3 bullet points".into()),
            ..Default::default()
        });
        c
    }

    #[tokio::test]
    async fn blank_draft_does_not_advance_or_call() {
        let provider = ScriptedProvider::new().shared();
        let mut c = WizardController::new(GenerationClient::new(provider.clone()));
        assert!(!c.next().await);
        assert_eq!(c.step(), Step::Deconstruct);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn entering_diagnose_calls_once() {
        let provider = ScriptedProvider::new().reply("V").shared();
        let mut c = controller(&provider);
        assert!(c.next().await);

        assert_eq!(provider.calls(), 1);
        let s = c.state();
        assert_eq!(s.step(), Step::Diagnose);
        assert!(!s.is_loading());
        assert_eq!(s.error(), None);
        assert_eq!(s.improvements(), Some("V"));

        c.ensure_result().await;
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn failure_then_retry() {
        let provider = ScriptedProvider::new().fail("quota exceeded").reply("- Add length constraint").shared();
        let mut c = controller(&provider);
        c.next().await;

        let s = c.state();
        assert!(!s.is_loading());
        assert_eq!(s.error(), Some(DIAGNOSE_FAILED));
        assert_eq!(s.improvements(), None);

        assert!(!c.next().await);
        c.ensure_result().await;
        assert_eq!(provider.calls(), 1);

        c.retry().await;
        assert_eq!(provider.calls(), 2);
        assert_eq!(c.state().error(), None);
        assert!(c.next().await);
    }

    #[tokio::test]
    async fn back_then_next_reuses_results() {
        let provider = ScriptedProvider::new()
            .reply("- Add length constraint")
            .reply("**Role**...**Task**...")
            .shared();
        let mut c = controller(&provider);
        c.next().await;
        c.next().await;
        assert_eq!(c.step(), Step::Develop);
        assert_eq!(provider.calls(), 2);

        c.back().await;
        c.next().await;
        c.back().await;
        c.back().await;
        c.next().await;
        c.next().await;
        assert_eq!(c.step(), Step::Develop);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn develop_receives_improvements() {
        let provider = ScriptedProvider::new()
            .reply("- Add length constraint")
            .reply("**Role**...**Task**...")
            .shared();
        let mut c = controller(&provider);
        c.next().await;
        c.next().await;
        assert!(provider.instructions()[1].contains("- Add length constraint"));
        assert_eq!(c.state().final_prompt(), Some("**Role**...**Task**..."));

        c.next().await;
        assert_eq!(c.step(), Step::Deliver);
        assert_eq!(c.state().final_prompt(), Some("**Role**...**Task**..."));
    }

    #[tokio::test]
    async fn develop_failure_and_edit() {
        let provider = ScriptedProvider::new()
            .reply("- tip")
            .fail("503")
            .reply("**Role** draft")
            .shared();
        let mut c = controller(&provider);
        c.next().await;
        c.next().await;
        assert_eq!(c.state().error(), Some(DEVELOP_FAILED));
        assert!(!c.next().await);

        c.retry().await;
        c.edit_final_prompt("**Role** edited".into());
        assert_eq!(provider.calls(), 3);
        assert!(c.next().await);
        assert_eq!(c.state().final_prompt(), Some("**Role** edited"));
    }

    #[tokio::test]
    async fn start_over_resets_everything() {
        let provider = ScriptedProvider::new().reply("- tip").fail("down").shared();
        let mut c = controller(&provider);
        c.next().await;
        c.next().await;
        c.start_over();
        assert_eq!(c.state(), &WizardState::new());
    }
}
