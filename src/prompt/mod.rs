use crate::draft::PromptDraft;

const NOT_SPECIFIED: &str = "Not specified";

fn or_not_specified(value: &str) -> &str {
    if value.is_empty() {
        NOT_SPECIFIED
    } else {
        value
    }
}

fn output_rules() -> &'static str {
r#"Output Rules:
- Use Markdown for structure with these sections, in order: **Role**, **Task**, **Specifications**, **Validation**.
- The prompt must be clear, concise and follow best practices for prompting AI models.
- Generate ONLY the final, optimized prompt as a single block of Markdown text.
- Do not include any explanatory text before or after the prompt itself."#
}

/// Instruction for the Diagnose step. Empty structured fields read as
/// "Not specified"; the initial prompt is embedded as typed.
pub fn diagnose_instruction(draft: &PromptDraft) -> String {
    format!(
r#"Based on these deconstructed requirements for an AI prompt, diagnose potential weaknesses and suggest specific improvements. Focus on adding clarity, specificity, providing context, and defining the format for the output.

**Deconstructed Requirements:**
- Core Task: {core_task}
- Inputs: {inputs}
- Desired Output: {output}
- Critical Features/Constraints: {features}

If the initial prompt was provided, here it is for context:
Initial Prompt: "{raw_prompt}"

Provide your diagnosis and suggestions as a clear, bulleted list of actionable improvements. Do not generate the full prompt, only the improvements."#,
        core_task = or_not_specified(&draft.core_task),
        inputs = or_not_specified(&draft.inputs),
        output = or_not_specified(&draft.output),
        features = or_not_specified(&draft.features),
        raw_prompt = draft.raw_prompt,
    )
}

/// Instruction for the Develop step: synthesize the draft and the diagnosed
/// improvements into one structured prompt document.
pub fn develop_instruction(draft: &PromptDraft, improvements: &str) -> String {
    format!(
r#"You are an expert prompt engineer. Your task is to draft a complete, well-structured, and optimized prompt using the 4-D methodology.

**1. Deconstructed Requirements:**
- Core Task: {core_task}
- Inputs: {inputs}
- Desired Output: {output}
- Critical Features/Constraints: {features}

**2. Diagnosed Improvements to Incorporate:**
{improvements}

**Your Task:**
Synthesize all the information above into a final, polished prompt.

{rules}"#,
        core_task = draft.core_task,
        inputs = draft.inputs,
        output = draft.output,
        features = draft.features,
        improvements = improvements,
        rules = output_rules(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnose_fills_blanks_except_raw_prompt() {
        let draft = PromptDraft {
            core_task: "Summarize an article".into(),
            output: "3 bullet points".into(),
            ..Default::default()
        };
        let text = diagnose_instruction(&draft);
        assert!(text.contains("- Core Task: Summarize an article"));
        assert!(text.contains("- Desired Output: 3 bullet points"));
        assert!(text.contains("- Inputs: Not specified"));
        assert!(text.contains("- Critical Features/Constraints: Not specified"));
        assert!(text.contains("Initial Prompt: \"\""));
        assert!(text.contains("bulleted list of actionable improvements"));
    }

    #[test]
    fn diagnose_embeds_raw_prompt_verbatim() {
        let draft = PromptDraft {
            raw_prompt: "Make a social media post about my new product".into(),
            ..Default::default()
        };
        let text = diagnose_instruction(&draft);
        assert!(text.contains("Initial Prompt: \"Make a social media post about my new product\""));
        assert!(text.contains("- Core Task: Not specified"));
    }

    #[test]
    fn develop_carries_improvements_and_sections() {
        let draft = PromptDraft {
            core_task: "Summarize an article".into(),
            output: "3 bullet points".into(),
            ..Default::default()
        };
        let text = develop_instruction(&draft, "- Add length constraint");
        assert!(text.contains("**2. Diagnosed Improvements to Incorporate:**\n- Add length constraint"));
        assert!(text.contains("- Core Task: Summarize an article"));
        for section in ["**Role**", "**Task**", "**Specifications**", "**Validation**"] {
            assert!(text.contains(section), "missing {section}");
        }
        assert!(text.contains("Generate ONLY the final, optimized prompt"));
    }

    #[test]
    fn instructions_are_deterministic() {
        let draft = PromptDraft {
            core_task: "x".into(),
            output: "y".into(),
            features: "z".into(),
            ..Default::default()
        };
        assert_eq!(diagnose_instruction(&draft), diagnose_instruction(&draft));
        assert_eq!(develop_instruction(&draft, "i"), develop_instruction(&draft, "i"));
    }
}
