use serde::{Deserialize, Serialize};

/// The fields a user fills in during Deconstruct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDraft {
    pub raw_prompt: String,
    pub core_task: String,
    pub inputs: String,
    pub output: String,
    pub features: String,
}

/// A partial edit of a draft; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftUpdate {
    pub raw_prompt: Option<String>,
    pub core_task: Option<String>,
    pub inputs: Option<String>,
    pub output: Option<String>,
    pub features: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RawPrompt,
    CoreTask,
    Output,
    Inputs,
    Features,
}

impl Field {
    /// Form order.
    pub fn all() -> &'static [Field] {
        &[
            Field::RawPrompt,
            Field::CoreTask,
            Field::Output,
            Field::Inputs,
            Field::Features,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::RawPrompt => "Your initial prompt (optional)",
            Field::CoreTask => "Core Task",
            Field::Output => "Desired Output",
            Field::Inputs => "Inputs",
            Field::Features => "Critical Features & Constraints",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::RawPrompt => "e.g. 'Make a social media post about my new product'",
            Field::CoreTask => "What is the main goal? e.g. 'Generate 3 tweets'",
            Field::Output => "What should the result look like? e.g. 'JSON array of strings'",
            Field::Inputs => "What data will the AI use? e.g. 'Product name, features, target audience'",
            Field::Features => "What are the rules? e.g. 'Max 280 chars, use 2 hashtags, professional tone'",
        }
    }

    pub fn required(&self) -> bool {
        matches!(self, Field::CoreTask | Field::Output)
    }
}

impl DraftUpdate {
    pub fn field(field: Field, value: impl Into<String>) -> Self {
        let mut update = Self::default();
        let value = Some(value.into());
        match field {
            Field::RawPrompt => update.raw_prompt = value,
            Field::CoreTask => update.core_task = value,
            Field::Output => update.output = value,
            Field::Inputs => update.inputs = value,
            Field::Features => update.features = value,
        }
        update
    }

    pub fn is_empty(&self) -> bool {
        self.raw_prompt.is_none()
            && self.core_task.is_none()
            && self.inputs.is_none()
            && self.output.is_none()
            && self.features.is_none()
    }
}

impl PromptDraft {
    pub fn update(&mut self, update: DraftUpdate) {
        if let Some(v) = update.raw_prompt {
            self.raw_prompt = v;
        }
        if let Some(v) = update.core_task {
            self.core_task = v;
        }
        if let Some(v) = update.inputs {
            self.inputs = v;
        }
        if let Some(v) = update.output {
            self.output = v;
        }
        if let Some(v) = update.features {
            self.features = v;
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::RawPrompt => &self.raw_prompt,
            Field::CoreTask => &self.core_task,
            Field::Output => &self.output,
            Field::Inputs => &self.inputs,
            Field::Features => &self.features,
        }
    }

    /// Required fields that are still blank.
    pub fn missing(&self) -> Vec<Field> {
        Field::all()
            .iter()
            .copied()
            .filter(|f| f.required() && self.get(*f).trim().is_empty())
            .collect()
    }

    pub fn is_ready(&self) -> bool {
        self.missing().is_empty()
    }
}
