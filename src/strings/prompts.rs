//! # Prompts
//!
//! Prompt fragments for the character service.

pub const PERSONA_TEMPLATE: &str = include_str!("../../prompts/persona.md");

/// A builder for rendering prompts with context.
pub struct PromptRenderer<'a> {
    template: &'a str,
    replacements: Vec<(&'a str, String)>,
}

impl<'a> PromptRenderer<'a> {
    pub fn new(template: &'a str) -> Self {
        Self {
            template,
            replacements: Vec::new(),
        }
    }

    pub fn set(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.replacements.push((key, value.into()));
        self
    }

    pub fn render(self) -> String {
        let mut result = self.template.to_string();
        for (key, value) in self.replacements {
            result = result.replace(key, &value);
        }

        if let Some(start) = result.find("{{")
            && let Some(end) = result[start..].find("}}")
        {
            let placeholder = &result[start..start + end + 2];
            tracing::error!("unreplaced placeholder in rendered prompt: {placeholder}");
        }

        result
    }
}

pub fn persona_instruction(name: &str) -> String {
    PromptRenderer::new(PERSONA_TEMPLATE)
        .set("{{NAME}}", name)
        .render()
        .trim_end()
        .to_string()
}

/// One speaker turn as the model sees it.
pub fn user_line(sender: &str, text: &str) -> String {
    format!("{sender}: {text}")
}
