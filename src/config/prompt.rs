use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use log::info;
use thiserror::Error;

const CONCISE_TEMPLATE: &str =
    "Rewrite the following response to be more concise. Keep the key information, drop repetition and filler, and reply with the rewritten text only.\n\nResponse:\n{content}";
const EXPAND_TEMPLATE: &str =
    "Expand the following response with more detail, explanation and examples where helpful. Keep the original meaning and reply with the expanded text only.\n\nResponse:\n{content}";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Prompt template '{0}' has no {{content}} placeholder")]
    MissingPlaceholder(String),

    #[error("Prompt file IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Prompt JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Post-hoc rewrites that can be applied to an AI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Concise,
    Expand,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Concise => "concise",
            Action::Expand => "expand",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseActionError(pub String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid action '{}', expected 'concise' or 'expand'", self.0)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concise" => Ok(Action::Concise),
            "expand" => Ok(Action::Expand),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub action_templates: HashMap<String, String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        let action_templates = HashMap::from([
            (Action::Concise.as_str().to_string(), CONCISE_TEMPLATE.to_string()),
            (Action::Expand.as_str().to_string(), EXPAND_TEMPLATE.to_string()),
        ]);
        Self { action_templates }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        for action in [Action::Concise, Action::Expand] {
            let template = get_action_template(self, action)?;
            if !template.contains("{content}") {
                return Err(PromptError::MissingPlaceholder(action.to_string()));
            }
        }
        Ok(())
    }
}

/// Reads templates from `path`; actions missing from the file keep their
/// built-in template.
pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = std::fs::read_to_string(path.as_ref())?;
    let overrides: PromptConfig = serde_json::from_str(&file_content)?;

    let mut config = PromptConfig::default();
    config.action_templates.extend(overrides.action_templates);
    config.validate()?;

    info!(
        "Loaded {} action template(s) from {}",
        config.action_templates.len(),
        path.as_ref().display()
    );
    Ok(Arc::new(config))
}

pub fn init_prompts(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path {
        Some(path) => load_prompts(path),
        None => {
            info!("Using built-in action templates");
            Ok(Arc::new(PromptConfig::default()))
        }
    }
}

fn get_action_template(config: &PromptConfig, action: Action) -> Result<&str, PromptError> {
    config.action_templates
        .get(action.as_str())
        .map(|s| s.as_str())
        .ok_or_else(|| PromptError::TemplateNotFound(format!("action_templates:{}", action)))
}

pub fn get_action_prompt(
    config: &PromptConfig,
    action: Action,
    content: &str
) -> Result<String, PromptError> {
    let template = get_action_template(config, action)?;
    Ok(template.replace("{content}", content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_only_known_actions() {
        assert_eq!("concise".parse::<Action>(), Ok(Action::Concise));
        assert_eq!("expand".parse::<Action>(), Ok(Action::Expand));
        assert!("shorten".parse::<Action>().is_err());
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn default_templates_embed_the_content() {
        let config = PromptConfig::default();
        let prompt = get_action_prompt(&config, Action::Concise, "A long answer.").unwrap();
        assert!(prompt.contains("concise"));
        assert!(prompt.ends_with("A long answer."));

        let prompt = get_action_prompt(&config, Action::Expand, "Short.").unwrap();
        assert!(prompt.contains("Expand"));
        assert!(prompt.ends_with("Short."));
    }

    #[test]
    fn file_overrides_merge_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"action_templates": {{"concise": "TL;DR: {{content}}"}}}}"#).unwrap();

        let config = load_prompts(file.path()).unwrap();
        assert_eq!(get_action_prompt(&config, Action::Concise, "x").unwrap(), "TL;DR: x");
        assert!(get_action_prompt(&config, Action::Expand, "x").unwrap().contains("Expand"));
    }

    #[test]
    fn override_without_placeholder_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"action_templates": {{"expand": "say more"}}}}"#).unwrap();

        assert!(matches!(load_prompts(file.path()), Err(PromptError::MissingPlaceholder(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(load_prompts("/nonexistent/prompts.json"), Err(PromptError::IoError(_))));
    }
}
