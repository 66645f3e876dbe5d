use std::{fmt, path::Path, str::FromStr};

use thiserror::Error;

/// Placeholder token replaced by the built artifact's path.
pub const APP_PLACEHOLDER: &str = "{app}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("command template is empty")]
    Empty,
}

/// A command line with an `{app}` placeholder for the built artifact.
///
/// The template is tokenized on whitespace once at construction. Rendering
/// substitutes the placeholder inside each token with the artifact path and
/// leaves every other token untouched, so `"node --inspect {app}"` becomes
/// `["node", "--inspect", "/path/to/bundle.js"]`. A template without the
/// placeholder is rendered literally.
///
/// Tokenization happens before substitution so that artifact paths containing
/// whitespace stay a single argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    tokens: Vec<String>,
}

impl CommandTemplate {
    /// Parses a template string. Fails if it contains no tokens at all.
    pub fn new(template: &str) -> Result<Self, TemplateError> {
        let tokens: Vec<String> = template.split_whitespace().map(str::to_owned).collect();
        if tokens.is_empty() {
            return Err(TemplateError::Empty);
        }
        Ok(Self { tokens })
    }

    /// Renders the argument vector for `app_path`.
    pub fn to_argv(&self, app_path: &Path) -> Vec<String> {
        let app = app_path.to_string_lossy();
        self.tokens
            .iter()
            .map(|token| {
                if token.contains(APP_PLACEHOLDER) {
                    token.replace(APP_PLACEHOLDER, &app)
                } else {
                    token.clone()
                }
            })
            .collect()
    }
}

impl Default for CommandTemplate {
    /// The bare `"{app}"` template: run the artifact with no extra arguments.
    fn default() -> Self {
        Self {
            tokens: vec![APP_PLACEHOLDER.to_owned()],
        }
    }
}

impl FromStr for CommandTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}
