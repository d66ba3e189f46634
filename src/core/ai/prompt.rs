use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::infrastructure::error::{Result, ReviewError};

static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder pattern"));

/// Label used when the caller gives an empty one.
pub const DEFAULT_FILE_TYPE: &str = "code";

const REVIEW_TEMPLATE: &str = "1. Detect all bugs or syntax errors in the following {{file_type}} code.
2. Explain the errors in detail (why they are errors, what caused them, etc.).
3. Provide a fully corrected version of the code.
4. After the corrected code, provide detailed documentation on the following:
   - What the original problem was.
   - Why the changes were necessary.
   - How the fixed code addresses the issues.
   - Any suggestions for improvement or best practices related to the problem.

CODE:
{{code}}";

// Same instructions plus a fifth asking for the headings the parser looks for.
const REVIEW_TEMPLATE_WITH_HEADERS: &str = "1. Detect all bugs or syntax errors in the following {{file_type}} code.
2. Explain the errors in detail (why they are errors, what caused them, etc.).
3. Provide a fully corrected version of the code.
4. After the corrected code, provide detailed documentation on the following:
   - What the original problem was.
   - Why the changes were necessary.
   - How the fixed code addresses the issues.
   - Any suggestions for improvement or best practices related to the problem.
5. Start the documentation sections with the literal headings \"Problem:\", \"Solution:\" and \"Suggestions:\", in that order.

CODE:
{{code}}";

/// 提示词模板
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub template: String,
    pub variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = Self::extract_variables(&template);

        Self {
            name: name.into(),
            template,
            variables,
        }
    }

    fn extract_variables(template: &str) -> Vec<String> {
        let mut variables: Vec<String> = Vec::new();
        for cap in VARIABLE.captures_iter(template) {
            if !variables.iter().any(|v| v == &cap[1]) {
                variables.push(cap[1].to_string());
            }
        }
        variables
    }

    /// Placeholders are substituted in one pass over the template, so a
    /// `{{...}}` sequence inside a value is copied through untouched.
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String> {
        if let Some(missing) = self
            .variables
            .iter()
            .find(|v| !values.contains_key(v.as_str()))
        {
            return Err(ReviewError::template(format!(
                "template '{}' is missing variable '{}'",
                self.name, missing
            )));
        }

        let rendered = VARIABLE.replace_all(&self.template, |cap: &Captures| {
            values.get(&cap[1]).copied().unwrap_or_default().to_string()
        });
        Ok(rendered.into_owned())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }
}

/// 提示词构建器
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    review: PromptTemplate,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            review: PromptTemplate::new("review", REVIEW_TEMPLATE),
        }
    }

    /// Builder whose prompt also asks the model for the
    /// `Problem:` / `Solution:` / `Suggestions:` headings.
    pub fn with_section_headers() -> Self {
        Self {
            review: PromptTemplate::new("review-with-headers", REVIEW_TEMPLATE_WITH_HEADERS),
        }
    }

    /// Load a custom review template. It must reference `{{code}}`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ReviewError::io(path, e))?;
        let template = PromptTemplate::new(path.display().to_string(), text);
        if !template.has_variable("code") {
            return Err(ReviewError::template(format!(
                "prompt template {} does not contain {{{{code}}}}",
                path.display()
            )));
        }
        Ok(Self { review: template })
    }

    /// Choose the builder from configuration: a custom file wins over the
    /// headings flag.
    pub fn from_options(prompt_path: Option<&Path>, section_headers: bool) -> Result<Self> {
        match prompt_path {
            Some(path) => Self::from_file(path),
            None if section_headers => Ok(Self::with_section_headers()),
            None => Ok(Self::new()),
        }
    }

    /// 构建代码审查提示词
    pub fn build_review_prompt(&self, code: &str, file_type: &str) -> Result<String> {
        let file_type = match file_type.trim() {
            "" => DEFAULT_FILE_TYPE,
            label => label,
        };

        let values = HashMap::from([("code", code), ("file_type", file_type)]);
        self.review.render(&values)
    }
}
