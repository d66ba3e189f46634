use handlebars::Handlebars;
use serde::Serialize;

use crate::infrastructure::error::Result;
use crate::review::ReviewOutcome;

const INDEX_TEMPLATE: &str = "index";

/// Values shown on the review page. Absent fields render as empty.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PageContext {
    pub code: Option<String>,
    pub review: Option<String>,
    pub fixed_code: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub suggestions: Option<String>,
    pub error: Option<String>,
    /// Set once a review completed, even an empty one.
    pub reviewed: bool,
}

impl PageContext {
    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// The submitted code together with an error; no review.
    pub fn failed(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn reviewed(code: impl Into<String>, outcome: ReviewOutcome) -> Self {
        let parsed = outcome.parsed;
        Self {
            code: Some(code.into()),
            review: Some(outcome.raw_review),
            fixed_code: Some(parsed.fixed_code),
            problem: Some(parsed.problem),
            solution: Some(parsed.solution),
            suggestions: Some(parsed.suggestions),
            error: None,
            reviewed: true,
        }
    }
}

/// 页面渲染器
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string(
            INDEX_TEMPLATE,
            include_str!("../../templates/index.html"),
        )?;
        Ok(Self { handlebars })
    }

    pub fn render(&self, context: &PageContext) -> Result<String> {
        Ok(self.handlebars.render(INDEX_TEMPLATE, context)?)
    }
}
