//! The fixed catalog of wizard steps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One page of the preference wizard.
///
/// Progresses linearly: ContentTypes → PostingGoals → WritingStyles →
/// Industries → JobDescriptions → Custom. The first five are backed by a
/// remote option list; `Custom` is a free-text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    ContentTypes,
    PostingGoals,
    WritingStyles,
    Industries,
    JobDescriptions,
    Custom,
}

impl Step {
    /// Every step, in wizard order.
    pub const ALL: [Step; 6] = [
        Step::ContentTypes,
        Step::PostingGoals,
        Step::WritingStyles,
        Step::Industries,
        Step::JobDescriptions,
        Step::Custom,
    ];

    /// The steps backed by a remote option list.
    pub const CATEGORICAL: [Step; 5] = [
        Step::ContentTypes,
        Step::PostingGoals,
        Step::WritingStyles,
        Step::Industries,
        Step::JobDescriptions,
    ];

    pub const FIRST: Step = Step::ContentTypes;
    pub const LAST: Step = Step::Custom;

    /// Heading shown above the step.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ContentTypes => "Content Types",
            Self::PostingGoals => "Posting Goals",
            Self::WritingStyles => "Writing Styles",
            Self::Industries => "Industries",
            Self::JobDescriptions => "Job Descriptions",
            Self::Custom => "Custom User Preferences",
        }
    }

    /// Backend endpoint name; `/api/{endpoint}/` lists the options.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::ContentTypes => "content-types",
            Self::PostingGoals => "posting-goals",
            Self::WritingStyles => "writing-styles",
            Self::Industries => "industries",
            Self::JobDescriptions => "job-descriptions",
            Self::Custom => "custom",
        }
    }

    /// Field name in the saved-selections payload.
    pub fn field(&self) -> &'static str {
        match self {
            Self::ContentTypes => "content_types",
            Self::PostingGoals => "posting_goals",
            Self::WritingStyles => "writing_styles",
            Self::Industries => "industries",
            Self::JobDescriptions => "job_descriptions",
            Self::Custom => "custom",
        }
    }

    /// Whether this is the free-text step.
    pub fn is_free_text(&self) -> bool {
        matches!(self, Self::Custom)
    }

    /// Zero-based position in the wizard.
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    /// The step at a zero-based position.
    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    /// Look a step up by its endpoint name.
    pub fn from_endpoint(endpoint: &str) -> Option<Step> {
        Self::ALL.into_iter().find(|s| s.endpoint() == endpoint)
    }

    /// The following step, if any.
    pub fn next(&self) -> Option<Step> {
        Self::from_index(self.index() + 1)
    }

    /// The preceding step, if any.
    pub fn previous(&self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Check if a move from `self` to `target` is a single step either way.
    pub fn can_transition_to(&self, target: Step) -> bool {
        self.next() == Some(target) || self.previous() == Some(target)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}
