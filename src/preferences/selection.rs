//! The set of option ids chosen on each categorical step.

use std::collections::BTreeMap;

use crate::api::PreferenceSelections;

use super::steps::Step;

/// Selected option ids per categorical step.
///
/// Ids are unique per step: [`SelectionSet::toggle`] adds an absent id and
/// removes a present one, so duplicates cannot arise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    by_step: BTreeMap<Step, Vec<u64>>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `id` on `step`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, step: Step, id: u64) -> bool {
        let ids = self.by_step.entry(step).or_default();
        if let Some(pos) = ids.iter().position(|existing| *existing == id) {
            ids.remove(pos);
            false
        } else {
            ids.push(id);
            true
        }
    }

    pub fn is_selected(&self, step: Step, id: u64) -> bool {
        self.selected(step).contains(&id)
    }

    /// Ids selected on `step`, in selection order.
    pub fn selected(&self, step: Step) -> &[u64] {
        self.by_step.get(&step).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of selected ids across steps.
    pub fn len(&self) -> usize {
        self.by_step.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build from previously saved selections.
    pub fn from_saved(saved: &PreferenceSelections) -> Self {
        let mut set = Self::new();
        for step in Step::CATEGORICAL {
            let ids = saved_field(saved, step);
            for id in ids {
                if !set.is_selected(step, *id) {
                    set.toggle(step, *id);
                }
            }
        }
        set
    }

    /// Full-replace payload: every categorical step is present, steps
    /// without a selection send an empty list.
    pub fn to_request(&self) -> PreferenceSelections {
        PreferenceSelections {
            content_types: self.selected(Step::ContentTypes).to_vec(),
            posting_goals: self.selected(Step::PostingGoals).to_vec(),
            writing_styles: self.selected(Step::WritingStyles).to_vec(),
            industries: self.selected(Step::Industries).to_vec(),
            job_descriptions: self.selected(Step::JobDescriptions).to_vec(),
        }
    }
}

fn saved_field(saved: &PreferenceSelections, step: Step) -> &[u64] {
    match step {
        Step::ContentTypes => &saved.content_types,
        Step::PostingGoals => &saved.posting_goals,
        Step::WritingStyles => &saved.writing_styles,
        Step::Industries => &saved.industries,
        Step::JobDescriptions => &saved.job_descriptions,
        Step::Custom => &[],
    }
}
