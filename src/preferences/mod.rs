//! Preference wizard: the step catalog, selections, the saved-preferences
//! check and the wizard state machine itself.

pub mod check;
pub mod selection;
pub mod steps;
pub mod wizard;

pub use check::{PreferenceCheck, check_saved_preferences, has_saved_preferences};
pub use selection::SelectionSet;
pub use steps::Step;
pub use wizard::{CompletionCallback, PreferenceWizard, WizardState};
