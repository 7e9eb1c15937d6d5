//! Domain logic for pipeline stage transitions

mod catalog;
mod classifier;
mod detector;
mod transition;
mod validation;


pub use catalog::StageCatalog;
pub use classifier::{classify, ChangeType};
pub use detector::{detect_events, detect_initial_events, DetectedChanges, DetectedEvent};
pub use transition::{
    apply, plan_initial, plan_transition, TransitionOutcome, TransitionPlan,
};
pub use validation::{validate, ValidationContext};
