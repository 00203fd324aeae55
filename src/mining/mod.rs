//! Refactoring-mining events and their agreement with oracle refactorings.

pub mod agreement;
pub mod events;

pub use agreement::{compute_agreement, Agreement, Overlap};
pub use events::{
    export_events, extract_events, extract_events_from_dir, extract_events_from_file,
    load_events, EventType, RefactoringEvent, NO_REFACTORING, NO_REFACTORING_INVALID_JSON,
};
