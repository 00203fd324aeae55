//! Verify-and-retry refactoring of a single class.

pub mod attempt;
pub mod engine;
pub mod guard;
pub mod result;
pub mod scope;

pub use attempt::{AttemptOutcome, RefactoringAttempt};
pub use engine::{ClassTarget, LoopSettings, RefactoringLoop};
pub use guard::WorkingFileGuard;
pub use result::{ClassResult, IMPROVED_CODE_FILE, ORIGINAL_CODE_FILE, RESULT_FILE};
pub use scope::TestScope;
