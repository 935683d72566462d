use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Everything that can go wrong inside a progress-store transition.
///
/// None of these halt the application: the store logs them and leaves the
/// state untouched. They are typed so the reducer can be tested directly and
/// so the HTTP layer can report why a command was skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("quest {0} not found")]
    QuestNotFound(Uuid),

    #[error("quest {id} already completed on {date}")]
    DuplicateCompletion { id: Uuid, date: NaiveDate },

    #[error("quest {id} already reached its completion cap of {max_completions}")]
    CompletionCapReached { id: Uuid, max_completions: u32 },

    #[error("quest {id} has no completed instance on {date}")]
    InstanceNotFound { id: Uuid, date: NaiveDate },
}
