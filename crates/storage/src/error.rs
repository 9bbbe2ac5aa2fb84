/// All errors that can be returned by a DecisionStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A record with this id was already appended. History is append-only
    /// and ids are unique, so a duplicate append is always a caller bug.
    #[error("duplicate {kind} record: {id}")]
    DuplicateRecord { kind: &'static str, id: String },

    /// No decision with the given id exists in the store.
    #[error("decision not found: {id}")]
    DecisionNotFound { id: String },

    /// No trace with the given id exists in the store.
    #[error("trace not found: {id}")]
    TraceNotFound { id: String },

    /// An attempted status transition that the decision lifecycle forbids.
    /// Decisions move `processing -> completed` or `processing -> failed`
    /// exactly once and never revert.
    #[error("illegal status transition for decision {id}: {from} -> {to}")]
    IllegalTransition {
        id: String,
        from: String,
        to: String,
    },

    /// A backend-specific storage error (connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
