use thiserror::Error;

/// Errors returned by queries on a [`Tree`][crate::lazy::Tree].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// No live value satisfies the query. Soft-removed values never match, so a tree holding
    /// only tombstones reports this too.
    #[error("no live value matches the query")]
    NotFound,
}
