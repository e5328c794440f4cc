//! Error types shared across the descry crates.

use thiserror::Error;

/// Failure of the backing catalog store (connectivity, permissions, a
/// malformed query). Never recovered locally; the engine propagates it
/// upward with the originating query context attached.
///
/// "No relation matched" is deliberately *not* an error — see
/// `DescribeOutcome::NoMatch` in `descry-engine`.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A catalog query failed.
    #[error("catalog query failed ({context}): {source}")]
    Query {
        /// Label of the query that failed, e.g. `"relation_flags"`.
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl CatalogError {
    pub fn query(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Query {
            context,
            source: source.into(),
        }
    }

    /// The query label this error was raised under.
    pub fn context(&self) -> &'static str {
        match self {
            Self::Query { context, .. } => context,
        }
    }
}
