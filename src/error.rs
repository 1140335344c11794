// Error taxonomy for the attribution core.
//
// Short samples are not an error: they produce a fingerprint with
// `low_confidence = true`. Everything here is a hard failure that the
// caller has to handle. Persistence failures are surfaced as-is; retrying
// is the job of whatever wraps the engine.

use thiserror::Error;

/// Errors produced by the attribution core.
#[derive(Error, Debug)]
pub enum InkprintError {
    /// Empty or otherwise unusable input (text, display name, query bounds).
    #[error("invalid input: {0}")]
    Input(String),

    /// No profile exists for the requested author id.
    #[error("no profile found for author '{0}'")]
    NotFound(String),

    /// Weights, thresholds, tolerances or the pattern dictionary are malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The profile repository failed. Never retried inside the core.
    #[error("persistence failure: {context}")]
    Persistence {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl InkprintError {
    /// Wrap a repository-level error with a short description of the operation.
    pub fn persistence<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        InkprintError::Persistence {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, InkprintError>;

/// `.context()`-style helper for turning backend errors into `Persistence`.
pub trait PersistenceContext<T> {
    fn persistence(self, context: &str) -> Result<T>;
}

impl<T, E> PersistenceContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn persistence(self, context: &str) -> Result<T> {
        self.map_err(|e| InkprintError::persistence(context, e))
    }
}
