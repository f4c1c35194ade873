use thiserror::Error;

/// Underlying cause chained onto a [`DomainError`].
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of a remote storage or infrastructure failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFault {
    /// The requested object or resource does not exist.
    NotFound,
    Other,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation Error: {}", chained(.message, .cause))]
    Validation {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("Data Error: {}", chained(.message, .cause))]
    Data {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("Filesystem Error: {}", chained(.message, .cause))]
    FileSystem {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("AWS Error: {}", chained(.message, .cause))]
    Aws {
        message: String,
        fault: RemoteFault,
        #[source]
        cause: Option<Cause>,
    },
}

fn chained(message: &str, cause: &Option<Cause>) -> String {
    match cause {
        Some(cause) => format!("{message}. Caused by: {cause}"),
        None => message.to_string(),
    }
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation {
            message: message.into(),
            cause: None,
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        DomainError::Data {
            message: message.into(),
            cause: None,
        }
    }

    pub fn file_system(message: impl Into<String>) -> Self {
        DomainError::FileSystem {
            message: message.into(),
            cause: None,
        }
    }

    pub fn aws(message: impl Into<String>) -> Self {
        DomainError::Aws {
            message: message.into(),
            fault: RemoteFault::Other,
            cause: None,
        }
    }

    /// AWS error for a missing remote object or resource.
    pub fn aws_not_found(message: impl Into<String>) -> Self {
        DomainError::Aws {
            message: message.into(),
            fault: RemoteFault::NotFound,
            cause: None,
        }
    }

    /// Attach the underlying cause, replacing any previous one.
    pub fn with_cause(mut self, source: impl Into<Cause>) -> Self {
        let slot = match &mut self {
            DomainError::Validation { cause, .. }
            | DomainError::Data { cause, .. }
            | DomainError::FileSystem { cause, .. }
            | DomainError::Aws { cause, .. } => cause,
        };
        *slot = Some(source.into());
        self
    }

    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation { message, .. }
            | DomainError::Data { message, .. }
            | DomainError::FileSystem { message, .. }
            | DomainError::Aws { message, .. } => message,
        }
    }

    /// True when a remote call failed because the resource does not exist.
    pub fn resource_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::Aws {
                fault: RemoteFault::NotFound,
                ..
            }
        )
    }

    /// Per-ticker data faults are skipped by the aggregator rather than aborting a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DomainError::Data { .. })
    }
}
