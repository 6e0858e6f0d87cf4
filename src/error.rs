//! Error types shared by every pipeline stage.
//!
//! Expected failures (unknown category, empty list, upstream error, malformed
//! payload) are values of [`PipelineError`], never panics. Each variant maps to
//! an HTTP-like status classifier so a transport layer can surface the message
//! and status verbatim.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Status used when a stage observed cancellation (nginx "client closed request").
pub const STATUS_CANCELLED: u16 = 499;

/// Result currency passed between pipeline stages and out to the transport layer.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// A failed pipeline stage: a human-readable message plus a status classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Caller supplied a value the pipeline does not recognize (400).
    #[error("{message}")]
    InvalidInput {
        /// Message surfaced to the caller.
        message: String,
    },

    /// Upstream reported nothing to return (404).
    #[error("{message}")]
    NotFound {
        /// Message surfaced to the caller.
        message: String,
    },

    /// Upstream answered with a non-success status; its raw body is the message.
    #[error("{body}")]
    Upstream {
        /// Status returned by the upstream service.
        status: u16,
        /// Raw error body returned by the upstream service.
        body: String,
    },

    /// The adapter could not complete the request at all (500).
    #[error("{message}")]
    Transport {
        /// Message naming the transport failure.
        message: String,
    },

    /// Upstream payload could not be parsed (500).
    #[error("{message}")]
    Malformed {
        /// Message naming the underlying parse error.
        message: String,
    },

    /// The cancellation token fired before the stage finished.
    #[error("request was cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Creates an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an `Upstream` error carrying the upstream status and body.
    #[must_use]
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Creates a `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns the HTTP-like status classifier for this failure.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Upstream { status, .. } => *status,
            Self::Transport { .. } | Self::Malformed { .. } => 500,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Returns true when the failure is attributable to the caller (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// Flattened, serializable view of a [`PipelineResult`] for transport layers.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome<T> {
    /// Whether the pipeline produced a value.
    pub success: bool,
    /// The produced value on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    /// Failure message on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// 200 on success, the failure's status classifier otherwise.
    pub status_code: u16,
}

impl<T> From<PipelineResult<T>> for PipelineOutcome<T> {
    fn from(result: PipelineResult<T>) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                value: Some(value),
                error_message: None,
                status_code: 200,
            },
            Err(error) => Self {
                success: false,
                value: None,
                error_message: Some(error.to_string()),
                status_code: error.status_code(),
            },
        }
    }
}

/// Runs `work` until it finishes or `cancel` fires, whichever comes first.
///
/// # Errors
///
/// Returns [`PipelineError::Cancelled`] when the token fires first, otherwise
/// whatever `work` returns.
pub async fn cancellable<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = PipelineResult<T>>,
) -> PipelineResult<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(PipelineError::Cancelled),
        result = work => result,
    }
}
