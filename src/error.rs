use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::{models::Message, store::StorageError};

pub type PollResult<T> = Result<T, PollError>;

/// Reasons a poll is rejected at creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is empty")]
    MissingTitle,

    #[error("at least {min} distinct candidates are required, got {count}")]
    TooFewCandidates { count: usize, min: usize },

    #[error("at most {max} distinct candidates are allowed, got {count}")]
    TooManyCandidates { count: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no such poll")]
    PollNotFound,

    #[error("no ballot cast for this poll")]
    BallotNotFound,

    #[error("'{0}' is not a candidate of this poll")]
    InvalidSelection(String),

    #[error("only one candidate may be selected in single selection mode")]
    TooManySelections,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

impl PollError {
    /// Storage failures may succeed when retried, everything else is terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, PollError::StorageUnavailable(_))
    }
}

impl ResponseError for PollError {
    fn status_code(&self) -> StatusCode {
        match self {
            PollError::Validation(_)
            | PollError::InvalidSelection(_)
            | PollError::TooManySelections => StatusCode::BAD_REQUEST,
            PollError::PollNotFound | PollError::BallotNotFound => StatusCode::NOT_FOUND,
            PollError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let PollError::StorageUnavailable(e) = self {
            log::error!("{}", e);
            return HttpResponse::build(self.status_code())
                .json(Message("storage unavailable, try again later"));
        }
        HttpResponse::build(self.status_code()).json(Message(&self.to_string()))
    }
}
