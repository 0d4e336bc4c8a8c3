use actix::MailboxError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use color_eyre::eyre::Report;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Vote update conflicted {attempts} times, try again")]
    Conflict { attempts: u32 },

    #[error("Internal error")]
    Internal(Report),
}

impl From<Report> for ApiError {
    fn from(report: Report) -> Self {
        ApiError::Internal(report)
    }
}

impl From<MailboxError> for ApiError {
    fn from(err: MailboxError) -> Self {
        ApiError::Internal(Report::msg(format!("actor mailbox error: {}", err)))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(report) = self {
            error!("Request failed: {:?}", report);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
