//! What to do when a hosting API answers with a non-success status.

use prmerge_forge::Fetched;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Policy for [`Fetched::Failed`] responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// Abort the run.
    #[default]
    Fail,
    /// Treat the response as carrying no data and keep going.
    Skip,
}

/// A [`Fetched`] value after the policy has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<T> {
    /// Usable data.
    Data(T),
    /// The request succeeded with nothing in it.
    Empty,
    /// A failed request that the policy chose to ignore.
    Skipped {
        /// HTTP status code.
        status: u16,
        /// Response body or explanation.
        message: String,
    },
}

impl StatusPolicy {
    /// Apply the policy to a response; `what` names the request in errors.
    ///
    /// # Errors
    /// Returns `HttpStatus` for a failed response under [`StatusPolicy::Fail`].
    pub fn settle<T>(self, fetched: Fetched<T>, what: impl Into<String>) -> Result<Settled<T>> {
        match (fetched, self) {
            (Fetched::Data(data), _) => Ok(Settled::Data(data)),
            (Fetched::Empty, _) => Ok(Settled::Empty),
            (Fetched::Failed { status, message }, Self::Skip) => {
                Ok(Settled::Skipped { status, message })
            }
            (Fetched::Failed { status, message }, Self::Fail) => Err(Error::HttpStatus {
                what: what.into(),
                status,
                message,
            }),
        }
    }
}
