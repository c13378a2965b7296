use std::{error::Error, fmt};

pub mod aggregate;
pub mod client;
pub mod database;
pub mod ingest;
pub mod scheduler;
pub mod source;
pub mod statistics;

#[cfg(test)]
pub(crate) mod testing;

/// Maximum number of locations a single user may track.
pub const LOCATION_LIMIT: usize = 20;

#[derive(Debug)]
pub enum RequestError {
    /// The referenced location does not exist.
    NotFound,
    /// The referenced location exists but belongs to another user. Nothing
    /// beyond "forbidden" may be disclosed about it.
    Forbidden,
    /// The user already tracks the maximum number of locations.
    LimitReached(usize),
    /// The upstream price API call failed; the next scheduled tick is the
    /// retry, so this is fatal for the current run.
    Upstream(Box<dyn Error + Send + Sync>),
    /// The upstream API returned station entries, but none carried usable
    /// price data.
    DataIntegrity(String),
    Other(Box<dyn Error + Send + Sync>),
}

impl RequestError {
    pub fn other<T: Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "The requested item does not exist."),
            Self::Forbidden => write!(f, "forbidden"),
            Self::LimitReached(limit) => {
                write!(f, "Location limit reached ({limit}).")
            }
            Self::Upstream(why) => write!(f, "Upstream API call failed: {why}"),
            Self::DataIntegrity(detail) => {
                write!(f, "Invalid price data received: {detail}")
            }
            Self::Other(why) => write!(f, "{why}"),
        }
    }
}

impl Error for RequestError {}

impl From<database::DatabaseError> for RequestError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::Other(why) => Self::Other(why),
        }
    }
}

pub type RequestResult<O> = Result<O, RequestError>;
