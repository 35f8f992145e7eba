pub(crate) mod error;
pub(crate) mod reviews;
pub(crate) mod venues;
pub(crate) mod visits;

pub(crate) use error::ApiError;
