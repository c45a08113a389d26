use thiserror::Error;

/// Classified reasons a weather lookup failed.
///
/// Every transport and decoding failure is converted into one of these at the
/// provider boundary, so the screen never has to deal with raw HTTP errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("City not found")]
    CityNotFound,

    #[error("Invalid API key")]
    InvalidApiKey,

    /// The provider answered successfully but the body lacked the data we render.
    #[error("Malformed response from weather provider")]
    MalformedResponse,

    #[error("Error: {0}")]
    Unknown(String),
}

/// Local input problems caught before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationNotice {
    #[error("Please enter a city")]
    EmptyInput,
}
