/// Errors the transcript parser can return.
///
/// Malformed transcript content is never an error; it is dropped or passed
/// through. Only input that cannot be read as text at all is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::str::Utf8Error> for ParseError {
    fn from(err: std::str::Utf8Error) -> Self {
        ParseError::InvalidInput(format!("transcript is not valid UTF-8 ({err})"))
    }
}
