use thiserror::Error;

/// Request-level failures. The display strings are the only error text
/// that ever reaches a client; anything else stays in the server log.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("No image data provided")]
    MissingImage,

    #[error("Invalid image data")]
    InvalidImage,

    #[error("Could not detect any objects in the image")]
    NoDetection,

    #[error("An unexpected error occurred")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MissingImage | ApiError::InvalidImage | ApiError::NoDetection => 400,
            ApiError::Internal => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_are_fixed() {
        assert_eq!(ApiError::MissingImage.to_string(), "No image data provided");
        assert_eq!(ApiError::InvalidImage.to_string(), "Invalid image data");
        assert_eq!(
            ApiError::NoDetection.to_string(),
            "Could not detect any objects in the image"
        );
        assert_eq!(
            ApiError::Internal.to_string(),
            "An unexpected error occurred"
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::MissingImage.status_code(), 400);
        assert_eq!(ApiError::InvalidImage.status_code(), 400);
        assert_eq!(ApiError::NoDetection.status_code(), 400);
        assert_eq!(ApiError::Internal.status_code(), 500);
    }
}
