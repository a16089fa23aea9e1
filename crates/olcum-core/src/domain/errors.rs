use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OlcumResult<T> = Result<T, OlcumError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OlcumErrorCategory {
    InputValidationError,
    RemoteFailure,
    IoSystemError,
    InternalError,
}

impl OlcumErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::RemoteFailure => 3,
            Self::IoSystemError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::RemoteFailure => "RemoteFailure",
            Self::IoSystemError => "IoSystemError",
            Self::InternalError => "InternalError",
        }
    }

    /// Validation and remote failures leave the editor usable; the operator
    /// can correct the input or resubmit.
    pub const fn is_recoverable(self) -> bool {
        matches!(self, Self::InputValidationError | Self::RemoteFailure)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OlcumError {
    category: OlcumErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl OlcumError {
    pub fn new(
        category: OlcumErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            OlcumErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn remote(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OlcumErrorCategory::RemoteFailure, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OlcumErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OlcumErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> OlcumErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn exit_line(&self) -> String {
        format!("EXIT CODE: {}", self.exit_code())
    }
}

impl Display for OlcumError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for OlcumError {}

#[cfg(test)]
mod tests {
    use super::{OlcumError, OlcumErrorCategory};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (OlcumErrorCategory::InputValidationError, 2, true),
            (OlcumErrorCategory::RemoteFailure, 3, true),
            (OlcumErrorCategory::IoSystemError, 4, false),
            (OlcumErrorCategory::InternalError, 5, false),
        ];

        for (category, exit_code, recoverable) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.is_recoverable(), recoverable);
        }
    }

    #[test]
    fn validation_error_renders_diagnostic_lines() {
        let error = OlcumError::input_validation(
            "INPUT.CHIMNEY_COUNT",
            "Chimney count must be between 1 and 20.",
        );

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.CHIMNEY_COUNT] Chimney count must be between 1 and 20."
        );
        assert_eq!(error.exit_line(), "EXIT CODE: 2");
        assert_eq!(
            error.to_string(),
            "InputValidationError [INPUT.CHIMNEY_COUNT] Chimney count must be between 1 and 20."
        );
    }
}
