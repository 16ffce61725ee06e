use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanSimError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    Overflow { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

impl LoanSimError {
    /// True for invalid loan terms and degenerate arithmetic: the errors that
    /// a single simulation run can raise for a given set of inputs.
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            LoanSimError::InvalidInput { .. }
                | LoanSimError::DivisionByZero { .. }
                | LoanSimError::Overflow { .. }
        )
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanSimError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        LoanSimError::Overflow {
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_exclude_insufficient_data() {
        assert!(LoanSimError::invalid("principal", "must be positive").is_domain_error());
        assert!(LoanSimError::overflow("interest").is_domain_error());
        assert!(LoanSimError::DivisionByZero {
            context: "annuity factor".into()
        }
        .is_domain_error());
        assert!(!LoanSimError::InsufficientData("no candidates".into()).is_domain_error());
    }

    #[test]
    fn test_invalid_input_message_names_field() {
        let err = LoanSimError::invalid("term_periods", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid input: term_periods — must be at least 1"
        );
    }
}
