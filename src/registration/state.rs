//! Loading and error state of the signup page

use crate::registration::error::SignupError;

/// Owned by the page and lent to the orchestrator for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    is_loading: bool,
    error: Option<String>,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submit controls are disabled while a submission is in flight.
    pub fn submit_enabled(&self) -> bool {
        !self.is_loading
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn start_loading(&mut self) {
        self.is_loading = true;
    }

    pub(crate) fn fail(&mut self, err: &SignupError) {
        self.error = Some(err.to_string());
        self.is_loading = false;
    }

    pub(crate) fn finish(&mut self) {
        self.is_loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::error::ValidationError;

    #[test]
    fn test_lifecycle() {
        let mut state = SubmissionState::new();
        assert!(state.submit_enabled());

        state.start_loading();
        assert!(state.is_loading());
        assert!(!state.submit_enabled());

        state.fail(&SignupError::Validation(ValidationError::PasswordMismatch));
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("Passwords do not match."));

        state.clear_error();
        assert_eq!(state.error(), None);
    }
}
