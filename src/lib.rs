//! Account creation for the Let's Connect chat app, backed by Firebase
//! Authentication and Firebase Storage.

pub mod registration;

pub use registration::{
    RegistrationConfig, SignupError, SignupOrchestrator, SubmissionState,
};
