//! User registration module using Firebase Authentication and Storage

pub mod auth;
pub mod auth_code;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod image_storage;
pub mod memory;
pub mod signup;
pub mod state;
pub mod user_directory;
pub mod user_info;

pub use auth::{FederatedProvider, FirebaseAuth, Identity, IdentityProvider, ProfileUpdate};
pub use auth_code::AuthErrorCode;
pub use config::RegistrationConfig;
pub use error::{OptionalUploadError, Operation, RegistrationError, SignupError, ValidationError};
pub use form::{ImageFile, LoginForm, MediaSelection, SignupForm, MAX_ADDITIONAL_IMAGES};
pub use image_storage::{BlobStore, FirebaseStorage};
pub use memory::MemoryBlobStore;
pub use signup::{SignInComplete, SignupComplete, SignupOrchestrator};
pub use state::SubmissionState;
pub use user_directory::{StorageUserDirectory, UserRecordStore};
pub use user_info::{normalize_interests, UserRecord};
