//! Signup orchestration
//!
//! Email signup runs a fixed sequence against the providers: create the
//! account, set its display name, upload the profile picture, upload up to
//! three additional pictures, then hand the composed record to the record
//! store. Each call is made once, in order, and the first terminal failure
//! ends the submission. Additional pictures are best effort.
//!
//! A failed profile picture upload leaves the freshly created account in
//! place; the account is not deleted.

use crate::registration::auth::{FederatedProvider, Identity, IdentityProvider, ProfileUpdate};
use crate::registration::config::DEFAULT_LANDING_ROUTE;
use crate::registration::error::{
    OptionalUploadError, Operation, RegistrationError, SignupError, ValidationError,
};
use crate::registration::form::{
    ImageFile, LoginForm, MediaSelection, SignupForm, MAX_ADDITIONAL_IMAGES,
};
use crate::registration::image_storage::{additional_image_path, profile_image_path, BlobStore};
use crate::registration::state::SubmissionState;
use crate::registration::user_directory::UserRecordStore;
use crate::registration::user_info::UserRecord;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// A finished email signup.
#[derive(Debug, Clone)]
pub struct SignupComplete {
    pub redirect_to: String,
    pub identity: Identity,
    pub record: UserRecord,
    /// Additional pictures that were skipped; never shown to the user
    pub skipped_uploads: Vec<OptionalUploadError>,
}

/// A finished login or federated sign-in.
#[derive(Debug, Clone)]
pub struct SignInComplete {
    pub redirect_to: String,
    pub identity: Identity,
}

pub struct SignupOrchestrator {
    identity_provider: Arc<dyn IdentityProvider>,
    blob_store: Arc<dyn BlobStore>,
    record_store: Option<Arc<dyn UserRecordStore>>,
    landing_route: String,
}

impl SignupOrchestrator {
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            identity_provider,
            blob_store,
            record_store: None,
            landing_route: DEFAULT_LANDING_ROUTE.to_string(),
        }
    }

    pub fn with_record_store(mut self, store: Arc<dyn UserRecordStore>) -> Self {
        self.record_store = Some(store);
        self
    }

    pub fn with_landing_route(mut self, route: impl Into<String>) -> Self {
        self.landing_route = route.into();
        self
    }

    pub fn landing_route(&self) -> &str {
        &self.landing_route
    }

    pub async fn submit_email_signup(
        &self,
        state: &mut SubmissionState,
        form: &SignupForm,
        media: &MediaSelection,
    ) -> Result<SignupComplete, SignupError> {
        state.clear_error();

        let profile_image = match validate_signup(form, media) {
            Ok(image) => image,
            Err(e) => {
                state.fail(&e);
                return Err(e);
            }
        };

        state.start_loading();

        let span = info_span!("email_signup", submission_id = %Uuid::new_v4());
        let result = self
            .run_email_signup(form, profile_image, media.additional_images())
            .instrument(span)
            .await;

        settle(state, result)
    }

    pub async fn federated_sign_in(
        &self,
        state: &mut SubmissionState,
        provider: FederatedProvider,
    ) -> Result<SignInComplete, SignupError> {
        state.clear_error();
        state.start_loading();

        let span = info_span!("federated_sign_in", submission_id = %Uuid::new_v4(), %provider);
        let result = async {
            let identity = self
                .identity_provider
                .federated_sign_in(provider)
                .await
                .map_err(|e| identity_failure(&e, Operation::FederatedSignIn))?;

            info!("Federated sign-in successful for '{}'", identity.uid);
            Ok::<_, SignupError>(self.signed_in(identity))
        }
        .instrument(span)
        .await;

        settle(state, result)
    }

    pub async fn sign_in(
        &self,
        state: &mut SubmissionState,
        form: &LoginForm,
    ) -> Result<SignInComplete, SignupError> {
        state.clear_error();

        if form.email.trim().is_empty() || form.password.is_empty() {
            let e = SignupError::from(ValidationError::MissingCredentials);
            state.fail(&e);
            return Err(e);
        }

        state.start_loading();

        let span = info_span!("login", submission_id = %Uuid::new_v4());
        let result = async {
            let identity = self
                .identity_provider
                .sign_in_with_password(&form.email, &form.password)
                .await
                .map_err(|e| identity_failure(&e, Operation::Login))?;

            info!("Signed in '{}'", identity.uid);
            Ok::<_, SignupError>(self.signed_in(identity))
        }
        .instrument(span)
        .await;

        settle(state, result)
    }

    async fn run_email_signup(
        &self,
        form: &SignupForm,
        profile_image: &ImageFile,
        additional_images: &[ImageFile],
    ) -> Result<SignupComplete, SignupError> {
        let identity = self
            .identity_provider
            .create_account(&form.email, &form.password)
            .await
            .map_err(|e| identity_failure(&e, Operation::EmailSignup))?;

        let identity = self
            .identity_provider
            .update_profile(&identity, &ProfileUpdate::display_name(&form.name))
            .await
            .map_err(|e| identity_failure(&e, Operation::EmailSignup))?;

        let profile_path = profile_image_path(&identity.uid, &profile_image.file_name);
        let profile_pic_url = self
            .blob_store
            .upload(&identity, &profile_path, profile_image)
            .await
            .map_err(|e| {
                error!("Profile picture upload failed for '{}': {}", identity.uid, e);
                SignupError::MandatoryUpload { reason: e.reason() }
            })?;

        let (additional_pic_urls, skipped_uploads) =
            self.upload_additional(&identity, additional_images).await;

        let record = UserRecord::compose(&identity, form, profile_pic_url, additional_pic_urls);
        self.persist(&identity, &record).await?;

        info!(
            "User '{}' created with {} additional picture(s)",
            identity.uid,
            record.additional_pic_urls.len()
        );

        Ok(SignupComplete {
            redirect_to: self.landing_route.clone(),
            identity,
            record,
            skipped_uploads,
        })
    }

    /// Uploads one at a time in selection order; failures are skipped.
    async fn upload_additional(
        &self,
        identity: &Identity,
        images: &[ImageFile],
    ) -> (Vec<String>, Vec<OptionalUploadError>) {
        let mut urls = Vec::new();
        let mut skipped = Vec::new();

        for (index, file) in images.iter().take(MAX_ADDITIONAL_IMAGES).enumerate() {
            let path = additional_image_path(&identity.uid, index, &file.file_name);
            match self.blob_store.upload(identity, &path, file).await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    let failure = OptionalUploadError {
                        index,
                        file_name: file.file_name.clone(),
                        reason: e.to_string(),
                    };
                    warn!("Failed to upload {}", failure);
                    skipped.push(failure);
                }
            }
        }

        (urls, skipped)
    }

    async fn persist(&self, identity: &Identity, record: &UserRecord) -> Result<(), SignupError> {
        match &self.record_store {
            Some(store) => store.save(identity, record).await.map_err(|e| {
                error!("Failed to save user record for '{}': {}", identity.uid, e);
                SignupError::from_provider(&e, Operation::EmailSignup)
            }),
            None => {
                info!(
                    "No user record store configured, record for '{}' not persisted: {:?}",
                    identity.uid, record
                );
                Ok(())
            }
        }
    }

    fn signed_in(&self, identity: Identity) -> SignInComplete {
        SignInComplete {
            redirect_to: self.landing_route.clone(),
            identity,
        }
    }
}

fn validate_signup<'a>(
    form: &SignupForm,
    media: &'a MediaSelection,
) -> Result<&'a ImageFile, SignupError> {
    if !form.passwords_match() {
        return Err(ValidationError::PasswordMismatch.into());
    }
    media
        .profile_image()
        .ok_or_else(|| ValidationError::MissingProfileImage.into())
}

fn identity_failure(err: &RegistrationError, operation: Operation) -> SignupError {
    error!("Authentication error during {}: {}", operation, err);
    SignupError::from_provider(err, operation)
}

/// Clears the loading flag and records the message of a failed submission.
fn settle<T>(
    state: &mut SubmissionState,
    result: Result<T, SignupError>,
) -> Result<T, SignupError> {
    match &result {
        Ok(_) => state.finish(),
        Err(e) => state.fail(e),
    }
    result
}
