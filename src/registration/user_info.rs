//! User record written after signup

use crate::registration::auth::Identity;
use crate::registration::form::SignupForm;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    pub name: String,
    pub age: Option<u32>,
    pub location: String,
    pub state_of_origin: String,
    pub interests: Vec<String>,
    pub email: String,
    pub profile_pic_url: String,
    pub additional_pic_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn compose(
        identity: &Identity,
        form: &SignupForm,
        profile_pic_url: impl Into<String>,
        additional_pic_urls: Vec<String>,
    ) -> Self {
        Self {
            uid: identity.uid.clone(),
            name: form.name.clone(),
            age: form.age.trim().parse().ok(),
            location: form.location.clone(),
            state_of_origin: form.state_of_origin.clone(),
            interests: normalize_interests(&form.interests),
            email: identity.email.clone().unwrap_or_else(|| form.email.clone()),
            profile_pic_url: profile_pic_url.into(),
            additional_pic_urls,
            created_at: Utc::now(),
        }
    }
}

/// Split on commas, trim, and drop empty entries.
pub fn normalize_interests(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
