//! Signup and login form input

use image::ImageFormat;
use std::fmt;

/// At most this many additional pictures are kept from a selection.
pub const MAX_ADDITIONAL_IMAGES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    /// Numeric text, checked by the input widget only
    pub age: String,
    pub location: String,
    pub state_of_origin: String,
    /// Comma separated
    pub interests: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Build from raw bytes, sniffing the content type from the image header.
    pub fn from_bytes(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let content_type = match image::guess_format(&data) {
            Ok(ImageFormat::Png) => "image/png",
            Ok(ImageFormat::Jpeg) => "image/jpeg",
            Ok(ImageFormat::Gif) => "image/gif",
            Ok(ImageFormat::WebP) => "image/webp",
            _ => "application/octet-stream",
        };
        Self::new(file_name, content_type, data)
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Pictures chosen on the signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaSelection {
    profile_image: Option<ImageFile>,
    additional_images: Vec<ImageFile>,
}

impl MediaSelection {
    pub fn new(profile_image: Option<ImageFile>, additional_images: Vec<ImageFile>) -> Self {
        let mut selection = Self {
            profile_image,
            additional_images: Vec::new(),
        };
        selection.set_additional_images(additional_images);
        selection
    }

    pub fn set_profile_image(&mut self, image: Option<ImageFile>) {
        self.profile_image = image;
    }

    /// Replaces the additional pictures, keeping only the first three.
    pub fn set_additional_images(&mut self, mut images: Vec<ImageFile>) {
        images.truncate(MAX_ADDITIONAL_IMAGES);
        self.additional_images = images;
    }

    pub fn profile_image(&self) -> Option<&ImageFile> {
        self.profile_image.as_ref()
    }

    pub fn additional_images(&self) -> &[ImageFile] {
        &self.additional_images
    }
}
