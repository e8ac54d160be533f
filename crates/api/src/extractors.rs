//! Multipart form parsing shared by the product and topping routes.

use std::collections::HashMap;

use axum::extract::{Multipart, multipart::MultipartError};
use axum::http::StatusCode;
use bytes::BytesMut;
use catalog_core::catalog::ImageUpload;
use validator::ValidationErrors;

use crate::error::ApiError;

/// Name of the file field carrying the entity image.
pub const IMAGE_FIELD: &str = "image";

/// Message returned when the image is larger than the configured limit.
pub const FILE_TOO_LARGE: &str = "File size exceeds the limit";

/// A parsed multipart form: text fields plus the optional image.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl MultipartForm {
    /// Reads every field of the form, enforcing `max_file_size` on the image.
    ///
    /// An empty file part counts as no image.
    ///
    /// # Errors
    ///
    /// Returns a 400 `ApiError` for malformed bodies and oversized images.
    pub async fn read(mut multipart: Multipart, max_file_size: usize) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD {
                let content_type = field.content_type().map(str::to_owned);
                let mut buf = BytesMut::new();

                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    if buf.len() + chunk.len() > max_file_size {
                        return Err(ApiError::validation(FILE_TOO_LARGE));
                    }
                    buf.extend_from_slice(&chunk);
                }

                if !buf.is_empty() {
                    form.image = Some(ImageUpload {
                        bytes: buf.freeze(),
                        content_type,
                    });
                }
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Text value of a field, if present.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text value of a field, or an empty string when absent.
    #[must_use]
    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    /// Parses an optional `true`/`false` field; absent means `false`.
    ///
    /// # Errors
    ///
    /// Returns a 400 `ApiError` for any other value.
    pub fn flag(&self, name: &str) -> Result<bool, ApiError> {
        match self.text(name).map(str::trim) {
            None | Some("" | "false") => Ok(false),
            Some("true") => Ok(true),
            Some(other) => Err(ApiError::validation(format!(
                "{name} must be true or false, got '{other}'"
            ))),
        }
    }

    /// Takes the uploaded image out of the form.
    pub fn take_image(&mut self) -> Option<ImageUpload> {
        self.image.take()
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::validation(FILE_TOO_LARGE)
    } else {
        ApiError::validation(err.body_text())
    }
}

/// Picks the first field message out of a validator report.
#[must_use]
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (field, errs) in fields {
        if let Some(e) = errs.first() {
            return e
                .message
                .as_ref()
                .map_or_else(|| format!("{field} is invalid"), ToString::to_string);
        }
    }
    "Invalid request".to_string()
}
