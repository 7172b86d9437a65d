//! HTML forms: parsing submitted data and carrying field errors back to
//! the page.

use std::collections::BTreeMap;

use axum::extract::Multipart;
use serde::{Deserialize, Serialize};
use yatube_common::{AppError, AppResult};
use yatube_core::{ImageChange, ImageUpload, PostInput, PostView};

/// Key for errors that belong to the form as a whole.
pub const NON_FIELD_ERRORS: &str = "__all__";

const REQUIRED: &str = "This field is required.";

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Record an error for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors for one field.
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Errors not tied to a field.
    #[must_use]
    pub fn non_field(&self) -> &[String] {
        self.field(NON_FIELD_ERRORS)
    }

    /// Split a validation message of `field: message` lines.
    ///
    /// Lines naming a field outside `fields` become non-field errors.
    #[must_use]
    pub fn from_validation(message: &str, fields: &[&str]) -> Self {
        let mut errors = Self::default();
        for line in message.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match line.split_once(": ") {
                Some((field, msg)) if fields.contains(&field) => errors.add(field, msg),
                _ => errors.add(NON_FIELD_ERRORS, line),
            }
        }
        errors
    }
}

fn bad_multipart(err: &axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed form data: {err}"))
}

/// The post create/edit form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostForm {
    pub text: String,
    pub group: Option<String>,
    /// Newly uploaded image, if any.
    #[serde(skip)]
    pub image: Option<ImageUpload>,
    /// Name of the newly uploaded file.
    pub image_name: Option<String>,
    /// The `image-clear` checkbox.
    pub image_clear: bool,
    /// URL of the image the post already has.
    pub current_image: Option<String>,
    pub errors: FormErrors,
}

impl PostForm {
    /// Field names, in display order.
    pub const FIELDS: [&'static str; 3] = ["text", "group", "image"];

    /// Field labels.
    pub const TEXT_LABEL: &'static str = "Post text";
    pub const TEXT_HELP: &'static str = "Text of the new post";
    pub const GROUP_LABEL: &'static str = "Group";
    pub const GROUP_HELP: &'static str = "Group the post will belong to";
    pub const IMAGE_LABEL: &'static str = "Image";

    /// Form pre-filled from an existing post.
    #[must_use]
    pub fn for_post(view: &PostView) -> Self {
        Self {
            text: view.post.text.clone(),
            group: view.post.group_id.clone(),
            current_image: view.image_url.clone(),
            ..Self::default()
        }
    }

    /// Read a submitted `multipart/form-data` body.
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| bad_multipart(&e))? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "text" => form.text = field.text().await.map_err(|e| bad_multipart(&e))?,
                "group" => {
                    let value = field.text().await.map_err(|e| bad_multipart(&e))?;
                    form.group = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                }
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await.map_err(|e| bad_multipart(&e))?;
                    // An untouched file input still submits an empty part
                    if !filename.is_empty() || !data.is_empty() {
                        form.image_name = Some(filename.clone());
                        form.image = Some(ImageUpload {
                            filename,
                            data: data.to_vec(),
                        });
                    }
                }
                "image-clear" => {
                    let value = field.text().await.map_err(|e| bad_multipart(&e))?;
                    form.image_clear = !matches!(value.as_str(), "" | "0" | "false" | "off");
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Check what can be checked without the database.
    pub fn validate(&mut self) -> bool {
        if self.text.trim().is_empty() {
            self.errors.add("text", REQUIRED);
        }
        if self.image.is_some() && self.image_clear {
            self.errors.add(
                "image",
                "Please either submit a file or check the clear checkbox, not both.",
            );
        }
        self.errors.is_empty()
    }

    /// Take the submitted values as service input.
    #[must_use]
    pub fn to_input(&self) -> PostInput {
        let image = match (&self.image, self.image_clear) {
            (Some(upload), _) => ImageChange::Replace(upload.clone()),
            (None, true) => ImageChange::Clear,
            (None, false) => ImageChange::Keep,
        };
        PostInput {
            text: self.text.clone(),
            group_id: self.group.clone(),
            image,
        }
    }

    /// Attach errors reported by the post service.
    pub fn add_service_errors(&mut self, message: &str) {
        let errors = FormErrors::from_validation(message, &Self::FIELDS);
        for (field, messages) in errors.0 {
            for msg in messages {
                self.errors.add(&field, msg);
            }
        }
    }
}

/// The comment form on the post detail page.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
    #[serde(skip_deserializing)]
    pub errors: FormErrors,
}

impl CommentForm {
    pub const TEXT_LABEL: &'static str = "Comment text";
}

/// The login form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(skip_deserializing)]
    pub errors: FormErrors,
}

impl LoginForm {
    /// Message shown for unknown users and wrong passwords alike.
    pub const INVALID_LOGIN: &'static str = "Please enter a correct username and password. \
        Note that both fields may be case-sensitive.";

    /// Check that both fields were filled in.
    pub fn validate(&mut self) -> bool {
        if self.username.trim().is_empty() {
            self.errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            self.errors.add("password", REQUIRED);
        }
        self.errors.is_empty()
    }
}

/// The sign-up form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing)]
    pub password_confirm: String,
    #[serde(skip_deserializing)]
    pub errors: FormErrors,
}

impl SignupForm {
    /// Field names, in display order.
    pub const FIELDS: [&'static str; 4] = ["username", "name", "password", "password_confirm"];

    /// Check required fields and the password confirmation.
    pub fn validate(&mut self) -> bool {
        if self.username.trim().is_empty() {
            self.errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            self.errors.add("password", REQUIRED);
        }
        if self.password != self.password_confirm {
            self.errors
                .add("password_confirm", "The two password fields didn't match.");
        }
        self.errors.is_empty()
    }
}
