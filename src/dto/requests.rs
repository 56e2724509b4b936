use std::{borrow::Cow, collections::BTreeMap};

use serde::Deserialize;
use tracing::debug;
use validator::{Validate, ValidationError, ValidationErrors};

use super::{FormData, UploadedFile};
use crate::store::Store;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";

/// Widget family of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice,
    Image,
    Email,
    Password,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(name: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec { name, kind, required }
}

/// Per-field error messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn for_field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, list) in errors.field_errors() {
            for err in list {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(&field, message);
            }
        }
        out
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(REQUIRED)));
    }
    Ok(())
}

fn username_chars(value: &str) -> Result<(), ValidationError> {
    let ok = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !ok {
        return Err(ValidationError::new("username").with_message(Cow::Borrowed(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        )));
    }
    Ok(())
}

// ============================================================================
// POSTS
// ============================================================================

/// Create/edit form for a post.
#[derive(Debug, Default, Validate)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    /// Raw choice value: a group id, or empty for "no group".
    pub group: String,
    pub image: Option<UploadedFile>,
    /// The "clear" checkbox next to an existing image.
    pub clear_image: bool,
}

/// A post form that passed validation.
#[derive(Debug)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<u64>,
    pub image: Option<UploadedFile>,
    pub clear_image: bool,
}

impl PostForm {
    pub const FIELDS: [FieldSpec; 3] = [
        field("text", FieldKind::Text, true),
        field("group", FieldKind::Choice, false),
        field("image", FieldKind::Image, false),
    ];

    pub fn from_data(mut data: FormData) -> Self {
        Self {
            text: data.text("text"),
            group: data.text("group"),
            image: data.take_file("image"),
            clear_image: data.checked("image-clear"),
        }
    }

    /// Runs field rules, then the checks that need the store. All failures
    /// are collected before returning.
    pub fn clean(self, store: &Store) -> Result<CleanPost, (Self, FormErrors)> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        let group_id = match self.group.trim() {
            "" => None,
            raw => match raw.parse::<u64>().ok().filter(|id| store.group(*id).is_some()) {
                Some(id) => Some(id),
                None => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        if let Some(file) = &self.image {
            if file.bytes.is_empty() {
                errors.add("image", EMPTY_FILE);
            } else if let Err(e) = image::load_from_memory(&file.bytes) {
                debug!("Upload {} does not decode: {}", file.file_name, e);
                errors.add("image", INVALID_IMAGE);
            }
        }

        if !errors.is_empty() {
            return Err((self, errors));
        }
        Ok(CleanPost {
            text: self.text,
            group_id,
            image: self.image,
            clear_image: self.clear_image,
        })
    }
}

// ============================================================================
// COMMENTS
// ============================================================================

#[derive(Debug, Default, Validate, Deserialize)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub const FIELDS: [FieldSpec; 1] = [field("text", FieldKind::Text, true)];
}

// ============================================================================
// ACCOUNTS
// ============================================================================

#[derive(Debug, Default, Validate, Deserialize)]
pub struct SignupForm {
    #[validate(
        length(min = 3, max = 150, message = "Username must be 3-150 characters"),
        custom(function = "username_chars")
    )]
    #[serde(default)]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 8, max = 100, message = "Password must be 8-100 characters"))]
    #[serde(default)]
    pub password: String,
}

impl SignupForm {
    pub const FIELDS: [FieldSpec; 3] = [
        field("username", FieldKind::Text, true),
        field("email", FieldKind::Email, true),
        field("password", FieldKind::Password, true),
    ];
}

#[derive(Debug, Default, Validate, Deserialize)]
pub struct LoginForm {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub username: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

impl LoginForm {
    pub const FIELDS: [FieldSpec; 3] = [
        field("username", FieldKind::Text, true),
        field("password", FieldKind::Password, true),
        field("next", FieldKind::Hidden, false),
    ];

    /// Where to go after logging in. Only local paths are honoured.
    pub fn redirect_target(next: &str) -> &str {
        if next.starts_with('/') && !next.starts_with("//") {
            next
        } else {
            "/"
        }
    }
}

/// `?next=` on the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: String,
}
