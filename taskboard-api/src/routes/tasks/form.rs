/// Multipart task form decoding and validation
///
/// `POST /tasks` and `PUT /tasks/:id` take the same multipart body:
///
/// | Field               | Create   | Update   | Format                                  |
/// |---------------------|----------|----------|-----------------------------------------|
/// | `title`             | required | required | non-empty text                          |
/// | `description`       | required | required | non-empty text                          |
/// | `completion_status` | required | required | `true`/`false`/`1`/`0`                  |
/// | `is_public`         | required | required | `true`/`false`/`1`/`0`                  |
/// | `due_date`          | required | required | `YYYY-MM-DD`                            |
/// | `created_by`        | required | ignored  | integer user ID                         |
/// | `sharedWith`        | required | optional | JSON array (`[1,2]`) or repeated fields |
/// | `responsible`       | optional | optional | integer, member of `sharedWith`         |
/// | `comments`          | optional | optional | text                                    |
/// | `tags`              | optional | optional | text                                    |
/// | `taskFile`          | optional | optional | PDF, JPEG or PNG up to the size limit   |
///
/// All failures are collected and reported together as per-field details.

use crate::{
    error::{validation_details, ApiError, ApiResult, ValidationErrorDetail},
    storage::Upload,
};
use axum::extract::Multipart;
use chrono::NaiveDate;
use taskboard_shared::models::file::ALLOWED_MIME_TYPES;
use serde::Deserialize;
use tracing::debug;
use utoipa::ToSchema;
use validator::Validate;

pub const FILE_RULE_MESSAGE: &str = "File must be a .pdf, .png, or .jpg and not larger than 5MB";
pub const RESPONSIBLE_MESSAGE: &str = "Responsible must be in the sharedWith array";
pub const SHARED_WITH_MESSAGE: &str = "sharedWith must be an array of user ids";
pub const CREATED_BY_MESSAGE: &str = "Created_by must be an integer";

/// Which endpoint the form is submitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Create,
    Update,
}

/// Multipart body accepted by `POST /tasks` and `PUT /tasks/{id}`
///
/// Documents the wire format only; requests are decoded by [`TaskForm`].
#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskFormFields {
    pub title: String,
    pub description: String,

    /// `true`/`false`/`1`/`0`
    pub completion_status: String,

    /// `YYYY-MM-DD`
    #[schema(value_type = String, format = Date)]
    pub due_date: String,

    /// `true`/`false`/`1`/`0`
    pub is_public: String,

    /// Owner; required on create, ignored on update
    pub created_by: Option<i32>,

    /// JSON array such as `[1,2]`, or one field per user ID
    #[serde(rename = "sharedWith")]
    pub shared_with: Option<String>,

    /// Must be one of `sharedWith`
    pub responsible: Option<i32>,

    pub comments: Option<String>,
    pub tags: Option<String>,

    /// PDF, JPEG or PNG
    #[serde(rename = "taskFile")]
    #[schema(value_type = Option<String>, format = Binary)]
    pub task_file: Option<Vec<u8>>,
}

/// Raw multipart fields, as received
#[derive(Debug, Default)]
pub struct TaskForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completion_status: Option<String>,
    pub due_date: Option<String>,
    pub is_public: Option<String>,
    pub created_by: Option<String>,
    pub shared_with: Option<Vec<String>>,
    pub responsible: Option<String>,
    pub comments: Option<String>,
    pub tags: Option<String>,
    pub task_file: Option<Upload>,
}

/// Decoded and validated task form
#[derive(Debug, Clone, Validate)]
pub struct TaskSubmission {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub completion_status: bool,
    pub due_date: NaiveDate,
    pub is_public: bool,

    /// Always set for [`FormKind::Create`]
    pub created_by: Option<i32>,

    /// None on update keeps the current share set
    pub shared_with: Option<Vec<i32>>,

    pub responsible: Option<i32>,
    pub comment: Option<String>,
    pub tag: Option<String>,
    pub file: Option<Upload>,
}

impl TaskSubmission {
    /// Checks `responsible` against the share set it will end up in
    pub fn check_responsible(&self, shared_with: &[i32]) -> ApiResult<()> {
        match self.responsible {
            Some(responsible) if !shared_with.contains(&responsible) => {
                Err(ApiError::invalid_field("responsible", RESPONSIBLE_MESSAGE))
            }
            _ => Ok(()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        .ok()
}

/// Accepts one JSON array value or one integer per field
pub fn parse_user_ids(values: &[String]) -> Option<Vec<i32>> {
    if let [single] = values {
        let single = single.trim();
        if single.starts_with('[') {
            return serde_json::from_str(single).ok();
        }
    }

    values
        .iter()
        .map(|value| value.trim().parse::<i32>().ok())
        .collect()
}

/// Whether an upload has an accepted type and fits the size limit
pub fn is_acceptable_upload(upload: &Upload, max_file_bytes: usize) -> bool {
    let type_ok = upload
        .content_type
        .as_deref()
        .is_some_and(|content_type| ALLOWED_MIME_TYPES.contains(&content_type));

    type_ok && upload.size() <= max_file_bytes
}

/// Records a failure when `parsed` is None
fn expect<T>(
    errors: &mut Vec<ValidationErrorDetail>,
    field: &str,
    message: &str,
    parsed: Option<T>,
) -> Option<T> {
    if parsed.is_none() {
        errors.push(ValidationErrorDetail::new(field, message));
    }
    parsed
}

impl TaskForm {
    /// Reads every multipart field
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "taskFile" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;

                // Browsers send an empty part when no file was chosen
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }

                form.task_file = Some(Upload {
                    file_name,
                    content_type,
                    data,
                });
            } else {
                let value = field.text().await?;
                form.set_text(&name, value);
            }
        }

        Ok(form)
    }

    /// Stores a text field by name; unknown names are ignored
    pub fn set_text(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "completion_status" => self.completion_status = Some(value),
            "due_date" => self.due_date = Some(value),
            "is_public" => self.is_public = Some(value),
            "created_by" => self.created_by = Some(value),
            "sharedWith" | "sharedWith[]" => {
                self.shared_with.get_or_insert_with(Vec::new).push(value)
            }
            "responsible" => self.responsible = Some(value),
            "comments" => self.comments = Some(value),
            "tags" => self.tags = Some(value),
            _ => debug!(field = name, "Ignoring unknown form field"),
        }
    }

    /// Decodes and validates the form
    ///
    /// # Errors
    ///
    /// `ApiError::ValidationError` listing every failing field.
    pub fn validate(self, kind: FormKind, max_file_bytes: usize) -> ApiResult<TaskSubmission> {
        let mut errors = Vec::new();

        let completion_status = expect(
            &mut errors,
            "completion_status",
            "Completion status must be a boolean",
            self.completion_status.as_deref().and_then(parse_bool),
        );
        let is_public = expect(
            &mut errors,
            "is_public",
            "Is_public must be a boolean",
            self.is_public.as_deref().and_then(parse_bool),
        );
        let due_date = expect(
            &mut errors,
            "due_date",
            "Due date must be a valid date",
            self.due_date.as_deref().and_then(parse_date),
        );

        let created_by = match kind {
            FormKind::Create => expect(
                &mut errors,
                "created_by",
                CREATED_BY_MESSAGE,
                self.created_by.as_deref().and_then(|raw| raw.trim().parse::<i32>().ok()),
            ),
            FormKind::Update => None,
        };

        let shared_with = match (&self.shared_with, kind) {
            (Some(values), _) => expect(&mut errors, "sharedWith", SHARED_WITH_MESSAGE, parse_user_ids(values)),
            (None, FormKind::Create) => expect(&mut errors, "sharedWith", SHARED_WITH_MESSAGE, None),
            (None, FormKind::Update) => None,
        };

        let responsible = match non_empty(self.responsible.as_deref()) {
            Some(raw) => expect(
                &mut errors,
                "responsible",
                "Responsible must be an integer",
                raw.parse::<i32>().ok(),
            ),
            None => None,
        };

        if let (Some(responsible), Some(ids)) = (responsible, &shared_with) {
            if !ids.contains(&responsible) {
                errors.push(ValidationErrorDetail::new("responsible", RESPONSIBLE_MESSAGE));
            }
        }

        let file = match self.task_file {
            Some(upload) if is_acceptable_upload(&upload, max_file_bytes) => Some(upload),
            Some(_) => {
                errors.push(ValidationErrorDetail::new("taskFile", FILE_RULE_MESSAGE));
                None
            }
            None => None,
        };

        let submission = TaskSubmission {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            completion_status: completion_status.unwrap_or_default(),
            due_date: due_date.unwrap_or_default(),
            is_public: is_public.unwrap_or_default(),
            created_by,
            shared_with,
            responsible,
            comment: non_empty(self.comments.as_deref()).map(str::to_string),
            tag: non_empty(self.tags.as_deref()).map(str::to_string),
            file,
        };

        let mut details = match submission.validate() {
            Ok(()) => Vec::new(),
            Err(validation) => validation_details(&validation),
        };
        details.extend(errors);

        if details.is_empty() {
            Ok(submission)
        } else {
            Err(ApiError::ValidationError(details))
        }
    }
}
