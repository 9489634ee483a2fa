use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::validate_not_blank;
use crate::utils::errors::{AppError, AppResult, FieldError};

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Category {
    Urgent,
    #[default]
    #[serde(rename = "Non-Urgent")]
    NonUrgent,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Urgent => "Urgent",
            Category::NonUrgent => "Non-Urgent",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "Urgent" => Ok(Category::Urgent),
            "Non-Urgent" => Ok(Category::NonUrgent),
            _ => Err(()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub category: Category,
    pub completed: bool,
    pub user_id: i64,
    /// Owner's username when the todo was created. Not kept in sync.
    pub username: String,
}

impl Todo {
    /// Overwrites the editable fields. Ownership and completion are untouched.
    pub fn apply(&mut self, fields: TodoFields) {
        self.title = fields.title;
        self.description = fields.description;
        self.due_date = fields.due_date;
        self.category = fields.category;
    }
}

/// Request body for create and update.
#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    #[validate(length(max = 100, message = "Title must be less than 100 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Title is required"))]
    pub title: String,

    #[validate(length(max = 500, message = "Description must be less than 500 characters"))]
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub due_date: Option<String>,

    #[validate(custom(
        function = "validate_category",
        message = "Category must be 'Urgent' or 'Non-Urgent'"
    ))]
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    Category::NonUrgent.as_str().to_string()
}

fn validate_category(value: &str) -> Result<(), validator::ValidationError> {
    value
        .parse::<Category>()
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("category"))
}

/// A validated draft.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoFields {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub category: Category,
}

impl TodoDraft {
    pub fn into_fields(self) -> AppResult<TodoFields> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => FieldError::collect(&e),
        };

        let due_date = non_empty(self.due_date);
        if let Some(date) = &due_date {
            if NaiveDate::parse_from_str(date, DUE_DATE_FORMAT).is_err() {
                errors.push(FieldError::new("dueDate", "Due date must be a YYYY-MM-DD date"));
            }
        }

        let category = match self.category.parse::<Category>() {
            Ok(c) if errors.is_empty() => c,
            _ => return Err(AppError::validation(errors)),
        };

        Ok(TodoFields {
            title: self.title,
            description: non_empty(self.description),
            due_date,
            category,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Insert payload handed to the store.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    #[serde(flatten)]
    pub fields: TodoFields,
    pub completed: bool,
    pub user_id: i64,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_string(),
            description: None,
            due_date: None,
            category: default_category(),
        }
    }

    fn bad_fields(draft: TodoDraft) -> Vec<String> {
        match draft.into_fields() {
            Err(AppError::Validation { errors, .. }) => {
                errors.into_iter().map(|e| e.field).collect()
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn category_defaults_to_non_urgent() {
        let draft: TodoDraft = serde_json::from_str(r#"{"title":"Buy milk"}"#).unwrap();
        let fields = draft.into_fields().unwrap();
        assert_eq!(fields.category, Category::NonUrgent);
    }

    #[test]
    fn category_uses_hyphenated_wire_name() {
        assert_eq!(
            serde_json::to_string(&Category::NonUrgent).unwrap(),
            "\"Non-Urgent\""
        );
        let c: Category = serde_json::from_str("\"Urgent\"").unwrap();
        assert_eq!(c, Category::Urgent);
    }

    #[test]
    fn title_limits() {
        assert!(draft(&"x".repeat(100)).into_fields().is_ok());
        assert_eq!(bad_fields(draft(&"x".repeat(101))), vec!["title"]);
        assert_eq!(bad_fields(draft("")), vec!["title"]);
        assert_eq!(bad_fields(draft("   ")), vec!["title"]);
    }

    #[test]
    fn title_limit_counts_characters() {
        assert!(draft(&"é".repeat(100)).into_fields().is_ok());
    }

    #[test]
    fn description_limit() {
        let mut d = draft("ok");
        d.description = Some("d".repeat(500));
        assert!(d.clone().into_fields().is_ok());
        d.description = Some("d".repeat(501));
        assert_eq!(bad_fields(d), vec!["description"]);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut d = draft("ok");
        d.category = "Someday".into();
        assert_eq!(bad_fields(d), vec!["category"]);
    }

    #[test]
    fn due_date_must_be_calendar_date() {
        let mut d = draft("ok");
        d.due_date = Some("2024-02-30".into());
        assert_eq!(bad_fields(d.clone()), vec!["dueDate"]);
        d.due_date = Some("2024-02-29".into());
        assert_eq!(
            d.into_fields().unwrap().due_date.as_deref(),
            Some("2024-02-29")
        );
    }

    #[test]
    fn empty_optional_strings_are_dropped() {
        let draft: TodoDraft = serde_json::from_str(
            r#"{"title":"t","description":"","dueDate":"","category":"Urgent"}"#,
        )
        .unwrap();
        let fields = draft.into_fields().unwrap();
        assert_eq!(fields.description, None);
        assert_eq!(fields.due_date, None);
        assert_eq!(fields.category, Category::Urgent);
    }

    #[test]
    fn todo_serializes_camel_case() {
        let todo = Todo {
            id: 1,
            title: "Buy milk".into(),
            description: None,
            due_date: Some("2025-01-01".into()),
            category: Category::Urgent,
            completed: false,
            user_id: 3,
            username: "alice".into(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["dueDate"], "2025-01-01");
        assert_eq!(json["userId"], 3);
        assert_eq!(json["category"], "Urgent");
    }

    #[test]
    fn new_todo_flattens_fields() {
        let new = NewTodo {
            fields: draft("Walk").into_fields().unwrap(),
            completed: false,
            user_id: 9,
            username: "bob".into(),
        };
        let json = serde_json::to_value(&new).unwrap();
        assert_eq!(json["title"], "Walk");
        assert_eq!(json["category"], "Non-Urgent");
        assert_eq!(json["userId"], 9);
    }
}
