//! Post and comment forms

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{checkbox, max_chars, required, FieldErrors};
use crate::models::{Post, PostInput};

/// Format used by `<input type="datetime-local">`
const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

/// Parse a `datetime-local` value (seconds optional) as a UTC instant.
///
/// A space is accepted in place of the `T` separator.
pub fn parse_datetime_local(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim().replacen(' ', "T", 1);
    ["%Y-%m-%dT%H:%M:%S", DATETIME_LOCAL]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Render an instant for a `datetime-local` input
pub fn format_datetime_local(value: DateTime<Utc>) -> String {
    value.format(DATETIME_LOCAL).to_string()
}

/// Create/edit post form.
///
/// There is no author field: the author is always the requester.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub pub_date: String,
    /// Category ID
    pub category: String,
    /// Location ID, empty for none
    pub location: String,
    pub is_published: Option<String>,
}

impl PostForm {
    /// Blank form for a new post: published, dated now
    pub fn new_post() -> Self {
        Self {
            pub_date: format_datetime_local(Utc::now()),
            is_published: Some("on".to_string()),
            ..Self::default()
        }
    }

    /// Form pre-filled from an existing post
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: format_datetime_local(post.pub_date),
            category: post.category.id.to_string(),
            location: post
                .location
                .as_ref()
                .map(|l| l.id.to_string())
                .unwrap_or_default(),
            is_published: post.is_published.then(|| "on".to_string()),
        }
    }

    /// Field-level validation.
    ///
    /// Whether the category and location exist is checked by the service.
    pub fn validate(&self) -> Result<PostInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required(&mut errors, "title", &self.title);
        max_chars(&mut errors, "title", &title, 256);

        let text = required(&mut errors, "text", &self.text);

        let pub_date = match parse_datetime_local(&self.pub_date) {
            Some(date) => date,
            None => {
                if self.pub_date.trim().is_empty() {
                    errors.add("pub_date", "This field is required.");
                } else {
                    errors.add("pub_date", "Enter a valid date/time.");
                }
                Utc::now()
            }
        };

        let category_id = category_choice(&mut errors, &self.category);

        let location_id = match self.location.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("location", "Select a valid choice.");
                    None
                }
            },
        };

        errors.into_result(PostInput {
            title,
            text,
            pub_date,
            category_id,
            location_id,
            is_published: checkbox(&self.is_published),
        })
    }
}

/// Required category select; the ID is parsed here, its existence checked later
fn category_choice(errors: &mut FieldErrors, value: &str) -> i64 {
    match value.trim() {
        "" => {
            errors.add("category", "This field is required.");
            0
        }
        raw => raw.parse::<i64>().unwrap_or_else(|_| {
            errors.add("category", "Select a valid choice.");
            0
        }),
    }
}

/// Inline row of the post moderation list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationForm {
    pub category: String,
    pub is_published: Option<String>,
}

impl ModerationForm {
    /// `(is_published, category_id)`
    pub fn validate(&self) -> Result<(bool, i64), FieldErrors> {
        let mut errors = FieldErrors::new();
        let category_id = category_choice(&mut errors, &self.category);
        errors.into_result((checkbox(&self.is_published), category_id))
    }
}

/// Comment form: the text is the only field a user controls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        let text = required(&mut errors, "text", &self.text);
        errors.into_result(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn valid_form() -> PostForm {
        PostForm {
            title: "Hello".into(),
            text: "World".into(),
            pub_date: "2024-05-01T10:30".into(),
            category: "3".into(),
            location: String::new(),
            is_published: Some("on".into()),
        }
    }

    #[test]
    fn test_parse_datetime_local() {
        let date = parse_datetime_local("2024-05-01T10:30").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 5, 1));
        assert_eq!((date.hour(), date.minute(), date.second()), (10, 30, 0));

        let with_seconds = parse_datetime_local("2024-05-01 10:30:15").unwrap();
        assert_eq!(with_seconds.second(), 15);

        assert!(parse_datetime_local("01/05/2024").is_none());
        assert!(parse_datetime_local("").is_none());
    }

    #[test]
    fn test_format_round_trips_to_minutes() {
        let date = parse_datetime_local("2030-12-31T23:59").unwrap();
        assert_eq!(format_datetime_local(date), "2030-12-31T23:59");
    }

    #[test]
    fn test_valid_post_form() {
        let input = valid_form().validate().expect("form should be valid");
        assert_eq!(input.title, "Hello");
        assert_eq!(input.category_id, 3);
        assert_eq!(input.location_id, None);
        assert!(input.is_published);
    }

    #[test]
    fn test_unchecked_box_means_unpublished() {
        let mut form = valid_form();
        form.is_published = None;
        assert!(!form.validate().unwrap().is_published);
    }

    #[test]
    fn test_post_form_errors() {
        let form = PostForm {
            title: "x".repeat(257),
            text: "   ".into(),
            pub_date: "yesterday".into(),
            category: String::new(),
            location: "abc".into(),
            is_published: None,
        };
        let errors = form.validate().unwrap_err();
        for field in ["title", "text", "pub_date", "category", "location"] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_title_limit_counts_characters() {
        let mut form = valid_form();
        form.title = "é".repeat(256);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let body = "title=T&text=B&pub_date=2024-01-01T00:00&category=1&author=99&is_published=on";
        let form: PostForm = serde_urlencoded::from_str(body).unwrap();
        let input = form.validate().unwrap();
        assert_eq!(input.title, "T");
    }

    #[test]
    fn test_moderation_form() {
        let form: ModerationForm = serde_urlencoded::from_str("category=3&is_published=on").unwrap();
        assert_eq!(form.validate().unwrap(), (true, 3));

        let form: ModerationForm = serde_urlencoded::from_str("category=3").unwrap();
        assert_eq!(form.validate().unwrap(), (false, 3));

        let form: ModerationForm = serde_urlencoded::from_str("category=x&is_published=on").unwrap();
        assert!(form.validate().unwrap_err().has("category"));
    }

    #[test]
    fn test_comment_form() {
        assert_eq!(CommentForm { text: " nice ".into() }.validate().unwrap(), "nice");
        assert!(CommentForm { text: "".into() }.validate().is_err());

        let form: CommentForm = serde_urlencoded::from_str("text=hi&post=42&author=7").unwrap();
        assert_eq!(form.text, "hi");
    }
}
