//! Registration, login and profile forms

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{max_chars, required, FieldErrors};
use crate::models::{CreateUserInput, UpdateUserInput, User};

/// Letters, digits and `@ . + - _`, at most 150 characters
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w.@+-]{1,150}$").expect("username pattern is valid")
});

const MIN_PASSWORD_LEN: usize = 8;

fn validate_username(errors: &mut FieldErrors, value: &str) -> String {
    let username = required(errors, "username", value);
    if !username.is_empty() && !USERNAME_RE.is_match(&username) {
        errors.add(
            "username",
            "Enter a valid username. It may contain up to 150 letters, numbers and @/./+/-/_ characters.",
        );
    }
    username
}

fn validate_email(errors: &mut FieldErrors, value: &str) -> String {
    let email = required(errors, "email", value);
    max_chars(errors, "email", &email, 254);
    if !email.is_empty() {
        let valid = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'))
            .unwrap_or(false);
        if !valid {
            errors.add("email", "Enter a valid email address.");
        }
    }
    email
}

/// Sign-up form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

impl RegistrationForm {
    /// Check the fields; whether the username is free is up to the service.
    pub fn validate(&self) -> Result<CreateUserInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = validate_username(&mut errors, &self.username);
        let email = validate_email(&mut errors, &self.email);

        if self.password1.is_empty() {
            errors.add("password1", "This field is required.");
        } else if self.password1.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password1",
                format!("This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."),
            );
        }
        if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.into_result(CreateUserInput {
            username,
            email,
            password: self.password1.clone(),
        })
    }
}

/// Sign-in form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Profile edit form for the signed-in user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }

    pub fn validate(&self) -> Result<UpdateUserInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = validate_username(&mut errors, &self.username);
        let email = validate_email(&mut errors, &self.email);

        let first_name = self.first_name.trim().to_string();
        max_chars(&mut errors, "first_name", &first_name, 150);
        let last_name = self.last_name.trim().to_string();
        max_chars(&mut errors, "last_name", &last_name, 150);

        errors.into_result(UpdateUserInput {
            username,
            email,
            first_name,
            last_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registration(username: &str, email: &str, p1: &str, p2: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.into(),
            email: email.into(),
            password1: p1.into(),
            password2: p2.into(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let input = registration("alice.b+1", "alice@example.com", "correct horse", "correct horse")
            .validate()
            .unwrap();
        assert_eq!(input.username, "alice.b+1");
        assert_eq!(input.password, "correct horse");
    }

    #[test]
    fn test_registration_errors() {
        let errors = registration("bad name!", "nope", "short", "other")
            .validate()
            .unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("email"));
        assert!(errors.has("password1"));
        assert!(errors.has("password2"));
    }

    #[test]
    fn test_username_length_limit() {
        let ok = "a".repeat(150);
        let too_long = "a".repeat(151);
        assert!(registration(&ok, "a@b.c", "password1", "password1").validate().is_ok());
        assert!(registration(&too_long, "a@b.c", "password1", "password1")
            .validate()
            .is_err());
    }

    #[test]
    fn test_password_not_serialized() {
        let form = registration("alice", "a@b.c", "secret-pass", "secret-pass");
        let json = serde_json::to_string(&form).unwrap();
        assert!(!json.contains("secret-pass"));
    }

    #[test]
    fn test_profile_form() {
        let form = ProfileForm {
            username: " alice ".into(),
            email: "alice@example.com".into(),
            first_name: " Alice ".into(),
            last_name: String::new(),
        };
        let input = form.validate().unwrap();
        assert_eq!(input.username, "alice");
        assert_eq!(input.first_name, "Alice");

        let bad = ProfileForm {
            username: String::new(),
            email: "a@@b".into(),
            ..ProfileForm::default()
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("email"));
    }

    proptest! {
        #[test]
        fn prop_username_charset_accepted(name in "[a-zA-Z0-9_.@+-]{1,150}") {
            let mut errors = FieldErrors::new();
            validate_username(&mut errors, &name);
            prop_assert!(errors.is_empty());
        }

        #[test]
        fn prop_username_with_space_rejected(a in "[a-z]{1,10}", b in "[a-z]{1,10}") {
            let mut errors = FieldErrors::new();
            validate_username(&mut errors, &format!("{a} {b}"));
            prop_assert!(errors.has("username"));
        }
    }
}
