//! Form payloads and their field-level validation
//!
//! Each form deserializes straight from `application/x-www-form-urlencoded`
//! with every field as a raw string, so an invalid submission can be echoed
//! back into the template together with its [`FormErrors`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{NewMovie, NewReview};
use crate::models::review::{MAX_RATING, MIN_RATING};

pub const NON_FIELD: &str = "non_field";

const TITLE_MAX: usize = 255;
const USERNAME_MAX: usize = 150;
const PASSWORD_MIN: usize = 8;
const GENRE_NAME_MAX: usize = 100;
const IMDB_ID_MAX: usize = 20;

/// Field name -> messages. Serializes as a plain map for the templates.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn require(errors: &mut FormErrors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
        false
    } else {
        true
    }
}

fn max_length(errors: &mut FormErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, len
            ),
        );
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub rating: String,
}

impl ReviewForm {
    pub fn validate(&self) -> Result<NewReview, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        if require(&mut errors, "title", title) {
            max_length(&mut errors, "title", title, TITLE_MAX);
        }
        require(&mut errors, "content", &self.content);

        let rating = match self.rating.trim() {
            "" => {
                errors.add("rating", "This field is required.");
                0
            }
            raw => match raw.parse::<i32>() {
                Ok(r) if (MIN_RATING..=MAX_RATING).contains(&r) => r,
                _ => {
                    errors.add(
                        "rating",
                        format!(
                            "Select a valid choice. {} is not one of the available choices.",
                            raw
                        ),
                    );
                    0
                }
            },
        };

        errors.into_result(NewReview {
            title: title.to_string(),
            content: self.content.trim().to_string(),
            rating,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct CommentForm {
    #[serde(default)]
    pub content: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        require(&mut errors, "content", &self.content);
        errors.into_result(self.content.trim().to_string())
    }
}

/// Registration form; the password fields are never echoed back
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidRegistration {
    pub username: String,
    pub password: String,
}

impl RegistrationForm {
    /// Field checks only; username uniqueness is decided by the database
    pub fn validate(&self) -> Result<ValidRegistration, FormErrors> {
        let mut errors = FormErrors::default();

        let username = self.username.trim();
        if require(&mut errors, "username", username) {
            max_length(&mut errors, "username", username, USERNAME_MAX);
            let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
            if !username.chars().all(allowed) {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
        }

        if require(&mut errors, "password1", &self.password1) {
            if self.password1.chars().count() < PASSWORD_MIN {
                errors.add(
                    "password1",
                    format!(
                        "This password is too short. It must contain at least {} characters.",
                        PASSWORD_MIN
                    ),
                );
            }
            if self.password1.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password1", "This password is entirely numeric.");
            }
        }

        if require(&mut errors, "password2", &self.password2)
            && self.password1 != self.password2
        {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.into_result(ValidRegistration {
            username: username.to_string(),
            password: self.password1.clone(),
        })
    }

    /// Values safe to echo into the template
    pub fn echo(&self) -> serde_json::Value {
        serde_json::json!({ "username": self.username })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        require(&mut errors, "username", &self.username);
        require(&mut errors, "password", &self.password);
        errors.into_result(())
    }
}

/// Only same-site absolute paths are honoured as a post-login redirect.
/// Browsers drop tabs and newlines while parsing a `Location`, so any
/// control character disqualifies the value.
pub fn safe_next(next: &str) -> Option<&str> {
    let next = next.trim();
    if next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control)
    {
        Some(next)
    } else {
        None
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct GenreForm {
    #[serde(default)]
    pub name: String,
}

impl GenreForm {
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        let name = self.name.trim();
        if require(&mut errors, "name", name) {
            max_length(&mut errors, "name", name, GENRE_NAME_MAX);
        }
        errors.into_result(name.to_string())
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct DirectorForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: String,
}

impl DirectorForm {
    pub fn validate(&self) -> Result<(String, Option<String>), FormErrors> {
        let mut errors = FormErrors::default();
        let name = self.name.trim();
        if require(&mut errors, "director_name", name) {
            max_length(&mut errors, "director_name", name, TITLE_MAX);
        }
        let bio = Some(self.bio.trim().to_string()).filter(|b| !b.is_empty());
        errors.into_result((name.to_string(), bio))
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MovieForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub director_id: String,
    /// Comma separated genre ids
    #[serde(default)]
    pub genre_ids: String,
    #[serde(default)]
    pub imdb_id: String,
    #[serde(default)]
    pub image: String,
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

impl MovieForm {
    pub fn validate(&self) -> Result<NewMovie, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        if require(&mut errors, "title", title) {
            max_length(&mut errors, "title", title, TITLE_MAX);
        }
        require(&mut errors, "description", &self.description);

        let year = match self.year.trim().parse::<i32>() {
            Ok(y) => y,
            Err(_) => {
                errors.add("year", "Enter a whole number.");
                0
            }
        };

        let director_id = match optional(&self.director_id) {
            None => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("director_id", "Select a valid director.");
                    None
                }
            },
        };

        let mut genre_ids = Vec::new();
        for raw in self.genre_ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match raw.parse::<i32>() {
                Ok(id) if !genre_ids.contains(&id) => genre_ids.push(id),
                Ok(_) => {}
                Err(_) => errors.add("genre_ids", format!("{} is not a valid genre id.", raw)),
            }
        }

        let imdb_id = optional(&self.imdb_id);
        if let Some(id) = &imdb_id {
            max_length(&mut errors, "imdb_id", id, IMDB_ID_MAX);
        }

        errors.into_result(NewMovie {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            year,
            director_id,
            genre_ids,
            imdb_id,
            image: optional(&self.image),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl FormErrors {
        fn get(&self, field: &str) -> Option<&[String]> {
            self.0.get(field).map(Vec::as_slice)
        }

        fn has(&self, field: &str) -> bool {
            self.0.contains_key(field)
        }
    }

    fn review(rating: &str) -> ReviewForm {
        ReviewForm {
            title: "Great".to_string(),
            content: "Loved it".to_string(),
            rating: rating.to_string(),
        }
    }

    #[test]
    fn review_accepts_ratings_one_to_five() {
        for r in 1..=5 {
            let valid = review(&r.to_string()).validate().unwrap();
            assert_eq!(valid.rating, r);
        }
    }

    #[test]
    fn review_rejects_out_of_range_ratings() {
        for bad in ["0", "6", "-1", "100", "3.5", "five"] {
            let errors = review(bad).validate().unwrap_err();
            assert!(errors.has("rating"), "rating {} should be rejected", bad);
            assert!(!errors.has("title"));
        }
    }

    #[test]
    fn review_requires_every_field() {
        let errors = ReviewForm::default().validate().unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("content"));
        assert!(errors.has("rating"));
    }

    #[test]
    fn review_title_is_limited_to_255_characters() {
        let mut form = review("4");
        form.title = "ą".repeat(256);
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("title").map(|e| e.len()), Some(1));

        form.title = "ą".repeat(255);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn blank_comment_is_rejected() {
        let form = CommentForm {
            content: "   ".to_string(),
        };
        assert!(form.validate().unwrap_err().has("content"));
    }

    #[test]
    fn registration_checks_passwords() {
        let form = RegistrationForm {
            username: "jonas".to_string(),
            password1: "12345678".to_string(),
            password2: "12345679".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get("password1"),
            Some(&["This password is entirely numeric.".to_string()][..])
        );
        assert!(errors.has("password2"));

        let form = RegistrationForm {
            username: "jonas".to_string(),
            password1: "kinas-2024".to_string(),
            password2: "kinas-2024".to_string(),
        };
        assert_eq!(
            form.validate().unwrap(),
            ValidRegistration {
                username: "jonas".to_string(),
                password: "kinas-2024".to_string()
            }
        );
    }

    #[test]
    fn registration_rejects_odd_usernames() {
        let form = RegistrationForm {
            username: "jonas jonaitis".to_string(),
            password1: "kinas-2024".to_string(),
            password2: "kinas-2024".to_string(),
        };
        assert!(form.validate().unwrap_err().has("username"));
    }

    #[test]
    fn next_must_be_a_local_path() {
        assert_eq!(safe_next("/movies/3/"), Some("/movies/3/"));
        assert_eq!(safe_next("//evil.example"), None);
        assert_eq!(safe_next("https://evil.example"), None);
        assert_eq!(safe_next(""), None);
        assert_eq!(safe_next("/\t/evil.example"), None);
        assert_eq!(safe_next("/movies\n/"), None);
        assert_eq!(safe_next("/movies/\u{7f}"), None);
    }

    #[test]
    fn movie_form_parses_optional_fields() {
        let form = MovieForm {
            title: "Alien".to_string(),
            description: "In space no one can hear you scream.".to_string(),
            year: "1979".to_string(),
            director_id: "".to_string(),
            genre_ids: "2, 5,2".to_string(),
            imdb_id: " ".to_string(),
            image: "movie_images/alien.jpg".to_string(),
        };
        let movie = form.validate().unwrap();
        assert_eq!(movie.year, 1979);
        assert_eq!(movie.director_id, None);
        assert_eq!(movie.genre_ids, vec![2, 5]);
        assert_eq!(movie.imdb_id, None);
        assert_eq!(movie.image.as_deref(), Some("movie_images/alien.jpg"));
    }

    #[test]
    fn movie_form_rejects_bad_year_and_genres() {
        let form = MovieForm {
            title: "Alien".to_string(),
            description: "d".to_string(),
            year: "nineteen".to_string(),
            genre_ids: "x".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("year"));
        assert!(errors.has("genre_ids"));
    }
}
