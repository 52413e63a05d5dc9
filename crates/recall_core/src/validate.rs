//! crates/recall_core/src/validate.rs
//!
//! Client-side input checks. A failure here is a `PortError::Validation` and the
//! request is never sent. Lengths are counted in characters.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::{Credentials, NoteInput, Registration};
use crate::ports::{PortError, PortResult};

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const NOTE_TITLE_MAX_CHARS: usize = 200;
pub const CATEGORY_NAME_MAX_CHARS: usize = 50;
pub const SUPERVISION_MIN_SECONDS: u32 = 10;
pub const SUPERVISION_MAX_SECONDS: u32 = 300;

fn invalid(message: impl Into<String>) -> PortError {
    PortError::Validation(message.into())
}

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static username pattern"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

pub fn username(value: &str) -> PortResult<()> {
    if value.trim().is_empty() {
        return Err(invalid("username must not be empty"));
    }
    let chars = value.chars().count();
    if chars < USERNAME_MIN_CHARS {
        return Err(invalid(format!(
            "username needs at least {} characters",
            USERNAME_MIN_CHARS
        )));
    }
    if chars > USERNAME_MAX_CHARS {
        return Err(invalid(format!(
            "username must not exceed {} characters",
            USERNAME_MAX_CHARS
        )));
    }
    if !username_pattern().is_match(value) {
        return Err(invalid(
            "username may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}

pub fn password(value: &str) -> PortResult<()> {
    if value.trim().is_empty() {
        return Err(invalid("password must not be empty"));
    }
    if value.chars().count() < PASSWORD_MIN_CHARS {
        return Err(invalid(format!(
            "password needs at least {} characters",
            PASSWORD_MIN_CHARS
        )));
    }
    Ok(())
}

pub fn email(value: &str) -> PortResult<()> {
    if value.trim().is_empty() {
        return Err(invalid("email must not be empty"));
    }
    if !email_pattern().is_match(value) {
        return Err(invalid("email address is not valid"));
    }
    Ok(())
}

pub fn credentials(credentials: &Credentials) -> PortResult<()> {
    username(&credentials.username)?;
    password(&credentials.password)
}

pub fn registration(registration: &Registration) -> PortResult<()> {
    username(&registration.username)?;
    password(&registration.password)?;
    email(&registration.email)
}

pub fn supervision_duration(seconds: u32) -> PortResult<()> {
    if seconds < SUPERVISION_MIN_SECONDS {
        return Err(invalid(format!(
            "supervision needs at least {} seconds",
            SUPERVISION_MIN_SECONDS
        )));
    }
    if seconds > SUPERVISION_MAX_SECONDS {
        return Err(invalid(format!(
            "supervision must not exceed {} seconds",
            SUPERVISION_MAX_SECONDS
        )));
    }
    Ok(())
}

pub fn note_input(input: &NoteInput) -> PortResult<()> {
    if input.title.trim().is_empty() {
        return Err(invalid("title must not be empty"));
    }
    if input.title.chars().count() > NOTE_TITLE_MAX_CHARS {
        return Err(invalid(format!(
            "title must not exceed {} characters",
            NOTE_TITLE_MAX_CHARS
        )));
    }
    if input.content.trim().is_empty() {
        return Err(invalid("content must not be empty"));
    }
    if input.is_supervised {
        match input.supervision_duration_seconds {
            Some(seconds) => supervision_duration(seconds)?,
            None => return Err(invalid("a supervised note needs a supervision duration")),
        }
    }
    Ok(())
}

pub fn category_name(name: &str) -> PortResult<()> {
    if name.trim().is_empty() {
        return Err(invalid("category name must not be empty"));
    }
    if name.chars().count() > CATEGORY_NAME_MAX_CHARS {
        return Err(invalid(format!(
            "category name must not exceed {} characters",
            CATEGORY_NAME_MAX_CHARS
        )));
    }
    Ok(())
}
