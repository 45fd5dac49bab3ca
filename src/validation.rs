//! Field rules shared by the HTTP handlers and the client screens.

use lazy_static::lazy_static;
use regex::Regex;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};

use crate::users::dto::CreateUserRequest;

pub const EMAIL_ERROR: &str = "Email is invalid. Enter a correct email";
pub const DATE_RANGE_ERROR: &str = "From Date cannot be greater than To Date";
pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,4}$").unwrap();
    static ref LOWERCASE_RE: Regex = Regex::new(r"[a-z]").unwrap();
    static ref UPPERCASE_RE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"[0-9]").unwrap();
    static ref SYMBOL_RE: Regex = Regex::new(r"[$&+,:;=?@#|'<>.^*()%!-]").unwrap();
}

/// Wire names of every blank field, in form order.
pub fn missing_fields(req: &CreateUserRequest) -> Vec<&'static str> {
    [
        ("firstName", &req.first_name),
        ("lastName", &req.last_name),
        ("email", &req.email),
        ("phoneNumber", &req.phone_number),
        ("password", &req.password),
        ("dateOfBirth", &req.date_of_birth),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(EMAIL_ERROR.to_string())
    }
}

/// Requirements the password does not meet yet.
pub fn missing_password_requirements(password: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        missing.push("at least 8 characters");
    }
    if !LOWERCASE_RE.is_match(password) {
        missing.push("one lowercase letter");
    }
    if !UPPERCASE_RE.is_match(password) {
        missing.push("one uppercase letter");
    }
    if !NUMBER_RE.is_match(password) {
        missing.push("one number");
    }
    if !SYMBOL_RE.is_match(password) {
        missing.push("one special character");
    }
    missing
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let missing = missing_password_requirements(password);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Password must contain: {}", missing.join(", ")))
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, keeping only the date.
pub fn parse_date(raw: &str) -> Result<Date, String> {
    let raw = raw.trim();
    let plain = format_description!("[year]-[month]-[day]");
    Date::parse(raw, &plain)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339).map(|dt| dt.date()))
        .map_err(|_| format!("Invalid date: {raw}"))
}

/// Rejects a filter whose lower bound lies after its upper bound.
/// One-sided or empty filters always pass.
pub fn check_date_range(from: &str, to: &str) -> Result<(), String> {
    if from.trim().is_empty() || to.trim().is_empty() {
        return Ok(());
    }
    let from = parse_date(from)?;
    let to = parse_date(to)?;
    if from > to {
        return Err(DATE_RANGE_ERROR.to_string());
    }
    Ok(())
}
