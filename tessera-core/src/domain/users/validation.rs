//! Field-level validation for profile input.
//!
//! Validators never fail fast: every offending field is reported in the
//! returned map so the client can show all problems at once.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Field name → human readable message.
pub type FieldErrors = BTreeMap<String, String>;

pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 254;
pub const GENDER_MAX_LEN: usize = 32;
pub const AGE_MAX: i32 = 150;
pub const PASSWORD_MIN_LEN: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Outcome of [`validate_profile_update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: FieldErrors,
}

impl ValidationOutcome {
    fn from_errors(errors: FieldErrors) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check the presence and shape of `name` and `email`.
pub fn validate_profile_update(
    name: Option<&str>,
    email: Option<&str>,
) -> ValidationOutcome {
    let mut errors = FieldErrors::new();

    match name.map(str::trim) {
        None | Some("") => {
            errors.insert("name".into(), "Name must not be empty".into());
        }
        Some(name) if name.chars().count() > NAME_MAX_LEN => {
            errors.insert(
                "name".into(),
                format!("Name must be at most {NAME_MAX_LEN} characters"),
            );
        }
        Some(_) => {}
    }

    match email.map(str::trim) {
        None | Some("") => {
            errors.insert("email".into(), "Email must not be empty".into());
        }
        Some(email)
            if email.len() > EMAIL_MAX_LEN || !EMAIL_PATTERN.is_match(email) =>
        {
            errors.insert(
                "email".into(),
                "Email must be a valid email address".into(),
            );
        }
        Some(_) => {}
    }

    ValidationOutcome::from_errors(errors)
}

/// Raw optional profile fields as they arrive from a form.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileExtrasInput<'a> {
    pub age: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub dob: Option<&'a str>,
    pub mobile: Option<&'a str>,
}

/// Parsed optional profile fields, one three-state value per field:
/// `None` when the field was not sent (keep the stored value),
/// `Some(None)` when it was sent blank (clear it) and `Some(Some(v))` for a
/// new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileExtras {
    pub age: Option<Option<i32>>,
    pub gender: Option<Option<String>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub mobile_number: Option<Option<String>>,
}

/// Validate and parse the optional profile fields.
///
/// Values are trimmed; a blank value asks for the field to be cleared.
/// `today` bounds the date of birth and is passed in so the check stays
/// deterministic.
pub fn validate_profile_extras(
    input: &ProfileExtrasInput<'_>,
    today: NaiveDate,
) -> Result<ProfileExtras, FieldErrors> {
    let mut errors = FieldErrors::new();

    let age = sent(input.age, |raw| match raw.parse::<i32>() {
        Ok(age) if (0..=AGE_MAX).contains(&age) => Ok(age),
        _ => Err(format!(
            "Age must be a whole number between 0 and {AGE_MAX}"
        )),
    })
    .unwrap_or_else(|message| reject(&mut errors, "age", message));

    let gender = sent(input.gender, |gender| {
        if gender.chars().count() > GENDER_MAX_LEN {
            Err(format!("Gender must be at most {GENDER_MAX_LEN} characters"))
        } else {
            Ok(gender.to_string())
        }
    })
    .unwrap_or_else(|message| reject(&mut errors, "gender", message));

    let date_of_birth = sent(input.dob, |raw| {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) if date > today => {
                Err("Date of birth cannot be in the future".to_string())
            }
            Ok(date) => Ok(date),
            Err(_) => Err(
                "Date of birth must be a date in YYYY-MM-DD format".to_string()
            ),
        }
    })
    .unwrap_or_else(|message| reject(&mut errors, "dob", message));

    let mobile_number = sent(input.mobile, |mobile| {
        if is_valid_mobile(mobile) {
            Ok(mobile.to_string())
        } else {
            Err("Mobile number must contain 7 to 15 digits".to_string())
        }
    })
    .unwrap_or_else(|message| reject(&mut errors, "mobile", message));

    if errors.is_empty() {
        Ok(ProfileExtras {
            age,
            gender,
            date_of_birth,
            mobile_number,
        })
    } else {
        Err(errors)
    }
}

/// Minimum password policy for registration and password changes.
pub fn validate_new_password(password: &str) -> Result<(), FieldErrors> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        let mut errors = FieldErrors::new();
        errors.insert(
            "password".into(),
            format!("Password must be at least {PASSWORD_MIN_LEN} characters"),
        );
        return Err(errors);
    }
    Ok(())
}

/// Lift one raw form value into its three-state form, parsing non-blank
/// values with `parse`.
fn sent<T>(
    value: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<Option<Option<T>>, String> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(raw) => parse(raw).map(|parsed| Some(Some(parsed))),
    }
}

fn reject<T>(errors: &mut FieldErrors, field: &str, message: String) -> Option<T> {
    errors.insert(field.into(), message);
    None
}

fn is_valid_mobile(raw: &str) -> bool {
    let body = raw.strip_prefix('+').unwrap_or(raw);
    let mut digits = 0usize;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' => {}
            _ => return false,
        }
    }
    (7..=15).contains(&digits)
}
