//! User-input validation.
//!
//! # Responsibility
//! - Check form input before any collaborator is called.
//! - Produce field-level messages the UI can show as-is.
//!
//! # Invariants
//! - Validators are pure: "today" is always passed in.
//! - Goal date rules compare calendar days, never times of day.

use crate::model::datetime::parse_date;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const GOAL_NAME_MIN_CHARS: usize = 3;

static GOAL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid goal name regex"));

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required { field: &'static str },
    TooShort { field: &'static str, min: usize },
    InvalidCharacters { field: &'static str },
    InvalidDate { field: &'static str, value: String },
    StartBeforeToday,
    EndNotAfterStart,
    DateNotInFuture { field: &'static str },
    TimeInPast { field: &'static str },
    InvalidEmail,
}

impl ValidationError {
    /// Form field the message belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::TooShort { field, .. }
            | Self::InvalidCharacters { field }
            | Self::InvalidDate { field, .. }
            | Self::DateNotInFuture { field }
            | Self::TimeInPast { field } => field,
            Self::StartBeforeToday => "Start Date",
            Self::EndNotAfterStart => "End Date",
            Self::InvalidEmail => "Email",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required { field } => write!(f, "{field} is required."),
            Self::TooShort { field, min } => {
                write!(f, "{field} must be at least {min} characters.")
            }
            Self::InvalidCharacters { field } => {
                write!(f, "{field} may only contain letters and digits.")
            }
            Self::InvalidDate { field, value } => {
                write!(f, "Invalid {}: `{value}`.", field.to_lowercase())
            }
            Self::StartBeforeToday => write!(f, "Start date cannot be before today."),
            Self::EndNotAfterStart => write!(f, "End date must be after start date."),
            Self::DateNotInFuture { .. } => write!(f, "You can only select future dates."),
            Self::TimeInPast { .. } => write!(f, "Please select a future time for today."),
            Self::InvalidEmail => write!(f, "Please enter a valid email address."),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Returns the trimmed value, or `Required` when it is empty or whitespace.
pub fn validate_required<'a>(field: &'static str, value: &'a str) -> ValidationResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed)
}

/// Goal names: at least three ASCII letters or digits, nothing else.
pub fn validate_goal_name(name: &str) -> ValidationResult<&str> {
    const FIELD: &str = "Goal name";
    let trimmed = validate_required(FIELD, name)?;
    if !GOAL_NAME_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidCharacters { field: FIELD });
    }
    if trimmed.chars().count() < GOAL_NAME_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field: FIELD,
            min: GOAL_NAME_MIN_CHARS,
        });
    }
    Ok(trimmed)
}

/// Parses and checks a goal's start/end pair against `today`.
///
/// Accepts `YYYY-MM-DD` or an ISO-8601 date-time (the date part is used).
pub fn validate_goal_dates(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> ValidationResult<(NaiveDate, NaiveDate)> {
    let start = parse_required_date("Start Date", start)?;
    let end = parse_required_date("End Date", end)?;
    check_goal_date_range(start, end, today)?;
    Ok((start, end))
}

/// Date rules for an already-parsed goal range.
pub fn check_goal_date_range(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> ValidationResult<()> {
    if start < today {
        return Err(ValidationError::StartBeforeToday);
    }
    if end <= start {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok(())
}

/// Calendar reminder flow: only days after `today` may be picked.
pub fn validate_reminder_date(date: NaiveDate, today: NaiveDate) -> ValidationResult<NaiveDate> {
    if date <= today {
        return Err(ValidationError::DateNotInFuture { field: "Date" });
    }
    Ok(date)
}

/// Deadlines and trigger times may not lie before `now`.
pub fn validate_not_past(
    field: &'static str,
    at: NaiveDateTime,
    now: NaiveDateTime,
) -> ValidationResult<NaiveDateTime> {
    if at < now {
        return Err(ValidationError::TimeInPast { field });
    }
    Ok(at)
}

/// One `@` with a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    let trimmed = validate_required("Email", email)?;
    let mut parts = trimmed.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidEmail);
    };
    let domain_ok = domain
        .split('.')
        .all(|label| !label.is_empty())
        && domain.contains('.');
    if local.is_empty() || !domain_ok || trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(trimmed)
}

fn parse_required_date(field: &'static str, raw: Option<&str>) -> ValidationResult<NaiveDate> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty());
    let Some(raw) = raw else {
        return Err(ValidationError::Required { field });
    };
    parse_date(raw).ok_or_else(|| ValidationError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        validate_email, validate_goal_dates, validate_goal_name, validate_not_past,
        validate_reminder_date, validate_required, ValidationError,
    };
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 14).unwrap()
    }

    #[test]
    fn goal_name_rules() {
        assert!(matches!(
            validate_goal_name("ab"),
            Err(ValidationError::TooShort { min: 3, .. })
        ));
        assert_eq!(validate_goal_name("abc"), Ok("abc"));
        assert!(matches!(
            validate_goal_name("abc!"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
        assert!(matches!(
            validate_goal_name(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_goal_name("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_goal_name("Read 12 books").is_err());
        assert_eq!(validate_goal_name(" Run5k "), Ok("Run5k"));
    }

    #[test]
    fn goal_date_rules() {
        assert_eq!(
            validate_goal_dates(Some("2025-05-14"), Some("2025-05-14"), today()),
            Err(ValidationError::EndNotAfterStart)
        );
        assert_eq!(
            validate_goal_dates(Some("2025-05-14"), Some("2025-05-15"), today()),
            Ok((today(), NaiveDate::from_ymd_opt(2025, 5, 15).unwrap()))
        );
        assert_eq!(
            validate_goal_dates(Some("2025-05-13"), Some("2025-05-20"), today()),
            Err(ValidationError::StartBeforeToday)
        );
    }

    #[test]
    fn goal_dates_accept_iso_date_times_and_report_missing_or_bad_input() {
        assert!(validate_goal_dates(
            Some("2025-05-14T00:00:00.000Z"),
            Some("2025-06-14T00:00:00.000Z"),
            today()
        )
        .is_ok());
        assert_eq!(
            validate_goal_dates(None, Some("2025-06-14"), today()),
            Err(ValidationError::Required {
                field: "Start Date"
            })
        );
        assert!(matches!(
            validate_goal_dates(Some("2025-05-14"), Some("someday"), today()),
            Err(ValidationError::InvalidDate {
                field: "End Date",
                ..
            })
        ));
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ValidationError::StartBeforeToday.to_string(),
            "Start date cannot be before today."
        );
        assert_eq!(
            ValidationError::Required { field: "Title" }.to_string(),
            "Title is required."
        );
    }

    #[test]
    fn reminder_calendar_date_must_be_after_today() {
        assert!(validate_reminder_date(today(), today()).is_err());
        let tomorrow = today().succ_opt().unwrap();
        assert_eq!(validate_reminder_date(tomorrow, today()), Ok(tomorrow));
    }

    #[test]
    fn past_times_are_rejected() {
        let now = today().and_hms_opt(12, 0, 0).unwrap();
        let earlier = today().and_hms_opt(11, 59, 0).unwrap();
        assert_eq!(
            validate_not_past("Deadline", earlier, now),
            Err(ValidationError::TimeInPast { field: "Deadline" })
        );
        assert_eq!(validate_not_past("Deadline", now, now), Ok(now));
    }

    #[test]
    fn email_and_required_fields() {
        assert_eq!(validate_email(" ada@example.com "), Ok("ada@example.com"));
        assert_eq!(validate_email("ada.example.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("ada@example"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("@example.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("a@b@c.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_required("Password", "  "), Err(ValidationError::Required { field: "Password" }));
    }
}
