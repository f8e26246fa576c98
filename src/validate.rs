//! Pure request validation: field presence, email shape, request type.
//!
//! No side effects; handlers map [`ValidationError`] to a 400 response.

use crate::handlers::student::StudentForm;
use crate::models::student::RequestType;
use crate::persisters::student::StudentInsert;

use regex::Regex;

lazy_static! {
    // Deliberately permissive: anything of the shape local@domain.tld
    // without whitespace.
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingName,
    MissingEmail,
    InvalidEmail,
    MissingRequestType,
    InvalidRequestType,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::MissingName => "Name is required.",
            ValidationError::MissingEmail => "Email is required.",
            ValidationError::InvalidEmail => "Invalid email format",
            ValidationError::MissingRequestType => "Request type is required.",
            ValidationError::InvalidRequestType => "Invalid request type.",
        }
    }
}

/// Checks a registration form and produces the insertable student.
pub fn registration(form: StudentForm) -> Result<StudentInsert, ValidationError> {
    let name = form
        .name
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingName)?;
    let email = form
        .email
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingEmail)?;
    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    let request_type: RequestType = form
        .request_type
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingRequestType)?
        .parse()
        .map_err(|_| ValidationError::InvalidRequestType)?;

    Ok(StudentInsert {
        name,
        email,
        request_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, request_type: &str) -> StudentForm {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        StudentForm {
            name: opt(name),
            email: opt(email),
            request_type: opt(request_type),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        let insert = registration(form("Alice", "a@b.com", "transcript")).unwrap();
        assert_eq!(insert.name, "Alice");
        assert_eq!(insert.email, "a@b.com");
        assert_eq!(insert.request_type, RequestType::Transcript);
    }

    #[test]
    fn missing_fields_each_have_their_own_error() {
        assert_eq!(
            registration(form("", "a@b.com", "transcript")),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            registration(form("Alice", "", "transcript")),
            Err(ValidationError::MissingEmail)
        );
        assert_eq!(
            registration(form("Alice", "a@b.com", "")),
            Err(ValidationError::MissingRequestType)
        );
    }

    #[test]
    fn absent_fields_count_as_missing() {
        let partial = StudentForm {
            name: Some("Alice".to_string()),
            email: None,
            request_type: None,
        };
        assert_eq!(registration(partial), Err(ValidationError::MissingEmail));
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["plainaddress", "a@b", "a b@c.com", "a@b c.com", "@b.com", "a@.com."] {
            assert_eq!(
                registration(form("Alice", bad, "transcript")),
                Err(ValidationError::InvalidEmail),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_simple_emails() {
        for good in ["a@b.com", "first.last@sub.example.org", "x+tag@y.co"] {
            assert!(registration(form("Alice", good, "transcript")).is_ok());
        }
    }

    #[test]
    fn rejects_unknown_request_type() {
        assert_eq!(
            registration(form("Alice", "a@b.com", "diploma")),
            Err(ValidationError::InvalidRequestType)
        );
    }

    #[test]
    fn recommendation_letter_is_recognized() {
        let insert = registration(form("Bob", "b@c.org", "recommendation_letter")).unwrap();
        assert_eq!(insert.request_type, RequestType::RecommendationLetter);
    }
}
