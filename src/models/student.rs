use sqlx::types::Uuid;
use sqlx::Error;

/// The two kinds of document a student can ask for. Stored as plain text in
/// the `students.request_type` column.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Transcript,
    RecommendationLetter,
}

impl RequestType {
    /// The wire/database spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Transcript => "transcript",
            RequestType::RecommendationLetter => "recommendation_letter",
        }
    }

    /// Human-readable form, used in email bodies.
    pub fn label(&self) -> &'static str {
        match self {
            RequestType::Transcript => "transcript",
            RequestType::RecommendationLetter => "recommendation letter",
        }
    }
}

#[derive(Debug)]
pub struct ParseRequestTypeError(String);

impl std::fmt::Display for ParseRequestTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized request type: {}", self.0)
    }
}

impl std::error::Error for ParseRequestTypeError {}

impl std::str::FromStr for RequestType {
    type Err = ParseRequestTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transcript" => Ok(RequestType::Transcript),
            "recommendation_letter" => Ok(RequestType::RecommendationLetter),
            other => Err(ParseRequestTypeError(other.to_string())),
        }
    }
}

impl TryFrom<String> for RequestType {
    type Error = ParseRequestTypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub request_type: RequestType,
    pub request_ready: bool,
}

#[derive(Debug)]
pub enum StudentError {
    /// A row for this (email, request_type) pair is already present.
    AlreadyExists,
    /// No row with the given id.
    NotFound,
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StudentError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            Error::RowNotFound => Self::NotFound,
            Error::Database(ref err) => {
                // 23505: unique constraint violation. Backstop for the
                // select-then-insert duplicate check, which can race.
                if err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
                    Self::AlreadyExists
                } else {
                    Self::Sqlx(e)
                }
            }
            _ => Self::Sqlx(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_type_round_trips_through_text() {
        for rt in [RequestType::Transcript, RequestType::RecommendationLetter] {
            assert_eq!(rt.as_str().parse::<RequestType>().unwrap(), rt);
        }
    }

    #[test]
    fn rejects_unknown_request_type() {
        assert!("diploma".parse::<RequestType>().is_err());
        assert!("".parse::<RequestType>().is_err());
        // Spellings are exact, not case-insensitive.
        assert!("Transcript".parse::<RequestType>().is_err());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&RequestType::RecommendationLetter).unwrap();
        assert_eq!(json, "\"recommendation_letter\"");
    }

    // Stand-in for a driver-reported database error with a SQLSTATE code.
    #[derive(Debug)]
    struct FakeDbError {
        code: &'static str,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "database error (sqlstate {})", self.code)
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "database error"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(std::borrow::Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.code {
                "23505" => sqlx::error::ErrorKind::UniqueViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    #[test]
    fn unique_violation_maps_to_already_exists() {
        let e = sqlx::Error::Database(Box::new(FakeDbError { code: "23505" }));
        assert!(matches!(StudentError::from(e), StudentError::AlreadyExists));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            StudentError::from(sqlx::Error::RowNotFound),
            StudentError::NotFound
        ));
    }

    #[test]
    fn other_database_errors_pass_through() {
        let e = sqlx::Error::Database(Box::new(FakeDbError { code: "23502" }));
        assert!(matches!(StudentError::from(e), StudentError::Sqlx(_)));
    }
}
