use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use campus_core::serde::{string_or_number, to_rfc3339_ms, to_rfc3339_ms_opt};

/// Enrollment type reported when the enrollment carries none.
pub const UNKNOWN_ENROLLMENT_TYPE: &str = "unknown";

/// A typed record stored in one document collection.
///
/// The document ID is the value of `KEY_FIELD`. The key and every field in
/// `IMMUTABLE_FIELDS` cannot be changed by an update.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;
    const ENTITY: &'static str;
    const KEY_FIELD: &'static str;
    const IMMUTABLE_FIELDS: &'static [&'static str] = &[];

    fn key(&self) -> &str;
}

/// A record together with the ID of the document holding it.
/// Serializes as `{"id": ..., ...record}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stored<T> {
    pub id: String,
    #[serde(flatten)]
    pub record: T,
}

/// A course in the catalog. Unknown descriptive fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default, deserialize_with = "string_or_number")]
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    pub course_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Course {
    const COLLECTION: &'static str = "courses";
    const ENTITY: &'static str = "Course";
    const KEY_FIELD: &'static str = "course_id";

    fn key(&self) -> &str {
        &self.course_id
    }
}

/// A seeded student record. `user_uid`/`linkedAt` are set once a user profile links to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default, alias = "student_id", deserialize_with = "string_or_number")]
    pub student_code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_uid: Option<String>,
    #[serde(
        rename = "linkedAt",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "to_rfc3339_ms_opt"
    )]
    pub linked_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Student {
    const COLLECTION: &'static str = "students";
    const ENTITY: &'static str = "Student";
    const KEY_FIELD: &'static str = "student_code";

    fn key(&self) -> &str {
        &self.student_code
    }
}

/// A student's enrollment in a course. `student_id` and `course_id` are string foreign keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(default, deserialize_with = "string_or_number")]
    pub enrollment_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub student_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub course_id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Enrollment {
    const COLLECTION: &'static str = "enrollments";
    const ENTITY: &'static str = "Enrollment";
    const KEY_FIELD: &'static str = "enrollment_id";

    fn key(&self) -> &str {
        &self.enrollment_id
    }
}

/// User profile keyed by the identity provider's uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub student_code: String,
    #[serde(rename = "emailVerified", default)]
    pub email_verified: bool,
    #[serde(rename = "createdAt", serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "to_rfc3339_ms_opt"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for User {
    const COLLECTION: &'static str = "users";
    const ENTITY: &'static str = "User";
    const KEY_FIELD: &'static str = "uid";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["student_code", "createdAt"];

    fn key(&self) -> &str {
        &self.uid
    }
}

/// A course joined with the enrollment metadata of one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedCourse {
    pub id: String,
    #[serde(flatten)]
    pub course: Course,
    #[serde(rename = "type")]
    pub kind: String,
    pub rating: Option<f64>,
}
