use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use campus_core::serde::{format_rfc3339_ms, to_rfc3339_ms};

use crate::domain::collection::Collection;
use crate::domain::store::{Document, DocumentStore};
use crate::domain::types::{Student, User};
use crate::error::RegistryError;

/// Caller identity as verified by the identity provider. Not re-validated here.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
}

/// Public view of a user profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub uid: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub student_code: String,
    #[serde(rename = "emailVerified")]
    pub email_verified: bool,
    #[serde(rename = "createdAt", serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            student_code: user.student_code,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

/// Current time at the millisecond precision timestamps are stored with.
fn now_ms() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

// ── RegisterProfile ──────────────────────────────────────────────────────────

pub struct RegisterProfileInput {
    pub identity: Identity,
    pub student_code: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone)]
pub struct RegisteredProfile {
    pub profile: Profile,
    pub outcome: RegisterOutcome,
}

/// Creates a user profile and links it to a seeded student record.
///
/// The user document is written first, then the student's back-link. The store
/// has no transaction spanning both, so a failed link deletes the new user
/// document again before the error is returned.
pub struct RegisterProfileUseCase<S: DocumentStore> {
    pub users: Collection<S, User>,
    pub students: Collection<S, Student>,
}

impl<S: DocumentStore> RegisterProfileUseCase<S> {
    pub async fn execute(
        &self,
        input: RegisterProfileInput,
    ) -> Result<RegisteredProfile, RegistryError> {
        let student_code = input.student_code.trim();
        let display_name = input.display_name.trim();
        if student_code.is_empty() || display_name.is_empty() {
            return Err(RegistryError::validation(
                "student_code and displayName are required",
            ));
        }
        let Identity {
            uid,
            email,
            email_verified,
        } = input.identity;

        if let Some(existing) = self.users.find(&uid).await? {
            info!(uid = uid.as_str(), "profile already exists");
            return Ok(RegisteredProfile {
                profile: existing.record.into(),
                outcome: RegisterOutcome::AlreadyExists,
            });
        }

        let student = self.students.get(student_code).await?;
        if let Some(linked_uid) = student.record.user_uid.as_deref() {
            if linked_uid != uid {
                return Err(RegistryError::AlreadyLinked {
                    student_code: student_code.to_owned(),
                });
            }
        }

        let user = User {
            uid: uid.clone(),
            email,
            display_name: display_name.to_owned(),
            student_code: student_code.to_owned(),
            email_verified,
            created_at: now_ms(),
            updated_at: None,
        };
        let created = self.users.create(&uid, user).await?;

        if let Err(link_error) = self.link_student(student_code, &uid).await {
            self.roll_back_user(&uid, &link_error).await;
            return Err(link_error);
        }

        info!(uid = uid.as_str(), student_code, "profile created and linked to student");
        Ok(RegisteredProfile {
            profile: created.record.into(),
            outcome: RegisterOutcome::Created,
        })
    }

    async fn link_student(&self, student_code: &str, uid: &str) -> Result<(), RegistryError> {
        let mut link = Document::new();
        link.insert("user_uid".to_owned(), Value::from(uid));
        link.insert(
            "linkedAt".to_owned(),
            Value::from(format_rfc3339_ms(&now_ms())),
        );
        self.students.update(student_code, link).await?;
        Ok(())
    }

    async fn roll_back_user(&self, uid: &str, cause: &RegistryError) {
        match self.users.delete(uid).await {
            Ok(_) => warn!(uid, error = %cause, "student link failed; profile removed"),
            Err(rollback_error) => error!(
                uid,
                error = %cause,
                rollback_error = %rollback_error,
                "student link failed and profile could not be removed"
            ),
        }
    }
}

// ── GetFullProfile ───────────────────────────────────────────────────────────

/// A user profile joined with its linked student record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullProfile {
    pub uid: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "emailVerified")]
    pub email_verified: bool,
    #[serde(rename = "createdAt", serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    pub student_code: String,
    pub name: String,
    pub major: Option<String>,
    pub semester: Option<u32>,
    pub gpa: Option<f64>,
}

pub struct GetFullProfileUseCase<S: DocumentStore> {
    pub users: Collection<S, User>,
    pub students: Collection<S, Student>,
}

impl<S: DocumentStore> GetFullProfileUseCase<S> {
    pub async fn execute(&self, uid: &str) -> Result<FullProfile, RegistryError> {
        let user = self.users.get(uid).await?.record;
        let student = self.students.get(&user.student_code).await?.record;
        Ok(FullProfile {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            email_verified: user.email_verified,
            created_at: user.created_at,
            student_code: student.student_code,
            name: student.name,
            major: student.major,
            semester: student.semester,
            gpa: student.gpa,
        })
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileInput {
    pub display_name: String,
}

/// Only the display name of a profile can be changed by its owner.
pub struct UpdateProfileUseCase<S: DocumentStore> {
    pub users: Collection<S, User>,
}

impl<S: DocumentStore> UpdateProfileUseCase<S> {
    pub async fn execute(
        &self,
        uid: &str,
        input: UpdateProfileInput,
    ) -> Result<Profile, RegistryError> {
        let display_name = input.display_name.trim();
        if display_name.is_empty() {
            return Err(RegistryError::validation("displayName is required"));
        }
        let mut changes = Document::new();
        changes.insert("displayName".to_owned(), Value::from(display_name));
        changes.insert(
            "updatedAt".to_owned(),
            Value::from(format_rfc3339_ms(&now_ms())),
        );
        let updated = self.users.update(uid, changes).await?;
        Ok(updated.record.into())
    }
}
