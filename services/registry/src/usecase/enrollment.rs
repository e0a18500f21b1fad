use std::collections::HashMap;

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::domain::collection::Collection;
use crate::domain::store::DocumentStore;
use crate::domain::types::{Course, EnrichedCourse, Enrollment, UNKNOWN_ENROLLMENT_TYPE};
use crate::error::RegistryError;

struct EnrollmentMeta {
    kind: Option<String>,
    rating: Option<f64>,
}

/// Lists the courses a student is enrolled in, each annotated with the
/// enrollment's `type` and `rating`.
pub struct GetCoursesOfStudentUseCase<S: DocumentStore> {
    pub enrollments: Collection<S, Enrollment>,
    pub courses: Collection<S, Course>,
}

impl<S: DocumentStore> GetCoursesOfStudentUseCase<S> {
    pub async fn execute(&self, student_id: &str) -> Result<Vec<EnrichedCourse>, RegistryError> {
        let student_id = student_id.trim();
        if student_id.is_empty() {
            return Err(RegistryError::validation("student_id is required"));
        }

        let enrollments = self.enrollments.find_by("student_id", student_id).await?;

        // First enrollment per course wins; order follows the query result.
        let mut course_ids: Vec<String> = Vec::new();
        let mut meta: HashMap<String, EnrollmentMeta> = HashMap::new();
        for enrollment in enrollments.into_iter().map(|e| e.record) {
            if meta.contains_key(&enrollment.course_id) {
                continue;
            }
            course_ids.push(enrollment.course_id.clone());
            meta.insert(
                enrollment.course_id,
                EnrollmentMeta {
                    kind: enrollment.kind,
                    rating: enrollment.rating,
                },
            );
        }

        let fetched = try_join_all(course_ids.iter().map(|id| self.courses.find(id))).await?;

        let mut result = Vec::with_capacity(fetched.len());
        for (course_id, course) in course_ids.iter().zip(fetched) {
            let Some(stored) = course else {
                warn!(
                    student_id,
                    course_id = course_id.as_str(),
                    "enrollment references a missing course"
                );
                continue;
            };
            let meta = meta.remove(course_id.as_str());
            let (kind, rating) = meta.map(|m| (m.kind, m.rating)).unwrap_or_default();
            let mut course = stored.record;
            // Enrollment metadata replaces any same-named course field.
            course.extra.remove("type");
            course.extra.remove("rating");
            result.push(EnrichedCourse {
                id: stored.id,
                course,
                kind: kind
                    .filter(|k| !k.is_empty())
                    .unwrap_or_else(|| UNKNOWN_ENROLLMENT_TYPE.to_owned()),
                rating,
            });
        }
        debug!(student_id, count = result.len(), "courses of student resolved");
        Ok(result)
    }
}
