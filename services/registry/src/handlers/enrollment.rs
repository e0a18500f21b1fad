use axum::{
    Json,
    extract::{Path, State},
};

use crate::domain::types::EnrichedCourse;
use crate::error::RegistryError;
use crate::state::AppState;
use crate::usecase::enrollment::GetCoursesOfStudentUseCase;

// ── GET /api/enrollments/student/{student_id} ────────────────────────────────

pub async fn get_courses_of_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<EnrichedCourse>>, RegistryError> {
    let usecase = GetCoursesOfStudentUseCase {
        enrollments: state.enrollments(),
        courses: state.courses(),
    };
    let courses = usecase.execute(&student_id).await?;
    Ok(Json(courses))
}
