use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use campus_auth_types::identity::IdentityHeaders;

use crate::error::RegistryError;
use crate::state::AppState;
use crate::usecase::profile::{
    FullProfile, GetFullProfileUseCase, Identity, Profile, RegisterOutcome,
    RegisterProfileInput, RegisterProfileUseCase, UpdateProfileInput, UpdateProfileUseCase,
};

fn identity_of(headers: IdentityHeaders) -> Identity {
    Identity {
        uid: headers.uid,
        email: headers.email,
        email_verified: headers.email_verified,
    }
}

// ── POST /api/auth/register ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub student_code: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub profile: Profile,
}

pub async fn register(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, RegistryError> {
    let usecase = RegisterProfileUseCase {
        users: state.users(),
        students: state.students(),
    };
    let registered = usecase
        .execute(RegisterProfileInput {
            identity: identity_of(identity),
            student_code: body.student_code.unwrap_or_default(),
            display_name: body.display_name.unwrap_or_default(),
        })
        .await?;

    let (status, message) = match registered.outcome {
        RegisterOutcome::Created => (StatusCode::CREATED, "Profile created successfully"),
        RegisterOutcome::AlreadyExists => (StatusCode::OK, "Profile already exists"),
    };
    let body = RegisterResponse {
        message,
        profile: registered.profile,
    };
    Ok((status, Json(body)).into_response())
}

// ── GET /api/profile/me ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProfileResponse<P> {
    pub message: &'static str,
    pub profile: P,
}

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse<FullProfile>>, RegistryError> {
    let usecase = GetFullProfileUseCase {
        users: state.users(),
        students: state.students(),
    };
    let profile = usecase.execute(&identity.uid).await?;
    Ok(Json(ProfileResponse {
        message: "Profile retrieved successfully",
        profile,
    }))
}

// ── PUT /api/profile/me ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

pub async fn update_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse<Profile>>, RegistryError> {
    let usecase = UpdateProfileUseCase {
        users: state.users(),
    };
    let profile = usecase
        .execute(
            &identity.uid,
            UpdateProfileInput {
                display_name: body.display_name.unwrap_or_default(),
            },
        )
        .await?;
    Ok(Json(ProfileResponse {
        message: "Profile updated successfully",
        profile,
    }))
}
