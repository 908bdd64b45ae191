use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "aku")]
    pub username: String,
    #[schema(example = "adalah")]
    pub password: String,
}

/// The session token handed out on login; sent back as `Bearer <token>`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: Uuid,
    pub username: String,
}
