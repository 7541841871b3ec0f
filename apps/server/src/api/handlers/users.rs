//! User endpoints
//!
//! Nothing is stored; the handler shows bind + validate + envelope.

use axum::response::Response;
use serde::{Deserialize, Serialize};
use strata_context::{Context, Payload, Result};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(
        min = 1,
        max = 64,
        message = "Name must be between 1 and 64 characters"
    ))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(range(min = 13, max = 150, message = "Age must be between 13 and 150"))]
    pub age: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: Option<u8>,
}

/// Create a user (POST /api/users)
///
/// Accepts JSON or form bodies. Bind and validation failures are answered
/// with the error envelope.
pub async fn create_user(mut ctx: Context) -> Result<Response> {
    let input = match ctx.bind_validate::<CreateUser>().await {
        Ok(input) => input,
        Err(err) => return ctx.ret_error(err, None),
    };

    let user = UserView {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        email: input.email,
        age: input.age,
    };
    tracing::info!(user_id = %user.id, "User created");

    ctx.ret_data(Payload::replace(user)?)
}
