//! `GET|PATCH|DELETE /users/:id` over a canned user record.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use waypoint::core::{ErrorEnvelope, ErrorKind};
use waypoint::prelude::*;

use super::now_iso;

/// Id the lookup treats as missing.
pub const MISSING_USER_ID: &str = "404";

const DEFAULT_NAME: &str = "John Doe";
const DEFAULT_EMAIL: &str = "john@example.com";
const FIXED_CREATED_AT: &str = "2024-01-01T00:00:00Z";

#[derive(Debug, Deserialize)]
struct UserParams {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateUser {
    name: Option<String>,
    email: Option<String>,
}

/// User record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Path id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Creation time, RFC 3339.
    pub created_at: String,
}

/// The `/users/:id` route.
pub fn route() -> RouteDefinition {
    let params =
        || Shape::object().field("id", Shape::string().min_len(1).message("User ID is required"));

    RouteDefinition::new("/users/:id")
        .get(
            MethodDefinition::new(get_user)
                .schema(RequestSchema::new().params(params()))
                .summary("Get user by ID")
                .description("Retrieve a specific user by their unique identifier")
                .tag("users"),
        )
        .patch(
            MethodDefinition::new(update_user)
                .schema(
                    RequestSchema::new().params(params()).body(
                        Shape::object()
                            .optional("name", Shape::string().min_len(1))
                            .optional("email", Shape::string().email()),
                    ),
                )
                .summary("Update user")
                .description("Partially update a user by ID")
                .tag("users"),
        )
        .delete(
            MethodDefinition::new(delete_user)
                .schema(RequestSchema::new().params(params()))
                .summary("Delete user")
                .description("Remove a user by ID")
                .tag("users"),
        )
}

async fn get_user(ctx: RequestContext) -> Result<Response, HandlerError> {
    let UserParams { id } = ctx.params_as()?;

    if id == MISSING_USER_ID {
        tracing::debug!(user_id = %id, "user not found");
        return Ok(response::json(
            StatusCode::NOT_FOUND,
            &ErrorEnvelope {
                error: "Not Found".to_string(),
                message: format!("User with ID {id} not found"),
                kind: ErrorKind::NotFound,
                details: None,
            },
        ));
    }

    Ok(response::ok(&User {
        id,
        name: DEFAULT_NAME.to_string(),
        email: DEFAULT_EMAIL.to_string(),
        created_at: now_iso(),
    }))
}

async fn update_user(ctx: RequestContext) -> Result<Response, HandlerError> {
    let UserParams { id } = ctx.params_as()?;
    let updates: UpdateUser = ctx.json_as()?;

    tracing::info!(user_id = %id, "updating user");

    Ok(response::ok(&User {
        id,
        name: updates.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        email: updates.email.unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
        created_at: FIXED_CREATED_AT.to_string(),
    }))
}

async fn delete_user(ctx: RequestContext) -> Result<Response, HandlerError> {
    let UserParams { id } = ctx.params_as()?;
    tracing::info!(user_id = %id, "deleting user");
    Ok(response::no_content())
}
