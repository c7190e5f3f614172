//! `GET|POST /simple/:id?`, both tracked by `request_track`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use waypoint::prelude::*;
use waypoint::schema::ObjectShape;

#[derive(Debug, Deserialize)]
struct SimpleParams {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    text: String,
    priority: String,
}

/// Payload of `GET /simple/:id?`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleStatus {
    /// Fixed description.
    pub message: &'static str,
    /// When tracking ran.
    pub timestamp: DateTime<Utc>,
    /// Count for this endpoint including this request.
    pub request_count: u64,
    /// Always `"active"`.
    pub status: &'static str,
    /// Echoed path id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Payload of `POST /simple/:id?`.
#[derive(Debug, Serialize)]
pub struct MessageEcho {
    /// The submitted text.
    pub received: String,
    /// `You said: "<text>" (Request #<n>)`.
    pub echo: String,
    /// Length of the text in characters.
    pub length: usize,
    /// Submitted or defaulted priority.
    pub priority: String,
    /// When tracking ran.
    pub timestamp: DateTime<Utc>,
    /// Echoed path id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// The `/simple/:id?` route.
pub fn route() -> RouteDefinition {
    let params = || Shape::object().optional("id", Shape::string().min_len(1));

    RouteDefinition::new("/simple/:id?")
        .get(
            MethodDefinition::new(status)
                .schema(RequestSchema::new().params(params()))
                .middleware(["request_track"])
                .summary("Simple GET endpoint with tracking")
                .tag("simple"),
        )
        .post(
            MethodDefinition::new(echo)
                .schema(RequestSchema::new().params(params()).body(message_body()))
                .middleware(["request_track"])
                .summary("Echo message with tracking")
                .description("Accepts a message and echoes it back with metadata and tracking info")
                .tag("simple"),
        )
}

/// Body accepted by `POST /simple/:id?`.
pub fn message_body() -> ObjectShape {
    Shape::object()
        .field(
            "text",
            Shape::string().min_len(1).message("Message text is required"),
        )
        .with_default(
            "priority",
            Shape::enumeration(["low", "medium", "high"]),
            "medium",
        )
}

fn tracking(ctx: &RequestContext) -> Result<RequestTrack, HandlerError> {
    ctx.extension::<RequestTrack>()
        .cloned()
        .ok_or_else(|| HandlerError::new("request tracking did not run for this route"))
}

async fn status(ctx: RequestContext) -> Result<Response, HandlerError> {
    let track = tracking(&ctx)?;
    let params: SimpleParams = ctx.params_as()?;

    Ok(response::ok(&SimpleStatus {
        message: "Simple GET endpoint with tracking",
        timestamp: track.timestamp,
        request_count: track.request_count,
        status: "active",
        id: params.id,
    }))
}

async fn echo(ctx: RequestContext) -> Result<Response, HandlerError> {
    let track = tracking(&ctx)?;
    let params: SimpleParams = ctx.params_as()?;
    let body: MessageRequest = ctx.json_as()?;

    tracing::debug!(
        endpoint = %track.endpoint_id,
        priority = %body.priority,
        "echoing message"
    );

    Ok(response::created(&MessageEcho {
        echo: format!("You said: \"{}\" (Request #{})", body.text, track.request_count),
        length: body.text.chars().count(),
        received: body.text,
        priority: body.priority,
        timestamp: track.timestamp,
        id: params.id,
    }))
}
