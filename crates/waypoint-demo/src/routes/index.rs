//! `GET /?name=`

use serde::{Deserialize, Serialize};
use waypoint::prelude::*;

use super::now_iso;

#[derive(Debug, Deserialize)]
struct WelcomeQuery {
    name: String,
}

/// Welcome payload.
#[derive(Debug, Serialize)]
pub struct Welcome {
    /// Greeting.
    pub message: String,
    /// Response time, RFC 3339.
    pub timestamp: String,
}

/// The `/` route.
pub fn route() -> RouteDefinition {
    RouteDefinition::new("/").get(
        MethodDefinition::new(welcome)
            .schema(
                RequestSchema::new()
                    .query(Shape::object().with_default("name", Shape::string(), "World")),
            )
            .summary("Welcome endpoint")
            .description("Returns a personalized welcome message with timestamp")
            .tag("welcome"),
    )
}

async fn welcome(ctx: RequestContext) -> Result<Response, HandlerError> {
    let query: WelcomeQuery = ctx.query_as()?;

    Ok(response::ok(&Welcome {
        message: format!("Hello, {}! Welcome to your Waypoint API", query.name),
        timestamp: now_iso(),
    }))
}
