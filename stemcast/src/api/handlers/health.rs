//! Liveness endpoint.

use axum::Json;

use crate::api::models::health::Greeting;

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    summary = "Liveness greeting",
    description = "Returns a fixed greeting proving the service is up.",
    responses(
        (status = 200, description = "Service is running", body = Greeting)
    )
)]
pub async fn greeting() -> Json<Greeting> {
    Json(Greeting::banner())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::api::models::health::Greeting;
    use crate::test_utils::{FixedOutputExtractor, create_test_app};

    #[tokio::test]
    async fn greeting_is_pinned() {
        let (server, _config, _root) = create_test_app(Arc::new(FixedOutputExtractor::default())).await;

        let response = server.get("/").await;

        response.assert_status_ok();
        let body: Greeting = response.json();
        assert_eq!(body.message, "Arrr! The stemcast backend be runnin'!");
    }
}
