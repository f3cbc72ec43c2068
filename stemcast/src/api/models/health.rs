use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness greeting returned from `GET /`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Greeting {
    /// Fixed banner identifying the service
    #[schema(example = "Arrr! The stemcast backend be runnin'!")]
    pub message: String,
}

impl Greeting {
    pub fn banner() -> Self {
        Self {
            message: "Arrr! The stemcast backend be runnin'!".to_string(),
        }
    }
}
