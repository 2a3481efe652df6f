use serde::{Deserialize, Serialize};

/// Liveness payload returned by `/health`.
#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}
