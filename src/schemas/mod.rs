use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod attempt;
pub(crate) mod invitation;
pub(crate) mod question;
pub(crate) mod quiz;
pub(crate) mod submission;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
}
