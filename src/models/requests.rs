//! Request DTOs
//!
//! Outbound request bodies. Inbound bodies are schema-checked by the
//! validator rather than deserialized directly.

use serde::Serialize;

use crate::geo::PointSet;

/// Body of `POST /process` and `POST /geo/process`
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest<'a> {
    pub points: &'a PointSet,
}
