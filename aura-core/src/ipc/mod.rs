//! Outbound types published to rendering / HUD collaborators.
//!
//! All types derive `serde::Serialize` + `serde::Deserialize` with camelCase
//! field names so the host can forward them as JSON unchanged.

pub mod events;
