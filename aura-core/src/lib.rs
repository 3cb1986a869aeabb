//! # aura-core
//!
//! Gesture arbitration for hand / face landmarks and voice transcripts.
//!
//! ## Architecture
//!
//! ```text
//! hand tracker ─┐                                   ┌─► GestureChangedEvent
//! face tracker ─┼─► InputSink ─► Pipeline(spawn_blocking)
//! speech       ─┘                    │              ├─► LogEvent / ClickEvent / AmbientEvent
//!                           InteractionSession      │
//!               HandInterpreter · EarBlinkDetector  └─► SceneSnapshot (RwLock)
//!               ObjectRegistry · PriorityResolver
//!               CommandDispatcher · ClickArbiter
//! ```
//!
//! The session is the single writer of interaction state. Producers never
//! block and the core never waits on them.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod click;
pub mod commands;
pub mod engine;
pub mod error;
pub mod face;
pub mod geometry;
pub mod hand;
pub mod ipc;
pub mod landmarks;
pub mod objects;
pub mod priority;
pub mod timer;

// Convenience re-exports for downstream crates
pub use click::{ClickArbiter, ClickConfig, ClickSource, ClickState};
pub use commands::{CommandDispatcher, DispatchOutcome, VoiceCommand, VoiceConfig};
pub use engine::{AuraEngine, EngineConfig, EngineInput, InputSink, InteractionSession};
pub use error::{AuraError, Result};
pub use face::{BlinkConfig, BlinkDetector, BlinkReading, EarBlinkDetector};
pub use geometry::Vec3;
pub use hand::{HandInterpreter, HandState, HandThresholds, SwipeDirection};
pub use ipc::events::{
    AmbientEvent, Capability, ClickEvent, EngineStatus, EngineStatusEvent, GestureChangedEvent,
    LogEvent, SceneSnapshot,
};
pub use landmarks::{FaceFrame, HandFrame, HandLandmarks, Landmark};
pub use objects::{InteractiveObject, ObjectConfig, ObjectId, ObjectRegistry, Viewport};
pub use priority::{GesturePriorityResolver, GestureType};
