//! Autonomous creature sprites for a page-flipping book viewer
//!
//! This crate implements:
//! - Wander + biased-seek steering that carries sprites edge-to-edge
//!   across visible page surfaces
//! - Timed spawn bursts with per-surface capacity and despawn scheduling
//! - A persistent surface registry that survives page turns, reparenting
//!   and transient zero-size geometry
//! - A `PageStage` trait decoupling the engine from whatever hosts the
//!   pages (a real DOM, the demo book, a test double)

pub mod agent;
pub mod animation;
pub mod assets;
pub mod config;
pub mod demo;
pub mod engine;
pub mod lifecycle;
pub mod registry;
pub mod route;
pub mod stage;
pub mod visibility;

// Re-export main types for convenience
pub use agent::{Agent, AgentId};
pub use config::BugConfig;
pub use demo::DemoBook;
pub use engine::Engine;
pub use registry::{Surface, SurfaceRegistry};
pub use route::{Edge, Route};
pub use stage::{OverlayId, PageId, PageStage, Rect, SpriteId, StageEvent};
