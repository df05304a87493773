// Public API - what other modules can use
pub use errors::GameError;
pub use models::{LeaveOutcome, PlayOutcome, Room, RoomStatus, Settings};
pub use registry::{RoomRegistry, SharedRoom};
pub use service::RoomService;
pub use timer::RoundTag;

pub mod errors;
pub mod models;
pub mod projection;
pub mod registry;
mod service;
pub mod timer;
