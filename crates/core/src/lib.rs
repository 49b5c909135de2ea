// Core types for the mps audio player: state, media handle, poller, controller

pub mod callback;
pub mod controller;
pub mod error;
pub mod media;
pub mod poller;
pub mod seek;
pub mod sim;
pub mod speed;
pub mod state;

// Re-export commonly used types
pub use callback::{Delivery, ListenerRegistry, PendingEvents, PlayerEvent, PlayerListener};
pub use controller::{PlayerController, MAX_VOLUME};
pub use error::{PlayerError, Result};
pub use media::{MediaHandle, PlaybackPrimitive};
pub use poller::{PollerTask, PositionPoller, TickOutcome, DEFAULT_POLL_INTERVAL};
pub use seek::SeekEncoding;
pub use sim::SimulatedPrimitive;
pub use speed::PlaybackSpeed;
pub use state::{Anchor, PlayerState, PresentationMode};
