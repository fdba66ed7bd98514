//! # argus-core
//!
//! Shared vocabulary for the Argus burst tripwire: contract events, alerts,
//! clocks and the inbound event bus.
//!
//! ### Key Submodules:
//! - `events`: `ChainEvent` plus the bounded multi-producer `EventBus`
//! - `alert`: alert levels, channels and messages sent to notification sinks
//! - `time`: `Clock` trait with wall-clock and manual implementations
//! - `address`: EVM address/topic format checks and display helpers

pub mod address;
pub mod alert;
pub mod events;
pub mod time;

pub mod prelude {
    pub use crate::alert::*;
    pub use crate::events::*;
    pub use crate::time::*;
}

pub use alert::{Alert, AlertLevel};
pub use events::{ChainEvent, EventBus, EventError, EventOrigin};
pub use time::{Clock, ManualClock, SystemClock};
