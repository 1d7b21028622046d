//! Motion tracker filtering and single-peer UDP relay
//!
//! - [`filter`]: sliding-window moving average with drift correction,
//!   velocity, debounced motion state and reference-area containment.
//! - [`session`]: connect/disconnect/ping handshake and bounded-retry
//!   sends over one non-blocking UDP socket.
//! - [`relay`]: the tick loop composing the two.

pub mod common;
pub mod config;
pub mod error;
pub mod filter;
pub mod relay;
pub mod sensors;
pub mod session;

pub use crate::config::AppConfig;
pub use crate::error::{Error, Result};
pub use crate::filter::SensorHistory;
pub use crate::relay::{TelemetryRelay, TickReport};
pub use crate::session::{Token, UdpChannel};
