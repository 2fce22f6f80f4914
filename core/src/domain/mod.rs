//! Core domain models for collar attachment history
//!
//! - Timestamp is the minute-precision instant every bound is expressed in
//! - Interval carries the containment / overlap arithmetic
//! - DataLifeWindow owns the nesting rule between attachment and data life
//! - Attachment is one stored device-on-animal period

pub mod attachment;
pub mod data_life;
pub mod interval;
pub mod role;
pub mod timestamp;

// Re-export commonly used types
pub use attachment::Attachment;
pub use data_life::{DataLifeBound, DataLifeWindow, UpperLimit, WindowError, WindowFields};
pub use interval::{clamp_to_outer, contains, overlaps, Interval};
pub use role::ActorRole;
pub use timestamp::{Timestamp, TimestampParseError};
