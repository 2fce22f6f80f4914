//! Attachment lifecycle operations
//!
//! Business logic for attaching devices to animals, detaching them, and
//! correcting the data-life window of an attachment.

pub mod error;
pub mod history;
pub mod input;
pub mod locks;
pub mod manager;
pub mod policy;

pub use error::{AttachmentError, AttachmentResult, ErrorCategory};
pub use history::HistoryQuery;
pub use input::{AttachInput, DetachInput, EditDataLifeInput, HistoryInput};
pub use manager::AttachmentManager;
pub use policy::{MutationPolicy, MutationRights};
