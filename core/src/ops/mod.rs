//! Operations - business logic on top of the domain models

pub mod attachments;
