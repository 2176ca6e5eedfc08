//! Conversation domain.
//!
//! - [`entities::Message`]: a single message sent to or received from a model

pub mod entities;
