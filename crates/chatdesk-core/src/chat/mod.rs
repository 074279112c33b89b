//! Conversation aggregation.
//!
//! `ChatStore` is the persistence port. `ConversationAccumulator` appends
//! text exchanges, `HistoryMerger` reassembles text and voice into one
//! timeline, and `ChatProjection` serves list and admin views.

pub mod accumulator;
pub mod history;
pub mod projection;
pub mod service;
pub mod store;
pub mod timestamp;
