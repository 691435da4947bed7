//! Message delivery for user notifications and replies.
//!
//! This crate provides:
//! - `Messenger` trait for the chat delivery collaborator
//! - Telegram Bot API implementation with inline keyboard actions

pub mod telegram;
pub mod traits;

pub use telegram::TelegramMessenger;
pub use traits::{Action, ActionTarget, Messenger, NotifyError};
