//! Audit event names, shared between request handlers and the worker.

pub const START: &str = "start";
pub const LIST: &str = "list";
pub const SEARCH: &str = "search";
pub const SUBSCRIBE: &str = "subscribe";
pub const UNSUBSCRIBE: &str = "unsubscribe";
pub const SUBSCRIPTION_FULFILLED: &str = "subscription_fulfilled";
pub const SUBSCRIPTION_EXPIRED: &str = "subscription_expired";
