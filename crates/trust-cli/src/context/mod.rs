mod app_context;

pub use app_context::{AppContext, caller_from_flags};
