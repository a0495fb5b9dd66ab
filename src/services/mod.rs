pub mod chat;
pub mod failure_sink;
pub mod identity;
pub mod messaging;
pub mod session_sweeper;
