pub mod chat;
pub mod completion;
pub mod persona;
pub mod retry;
pub mod session;
