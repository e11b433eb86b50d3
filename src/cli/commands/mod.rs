//! Command implementations.

pub mod board;
pub mod create;
pub mod init;
pub mod list;
pub mod move_issue;
pub mod update;
