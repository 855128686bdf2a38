//! Command implementations that operate on the workspace directory itself.

pub mod init;
