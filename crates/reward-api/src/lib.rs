//! Event reward service: HTTP surface, configuration, mock delegate platform.

pub mod config;
pub mod mock_platform;
pub mod server;
