//! linehook core library: LINE webhook verification, event dispatch, reply
//! client and the HTTP server used by the CLI.

pub mod config;
pub mod dispatch;
pub mod init;
pub mod line;
pub mod server;
pub mod webhook;
