//! # provost
//!
//! Library surface of the Provost binary: the HTTP API router and the CLI
//! command implementations, exposed so integration tests can drive the
//! router without binding a socket.

pub mod api;
pub mod cli;
pub mod config;
