//! Open House registration server.
//!
//! Wires the engines from `openhouse-core` to `PostgreSQL` and HTTP:
//!
//! - [`config`]: environment configuration and production checks
//! - [`auth`]: the [`auth::AuthenticatedUser`] extractor
//! - [`api`]: route handlers
//! - [`server`]: application state, router, graceful shutdown
//! - [`cli`]: the `openhouse` command line

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod server;
