//! HTTP table client for the Taskpad remote backend
//!
//! Implements the core [`TaskTables`](taskpad_core::table::TaskTables)
//! surface over a PostgREST-style endpoint: one route per table, filters in
//! the query string, inserted rows echoed back with
//! `Prefer: return=representation`.

mod client;
mod config;

pub use client::RestTables;
pub use config::RestConfig;
