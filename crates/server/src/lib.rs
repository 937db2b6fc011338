//! Farm Report server library.
//!
//! Farm records owned by authenticated users, and yield reports that compare
//! every farm against the fleet-wide average yield. Exposed as a library so
//! the HTTP surface can be tested without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
