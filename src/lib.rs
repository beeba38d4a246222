//! Sortera is a small REST backend for a municipal waste sorting guide.
//!
//! It serves read-only JSON endpoints over four datasets: waste categories,
//! waste items, pickup schedules, and dropbox locations. Every response is
//! wrapped in a uniform envelope so clients can branch on `success` without
//! inspecting HTTP details.
//!
//! The crate is layered the usual way:
//!
//! - [`config`] loads settings from files, environment, and CLI flags.
//! - [`domain`] holds the plain record types the API serves.
//! - [`application`] owns request parameter handling, the response envelope,
//!   the API failure type, and the repository traits.
//! - [`infra`] provides the Postgres repositories, the HTTP router, and
//!   telemetry bootstrap.
//! - [`cache`] is a process-local TTL cache for GET responses.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
