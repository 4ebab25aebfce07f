//! # Matchpoint
//!
//! Tournament phase-progression and scheduling engine for doubles tournaments.
//!
//! This crate takes a pool of registered doubles teams and produces balanced,
//! time-compatible groups ("zones"), a round-robin fixture assigning every
//! match to a concrete date/time/court, standings computed from confirmed
//! results, and a single-elimination bracket (with automatic byes) seeded
//! from those standings.
//!
//! ## Features
//!
//! - **Availability**: normalize per-team forbidden windows into bookable
//!   slot sets over the tournament calendar
//! - **Zone Building**: partition confirmed teams into balanced groups,
//!   maximizing time compatibility and rating parity
//! - **Slot Allocation**: deterministic greedy placement of every group
//!   match under court-occupancy and minimum-rest constraints
//! - **Standings & Brackets**: ranked tables per zone and a knockout tree
//!   with explicit bye propagation
//! - **HTTP API**: RESTful endpoints via Axum for the rest of the system
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: identifier newtypes and re-exported data types
//! - [`models`]: tournament, team, calendar and fixture domain types
//! - [`engine`]: the scheduling computations and the engine facade
//! - [`db`]: repository pattern and persistence layer
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Concurrency
//!
//! Scheduling operations are synchronous, whole-dataset transformations.
//! The engine serializes operations per tournament; operations on different
//! tournaments run independently.

pub mod api;

pub mod config;
pub mod db;
pub mod models;

pub mod engine;

#[cfg(feature = "http-server")]
pub mod http;
