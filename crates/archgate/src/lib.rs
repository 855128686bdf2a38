//! Archgate - architecture governance core.
//!
//! Two pieces of real logic sit behind thin storage and CLI plumbing:
//!
//! - [`impact`]: bounded level-synchronous BFS over the dependency graph to
//!   compute the blast radius of a change
//! - [`workflow`]: the change-review state machine, which guards actions by
//!   role ([`authz`]), evaluates compliance rules ([`compliance`]) and commits
//!   status, checks and one audit event atomically
//!
//! Reference data and review state are reached through the traits in
//! [`storage`], so both can be tested against the in-memory backend.

#![forbid(unsafe_code)]

pub mod app;
pub mod authz;
pub mod cli;
pub mod commands;
pub mod compliance;
pub mod config;
pub mod domain;
pub mod dr;
pub mod error;
pub mod id_generation;
pub mod impact;
pub mod output;
pub mod storage;
pub mod workflow;
