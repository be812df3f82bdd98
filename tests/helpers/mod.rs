//! Test helpers module
//!
//! This module provides utilities and helpers for testing SchoolDesk:
//! a disposable Postgres database and fixture builders.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_data;

pub use database_helper::*;
pub use test_data::*;
