//! Millguard domain logic.
//!
//! Everything in this crate is pure: no I/O, no clocks. Callers pass `now`
//! in explicitly so the time-based rules can be tested deterministically.

pub mod channels;
pub mod classification;
pub mod error;
pub mod fault;
pub mod notification;
pub mod reading;
pub mod schedule;
pub mod types;
