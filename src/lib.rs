//! Pair comparison of irregularly traded instruments
//!
//! Parses daily exchange exports, joins two instruments on their shared
//! trading dates and derives rolling correlation, moving averages and ratio
//! trends, with Jalali display dates.

pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{AppError, Result};
