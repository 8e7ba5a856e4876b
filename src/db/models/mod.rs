#![allow(unused_imports)]

//! Database models split into separate files.
//! This module re-exports individual model modules so imports like
//! `use crate::db::models::*;` keep working.

pub mod day_log;
pub mod last_used_issue;
pub mod settings;
pub mod ticket_memory;

pub use self::day_log::*;
pub use self::last_used_issue::*;
pub use self::settings::*;
pub use self::ticket_memory::*;
