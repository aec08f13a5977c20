//! Daily task timer. Time is logged per named task for each calendar day, only one timer runs at a
//! time, and days or weeks can be summarized into productive time, screen time and completion
//! rate.
//!

pub mod auth;
pub mod cli;
pub mod history;
pub mod session;
pub mod storage;
pub mod summary;
pub mod tasks;
pub mod timer;
pub mod utils;
