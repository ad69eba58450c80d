//! Measures how much time is spent on a user chosen list of websites. The browser extension
//! reports tab and idle events over native messaging, the host turns them into per day totals and
//! answers with badge and notification commands. A small cli manages tracked sites and prints the
//! collected totals.

pub mod browser_api;
pub mod cli;
pub mod daemon;
pub mod messaging;
pub mod utils;
