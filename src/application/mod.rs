pub mod bootstrap;
pub mod countdown;
pub mod date_resolver;
pub mod day_boundary;
pub mod engine;
pub mod phase;
pub mod polling;
pub mod reminders;
