//! Wayfare itinerary temporal engine.
//!
//! The timezone-aware core of the Wayfare travel tracker: resolving
//! location-local timestamps to UTC instants, inferring a flight's
//! effective phase from noisy live-tracking snapshots, composing
//! countdowns and contextual time labels, classifying today/tomorrow in
//! the event's own timezone, choosing a live-status polling cadence, and
//! idempotently (re)scheduling local reminder notifications.
//!
//! Everything except the reminder scheduler is synchronous and pure; the
//! rendering layer polls the [`TravelEngine`] on each refresh.

mod application;
mod domain;
mod infrastructure;

pub use application::bootstrap::{BootstrapResult, bootstrap_workspace};
pub use application::countdown::{compose_countdown, compose_time_label};
pub use application::date_resolver::{
    DateResolver, NowProvider, ResolvedInstant, local_date, local_datetime, parse_offset_minutes,
};
pub use application::day_boundary::{is_local_date_today, is_today, is_tomorrow};
pub use application::engine::TravelEngine;
pub use application::phase::infer_phase;
pub use application::polling::polling_interval;
pub use application::reminders::{NotificationScheduler, ReminderRequest, ReminderScheduler};
pub use domain::models::{
    CountdownColor, CountdownResult, FlightPhase, FlightStatusSnapshot, ReminderPolicy,
    Reservation, ReservationDetails, ReservationStatus, ReservationType, TimeLabel,
};
pub use infrastructure::airport_zones::builtin_airport_zones;
pub use infrastructure::config::{
    ConfigBundle, ensure_default_configs, load_configs, read_reminder_policy, read_timezone,
};
pub use infrastructure::error::InfraError;
pub use infrastructure::reminder_store::{
    InMemoryReminderHandleRepository, ReminderHandleRepository, SqliteReminderHandleRepository,
};
