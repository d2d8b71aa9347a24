use crate::application::countdown::format_span;
use crate::application::date_resolver::{DateResolver, NowProvider};
use crate::domain::models::{ReminderPolicy, Reservation, ReservationType};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::reminder_store::ReminderHandleRepository;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

/// One local notification to be scheduled at a UTC instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub entity_id: String,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

/// Port onto the OS-level notification service. Returns an opaque handle
/// on schedule; cancelling an already-fired or missing handle is allowed
/// to fail and callers treat that as a non-error.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn schedule(&self, request: &ReminderRequest) -> Result<String, InfraError>;
    async fn cancel(&self, handle: &str) -> Result<(), InfraError>;
}

/// Keeps at most one live reminder set per entity.
///
/// Every reschedule is cancel-then-create: tear down whatever handle list
/// is stored for the entity, then compute and schedule a fresh set and
/// persist the new handles. Reschedules for the same entity are serialized
/// through a per-entity async mutex so two rapid update events cannot
/// interleave and orphan handles; distinct entities proceed in parallel.
/// Individual notification failures are logged and skipped, never fatal:
/// a partially populated set is an accepted outcome.
pub struct ReminderScheduler<N, R>
where
    N: NotificationScheduler,
    R: ReminderHandleRepository,
{
    notifier: Arc<N>,
    handle_repository: Arc<R>,
    resolver: Arc<DateResolver>,
    policy: ReminderPolicy,
    now_provider: NowProvider,
    entity_locks: AsyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<N, R> ReminderScheduler<N, R>
where
    N: NotificationScheduler,
    R: ReminderHandleRepository,
{
    pub fn new(notifier: Arc<N>, handle_repository: Arc<R>, resolver: Arc<DateResolver>) -> Self {
        Self {
            notifier,
            handle_repository,
            resolver,
            policy: ReminderPolicy::default(),
            now_provider: Arc::new(Utc::now),
            entity_locks: AsyncMutex::new(HashMap::new()),
        }
    }

    pub fn with_policy(mut self, policy: ReminderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    /// Replace the entity's reminder set with one computed from its current
    /// timing. Idempotent: calling it any number of times leaves exactly
    /// the reminders of the last call active.
    pub async fn reschedule(&self, reservation: &Reservation) -> Result<(), InfraError> {
        let lock = self.entity_lock(&reservation.id).await;
        let _guard = lock.lock().await;

        self.teardown(&reservation.id).await?;

        let mut handles = Vec::new();
        for request in self.compute_schedule(reservation) {
            match self.notifier.schedule(&request).await {
                Ok(handle) => handles.push(handle),
                Err(error) => {
                    tracing::warn!(
                        entity_id = %reservation.id,
                        fire_at = %request.fire_at,
                        %error,
                        "failed to schedule reminder; continuing with partial set"
                    );
                }
            }
        }
        self.handle_repository.save(&reservation.id, &handles)?;
        Ok(())
    }

    /// Cancel and forget the entity's reminder set. Must run before the
    /// owning record is deleted, or the stored handles can no longer be
    /// resolved back to content. Also drops the entity's serialization
    /// lock once no other task is waiting on it, so the lock map does not
    /// grow with every deleted entity.
    pub async fn cancel_all(&self, entity_id: &str) -> Result<(), InfraError> {
        let lock = self.entity_lock(entity_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.teardown(entity_id).await
        };
        self.release_entity_lock(entity_id, &lock).await;
        result
    }

    /// The reminder set this entity should currently have, ignoring what is
    /// already scheduled. Only instants still in the future make the cut,
    /// so a past-due start yields an empty schedule.
    pub fn compute_schedule(&self, reservation: &Reservation) -> Vec<ReminderRequest> {
        let now = (self.now_provider)();
        let start = self
            .resolver
            .resolve_utc(
                &reservation.start_at,
                reservation.start_offset(),
                reservation.start_location_code(),
            )
            .instant();

        self.policy
            .lead_minutes_for(reservation.reservation_type)
            .iter()
            .filter_map(|lead_minutes| {
                let fire_at = start - Duration::minutes(*lead_minutes);
                if fire_at <= now {
                    return None;
                }
                Some(ReminderRequest {
                    entity_id: reservation.id.clone(),
                    fire_at,
                    title: reminder_title(reservation),
                    body: format!("Coming up in {}", format_span(*lead_minutes)),
                })
            })
            .collect()
    }

    async fn teardown(&self, entity_id: &str) -> Result<(), InfraError> {
        let previous = self.handle_repository.load(entity_id)?;
        for handle in &previous {
            if let Err(error) = self.notifier.cancel(handle).await {
                // Already fired or never existed; nothing left to cancel.
                tracing::warn!(entity_id, handle = %handle, %error, "failed to cancel reminder");
            }
        }
        self.handle_repository.clear(entity_id)?;
        Ok(())
    }

    async fn entity_lock(&self, entity_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.entity_locks.lock().await;
        locks
            .entry(entity_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    async fn release_entity_lock(&self, entity_id: &str, lock: &Arc<AsyncMutex<()>>) {
        let mut locks = self.entity_locks.lock().await;
        // Two owners means the map entry and our clone; anyone mid-flight
        // on this entity holds a third, and then the entry must stay.
        if Arc::strong_count(lock) == 2 {
            locks.remove(entity_id);
        }
    }
}

fn reminder_title(reservation: &Reservation) -> String {
    match reservation.reservation_type {
        ReservationType::Flight => match reservation.snapshot() {
            Some(snapshot) => format!(
                "Flight {} {}",
                snapshot.carrier_code, snapshot.flight_number
            ),
            None => "Upcoming flight".to_string(),
        },
        ReservationType::Hotel => "Hotel check-in".to_string(),
        ReservationType::Car => "Car pickup".to_string(),
        ReservationType::Train => "Train departure".to_string(),
        ReservationType::Meeting => "Meeting".to_string(),
        ReservationType::Event => "Event".to_string(),
    }
}
