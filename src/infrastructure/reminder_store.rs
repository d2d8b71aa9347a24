use crate::infrastructure::error::InfraError;
use rusqlite::{Connection, params};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persisted mapping from entity id (reservation or trip) to the list of
/// notification handles currently scheduled for it. Durable across process
/// restarts; at most one list per entity.
pub trait ReminderHandleRepository: Send + Sync {
    fn load(&self, entity_id: &str) -> Result<Vec<String>, InfraError>;
    fn save(&self, entity_id: &str, handles: &[String]) -> Result<(), InfraError>;
    fn clear(&self, entity_id: &str) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct SqliteReminderHandleRepository {
    db_path: PathBuf,
}

impl SqliteReminderHandleRepository {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, InfraError> {
        Connection::open(&self.db_path).map_err(InfraError::from)
    }
}

impl ReminderHandleRepository for SqliteReminderHandleRepository {
    fn load(&self, entity_id: &str) -> Result<Vec<String>, InfraError> {
        let connection = self.connect()?;
        let mut statement = connection.prepare(
            "SELECT handle FROM reminder_handles WHERE entity_id = ?1 ORDER BY position",
        )?;
        let handles = statement
            .query_map(params![entity_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(handles)
    }

    fn save(&self, entity_id: &str, handles: &[String]) -> Result<(), InfraError> {
        let mut connection = self.connect()?;
        let transaction = connection.transaction()?;
        transaction.execute(
            "DELETE FROM reminder_handles WHERE entity_id = ?1",
            params![entity_id],
        )?;
        for (position, handle) in handles.iter().enumerate() {
            transaction.execute(
                "INSERT INTO reminder_handles (entity_id, handle, position)
                 VALUES (?1, ?2, ?3)",
                params![entity_id, handle, position as i64],
            )?;
        }
        transaction.commit()?;
        Ok(())
    }

    fn clear(&self, entity_id: &str) -> Result<(), InfraError> {
        let connection = self.connect()?;
        connection.execute(
            "DELETE FROM reminder_handles WHERE entity_id = ?1",
            params![entity_id],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryReminderHandleRepository {
    handles: Mutex<HashMap<String, Vec<String>>>,
}

impl ReminderHandleRepository for InMemoryReminderHandleRepository {
    fn load(&self, entity_id: &str) -> Result<Vec<String>, InfraError> {
        let handles = self.handles.lock().map_err(|error| {
            InfraError::InvalidConfig(format!("reminder handle lock poisoned: {error}"))
        })?;
        Ok(handles.get(entity_id).cloned().unwrap_or_default())
    }

    fn save(&self, entity_id: &str, new_handles: &[String]) -> Result<(), InfraError> {
        let mut handles = self.handles.lock().map_err(|error| {
            InfraError::InvalidConfig(format!("reminder handle lock poisoned: {error}"))
        })?;
        handles.insert(entity_id.to_string(), new_handles.to_vec());
        Ok(())
    }

    fn clear(&self, entity_id: &str) -> Result<(), InfraError> {
        let mut handles = self.handles.lock().map_err(|error| {
            InfraError::InvalidConfig(format!("reminder handle lock poisoned: {error}"))
        })?;
        handles.remove(entity_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::initialize_database;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_WORKSPACE: AtomicUsize = AtomicUsize::new(0);

    struct TempWorkspace {
        path: PathBuf,
    }

    impl TempWorkspace {
        fn new() -> Self {
            let sequence = NEXT_TEMP_WORKSPACE.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "wayfare-reminder-store-tests-{}-{}",
                std::process::id(),
                sequence
            ));
            fs::create_dir_all(&path).expect("create temp workspace");
            Self { path }
        }

        fn database(&self) -> PathBuf {
            let db_path = self.path.join("wayfare.sqlite");
            initialize_database(&db_path).expect("initialize database");
            db_path
        }
    }

    impl Drop for TempWorkspace {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn sqlite_repository_persists_across_connections() {
        let workspace = TempWorkspace::new();
        let db_path = workspace.database();

        let repository = SqliteReminderHandleRepository::new(&db_path);
        assert!(repository.load("res-1").expect("load").is_empty());

        repository
            .save("res-1", &["h-1".to_string(), "h-2".to_string()])
            .expect("save first set");
        repository
            .save("res-1", &["h-3".to_string(), "h-4".to_string()])
            .expect("save second set");

        // A fresh repository over the same file sees the replacement set
        // in insertion order.
        let reopened = SqliteReminderHandleRepository::new(&db_path);
        assert_eq!(
            reopened.load("res-1").expect("load"),
            vec!["h-3".to_string(), "h-4".to_string()]
        );

        reopened.clear("res-1").expect("clear");
        assert!(repository.load("res-1").expect("load").is_empty());
    }

    #[test]
    fn sqlite_repository_isolates_entities() {
        let workspace = TempWorkspace::new();
        let repository = SqliteReminderHandleRepository::new(workspace.database());

        repository
            .save("res-1", &["h-1".to_string()])
            .expect("save res-1");
        repository
            .save("trip-9", &["h-2".to_string()])
            .expect("save trip-9");

        repository.clear("res-1").expect("clear res-1");
        assert_eq!(
            repository.load("trip-9").expect("load"),
            vec!["h-2".to_string()]
        );
    }

    #[test]
    fn in_memory_repository_replaces_lists_wholesale() {
        let repository = InMemoryReminderHandleRepository::default();
        assert!(repository.load("res-1").expect("load").is_empty());

        repository
            .save("res-1", &["h-1".to_string(), "h-2".to_string()])
            .expect("save first set");
        repository
            .save("res-1", &["h-3".to_string()])
            .expect("save second set");

        assert_eq!(repository.load("res-1").expect("load"), vec!["h-3".to_string()]);

        repository.clear("res-1").expect("clear");
        assert!(repository.load("res-1").expect("load").is_empty());
    }

    #[test]
    fn entities_are_isolated_from_each_other() {
        let repository = InMemoryReminderHandleRepository::default();
        repository
            .save("res-1", &["h-1".to_string()])
            .expect("save res-1");
        repository
            .save("trip-9", &["h-2".to_string()])
            .expect("save trip-9");

        repository.clear("res-1").expect("clear res-1");
        assert_eq!(
            repository.load("trip-9").expect("load"),
            vec!["h-2".to_string()]
        );
    }
}
