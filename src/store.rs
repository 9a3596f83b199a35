use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::error::StoreError;
use crate::models::{ApplicationRecord, ApplicationStatus, Deadline, NewApplication};

/// In-memory owner of every application record.
///
/// Callers get copies; the only way to change a record is through the
/// methods here.
#[derive(Debug, Default)]
pub struct ApplicationStore {
    records: Vec<ApplicationRecord>,
    last_id: i64,
    overflow_seq: u64,
}

impl ApplicationStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_sample_data() -> Self {
        let sample = [
            ("1", "Innovate Corp.", "Software Engineer", "2025-08-10", ApplicationStatus::Applied),
            ("2", "Global Tech", "Product Manager", "2025-08-01", ApplicationStatus::Interviewed),
            ("3", "Data Solutions", "Data Scientist", "2025-08-15", ApplicationStatus::Researching),
            ("4", "Creative Design", "UX Designer", "2025-07-28", ApplicationStatus::Rejected),
            ("5", "Future AI Labs", "Machine Learning Engineer", "2025-09-15", ApplicationStatus::Interested),
        ];
        let records = sample
            .into_iter()
            .map(|(id, company, role, deadline, status)| ApplicationRecord {
                id: id.to_string(),
                company: company.to_string(),
                role: role.to_string(),
                deadline: Deadline::new(deadline),
                status,
            })
            .collect();
        Self::seeded(records)
    }

    pub fn from_records(records: Vec<ApplicationRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = records.iter().find(|r| !seen.insert(r.id.clone())) {
            return Err(anyhow!("Duplicate application id in seed: {}", dup.id));
        }
        Ok(Self::seeded(records))
    }

    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
        let records: Vec<ApplicationRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse seed file: {}", path.display()))?;
        Self::from_records(records)
    }

    fn seeded(records: Vec<ApplicationRecord>) -> Self {
        // Numeric seed ids must never be handed out again.
        let last_id = records
            .iter()
            .filter_map(|r| r.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            records,
            last_id,
            overflow_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn list(&self) -> Vec<ApplicationRecord> {
        self.records.clone()
    }

    pub fn create(&mut self, fields: NewApplication) -> ApplicationRecord {
        let record = ApplicationRecord {
            id: self.next_id(),
            company: fields.company,
            role: fields.role,
            deadline: fields.deadline,
            status: fields.status,
        };
        self.records.push(record.clone());
        record
    }

    pub fn update_status(
        &mut self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.status = status;
        Ok(record.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Millisecond timestamp, bumped past the previous id when the clock
    /// hasn't moved (or moved backwards).
    fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        if let Some(floor) = self.last_id.checked_add(1) {
            let id = now.max(floor);
            self.last_id = id;
            return id.to_string();
        }

        // A seed used up the numeric range; suffixed ids never parse as i64.
        loop {
            self.overflow_seq += 1;
            let id = format!("{}-{}", now, self.overflow_seq);
            if !self.records.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::Write;

    fn new_app(company: &str, deadline: &str, status: ApplicationStatus) -> NewApplication {
        NewApplication {
            company: company.to_string(),
            role: "Engineer".to_string(),
            deadline: Deadline::new(deadline),
            status,
        }
    }

    #[test]
    fn create_assigns_unique_ids() {
        let mut store = ApplicationStore::with_sample_data();
        let mut ids: HashSet<String> = store.list().into_iter().map(|r| r.id).collect();
        for i in 0..50 {
            let record = store.create(new_app(&format!("Co {}", i), "2025-01-01", ApplicationStatus::Applied));
            assert!(ids.insert(record.id), "id handed out twice");
        }
        assert_eq!(store.len(), 55);
    }

    #[test]
    fn list_reflects_net_effect_of_mutations() {
        let mut store = ApplicationStore::empty();
        let a = store.create(new_app("Acme", "2025-01-01", ApplicationStatus::Applied));
        let b = store.create(new_app("Globex", "2025-02-01", ApplicationStatus::Interested));
        let c = store.create(new_app("Initech", "2025-03-01", ApplicationStatus::Researching));

        store.update_status(&b.id, ApplicationStatus::Offered).unwrap();
        store.delete(&a.id).unwrap();

        let records = store.list();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, b.id);
        assert_eq!(records[0].status, ApplicationStatus::Offered);
        assert_eq!(records[1], c);
    }

    #[test]
    fn update_missing_id_leaves_collection_unchanged() {
        let mut store = ApplicationStore::with_sample_data();
        let before = store.list();

        let err = store
            .update_status("nope", ApplicationStatus::Offered)
            .unwrap_err();

        assert_eq!(err, StoreError::NotFound("nope".to_string()));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn delete_twice_fails_the_second_time() {
        let mut store = ApplicationStore::with_sample_data();
        assert!(store.delete("3").is_ok());
        assert_eq!(store.delete("3"), Err(StoreError::NotFound("3".to_string())));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn create_then_update_round_trips_fields() {
        let mut store = ApplicationStore::empty();
        let fields = new_app("Acme", "not a date", ApplicationStatus::Other("Ghosted".to_string()));
        let created = store.create(fields.clone());
        store
            .update_status(&created.id, ApplicationStatus::Interviewed)
            .unwrap();

        let listed = store.list();
        let record = listed.iter().find(|r| r.id == created.id).unwrap();
        assert_eq!(record.company, fields.company);
        assert_eq!(record.role, fields.role);
        assert_eq!(record.deadline, fields.deadline);
        assert_eq!(record.status, ApplicationStatus::Interviewed);
    }

    #[test]
    fn seed_with_duplicate_ids_is_rejected() {
        let mut records = ApplicationStore::with_sample_data().list();
        records.push(records[0].clone());
        assert!(ApplicationStore::from_records(records).is_err());
    }

    #[test]
    fn ids_stay_ahead_of_large_seed_ids() {
        let far_future = chrono::Utc::now().timestamp_millis() + 1_000_000;
        let seed = vec![ApplicationRecord {
            id: far_future.to_string(),
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            deadline: Deadline::new("2025-01-01"),
            status: ApplicationStatus::Applied,
        }];
        let mut store = ApplicationStore::from_records(seed).unwrap();
        let record = store.create(new_app("Globex", "2025-01-02", ApplicationStatus::Applied));
        assert_eq!(record.id, (far_future + 1).to_string());
    }

    #[test]
    fn seed_at_max_numeric_id_still_allows_creates() {
        let seed = vec![ApplicationRecord {
            id: i64::MAX.to_string(),
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            deadline: Deadline::new("2025-01-01"),
            status: ApplicationStatus::Applied,
        }];
        let mut store = ApplicationStore::from_records(seed).unwrap();

        let first = store.create(new_app("Globex", "2025-01-02", ApplicationStatus::Applied));
        let second = store.create(new_app("Initech", "2025-01-03", ApplicationStatus::Applied));

        let ids: HashSet<String> = store.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 3);
        assert_ne!(first.id, second.id);
        assert!(first.id.parse::<i64>().is_err());
    }

    #[test]
    fn seed_file_loads_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let records = ApplicationStore::with_sample_data().list();
        file.write_all(serde_json::to_string(&records).unwrap().as_bytes())
            .unwrap();

        let mut store = ApplicationStore::from_seed_file(file.path()).unwrap();

        assert_eq!(store.list(), records);
        let created = store.create(new_app("Acme", "2025-01-01", ApplicationStatus::Applied));
        assert!(records.iter().all(|r| r.id != created.id));
    }

    #[test]
    fn missing_seed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");

        let err = ApplicationStore::from_seed_file(&path).unwrap_err();

        assert!(err.to_string().contains("Failed to read seed file"));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn malformed_seed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[{\"id\": \"1\", \"company\": ").unwrap();

        let err = ApplicationStore::from_seed_file(file.path()).unwrap_err();

        assert!(err.to_string().contains("Failed to parse seed file"));
        assert!(err.source().is_some());
    }
}
