use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::SpecialsStore;

use super::domain::{day_label, parse_day_label};
use super::repository::{
    newest_first, NewSpecial, RepositoryError, SpecialId, SpecialRecord, SpecialsRepository,
};

/// Process-local store, used by tests and `APP_SPECIALS_STORE=memory`.
#[derive(Default, Clone)]
pub struct InMemorySpecialsRepository {
    records: Arc<Mutex<Vec<SpecialRecord>>>,
}

impl InMemorySpecialsRepository {
    pub fn records(&self) -> Vec<SpecialRecord> {
        self.records.lock().expect("specials mutex poisoned").clone()
    }
}

impl SpecialsRepository for InMemorySpecialsRepository {
    fn append(&self, special: NewSpecial) -> Result<SpecialRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("specials mutex poisoned");
        let id = SpecialId(guard.len() as u64 + 1);
        let record = SpecialRecord::from_new(id, special, Local::now().naive_local());
        guard.push(record.clone());
        Ok(record)
    }

    fn append_all(&self, specials: Vec<NewSpecial>) -> Result<Vec<SpecialRecord>, RepositoryError> {
        let mut guard = self.records.lock().expect("specials mutex poisoned");
        let date_added = Local::now().naive_local();
        let first_id = guard.len() as u64 + 1;
        let records: Vec<SpecialRecord> = specials
            .into_iter()
            .zip(first_id..)
            .map(|(special, id)| SpecialRecord::from_new(SpecialId(id), special, date_added))
            .collect();
        guard.extend(records.iter().cloned());
        Ok(records)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SpecialRecord>, RepositoryError> {
        let mut records = self.records.lock().expect("specials mutex poisoned").clone();
        newest_first(&mut records);
        records.truncate(limit);
        Ok(records)
    }
}

/// Append-only CSV file. Existing rows are never rewritten.
pub struct CsvSpecialsRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvSpecialsRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<SpecialRecord>, RepositoryError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut reader = csv::ReaderBuilder::new().from_reader(file);
        let mut records = Vec::new();
        for row in reader.deserialize::<SpecialRow>() {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn needs_header(&self) -> Result<bool, RepositoryError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(true),
            Err(err) => Err(err.into()),
        }
    }
}

impl SpecialsRepository for CsvSpecialsRepository {
    fn append(&self, special: NewSpecial) -> Result<SpecialRecord, RepositoryError> {
        self.append_all(vec![special])?
            .pop()
            .ok_or_else(|| RepositoryError::Unavailable("append produced no record".to_string()))
    }

    /// Encodes the batch in memory first so the file receives a single write.
    fn append_all(&self, specials: Vec<NewSpecial>) -> Result<Vec<SpecialRecord>, RepositoryError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;

        let first_id = self
            .read_records()?
            .iter()
            .map(|record| record.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        let date_added = Local::now().naive_local();
        let records: Vec<SpecialRecord> = specials
            .into_iter()
            .zip(first_id..)
            .map(|(special, id)| SpecialRecord::from_new(SpecialId(id), special, date_added))
            .collect();

        let mut encoded = Vec::new();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(self.needs_header()?)
                .from_writer(&mut encoded);
            for record in &records {
                writer.serialize(SpecialRow::from_record(record))?;
            }
            writer.flush()?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&encoded)?;
        file.flush()?;

        Ok(records)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SpecialRecord>, RepositoryError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;

        let mut records = self.read_records()?;
        newest_first(&mut records);
        records.truncate(limit);
        Ok(records)
    }
}

/// Store chosen by `APP_SPECIALS_STORE`.
pub enum ConfiguredRepository {
    Memory(InMemorySpecialsRepository),
    Csv(CsvSpecialsRepository),
}

impl ConfiguredRepository {
    pub fn from_config(store: &SpecialsStore) -> Self {
        match store {
            SpecialsStore::Memory => Self::Memory(InMemorySpecialsRepository::default()),
            SpecialsStore::Csv(path) => Self::Csv(CsvSpecialsRepository::new(path)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "in-memory".to_string(),
            Self::Csv(repository) => repository.path().display().to_string(),
        }
    }
}

impl SpecialsRepository for ConfiguredRepository {
    fn append(&self, special: NewSpecial) -> Result<SpecialRecord, RepositoryError> {
        match self {
            Self::Memory(repository) => repository.append(special),
            Self::Csv(repository) => repository.append(special),
        }
    }

    fn append_all(&self, specials: Vec<NewSpecial>) -> Result<Vec<SpecialRecord>, RepositoryError> {
        match self {
            Self::Memory(repository) => repository.append_all(specials),
            Self::Csv(repository) => repository.append_all(specials),
        }
    }

    fn recent(&self, limit: usize) -> Result<Vec<SpecialRecord>, RepositoryError> {
        match self {
            Self::Memory(repository) => repository.recent(limit),
            Self::Csv(repository) => repository.recent(limit),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SpecialRow {
    id: u64,
    restaurant_name: String,
    special_details: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    day: Option<String>,
    date_added: NaiveDateTime,
}

impl SpecialRow {
    fn from_record(record: &SpecialRecord) -> Self {
        Self {
            id: record.id.0,
            restaurant_name: record.restaurant_name.clone(),
            special_details: record.special_details.clone(),
            day: record.day.map(|day| day_label(day).to_string()),
            date_added: record.date_added,
        }
    }

    fn into_record(self) -> Result<SpecialRecord, RepositoryError> {
        let day = match self.day {
            Some(label) => Some(parse_day_label(&label).ok_or_else(|| {
                RepositoryError::Unavailable(format!("unknown day label '{label}' in store"))
            })?),
            None => None,
        };

        Ok(SpecialRecord {
            id: SpecialId(self.id),
            restaurant_name: self.restaurant_name,
            special_details: self.special_details,
            day,
            date_added: self.date_added,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn scratch_path(label: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "specials-finder-{label}-{}-{n}.csv",
            std::process::id()
        ))
    }

    fn named(name: &str, details: &str) -> NewSpecial {
        NewSpecial {
            restaurant_name: name.to_string(),
            special_details: details.to_string(),
            day: None,
        }
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let repository = CsvSpecialsRepository::new(scratch_path("missing"));
        assert!(repository.recent(10).expect("read").is_empty());
    }

    #[test]
    fn csv_store_appends_and_lists_newest_first() {
        let path = scratch_path("append");
        let repository = CsvSpecialsRepository::new(&path);

        let first = repository
            .append(named("Tony's Pizza", "$5 off large pies\nValid Friday only"))
            .expect("append first");
        let second = repository
            .append(NewSpecial {
                restaurant_name: "Fish Shack".to_string(),
                special_details: "Fish fry $10".to_string(),
                day: Some(Weekday::Fri),
            })
            .expect("append second");
        assert_eq!(first.id, SpecialId(1));
        assert_eq!(second.id, SpecialId(2));

        let reopened = CsvSpecialsRepository::new(&path);
        let records = reopened.recent(10).expect("read back");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, SpecialId(2));
        assert_eq!(records[0].day, Some(Weekday::Fri));
        assert_eq!(records[1].special_details, "$5 off large pies\nValid Friday only");
        assert_eq!(records[1].day, None);

        let header_count = std::fs::read_to_string(&path)
            .expect("file readable")
            .matches("restaurant_name")
            .count();
        assert_eq!(header_count, 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn csv_batch_lands_with_consecutive_ids_and_one_header() {
        let path = scratch_path("batch");
        let repository = CsvSpecialsRepository::new(&path);
        repository.append(named("Diner", "Eggs")).expect("append single");

        let batch = repository
            .append_all(vec![
                NewSpecial {
                    restaurant_name: "Blue Moon Tavern".to_string(),
                    special_details: "Burger special $8".to_string(),
                    day: Some(Weekday::Mon),
                },
                NewSpecial {
                    restaurant_name: "Blue Moon Tavern".to_string(),
                    special_details: "Taco night $6 | more tacos".to_string(),
                    day: Some(Weekday::Tue),
                },
            ])
            .expect("append batch");
        assert_eq!(
            batch.iter().map(|record| record.id).collect::<Vec<_>>(),
            [SpecialId(2), SpecialId(3)]
        );

        let records = CsvSpecialsRepository::new(&path).recent(10).expect("read back");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].day, Some(Weekday::Tue));
        assert_eq!(records[1].day, Some(Weekday::Mon));

        let header_count = std::fs::read_to_string(&path)
            .expect("file readable")
            .matches("restaurant_name")
            .count();
        assert_eq!(header_count, 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn memory_batch_continues_id_sequence() {
        let repository = InMemorySpecialsRepository::default();
        repository.append(named("Diner", "Eggs")).expect("append single");

        let batch = repository
            .append_all(vec![named("Diner", "Toast"), named("Diner", "Coffee")])
            .expect("append batch");
        assert_eq!(batch[0].id, SpecialId(2));
        assert_eq!(batch[1].id, SpecialId(3));
        assert_eq!(repository.records().len(), 3);
        assert!(repository.append_all(Vec::new()).expect("empty batch").is_empty());
    }

    #[test]
    fn recent_respects_limit() {
        let repository = InMemorySpecialsRepository::default();
        for n in 0..3 {
            repository
                .append(named(&format!("Place {n}"), "details"))
                .expect("append");
        }

        let records = repository.recent(2).expect("recent");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, SpecialId(3));
        assert_eq!(records[1].id, SpecialId(2));
        assert_eq!(repository.records().len(), 3);
    }

    #[test]
    fn configured_repository_follows_store_setting() {
        let memory = ConfiguredRepository::from_config(&SpecialsStore::Memory);
        assert_eq!(memory.describe(), "in-memory");
        memory.append(named("Diner", "Eggs")).expect("append");
        assert_eq!(memory.recent(5).expect("recent").len(), 1);

        let path = scratch_path("configured");
        let csv = ConfiguredRepository::from_config(&SpecialsStore::Csv(path.clone()));
        assert_eq!(csv.describe(), path.display().to_string());
        csv.append(named("Diner", "Eggs")).expect("append");
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn unknown_day_label_in_file_is_reported() {
        let path = scratch_path("corrupt");
        std::fs::write(
            &path,
            "id,restaurant_name,special_details,day,date_added\n1,Diner,Eggs,Funday,2025-01-06T09:00:00\n",
        )
        .expect("seed file");

        let error = CsvSpecialsRepository::new(&path)
            .recent(5)
            .expect_err("bad label rejected");
        assert!(error.to_string().contains("Funday"));

        std::fs::remove_file(&path).ok();
    }
}
