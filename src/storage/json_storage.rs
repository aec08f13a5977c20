use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, instrument};

use crate::{auth::Credential, tasks::TaskEntity, utils::time::date_to_record_name};

use super::{DayStorage, FetchError, SaveError};

/// The main realization of [DayStorage]. Every date is a `<YYYY-MM-DD>.json` file holding an
/// array of tasks. Files are locked while being read or written, so several processes can share
/// the directory.
pub struct JsonDayStorage {
    day_dir: PathBuf,
}

impl JsonDayStorage {
    pub fn new(day_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&day_dir)?;

        Ok(Self { day_dir })
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.day_dir
            .join(format!("{}.json", date_to_record_name(date)))
    }

    async fn read_inner(path: &Path) -> Result<Vec<TaskEntity>, FetchError> {
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Nothing stored at {path:?}");
                return Ok(vec![]);
            }
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut content = String::new();
        let read = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        read?;

        if content.trim().is_empty() {
            return Ok(vec![]);
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_inner(path: &Path, tasks: &[TaskEntity]) -> Result<(), std::io::Error> {
        let buffer = serde_json::to_vec_pretty(tasks)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .await?;

        // Truncate only once the lock is held, so readers never see a half written file.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.write_all(&buffer).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        file.unlock_async().await?;
        result
    }
}

impl DayStorage for JsonDayStorage {
    #[instrument(skip(self, _credential))]
    async fn load_day(
        &self,
        date: NaiveDate,
        _credential: Option<&Credential>,
    ) -> Result<Vec<TaskEntity>, FetchError> {
        let tasks = Self::read_inner(&self.path_for(date)).await?;
        debug!("Read {} tasks", tasks.len());
        Ok(tasks)
    }

    #[instrument(skip(self, _credential, tasks))]
    async fn save_day(
        &self,
        date: NaiveDate,
        _credential: &Credential,
        tasks: Vec<TaskEntity>,
    ) -> Result<String, SaveError> {
        let path = self.path_for(date);
        Self::write_inner(&path, &tasks).await.map_err(|e| {
            SaveError::new(format!(
                "Error saving tasks for {}: {e}",
                date_to_record_name(date)
            ))
        })?;
        Ok(format!(
            "Saved {} tasks for {}",
            tasks.len(),
            date_to_record_name(date)
        ))
    }
}
