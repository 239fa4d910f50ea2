use chrono::Local;
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::db::models::NewContact;
use crate::error::BlogError;

pub const CSV_HEADER: &str = "Date,Time,Name,Email,Subject,Message";

/// Append-only CSV log of contact submissions.
pub struct ContactCsv {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ContactCsv {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first if the file is empty.
    pub async fn append(&self, contact: &NewContact) -> Result<(), BlogError> {
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let is_new = file.metadata().await?.len() == 0;

        let now = Local::now();
        let date = now.format("%Y-%m-%d").to_string();
        let time = now.format("%H:%M:%S").to_string();
        let buf = encode(
            is_new,
            [
                date.as_str(),
                time.as_str(),
                contact.name.as_str(),
                contact.email.as_str(),
                contact.subject.as_str(),
                contact.message.as_str(),
            ],
        )?;

        file.write_all(&buf).await?;
        file.flush().await?;
        if is_new {
            info!(path = %self.path.display(), "started contact log");
        }
        Ok(())
    }
}

fn encode(with_header: bool, record: [&str; 6]) -> Result<Vec<u8>, BlogError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    if with_header {
        writer.write_record(CSV_HEADER.split(','))?;
    }
    writer.write_record(record)?;
    writer.into_inner().map_err(|e| BlogError::Io(e.into_error()))
}
