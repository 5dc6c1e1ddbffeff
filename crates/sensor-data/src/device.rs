//! Sensor files on the emulator's shared storage.

use std::fmt;
use std::path::Path;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::{debug, info};
use uuid::Uuid;
use walker::emulator::{Adb, EmulatorError};

/// Where the running app keeps its accelerometer recordings.
pub const SENSOR_DIR: &str = "/storage/emulated/0/sensor";

/// Newest files listed at most.
pub const MAX_LISTED: usize = 20;

/// `stat -c '%y'` output, e.g. `2024-12-15 14:30:45.123456789 +0800`.
const STAT_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour sign:mandatory][offset_minute]"
);
const STAT_FORMAT_WHOLE_SECONDS: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
);
const DISPLAY_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, Clone, PartialEq)]
pub struct SensorFile {
    pub name: String,
    /// `None` when the device did not report a usable timestamp.
    pub modified: Option<OffsetDateTime>,
}

impl SensorFile {
    pub fn remote_path(&self) -> String {
        remote_path(&self.name)
    }
}

impl fmt::Display for SensorFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modified.and_then(|m| m.format(DISPLAY_FORMAT).ok()) {
            Some(ts) => write!(f, "{} (modified {ts})", self.name),
            None => write!(f, "{} (modified unknown)", self.name),
        }
    }
}

pub fn remote_path(name: &str) -> String {
    format!("{SENSOR_DIR}/{name}")
}

/// Fresh file name for when no recording exists yet.
pub fn new_sensor_file_name() -> String {
    format!("{}.txt", Uuid::new_v4())
}

/// File names from `ls -t` output, newest first, `.txt` only.
pub fn parse_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.ends_with(".txt") && !line.contains(char::is_whitespace))
        .take(MAX_LISTED)
        .map(String::from)
        .collect()
}

pub fn parse_stat_timestamp(output: &str) -> Option<OffsetDateTime> {
    let s = output.trim();
    OffsetDateTime::parse(s, STAT_FORMAT)
        .or_else(|_| OffsetDateTime::parse(s, STAT_FORMAT_WHOLE_SECONDS))
        .ok()
}

/// Lists the newest sensor files on the device. A missing directory reads
/// as empty.
pub async fn list_recent(adb: &Adb) -> Result<Vec<SensorFile>, EmulatorError> {
    info!("Querying sensor files on the device...");
    let listing = match adb
        .shell(&format!(
            "cd {SENSOR_DIR} && ls -t *.txt 2>/dev/null | head -n {MAX_LISTED}"
        ))
        .await
    {
        Ok(out) => out,
        Err(EmulatorError::CommandFailed { stderr, .. }) => {
            debug!("Listing failed, treating as empty: {stderr}");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for name in parse_listing(&listing) {
        let modified = match adb
            .shell(&format!("stat -c '%y' {}", remote_path(&name)))
            .await
        {
            Ok(out) => parse_stat_timestamp(&out),
            Err(e) => {
                debug!("stat failed for {name}: {e}");
                None
            }
        };
        files.push(SensorFile { name, modified });
    }
    Ok(files)
}

/// Uploads `local` as `name` in [`SENSOR_DIR`], creating the directory
/// first. Returns the remote path.
pub async fn push_sensor_file(
    adb: &Adb,
    local: &Path,
    name: &str,
) -> Result<String, EmulatorError> {
    adb.shell(&format!("mkdir -p {SENSOR_DIR}")).await?;
    let remote = remote_path(name);
    adb.push(local, &remote).await?;
    info!("Pushed {} to {remote}", local.display());
    Ok(remote)
}
