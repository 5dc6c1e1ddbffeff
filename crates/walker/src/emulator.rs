//! MuMu emulator discovery and subprocess wrappers for the manager
//! executable and ADB.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ConfigStore, WalkerConfig};
use crate::simulator::LocationSink;

const MANAGER_NAME: &str = "MuMuManager";
const ADB_NAME: &str = "adb";

/// MuMu 12 keeps adb in this subdirectory.
const NX_MAIN_DIR: &str = "nx_main";

#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("Emulator not found; install MuMu or set emu_dir in the config")]
    NotFound,
    #[error("Manager executable not found in {0}")]
    ManagerMissing(PathBuf),
    #[error("adb not found at {0}")]
    AdbMissing(PathBuf),
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("Malformed manager output: {0}")]
    InvalidInfo(#[from] serde_json::Error),
    #[error("Manager did not report an adb address; is the emulator running?")]
    MissingAdbInfo,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Platform file name of a bundled executable.
pub fn executable(name: &str) -> String {
    format!("{name}{}", std::env::consts::EXE_SUFFIX)
}

/// Manager path for an emulator dir: either inside it or one level up.
pub fn manager_path(emu_dir: &Path) -> Option<PathBuf> {
    let exe = executable(MANAGER_NAME);
    let inside = emu_dir.join(&exe);
    if inside.is_file() {
        return Some(inside);
    }
    let above = emu_dir.parent().map(|p| p.join(&exe))?;
    above.is_file().then_some(above)
}

pub fn manager_exists(emu_dir: &Path) -> bool {
    manager_path(emu_dir).is_some()
}

/// Prefers the `nx_main` subdirectory when it holds adb.
pub fn pick_best_emu_dir(base: &Path) -> PathBuf {
    let nx_main = base.join(NX_MAIN_DIR);
    if nx_main.join(executable(ADB_NAME)).is_file() {
        nx_main
    } else {
        base.to_path_buf()
    }
}

/// Filesystem roots to search: existing drive letters on Windows, `/`
/// elsewhere.
pub fn search_roots() -> Vec<PathBuf> {
    if cfg!(windows) {
        ('C'..='Z')
            .map(|d| PathBuf::from(format!("{d}:/")))
            .filter(|p| p.exists())
            .collect()
    } else {
        vec![PathBuf::from("/")]
    }
}

/// Depth-first search for the manager executable. Unreadable directories
/// are skipped.
pub fn search_for_manager(roots: &[PathBuf]) -> Option<PathBuf> {
    let exe = executable(MANAGER_NAME);
    let target = OsStr::new(&exe);

    for root in roots {
        let mut stack = vec![root.clone()];
        while let Some(dir) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!("Skipping {}: {e}", dir.display());
                    continue;
                }
            };
            for entry in entries.flatten() {
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                if file_type.is_dir() {
                    stack.push(entry.path());
                } else if file_type.is_file() && entry.file_name() == target {
                    return Some(entry.path());
                }
            }
        }
    }
    None
}

/// Emulator directory and whether it had to be discovered.
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatorDir {
    pub path: PathBuf,
    /// True when the config did not hold a usable path and the caller
    /// should persist `path`.
    pub discovered: bool,
}

/// Finds the emulator directory from the config, falling back to a disk
/// search. On discovery `config.emu_dir` is updated; saving is up to the
/// caller.
pub fn find_emu_dir(
    config: &mut WalkerConfig,
    store: &ConfigStore,
    roots: &[PathBuf],
) -> Result<EmulatorDir, EmulatorError> {
    if let Some(dir) = &config.emu_dir {
        let path = store.resolve_path(dir);
        if manager_exists(&path) {
            info!("Using emulator directory from config: {}", path.display());
            return Ok(EmulatorDir {
                path,
                discovered: false,
            });
        }
        warn!(
            "Configured emu_dir {} has no manager, searching disk",
            path.display()
        );
    }

    info!("Searching for the MuMu installation...");
    let manager = search_for_manager(roots).ok_or(EmulatorError::NotFound)?;
    let base = manager.parent().ok_or(EmulatorError::NotFound)?;
    let path = pick_best_emu_dir(base);
    info!("Found emulator directory: {}", path.display());

    config.emu_dir = Some(path.display().to_string());
    Ok(EmulatorDir {
        path,
        discovered: true,
    })
}

/// Runs a command to completion and returns its stdout.
async fn run_command<I, S>(program: &Path, args: I) -> Result<String, EmulatorError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let name = program.display().to_string();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| EmulatorError::Spawn {
            program: name.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(EmulatorError::CommandFailed {
            program: name,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Thin wrapper over the adb executable.
#[derive(Debug, Clone)]
pub struct Adb {
    path: PathBuf,
}

impl Adb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// adb inside an emulator directory; it must exist.
    pub fn in_emu_dir(emu_dir: &Path) -> Result<Self, EmulatorError> {
        let path = emu_dir.join(executable(ADB_NAME));
        if !path.is_file() {
            return Err(EmulatorError::AdbMissing(path));
        }
        Ok(Self::new(path))
    }

    /// adb from the config's `emu_dir`, which must already be set.
    pub fn from_config(config: &WalkerConfig, store: &ConfigStore) -> Result<Self, EmulatorError> {
        let dir = config
            .emu_dir
            .as_deref()
            .ok_or(ConfigError::MissingField("emu_dir"))?;
        Self::in_emu_dir(&store.resolve_path(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn connect(&self, address: &str) -> Result<(), EmulatorError> {
        run_command(&self.path, ["connect", address]).await?;
        Ok(())
    }

    /// Runs a shell command on the device and returns its stdout.
    pub async fn shell(&self, command: &str) -> Result<String, EmulatorError> {
        run_command(&self.path, ["shell", command]).await
    }

    /// Copies a local file to the device.
    pub async fn push(&self, local: &Path, remote: &str) -> Result<(), EmulatorError> {
        run_command(
            &self.path,
            [OsStr::new("push"), local.as_os_str(), OsStr::new(remote)],
        )
        .await?;
        Ok(())
    }
}

/// Extracts `host:port` from the manager's `info` JSON.
///
/// The port may be reported as a number or a string.
pub fn parse_adb_address(info: &str) -> Result<String, EmulatorError> {
    let value: Value = serde_json::from_str(info)?;
    let host = value
        .get("adb_host_ip")
        .and_then(Value::as_str)
        .ok_or(EmulatorError::MissingAdbInfo)?;
    let port = match value.get("adb_port") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(EmulatorError::MissingAdbInfo),
    };
    Ok(format!("{host}:{port}"))
}

/// A located MuMu installation.
#[derive(Debug, Clone)]
pub struct Emulator {
    manager: PathBuf,
    adb: Adb,
}

impl Emulator {
    pub fn from_dir(emu_dir: &Path) -> Result<Self, EmulatorError> {
        let manager =
            manager_path(emu_dir).ok_or_else(|| EmulatorError::ManagerMissing(emu_dir.into()))?;
        Ok(Self {
            manager,
            adb: Adb::new(emu_dir.join(executable(ADB_NAME))),
        })
    }

    pub fn manager(&self) -> &Path {
        &self.manager
    }

    pub fn adb(&self) -> &Adb {
        &self.adb
    }

    /// Asks the manager for the adb address of instance 0 and connects.
    pub async fn connect(&self) -> Result<String, EmulatorError> {
        info!("Connecting to the emulator...");
        let raw = run_command(&self.manager, ["info", "-v", "0"]).await?;
        let address = parse_adb_address(&raw)?;
        self.adb.connect(&address).await?;
        info!("Connected to adb at {address}");
        Ok(address)
    }

    pub fn location_sink(&self) -> ManagerLocationSink {
        ManagerLocationSink {
            manager: self.manager.clone(),
        }
    }
}

/// Sets instance 0's GPS location through the manager executable.
#[derive(Debug, Clone)]
pub struct ManagerLocationSink {
    manager: PathBuf,
}

/// Manager arguments for a location update, coordinates at 6 decimals.
pub fn location_args(lon: f64, lat: f64) -> Vec<String> {
    let mut args: Vec<String> = ["control", "-v", "0", "tool", "location"]
        .into_iter()
        .map(String::from)
        .collect();
    args.extend(["-lon".into(), format!("{lon:.6}"), "-lat".into(), format!("{lat:.6}")]);
    args
}

impl LocationSink for ManagerLocationSink {
    type Error = EmulatorError;

    async fn set_location(&mut self, lon: f64, lat: f64) -> Result<(), EmulatorError> {
        let name = self.manager.display().to_string();
        let status = Command::new(&self.manager)
            .args(location_args(lon, lat))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| EmulatorError::Spawn {
                program: name.clone(),
                source,
            })?;

        if !status.success() {
            return Err(EmulatorError::CommandFailed {
                program: name,
                status,
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

/// Sink that only logs, for dry runs without a device.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    pub updates: u64,
}

impl LocationSink for LogSink {
    type Error = std::convert::Infallible;

    async fn set_location(&mut self, lon: f64, lat: f64) -> Result<(), Self::Error> {
        self.updates += 1;
        debug!("location -> lon {lon:.6}, lat {lat:.6}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("walker-emu-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path) {
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_parse_adb_address() {
        let info = r#"{"adb_host_ip": "127.0.0.1", "adb_port": 16384, "is_android_started": true}"#;
        assert_eq!(parse_adb_address(info).unwrap(), "127.0.0.1:16384");

        let info = r#"{"adb_host_ip": "127.0.0.1", "adb_port": "7555"}"#;
        assert_eq!(parse_adb_address(info).unwrap(), "127.0.0.1:7555");
    }

    #[test]
    fn test_parse_adb_address_stopped_instance() {
        let info = r#"{"is_android_started": false}"#;
        assert!(matches!(
            parse_adb_address(info),
            Err(EmulatorError::MissingAdbInfo)
        ));
        assert!(matches!(
            parse_adb_address("not json"),
            Err(EmulatorError::InvalidInfo(_))
        ));
    }

    #[test]
    fn test_location_args_six_decimals() {
        let args = location_args(116.3975, 39.9087123456);
        assert_eq!(
            args,
            [
                "control", "-v", "0", "tool", "location", "-lon", "116.397500", "-lat",
                "39.908712"
            ]
        );
    }

    #[test]
    fn test_pick_best_emu_dir_prefers_nx_main() {
        let base = temp_dir("nx");
        assert_eq!(pick_best_emu_dir(&base), base);

        let nx_main = base.join(NX_MAIN_DIR);
        std::fs::create_dir_all(&nx_main).unwrap();
        // Directory without adb is not enough
        assert_eq!(pick_best_emu_dir(&base), base);

        touch(&nx_main.join(executable(ADB_NAME)));
        assert_eq!(pick_best_emu_dir(&base), nx_main);
    }

    #[test]
    fn test_manager_found_one_level_up() {
        let base = temp_dir("manager");
        let nx_main = base.join(NX_MAIN_DIR);
        std::fs::create_dir_all(&nx_main).unwrap();
        assert!(!manager_exists(&nx_main));

        touch(&base.join(executable(MANAGER_NAME)));
        assert!(manager_exists(&base));
        assert!(manager_exists(&nx_main));
    }

    #[test]
    fn test_find_emu_dir_searches_when_config_stale() {
        let root = temp_dir("search");
        let install = root.join("Program Files").join("MuMu").join("shell");
        std::fs::create_dir_all(install.join(NX_MAIN_DIR)).unwrap();
        touch(&install.join(executable(MANAGER_NAME)));
        touch(&install.join(NX_MAIN_DIR).join(executable(ADB_NAME)));

        let store = ConfigStore::new(root.join("config.json"));
        let mut config = WalkerConfig {
            emu_dir: Some(root.join("gone").display().to_string()),
            ..Default::default()
        };

        let found = find_emu_dir(&mut config, &store, &[root.clone()]).unwrap();
        assert!(found.discovered);
        assert_eq!(found.path, install.join(NX_MAIN_DIR));
        assert_eq!(
            config.emu_dir.as_deref(),
            Some(found.path.display().to_string().as_str())
        );

        // Now the config is valid and no search happens
        let again = find_emu_dir(&mut config, &store, &[]).unwrap();
        assert!(!again.discovered);
        assert_eq!(again.path, found.path);
    }

    #[test]
    fn test_find_emu_dir_not_found() {
        let root = temp_dir("empty");
        let store = ConfigStore::new(root.join("config.json"));
        let mut config = WalkerConfig::default();
        assert!(matches!(
            find_emu_dir(&mut config, &store, &[root]),
            Err(EmulatorError::NotFound)
        ));
        assert!(config.emu_dir.is_none());
    }

    #[test]
    fn test_adb_from_config_requires_emu_dir() {
        let root = temp_dir("adb");
        let store = ConfigStore::new(root.join("config.json"));
        assert!(matches!(
            Adb::from_config(&WalkerConfig::default(), &store),
            Err(EmulatorError::Config(ConfigError::MissingField("emu_dir")))
        ));

        let config = WalkerConfig {
            emu_dir: Some(root.display().to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Adb::from_config(&config, &store),
            Err(EmulatorError::AdbMissing(_))
        ));
        touch(&root.join(executable(ADB_NAME)));
        assert!(Adb::from_config(&config, &store).is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_counts_updates() {
        let mut sink = LogSink::default();
        sink.set_location(1.0, 2.0).await.unwrap();
        sink.set_location(1.0, 2.0).await.unwrap();
        assert_eq!(sink.updates, 2);
    }
}
