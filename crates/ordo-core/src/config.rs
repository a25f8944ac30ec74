use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory under the project root holding config and the default database.
pub const PROJECT_DIR: &str = ".ordo";

/// Config file name inside [`PROJECT_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the database path.
pub const DB_ENV_VAR: &str = "ORDO_DB";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file. Relative paths resolve against the project root.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(PROJECT_DIR).join("ordo.db")
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Load `<root>/.ordo/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_DIR).join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write `<root>/.ordo/config.toml` with default settings unless it exists.
///
/// Returns `true` when a new file was written.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn init_project_config(project_root: &Path) -> Result<bool> {
    let dir = project_root.join(PROJECT_DIR);
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let content = toml::to_string_pretty(&ProjectConfig::default())
        .context("Failed to serialize default config")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

/// Resolve the store configuration for a project.
///
/// Database path precedence: `db_flag` > `ORDO_DB` > config file > default.
/// The result always carries an absolute-or-root-joined path.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn resolve_store_config(project_root: &Path, db_flag: Option<&Path>) -> Result<StoreConfig> {
    let project = load_project_config(project_root)?;
    let env_db = env::var_os(DB_ENV_VAR).map(PathBuf::from);
    Ok(resolve_store_inner(project_root, project.store, db_flag, env_db))
}

fn resolve_store_inner(
    project_root: &Path,
    mut store: StoreConfig,
    db_flag: Option<&Path>,
    env_db: Option<PathBuf>,
) -> StoreConfig {
    if let Some(flag) = db_flag {
        store.path = flag.to_path_buf();
    } else if let Some(env_path) = env_db.filter(|p| !p.as_os_str().is_empty()) {
        store.path = env_path;
    }

    if store.path.is_relative() {
        store.path = project_root.join(&store.path);
    }
    store
}
