use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Maximum number of job ids kept in the recent-activity index.
pub const RECENCY_CAP: usize = 10;
/// Job metadata lifetime: 24 hours after submission.
pub const METADATA_TTL_SECS: i64 = 86_400;
/// Queue-side retention of a finished/failed job: 15 minutes after completion.
pub const RESULT_TTL_SECS: i64 = 900;

/// External downloader invocation (optional `[downloader]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Program to run for each job (looked up on `PATH` unless absolute).
    pub program: String,
    /// Extra arguments inserted before the URL.
    pub extra_args: Vec<String>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Global configuration loaded from `~/.config/vdq/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VdqConfig {
    /// Address the HTTP API binds to.
    pub listen: String,
    /// Where finished downloads land (None = `~/.local/share/vdq/downloads`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    /// Extension (without the dot) of finished artifacts shown in listings.
    pub file_extension: String,
    /// Concurrent download jobs per worker process. `serve` embeds workers when > 0.
    pub workers: usize,
    /// How long an idle worker sleeps before polling the queue again.
    pub poll_interval_ms: u64,
    /// Hosts accepted by the URL policy.
    pub allowed_hosts: Vec<String>,
    pub downloader: DownloaderConfig,
}

impl Default for VdqConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:5000".to_string(),
            download_dir: None,
            file_extension: "mp4".to_string(),
            workers: 1,
            poll_interval_ms: 1000,
            allowed_hosts: crate::url_policy::DEFAULT_ALLOWED_HOSTS
                .iter()
                .map(|h| h.to_string())
                .collect(),
            downloader: DownloaderConfig::default(),
        }
    }
}

impl VdqConfig {
    /// Resolved download directory (configured, or under the XDG data dir).
    pub fn download_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.download_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("vdq")?;
        Ok(xdg_dirs.get_data_home().join("vdq").join("downloads"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vdq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VdqConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VdqConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VdqConfig = toml::from_str(&data)?;
    Ok(cfg)
}
