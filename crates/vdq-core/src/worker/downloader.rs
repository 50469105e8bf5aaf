//! External downloader invocation.
//!
//! The worker treats the downloader as opaque: hand it a URL and a
//! destination directory, get back the title if it reported one.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;

use crate::config::DownloaderConfig;
use crate::types::DownloadTask;

/// Outcome of a successful download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Downloaded {
    pub title: Option<String>,
}

#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, task: &DownloadTask, dest_dir: &Path) -> Result<Downloaded>;
}

/// Runs `yt-dlp` (or a compatible program) once per job.
///
/// Output lands in `<dest_dir>/<title>.<ext>`; `--print title` with
/// `--no-simulate` makes the first stdout line the video title.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    extra_args: Vec<String>,
}

impl YtDlp {
    pub fn new(cfg: &DownloaderConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            extra_args: cfg.extra_args.clone(),
        }
    }

    fn args(&self, url: &str, dest_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--no-progress",
            "--no-playlist",
            "--print",
            "title",
            "--no-simulate",
            "-o",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(dest_dir.join("%(title)s.%(ext)s").into_os_string());
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(OsString::from("--"));
        args.push(OsString::from(url));
        args
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn download(&self, task: &DownloadTask, dest_dir: &Path) -> Result<Downloaded> {
        let output = Command::new(&self.program)
            .args(self.args(&task.url, dest_dir))
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("spawn {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("no error output");
            anyhow::bail!("{} exited with {}: {}", self.program, output.status, reason);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let title = stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string);
        Ok(Downloaded { title })
    }
}
