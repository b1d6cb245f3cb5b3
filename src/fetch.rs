//! Downloads a RemixIcon release archive and unpacks its SVG sources.
//!
//! This runs independently of the build pipeline: it only prepares the
//! `<dest>/line` and `<dest>/fill` directories the loader later reads.

use crate::{
    config::Style,
    error::{Error, Result},
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    time::Instant,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, trace};

/// Release download location used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://github.com/Remix-Design/RemixIcon/releases/download";

static VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)*$").expect("valid version regex"));

/// Checks that `version` is a dot-separated list of numbers, like `4.6.0`.
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] for anything else.
pub fn validate_version(version: &str) -> Result<()> {
    if VERSION.is_match(version) {
        Ok(())
    } else {
        Err(Error::invalid_version(version))
    }
}

/// Asks for a release version on the terminal until a valid one is entered.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn prompt_version() -> Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt("RemixIcon version")
        .validate_with(|input: &String| validate_version(input.trim()).map_err(|e| e.to_string()))
        .interact_text()
        .map(|version| version.trim().to_owned())
        .map_err(|e| Error::config(format!("failed to read version: {e}")))
}

/// Archive file name published for `version`.
#[must_use]
pub fn archive_name(version: &str) -> String {
    format!("RemixIcon_SVG_v{version}.zip")
}

/// Settings for one fetch run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Release version, without the leading `v`
    pub version: String,

    /// Base URL releases are published under
    pub base_url: String,

    /// Directory the downloaded archive is saved into
    pub archive_dir: PathBuf,

    /// Directory receiving the `line/` and `fill/` sources
    pub dest_dir: PathBuf,
}

impl FetchConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::default()
    }

    /// Full download URL of the release archive.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}/v{}/{}",
            self.base_url.trim_end_matches('/'),
            self.version,
            archive_name(&self.version)
        )
    }

    /// Local path of the downloaded archive.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.archive_dir.join(archive_name(&self.version))
    }
}

/// Builder for [`FetchConfig`].
#[derive(Debug, Default)]
pub struct FetchConfigBuilder {
    version: Option<String>,
    base_url: Option<String>,
    archive_dir: Option<PathBuf>,
    dest_dir: Option<PathBuf>,
}

impl FetchConfigBuilder {
    /// Sets the release version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Overrides the release base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets where the archive is saved.
    #[must_use]
    pub fn archive_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(path.into());
        self
    }

    /// Sets where the SVG sources are extracted.
    #[must_use]
    pub fn dest_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dest_dir = Some(path.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no version was set or the version is malformed.
    pub fn build(self) -> Result<FetchConfig> {
        let version = self
            .version
            .ok_or_else(|| Error::config("a release version is required"))?;
        validate_version(&version)?;

        Ok(FetchConfig {
            version,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            archive_dir: self.archive_dir.unwrap_or_else(|| PathBuf::from(".")),
            dest_dir: self.dest_dir.unwrap_or_else(|| PathBuf::from("src")),
        })
    }
}

/// Number of SVG files extracted per style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Files written to `line/`
    pub line: usize,
    /// Files written to `fill/`
    pub fill: usize,
    /// Archive entries that matched neither style
    pub skipped: usize,
}

/// Downloads and extracts one release.
pub struct Fetcher {
    config: FetchConfig,
    client: reqwest::Client,
}

impl Fetcher {
    /// Creates a fetcher with a default HTTP client.
    #[must_use]
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Downloads the archive, then extracts it.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or the extraction fails.
    #[instrument(skip(self), fields(version = %self.config.version))]
    pub async fn run(&self) -> Result<ExtractStats> {
        let start = Instant::now();

        let archive = self.download().await?;
        info!("Start unzip");
        let stats = extract(&archive, &self.config.dest_dir)?;
        info!(
            "Finished unzip: {} line and {} fill icons in {:.2}s",
            stats.line,
            stats.fill,
            start.elapsed().as_secs_f64()
        );

        Ok(stats)
    }

    /// Streams the release archive to disk and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] on connection failures or a non-success
    /// status, and [`Error::Io`] if the file cannot be written.
    pub async fn download(&self) -> Result<PathBuf> {
        let url = self.config.url();
        let path = self.config.archive_path();
        info!("Downloading {}", url);

        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::network(&url, e))?;

        tokio::fs::create_dir_all(&self.config.archive_dir)
            .await
            .map_err(|e| Error::io(&self.config.archive_dir, e))?;
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| Error::io(&path, e))?;

        let mut received = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::network(&url, e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io(&path, e))?;
            received += chunk.len();
        }
        file.flush().await.map_err(|e| Error::io(&path, e))?;

        debug!("Saved {} bytes to {}", received, path.display());
        Ok(path)
    }
}

fn style_matcher() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for style in Style::ALL {
        let glob = Glob::new(&format!("*{}.svg", style.name()))
            .map_err(|e| Error::config(format!("invalid style pattern: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::config(format!("invalid style pattern: {e}")))
}

/// Extracts `line` and `fill` SVGs from `archive` into `dest`.
///
/// Entries are flattened to their base name and the `-<style>.svg` suffix is
/// shortened to `.svg`, so `icons/Arrows/arrow-up-line.svg` lands at
/// `<dest>/line/arrow-up.svg`.
///
/// # Errors
///
/// Returns [`Error::Archive`] if the archive cannot be read, or
/// [`Error::Io`] if a file cannot be written.
pub fn extract(archive: &Path, dest: &Path) -> Result<ExtractStats> {
    let matcher = style_matcher()?;
    let file = File::open(archive).map_err(|e| Error::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| Error::archive(archive, e))?;

    let mut stats = ExtractStats::default();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| Error::archive(archive, e))?;
        if entry.is_dir() {
            continue;
        }

        let entry_name = entry.name().to_owned();
        let Some(style) = matcher
            .matches(&entry_name)
            .first()
            .map(|&index| Style::ALL[index])
        else {
            stats.skipped += 1;
            continue;
        };

        // Only the base name is kept, whichever separator the archive used.
        let base = entry_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&entry_name);
        let file_name = base.replacen(&format!("-{}.svg", style.name()), ".svg", 1);

        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|e| Error::archive(archive, e))?;

        let dir = dest.join(style.name());
        std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        let target = dir.join(&file_name);
        std::fs::write(&target, contents).map_err(|e| Error::io(&target, e))?;
        trace!("Extracted {} -> {}", entry_name, target.display());

        match style {
            Style::Line => stats.line += 1,
            Style::Fill => stats.fill += 1,
        }
    }

    Ok(stats)
}
