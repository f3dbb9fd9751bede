// Fri Jan 17 2026 - Alex

use crate::catalog::PatchCatalog;
use reqwest::StatusCode;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("No network copy and no usable cache for {0}")]
    NetworkUnavailable(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Feed content rejected")]
    Rejected,
}

/// A text document fetched over HTTPS and mirrored to a local cache file.
///
/// The cache is served instead of the network while it is younger than the
/// cooldown, in local-only mode, and whenever the download fails.
#[derive(Debug, Clone)]
pub struct RemoteFeed {
    url: Option<String>,
    cache_path: PathBuf,
    timeout: Duration,
    cooldown: Duration,
    local_only: bool,
}

impl RemoteFeed {
    pub fn new(url: Option<String>, cache_path: PathBuf) -> Self {
        Self {
            url,
            cache_path,
            timeout: Duration::from_secs(10),
            cooldown: Duration::from_secs(3600),
            local_only: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_local_only(mut self, local_only: bool) -> Self {
        self.local_only = local_only;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn fetch_text(&self) -> Result<String, FeedError> {
        self.fetch_parsed(|text| Some(text.to_string()))
    }

    /// Fetches and parses. Downloads that fail to parse are not cached.
    pub fn fetch_parsed<T, F>(&self, parse: F) -> Result<T, FeedError>
    where
        F: Fn(&str) -> Option<T>,
    {
        if self.local_only || self.cache_is_fresh() {
            if let Some(value) = self.read_cache().as_deref().and_then(&parse) {
                log::debug!("Using cached {}", self.cache_path.display());
                return Ok(value);
            }
        }

        if !self.local_only {
            match self.download() {
                Ok(text) => match parse(&text) {
                    Some(value) => {
                        self.write_cache(&text);
                        return Ok(value);
                    }
                    None => log::warn!("Downloaded content was rejected, falling back to cache"),
                },
                Err(e) => log::warn!("Download failed ({}), falling back to cache", e),
            }
        }

        self.read_cache()
            .as_deref()
            .and_then(&parse)
            .ok_or_else(|| FeedError::NetworkUnavailable(self.describe()))
    }

    fn download(&self) -> Result<String, FeedError> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| FeedError::NetworkUnavailable(self.describe()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client.get(url).send()?;

        if response.status() != StatusCode::OK {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        Ok(response.text()?)
    }

    fn cache_is_fresh(&self) -> bool {
        fs::metadata(&self.cache_path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .map(|age| age < self.cooldown)
            .unwrap_or(false)
    }

    fn read_cache(&self) -> Option<String> {
        fs::read_to_string(&self.cache_path).ok()
    }

    fn write_cache(&self, text: &str) {
        let result = self
            .cache_path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| fs::write(&self.cache_path, text));

        if let Err(e) = result {
            log::warn!("Could not update cache {}: {}", self.cache_path.display(), e);
        }
    }

    fn describe(&self) -> String {
        self.url.clone().unwrap_or_else(|| self.cache_path.display().to_string())
    }
}

/// Supplies the achievements block spliced into repaired saves.
pub trait AchievementsSource {
    fn fetch_latest_achievements_block(&self) -> Option<String>;
}

pub struct FeedAchievements {
    feed: RemoteFeed,
}

impl FeedAchievements {
    pub fn new(feed: RemoteFeed) -> Self {
        Self { feed }
    }
}

impl AchievementsSource for FeedAchievements {
    fn fetch_latest_achievements_block(&self) -> Option<String> {
        let block = self
            .feed
            .fetch_parsed(|text| Some(text.trim_end().to_string()).filter(|b| b.contains('{')));

        match block {
            Ok(block) => Some(block),
            Err(e) => {
                log::error!("Achievements unavailable: {}", e);
                None
            }
        }
    }
}

/// A fixed block, used when the text is already at hand.
pub struct StaticAchievements(pub String);

impl AchievementsSource for StaticAchievements {
    fn fetch_latest_achievements_block(&self) -> Option<String> {
        Some(self.0.clone()).filter(|b| !b.trim().is_empty())
    }
}

/// Loads the pattern catalog from its feed.
pub struct PatternSource {
    feed: RemoteFeed,
}

impl PatternSource {
    pub fn new(feed: RemoteFeed) -> Self {
        Self { feed }
    }

    pub fn load_catalog(&self) -> Result<PatchCatalog, FeedError> {
        self.feed.fetch_parsed(|text| match PatchCatalog::from_json(text) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                log::warn!("Pattern catalog rejected: {}", e);
                None
            }
        })
    }
}
