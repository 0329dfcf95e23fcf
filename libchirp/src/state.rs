//! On-disk state for incremental update checks
//!
//! The bot runs as a short-lived process, so everything it needs to
//! remember between invocations lives in tiny flat files under one state
//! directory: a last-seen marker per marker-tracked feature, a
//! line-delimited list of known follower ids, a table of last-observed
//! favorite counts, and the cadence countdown.
//!
//! Loads never fail: a missing file is the empty/default state, and an
//! unparseable file is logged and replaced by the default on the next
//! save. Saves rewrite the whole file. Concurrent writers are not
//! supported; callers must ensure one invocation at a time.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StateError};
use crate::types::{StatusId, UserId};

const FOLLOWERS_FILE: &str = "followers.txt";
const FAVORITES_FILE: &str = "favorites.toml";
const CADENCE_FILE: &str = "cadence.toml";

/// Update-check features that track a last-seen marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Retweets,
    Replies,
    DirectMessages,
}

impl Feature {
    fn file_name(self) -> &'static str {
        match self {
            Feature::Retweets => "retweets.toml",
            Feature::Replies => "replies.toml",
            Feature::DirectMessages => "direct_messages.toml",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feature::Retweets => write!(f, "retweets"),
            Feature::Replies => write!(f, "replies"),
            Feature::DirectMessages => write!(f, "direct_messages"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MarkerFile {
    latest_seen: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CadenceFile {
    remaining: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    counts: BTreeMap<String, u64>,
}

pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Last-seen marker for a feature, if one has ever been recorded.
    pub fn load_marker(&self, feature: Feature) -> Option<StatusId> {
        let marker = self
            .read_toml::<MarkerFile>(&self.dir.join(feature.file_name()))
            .map(|record| StatusId(record.latest_seen));
        match marker {
            Some(id) => debug!(%feature, %id, "loaded marker"),
            None => debug!(%feature, "no marker recorded"),
        }
        marker
    }

    pub fn save_marker(&self, feature: Feature, id: StatusId) -> Result<()> {
        debug!(%feature, %id, "saving marker");
        self.write_toml(
            &self.dir.join(feature.file_name()),
            &MarkerFile { latest_seen: id.0 },
        )
    }

    /// Follower ids seen on any previous run. Unparseable lines are
    /// skipped rather than discarding the whole set.
    pub fn load_follower_set(&self) -> BTreeSet<UserId> {
        let path = self.dir.join(FOLLOWERS_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no followers file");
                return BTreeSet::new();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read followers file, treating as empty");
                return BTreeSet::new();
            }
        };

        let mut known = BTreeSet::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<u64>() {
                Ok(id) => {
                    known.insert(UserId(id));
                }
                Err(_) => warn!(path = %path.display(), line = %line, "skipping unparseable follower id"),
            }
        }
        debug!(count = known.len(), "known followers loaded");
        known
    }

    pub fn save_follower_set(&self, followers: &BTreeSet<UserId>) -> Result<()> {
        self.ensure_dir()?;
        let mut content = String::new();
        for id in followers {
            content.push_str(&id.0.to_string());
            content.push('\n');
        }
        std::fs::write(self.dir.join(FOLLOWERS_FILE), content).map_err(StateError::Io)?;
        Ok(())
    }

    /// Post id to last-observed favorite count.
    pub fn load_favorite_ledger(&self) -> BTreeMap<StatusId, u64> {
        let path = self.dir.join(FAVORITES_FILE);
        let Some(file) = self.read_toml::<LedgerFile>(&path) else {
            return BTreeMap::new();
        };

        let mut ledger = BTreeMap::new();
        for (key, count) in file.counts {
            match key.parse::<u64>() {
                Ok(id) => {
                    ledger.insert(StatusId(id), count);
                }
                Err(_) => warn!(path = %path.display(), key = %key, "skipping unparseable ledger entry"),
            }
        }
        ledger
    }

    pub fn save_favorite_ledger(&self, ledger: &BTreeMap<StatusId, u64>) -> Result<()> {
        let counts = ledger
            .iter()
            .map(|(id, count)| (id.0.to_string(), *count))
            .collect();
        self.write_toml(&self.dir.join(FAVORITES_FILE), &LedgerFile { counts })
    }

    /// Remaining invocations until the next real update check. 0 when the
    /// counter has never been written (so a fresh deployment checks on its
    /// first run).
    pub fn load_cadence_counter(&self) -> u32 {
        self.read_toml::<CadenceFile>(&self.dir.join(CADENCE_FILE))
            .map(|record| record.remaining)
            .unwrap_or(0)
    }

    pub fn save_cadence_counter(&self, remaining: u32) -> Result<()> {
        self.write_toml(&self.dir.join(CADENCE_FILE), &CadenceFile { remaining })
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            debug!(dir = %self.dir.display(), "creating state directory");
            std::fs::create_dir_all(&self.dir).map_err(StateError::Io)?;
        }
        Ok(())
    }

    fn read_toml<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return None;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read state file, treating as empty");
                return None;
            }
        };

        match toml::from_str(&content) {
            Ok(value) => Some(value),
            Err(err) => {
                let corrupt = StateError::Corrupt {
                    path: path.display().to_string(),
                    detail: err.to_string(),
                };
                warn!(error = %corrupt, "falling back to default state");
                None
            }
        }
    }

    fn write_toml<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let encoded = toml::to_string(value).map_err(StateError::Encode)?;
        std::fs::write(path, encoded).map_err(StateError::Io)?;
        Ok(())
    }
}
