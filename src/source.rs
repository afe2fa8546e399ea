//! Cached access to the remote hiring spreadsheet.
//!
//! Each loader owns one memo with two levels: a process-wide slot, then a
//! JSON file under the cache directory so separate CLI runs share the
//! window. Freshness is measured from the original fetch time on both
//! levels. Failures are never stored, so the next call retries from scratch.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::graph_api::drive::SpreadsheetLocation;
use crate::graph_api::GraphClient;
use crate::sheet::Table;
use crate::types::{Config, DASHBOARD_CACHE_TTL_SECS, EVALUATION_CACHE_TTL_SECS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemoEntry {
    key: String,
    fetched_at: DateTime<Utc>,
    table: Table,
}

impl MemoEntry {
    fn is_fresh(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.key == key
            && (now - self.fetched_at)
                .to_std()
                .map(|age| age < ttl)
                .unwrap_or(false)
    }
}

/// Time-boxed cache of the last good table, in memory and on disk.
pub struct Memo {
    ttl: Duration,
    file_name: &'static str,
    slot: Mutex<Option<MemoEntry>>,
}

impl Memo {
    pub const fn new(ttl: Duration, file_name: &'static str) -> Self {
        Self {
            ttl,
            file_name,
            slot: Mutex::new(None),
        }
    }

    /// Cached table for `key` if still fresh in memory.
    pub fn get(&self, key: &str) -> Option<Table> {
        let guard = self.slot.lock();
        guard
            .as_ref()
            .filter(|entry| entry.is_fresh(key, self.ttl, Utc::now()))
            .map(|entry| entry.table.clone())
    }

    pub fn store(&self, key: &str, table: Table) {
        self.remember(MemoEntry {
            key: key.to_string(),
            fetched_at: Utc::now(),
            table,
        });
    }

    fn remember(&self, entry: MemoEntry) {
        *self.slot.lock() = Some(entry);
    }

    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Fresh entry for `key` from `<dir>/<file_name>`. Unreadable, stale or
    /// foreign files are ignored.
    fn read_disk(&self, dir: &Path, key: &str) -> Option<MemoEntry> {
        let path = dir.join(self.file_name);
        let raw = std::fs::read_to_string(&path).ok()?;
        let entry: MemoEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Ignoring unreadable cache file {}: {}", path.display(), e);
                return None;
            }
        };
        entry.is_fresh(key, self.ttl, Utc::now()).then_some(entry)
    }

    fn write_disk(&self, dir: &Path, entry: &MemoEntry) {
        let path = dir.join(self.file_name);
        let result = std::fs::create_dir_all(dir)
            .map_err(|e| e.to_string())
            .and_then(|_| serde_json::to_vec(entry).map_err(|e| e.to_string()))
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(|e| e.to_string()));
        if let Err(e) = result {
            log::warn!("Could not write cache file {}: {}", path.display(), e);
        }
    }

    /// Return the fresh cached value or run `fetch`, caching only `Ok`.
    ///
    /// Memory is checked first, then `cache_dir` when given. `force` skips
    /// both lookups but still stores the new result. The lock is released
    /// before `fetch` is awaited.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        force: bool,
        cache_dir: Option<&Path>,
        fetch: F,
    ) -> Result<Table, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Table, E>>,
    {
        if !force {
            if let Some(table) = self.get(key) {
                log::debug!("Spreadsheet cache hit for '{}'", key);
                return Ok(table);
            }
            if let Some(entry) = cache_dir.and_then(|dir| self.read_disk(dir, key)) {
                log::debug!(
                    "Spreadsheet disk cache hit for '{}' (fetched {})",
                    key,
                    entry.fetched_at
                );
                let table = entry.table.clone();
                self.remember(entry);
                return Ok(table);
            }
        }

        let table = fetch().await?;
        let entry = MemoEntry {
            key: key.to_string(),
            fetched_at: Utc::now(),
            table: table.clone(),
        };
        if let Some(dir) = cache_dir {
            self.write_disk(dir, &entry);
        }
        self.remember(entry);
        Ok(table)
    }
}

static DASHBOARD_MEMO: Memo = Memo::new(
    Duration::from_secs(DASHBOARD_CACHE_TTL_SECS),
    "dashboard.json",
);
static EVALUATION_MEMO: Memo = Memo::new(
    Duration::from_secs(EVALUATION_CACHE_TTL_SECS),
    "evaluation.json",
);

fn location(config: &Config, query: &str) -> SpreadsheetLocation {
    SpreadsheetLocation {
        host: config.sharepoint.host.clone(),
        site_path: config.sharepoint.site_path.clone(),
        query: query.to_string(),
    }
}

async fn load_through(memo: &Memo, config: &Config, query: &str, force: bool) -> Result<Table, AppError> {
    let location = location(config, query);
    let key = format!("{}{}|{}", location.host, location.site_path, location.query);
    let cache_dir = match config.cache_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            log::warn!("Spreadsheet disk cache disabled: {}", e);
            None
        }
    };
    let client = GraphClient::from_config(config);
    let (client, location) = (&client, &location);

    memo.get_or_fetch(&key, force, cache_dir.as_deref(), move || async move {
        client.fetch_spreadsheet(location).await.map_err(|e| {
            log::error!("Failed to load spreadsheet '{}': {}", location.query, e);
            AppError::from(e)
        })
    })
    .await
}

/// Hiring spreadsheet for the dashboard (5-minute window).
pub async fn load_hiring_table(config: &Config, force: bool) -> Result<Table, AppError> {
    load_through(&DASHBOARD_MEMO, config, &config.sharepoint.search_query, force).await
}

/// Spreadsheet scanned for evaluation eligibility (1-hour window).
pub async fn load_evaluation_table(config: &Config, force: bool) -> Result<Table, AppError> {
    load_through(
        &EVALUATION_MEMO,
        config,
        config.sharepoint.evaluation_query(),
        force,
    )
    .await
}
