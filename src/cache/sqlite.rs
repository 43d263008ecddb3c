use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::paths;

/// Everything that determines a translation of one unit's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub source_text: String,
    pub target_language: String,
    pub model: String,
    pub endpoint: String,
    pub preserve_terms: Vec<String>,
    pub context: Option<String>,
    pub prompt_hash: String,
}

impl CacheKey {
    /// SHA-256 over every field, hex encoded.
    pub fn digest(&self) -> String {
        let cache_input = serde_json::json!({
            "source_text": self.source_text,
            "target_language": self.target_language,
            "model": self.model,
            "endpoint": self.endpoint,
            "preserve_terms": self.preserve_terms,
            "context": self.context,
            "prompt_hash": self.prompt_hash
        });

        let mut hasher = Sha256::new();
        hasher.update(cache_input.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

pub struct CacheManager {
    db_path: PathBuf,
}

impl CacheManager {
    /// Opens the cache at its default location under the XDG cache dir.
    pub fn new() -> Result<Self> {
        Self::at(paths::cache_dir()?.join("translations.db"))
    }

    /// Opens (creating if needed) a cache database at `db_path`.
    pub fn at(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create cache directory: {}", dir.display())
            })?;
        }

        let manager = Self { db_path };
        manager.init_db()?;

        Ok(manager)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cache_key TEXT UNIQUE NOT NULL,
                source_text TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                target_language TEXT NOT NULL,
                model TEXT NOT NULL,
                endpoint TEXT NOT NULL,
                prompt_hash TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                accessed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )
        .context("Failed to create translations table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cache_key ON translations(cache_key)",
            [],
        )
        .context("Failed to create index")?;

        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open cache database: {}", self.db_path.display()))
    }

    pub fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let cache_key = key.digest();
        let conn = self.connect()?;

        let result: Option<String> = conn
            .query_row(
                "SELECT translated_text FROM translations WHERE cache_key = ?1",
                [&cache_key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read translation from cache")?;

        if result.is_some() {
            conn.execute(
                "UPDATE translations SET accessed_at = CURRENT_TIMESTAMP WHERE cache_key = ?1",
                [&cache_key],
            )?;
        }

        Ok(result)
    }

    pub fn put(&self, key: &CacheKey, translated_text: &str) -> Result<()> {
        let cache_key = key.digest();
        let conn = self.connect()?;

        conn.execute(
            "INSERT OR REPLACE INTO translations
             (cache_key, source_text, translated_text, target_language, model, endpoint, prompt_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            [
                &cache_key,
                &key.source_text,
                translated_text,
                &key.target_language,
                &key.model,
                &key.endpoint,
                &key.prompt_hash,
            ],
        )
        .context("Failed to insert translation into cache")?;

        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))
            .context("Failed to count cached translations")?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
