use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;

use crate::paths;
use crate::translation::TranslationRequest;

/// On-disk cache of finished translations.
///
/// A connection is opened per operation, so the manager can be shared
/// freely between tasks.
#[derive(Debug)]
pub struct CacheManager {
    db_path: PathBuf,
}

impl CacheManager {
    /// Opens the cache in the user's cache directory.
    pub fn new() -> Result<Self> {
        let cache_dir = paths::cache_dir()?;

        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;

        Self::open(cache_dir.join("translations.db"))
    }

    /// Opens (creating if needed) the cache database at `db_path`.
    pub fn open(db_path: PathBuf) -> Result<Self> {
        let manager = Self { db_path };
        manager.init_db()?;
        Ok(manager)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cache_key TEXT UNIQUE NOT NULL,
                source_text TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                source_language TEXT NOT NULL,
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

    pub fn get(&self, request: &TranslationRequest) -> Result<Option<String>> {
        let cache_key = request.cache_key();
        let conn = self.connect()?;

        let result: Option<String> = conn
            .query_row(
                "SELECT translated_text FROM translations WHERE cache_key = ?1",
                [&cache_key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query translation cache")?;

        if result.is_some() {
            conn.execute(
                "UPDATE translations SET accessed_at = CURRENT_TIMESTAMP WHERE cache_key = ?1",
                [&cache_key],
            )?;
        }

        Ok(result)
    }

    pub fn put(&self, request: &TranslationRequest, translated_text: &str) -> Result<()> {
        let cache_key = request.cache_key();
        let prompt_hash = TranslationRequest::prompt_hash();
        let conn = self.connect()?;

        conn.execute(
            "INSERT OR REPLACE INTO translations
             (cache_key, source_text, translated_text, source_language, target_language,
              model, endpoint, prompt_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            [
                &cache_key,
                &request.source_text,
                translated_text,
                &request.source_language,
                &request.target_language,
                &request.model,
                &request.endpoint,
                &prompt_hash,
            ],
        )
        .context("Failed to insert translation into cache")?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_manager(temp_dir: &TempDir) -> CacheManager {
        CacheManager::open(temp_dir.path().join("translations.db")).unwrap()
    }

    fn request(text: &str, source: &str, target: &str, endpoint: &str) -> TranslationRequest {
        TranslationRequest {
            source_text: text.to_string(),
            source_language: source.to_string(),
            target_language: target.to_string(),
            model: "gemma3:12b".to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    const LOCAL: &str = "http://localhost:11434";

    #[test]
    fn test_cache_miss() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        let result = manager.get(&request("hello", "en", "ka", LOCAL)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_cache_hit() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        let request = request("hello", "en", "ka", LOCAL);

        manager.put(&request, "გამარჯობა").unwrap();

        assert_eq!(manager.get(&request).unwrap(), Some("გამარჯობა".to_string()));
    }

    #[test]
    fn test_directions_are_cached_separately() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        let en_ka = request("mama", "en", "ka", LOCAL);
        let en_ru = request("mama", "en", "ru", LOCAL);
        let ka_en = request("mama", "ka", "en", LOCAL);

        manager.put(&en_ka, "დედა").unwrap();
        manager.put(&en_ru, "мама").unwrap();

        assert_eq!(manager.get(&en_ka).unwrap(), Some("დედა".to_string()));
        assert_eq!(manager.get(&en_ru).unwrap(), Some("мама".to_string()));
        assert_eq!(manager.get(&ka_en).unwrap(), None);
    }

    #[test]
    fn test_cache_key_includes_endpoint() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        let local = request("hello", "en", "ka", LOCAL);
        let remote = request("hello", "en", "ka", "http://production:11434");

        manager.put(&local, "Local Translation").unwrap();
        manager.put(&remote, "Production Translation").unwrap();

        assert_eq!(
            manager.get(&local).unwrap(),
            Some("Local Translation".to_string())
        );
        assert_eq!(
            manager.get(&remote).unwrap(),
            Some("Production Translation".to_string())
        );
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let temp_dir = TempDir::new().unwrap();
        let request = request("hello", "en", "ru", LOCAL);

        create_test_manager(&temp_dir).put(&request, "привет").unwrap();

        let reopened = create_test_manager(&temp_dir);
        assert_eq!(reopened.get(&request).unwrap(), Some("привет".to_string()));
    }
}
