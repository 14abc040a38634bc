// File: src/persistence.rs
use crate::error::StoreError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const MESSAGES_FILE: &str = "messages.jsonl";
const SETTINGS_FILE: &str = "settings.json";

/// Durable storage for what each community has said.
///
/// The model never calls this on its own except for `delete_occurrences`;
/// the registry drives the rest.
pub trait MessageStore: Send + Sync {
    fn append_message(&self, community: &str, text: &str) -> Result<(), StoreError>;

    /// Every stored message in arrival order, or `None` if nothing was ever stored.
    fn load_all(&self, community: &str) -> Result<Option<Vec<String>>, StoreError>;

    /// Removes every stored copy of `message`. Returns true if any were removed.
    fn delete_occurrences(&self, message: &str, community: &str) -> Result<bool, StoreError>;

    fn delete_community(&self, community: &str) -> Result<(), StoreError>;

    fn has_data(&self, community: &str) -> bool;

    fn reply_rate(&self, community: &str) -> Result<Option<u32>, StoreError>;

    fn save_reply_rate(&self, rate: u32, community: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Settings {
    reply_rate: Option<u32>,
}

/// One directory per community under `root`: an append-only
/// `messages.jsonl` (one JSON string per line) and a `settings.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn community_dir(&self, community: &str) -> Result<PathBuf, StoreError> {
        let valid = !community.is_empty()
            && community
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidCommunityId(community.to_string()));
        }
        Ok(self.root.join(community))
    }

    fn messages_path(&self, community: &str) -> Result<PathBuf, StoreError> {
        Ok(self.community_dir(community)?.join(MESSAGES_FILE))
    }

    fn read_settings(&self, community: &str) -> Result<Settings, StoreError> {
        let path = self.community_dir(community)?.join(SETTINGS_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_messages(path: &Path) -> Result<Vec<String>, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        let mut messages = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<String>(&line) {
                Ok(message) => messages.push(message),
                Err(e) => warn!("Skipping corrupt line {} in {:?}: {}", n + 1, path, e),
            }
        }
        Ok(messages)
    }

    /// Replaces `path` with `messages` through a temp file in the same
    /// directory, so readers never observe a half-written file.
    fn write_atomic(path: &Path, messages: &[String]) -> Result<(), StoreError> {
        let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            for message in messages {
                serde_json::to_writer(&mut writer, message)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl MessageStore for FileStore {
    fn append_message(&self, community: &str, text: &str) -> Result<(), StoreError> {
        let path = self.messages_path(community)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(text)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn load_all(&self, community: &str) -> Result<Option<Vec<String>>, StoreError> {
        let path = self.messages_path(community)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::read_messages(&path)?))
    }

    fn delete_occurrences(&self, message: &str, community: &str) -> Result<bool, StoreError> {
        let path = self.messages_path(community)?;
        if !path.exists() {
            return Ok(false);
        }
        let mut messages = Self::read_messages(&path)?;
        let before = messages.len();
        messages.retain(|m| m != message);
        let removed = before - messages.len();
        if removed == 0 {
            return Ok(false);
        }
        Self::write_atomic(&path, &messages)?;
        debug!("Removed {} stored copies from {}", removed, community);
        Ok(true)
    }

    fn delete_community(&self, community: &str) -> Result<(), StoreError> {
        let dir = self.community_dir(community)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn has_data(&self, community: &str) -> bool {
        self.messages_path(community)
            .ok()
            .and_then(|path| fs::metadata(path).ok())
            .map(|meta| meta.len() > 0)
            .unwrap_or(false)
    }

    fn reply_rate(&self, community: &str) -> Result<Option<u32>, StoreError> {
        Ok(self.read_settings(community)?.reply_rate)
    }

    fn save_reply_rate(&self, rate: u32, community: &str) -> Result<(), StoreError> {
        let dir = self.community_dir(community)?;
        fs::create_dir_all(&dir)?;
        let mut settings = self.read_settings(community)?;
        settings.reply_rate = Some(rate);

        let temp_file = NamedTempFile::new_in(&dir)?;
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, &settings)?;
        writer.flush()?;
        drop(writer);
        temp_file.persist(dir.join(SETTINGS_FILE)).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.load_all("123").unwrap(), None);
        assert!(!store.has_data("123"));

        store.append_message("123", "hello there").unwrap();
        store.append_message("123", "two\nlines").unwrap();
        assert!(store.has_data("123"));
        assert_eq!(
            store.load_all("123").unwrap(),
            Some(vec!["hello there".to_string(), "two\nlines".to_string()])
        );
    }

    #[test]
    fn test_delete_occurrences() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        for m in ["the cat sat", "the dog sat", "the cat sat"] {
            store.append_message("g", m).unwrap();
        }

        assert!(store.delete_occurrences("the cat sat", "g").unwrap());
        assert!(!store.delete_occurrences("the cat sat", "g").unwrap());
        assert!(!store.delete_occurrences("anything", "missing").unwrap());
        assert_eq!(store.load_all("g").unwrap(), Some(vec!["the dog sat".to_string()]));
    }

    #[test]
    fn test_reply_rate_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.reply_rate("g").unwrap(), None);
        store.save_reply_rate(3, "g").unwrap();
        store.save_reply_rate(7, "g").unwrap();
        assert_eq!(store.reply_rate("g").unwrap(), Some(7));
    }

    #[test]
    fn test_delete_community() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.append_message("g", "a b").unwrap();
        store.save_reply_rate(2, "g").unwrap();

        store.delete_community("g").unwrap();
        store.delete_community("g").unwrap();
        assert_eq!(store.load_all("g").unwrap(), None);
        assert_eq!(store.reply_rate("g").unwrap(), None);
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        for id in ["", "..", "a/b", "a b"] {
            assert!(matches!(
                store.append_message(id, "x y"),
                Err(StoreError::InvalidCommunityId(_))
            ));
        }
    }

    #[test]
    fn test_skips_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.append_message("g", "good one").unwrap();
        let path = dir.path().join("g").join(MESSAGES_FILE);
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();
        store.append_message("g", "good two").unwrap();

        assert_eq!(
            store.load_all("g").unwrap(),
            Some(vec!["good one".to_string(), "good two".to_string()])
        );
    }
}
