//! Stockage clé/valeur persistant, avec sauvegarde en JSON

use log::{error, info, warn};
use std::{
    collections::HashMap,
    fs::{create_dir_all, rename, File},
    io::{self, ErrorKind::NotFound},
    path::PathBuf,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Store is corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// Un stockage de chaînes indexées par clé
pub trait PersistentStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Stockage sauvegardé dans un fichier JSON à chaque écriture
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl JsonFileStore {
    /// Ouvre le fichier, ou le crée s'il n'existe pas.
    /// Un fichier illisible est remplacé par un stockage vide.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        match File::open(&path) {
            Ok(f) => match serde_json::from_reader(f) {
                Ok(entries) => Ok(Self { path, entries }),
                Err(e) => {
                    warn!("Session file {} is corrupted ({e}), starting empty", path.display());
                    Self::create(path)
                }
            },

            // Fichier non existant, on le crée
            Err(not_found) if not_found.kind() == NotFound => {
                info!("Session file not found, creating {}", path.display());
                Self::create(path)
            }

            Err(other) => Err(other.into()),
        }
    }

    fn create(path: PathBuf) -> Result<Self, StoreError> {
        let store = Self {
            path,
            entries: HashMap::new(),
        };
        store.save()?;
        Ok(store)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Écrit dans un fichier temporaire puis le renomme, le fichier
    /// en place n'est jamais tronqué
    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        let file = File::create(&temp)?;
        serde_json::to_writer_pretty(file, &self.entries).inspect_err(|e| {
            error!("Failed to save {}: {e}", self.path.display());
        })?;
        rename(&temp, &self.path)?;
        Ok(())
    }
}

impl PersistentStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

/// Stockage en mémoire, sans persistance
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        temp_dir().join(format!("medirdv-{}", Uuid::new_v4())).join("session.json")
    }

    #[test]
    fn test_open_creates_missing_file() {
        let path = temp_path();
        let store = JsonFileStore::open(path.clone()).unwrap();
        assert!(path.exists(), "Store file was not created");
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path();
        let mut store = JsonFileStore::open(path.clone()).unwrap();
        store.set("token", "abc".into()).unwrap();
        store.set("user", "{}".into()).unwrap();
        store.remove("user").unwrap();

        let reopened = JsonFileStore::open(path).unwrap();
        assert_eq!(reopened.get("token").as_deref(), Some("abc"));
        assert_eq!(reopened.get("user"), None);
    }

    #[test]
    fn test_truncated_file_opens_empty() {
        let path = temp_path();
        create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{\"token\": \"ab").unwrap();

        let store = JsonFileStore::open(path.clone()).expect("Truncated file must not prevent opening");
        assert_eq!(store.get("token"), None);

        // Le contenu illisible a été remplacé
        let reopened = JsonFileStore::open(path).unwrap();
        assert_eq!(reopened.get("token"), None);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let path = temp_path();
        let mut store = JsonFileStore::open(path.clone()).unwrap();
        store.set("token", "abc".into()).unwrap();

        assert!(!store.temp_path().exists(), "Temporary file was left behind");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("abc"));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        store.set("k", "v".into()).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }
}
