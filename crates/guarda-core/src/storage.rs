use crate::model::ItemRecord;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Nome fixo do blob que guarda a coleção inteira
pub const ITEMS_KEY: &str = "guarda.items";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("erro de IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("erro de serialização: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Armazenamento chave-valor de blobs de texto, lidos e gravados inteiros.
pub trait BlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: BlobStore + ?Sized> BlobStore for &T {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

/// Um arquivo `<chave>.json` por blob dentro de um diretório.
///
/// Sem proteção contra escrita parcial nem versionamento: o último a
/// escrever vence.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "blob ainda não existe");
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "blob lido");
        Ok(Some(data))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        fs::write(&path, value)?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "blob gravado");
        Ok(())
    }
}

/// Blobs só em memória (testes e execuções sem disco).
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RefCell<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .blobs
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs.borrow().get(key).cloned()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Serializa a coleção inteira (array JSON, sem campo de versão)
pub fn encode_items(items: &[ItemRecord]) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(items)?)
}

pub fn decode_items(blob: &str) -> Result<Vec<ItemRecord>, StorageError> {
    Ok(serde_json::from_str(blob)?)
}
