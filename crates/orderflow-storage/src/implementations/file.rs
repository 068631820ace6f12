//! File-based storage backend implementation for the orderflow system.
//!
//! This module provides a filesystem implementation of the StorageInterface
//! trait, storing each record as a JSON file on disk. It offers simple
//! persistence without requiring external dependencies.

use crate::{StorageError, StorageFactory, StorageInterface};
use async_trait::async_trait;
use orderflow_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::path::PathBuf;
use tokio::fs;

/// File-based storage implementation.
///
/// Keys are sanitized to filesystem-safe names and stored as individual
/// `.json` files below the base path. Writes go through a temporary file
/// followed by a rename so a crash never leaves a half-written record.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	///
	/// Sanitizes the key by replacing problematic characters and
	/// appending a .json extension.
	fn get_file_path(&self, key: &str) -> PathBuf {
		self.base_path.join(format!("{}.json", sanitize_key(key)))
	}
}

/// Replaces characters that are unsafe in file names.
fn sanitize_key(key: &str) -> String {
	key.replace(['/', ':'], "_")
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		// Create parent directory if it doesn't exist
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		// Write atomically by writing to temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.get_file_path(key);
		Ok(path.exists())
	}

	async fn list_bytes(&self, prefix: &str) -> Result<Vec<Vec<u8>>, StorageError> {
		let file_prefix = sanitize_key(prefix);

		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			// A base path that was never written to is an empty namespace
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut items = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("json")) {
				continue;
			}
			let matches_prefix = path
				.file_stem()
				.and_then(|stem| stem.to_str())
				.is_some_and(|stem| stem.starts_with(&file_prefix));
			if !matches_prefix {
				continue;
			}

			let data = fs::read(&path)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
			items.push(data);
		}
		Ok(items)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![], // No required fields
			vec![Field::new("storage_path", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/orders")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/orders")
		.to_string();

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry entry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn storage() -> (TempDir, FileStorage) {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());
		(dir, storage)
	}

	#[tokio::test]
	async fn test_basic_operations() {
		let (_dir, storage) = storage();

		let key = "orders:abc";
		let value = b"{\"id\":\"abc\"}".to_vec();
		storage.set_bytes(key, value.clone()).await.unwrap();

		let retrieved = storage.get_bytes(key).await.unwrap();
		assert_eq!(retrieved, value);

		assert!(storage.exists(key).await.unwrap());

		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());
		assert!(matches!(
			storage.get_bytes(key).await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_delete_missing_key_is_noop() {
		let (_dir, storage) = storage();
		storage.delete("orders:missing").await.unwrap();
	}

	#[tokio::test]
	async fn test_list_by_prefix() {
		let (_dir, storage) = storage();

		storage.set_bytes("orders:1", b"a".to_vec()).await.unwrap();
		storage.set_bytes("orders:2", b"b".to_vec()).await.unwrap();
		storage.set_bytes("other:1", b"c".to_vec()).await.unwrap();

		let listed = storage.list_bytes("orders:").await.unwrap();
		assert_eq!(listed.len(), 2);
	}

	#[tokio::test]
	async fn test_list_missing_base_path() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().join("never-created"));

		let listed = storage.list_bytes("orders:").await.unwrap();
		assert!(listed.is_empty());
	}

	#[tokio::test]
	async fn test_persistence_across_instances() {
		let dir = TempDir::new().unwrap();
		{
			let storage = FileStorage::new(dir.path().to_path_buf());
			storage
				.set_bytes("orders:1", b"persisted".to_vec())
				.await
				.unwrap();
		}

		let storage = FileStorage::new(dir.path().to_path_buf());
		let retrieved = storage.get_bytes("orders:1").await.unwrap();
		assert_eq!(retrieved, b"persisted".to_vec());
	}

	#[test]
	fn test_config_schema_rejects_bad_path_type() {
		let config: toml::Value = toml::from_str("storage_path = 42").unwrap();
		assert!(FileStorageSchema.validate(&config).is_err());
	}
}
