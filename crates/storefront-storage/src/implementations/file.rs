//! File-based storage backend implementation.
//!
//! Stores each value as a JSON file on disk, providing simple persistence
//! without external dependencies. Writes go through a temp file followed
//! by a rename so a crash mid-write never leaves a torn value behind.

use crate::{StorageError, StorageFactory, StorageInterface};
use async_trait::async_trait;
use std::path::PathBuf;
use storefront_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use tokio::fs;

/// File-based storage implementation.
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
	/// Sanitizes the key by replacing separator characters and appending
	/// a .json extension.
	fn file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', ':'], "_");
		self.base_path.join(format!("{}.json", safe_key))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		// Write atomically: temp file then rename.
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
		let path = self.file_path(key);

		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.file_path(key);
		match fs::try_exists(&path).await {
			Ok(found) => Ok(found),
			Err(e) => {
				tracing::debug!("Could not stat {:?}: {}", path, e);
				Ok(false)
			}
		}
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![Field::new("storage_path", FieldType::String)], vec![]);
		schema.validate(config)
	}
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: base directory for stored files (required)
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage = FileStorage::new(PathBuf::new());
	storage
		.config_schema()
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let base_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| StorageError::Configuration("storage_path is required".to_string()))?;

	tracing::debug!("File storage ready at {}", base_path);
	Ok(Box::new(FileStorage::new(PathBuf::from(base_path))))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_round_trip_on_disk() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		let key = "orders:a1b2";
		let value = br#"{"status":"pending"}"#.to_vec();
		storage.set_bytes(key, value.clone()).await.unwrap();

		let retrieved = storage.get_bytes(key).await.unwrap();
		assert_eq!(retrieved, value);

		storage.delete(key).await.unwrap();
		assert!(matches!(
			storage.get_bytes(key).await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_keys_are_sanitized() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		storage
			.set_bytes("carts:session:abc", b"{}".to_vec())
			.await
			.unwrap();
		assert!(dir.path().join("carts_session_abc.json").exists());
	}

	#[tokio::test]
	async fn test_factory_requires_storage_path() {
		let config: toml::Value = toml::from_str("").unwrap();
		assert!(create_storage(&config).is_err());

		let config: toml::Value = toml::from_str("storage_path = \"/tmp/storefront\"").unwrap();
		assert!(create_storage(&config).is_ok());
	}
}
