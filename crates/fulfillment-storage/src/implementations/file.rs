//! File-based storage backend implementation for the fulfillment service.
//!
//! Records are stored as one JSON file per key under
//! `<base>/<namespace>/<id>.json`. Individual writes go through a temp file
//! and rename, so a crash never leaves a half-written record. A single
//! writer mutex serializes mutations, which is what makes the guarded
//! commit atomic for this backend.

use crate::{StorageError, StorageInterface, WriteOp};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
	/// Serializes all mutations, including guarded commits.
	write_lock: Mutex<()>,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self {
			base_path,
			write_lock: Mutex::new(()),
		}
	}

	/// Replaces characters that cannot appear in file names.
	fn sanitize(part: &str) -> String {
		part.replace(['/', ':', '\\'], "_")
	}

	/// Converts a storage key to a filesystem path.
	///
	/// Keys have the form `namespace:id`; the namespace becomes a
	/// directory and the id a sanitized `.json` file name.
	fn get_file_path(&self, key: &str) -> PathBuf {
		match key.split_once(':') {
			Some((namespace, id)) => self
				.base_path
				.join(Self::sanitize(namespace))
				.join(format!("{}.json", Self::sanitize(id))),
			None => self.base_path.join(format!("{}.json", Self::sanitize(key))),
		}
	}

	/// Reads the bytes at `key`, or `None` if the file does not exist.
	async fn read_optional(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
		match fs::read(self.get_file_path(key)).await {
			Ok(data) => Ok(Some(data)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	/// Writes bytes atomically by writing to a temp file then renaming.
	async fn write_file(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	/// Removes the file at `key`, treating a missing file as success.
	async fn remove_file(&self, key: &str) -> Result<(), StorageError> {
		match fs::remove_file(self.get_file_path(key)).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		self.read_optional(key).await?.ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let _guard = self.write_lock.lock().await;
		self.write_file(key, &value).await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let _guard = self.write_lock.lock().await;
		self.remove_file(key).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self.get_file_path(key).exists())
	}

	async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
		let (namespace, id_prefix) = prefix.split_once(':').unwrap_or((prefix, ""));
		let dir = self.base_path.join(Self::sanitize(namespace));
		let id_prefix = Self::sanitize(id_prefix);

		let mut entries = Vec::new();
		let mut read_dir = match fs::read_dir(&dir).await {
			Ok(read_dir) => read_dir,
			// A namespace nothing was written to yet is just empty.
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		while let Some(entry) = read_dir
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("json")) {
				continue;
			}
			let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
				continue;
			};
			if !stem.starts_with(&id_prefix) {
				continue;
			}

			let data = fs::read(&path)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
			entries.push((format!("{}:{}", namespace, stem), data));
		}

		entries.sort_by(|a, b| a.0.cmp(&b.0));
		Ok(entries)
	}

	async fn compare_and_swap(
		&self,
		guard_key: &str,
		expected: Option<&[u8]>,
		ops: Vec<WriteOp>,
	) -> Result<bool, StorageError> {
		let _guard = self.write_lock.lock().await;

		let current = self.read_optional(guard_key).await?;
		if current.as_deref() != expected {
			tracing::debug!(guard_key, "guarded commit rejected by stale snapshot");
			return Ok(false);
		}

		for op in &ops {
			match op {
				WriteOp::Put { key, value } => self.write_file(key, value).await?,
				WriteOp::Delete { key } => self.remove_file(key).await?,
			}
		}
		Ok(true)
	}
}
