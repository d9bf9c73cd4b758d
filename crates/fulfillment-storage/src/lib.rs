//! Storage module for the order fulfillment system.
//!
//! This module provides abstractions for persistent storage of fulfillment
//! data, supporting different backend implementations such as in-memory or
//! file-based storage. Records are namespaced key-value blobs; the one
//! concurrency primitive every backend must provide is a guarded batch
//! commit, which the state machine uses to make order transitions a single
//! atomic check-and-set.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

pub use implementations::file::FileStorage;
pub use implementations::memory::MemoryStorage;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// A single write in a guarded batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
	/// Insert or overwrite the value at `key`.
	Put { key: String, value: Vec<u8> },
	/// Remove the value at `key`, if present.
	Delete { key: String },
}

impl WriteOp {
	/// Builds a `Put` for a serializable record under `namespace:id`.
	pub fn put<T: Serialize>(namespace: &str, id: &str, data: &T) -> Result<Self, StorageError> {
		let value =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		Ok(WriteOp::Put {
			key: compose_key(namespace, id),
			value,
		})
	}

	/// Builds a `Delete` for the record under `namespace:id`.
	pub fn delete(namespace: &str, id: &str) -> Self {
		WriteOp::Delete {
			key: compose_key(namespace, id),
		}
	}
}

/// Joins a namespace and id into a storage key.
fn compose_key(namespace: &str, id: &str) -> String {
	format!("{}:{}", namespace, id)
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the fulfillment system. It provides basic key-value
/// operations plus prefix scanning and a guarded atomic batch commit.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns all `(key, value)` pairs whose key starts with `prefix`.
	async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError>;

	/// Atomically applies `ops` if `guard_key` still holds `expected`.
	///
	/// `expected` of `None` requires the guard key to be absent, which
	/// turns the commit into an insert-if-absent. Returns `false` without
	/// applying anything when the guard does not match, so callers can
	/// detect that they lost a race and re-read.
	async fn compare_and_swap(
		&self,
		guard_key: &str,
		expected: Option<&[u8]>,
		ops: Vec<WriteOp>,
	) -> Result<bool, StorageError>;
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed data with
/// automatic serialization/deserialization.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Stores a serializable value.
	///
	/// The namespace and id are combined to form a unique key.
	/// The data is serialized to JSON before storage.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&compose_key(namespace, id), bytes).await
	}

	/// Retrieves and deserializes a value from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&compose_key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Retrieves a value together with the raw snapshot bytes it was
	/// decoded from. The snapshot is the `expected` guard for a later
	/// [`StorageService::compare_and_swap`] on the same record.
	pub async fn retrieve_with_raw<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<(T, Vec<u8>), StorageError> {
		let bytes = self.backend.get_bytes(&compose_key(namespace, id)).await?;
		let value =
			serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))?;
		Ok((value, bytes))
	}

	/// Retrieves all records in a namespace as `(id, value)` pairs.
	pub async fn retrieve_all<T: DeserializeOwned>(
		&self,
		namespace: &str,
	) -> Result<Vec<(String, T)>, StorageError> {
		let prefix = format!("{}:", namespace);
		let entries = self.backend.scan_prefix(&prefix).await?;

		let mut result = Vec::with_capacity(entries.len());
		for (key, bytes) in entries {
			let id = key[prefix.len()..].to_string();
			let value = serde_json::from_slice(&bytes)
				.map_err(|e| StorageError::Serialization(e.to_string()))?;
			result.push((id, value));
		}
		Ok(result)
	}

	/// Removes a value from storage.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&compose_key(namespace, id)).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&compose_key(namespace, id)).await
	}

	/// Atomically applies `ops` if the record under `namespace:id` still
	/// holds `expected` bytes (`None` = record must be absent).
	pub async fn compare_and_swap(
		&self,
		namespace: &str,
		id: &str,
		expected: Option<&[u8]>,
		ops: Vec<WriteOp>,
	) -> Result<bool, StorageError> {
		self.backend
			.compare_and_swap(&compose_key(namespace, id), expected, ops)
			.await
	}
}
