//! In-memory storage backend implementation for the fulfillment service.
//!
//! This module provides a memory-based implementation of the StorageInterface
//! trait, useful for testing and development scenarios where persistence is
//! not required.

use crate::{StorageError, StorageInterface, WriteOp};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage implementation.
///
/// This implementation stores data in a HashMap in memory, providing fast
/// access but no persistence across restarts. Guarded commits hold the
/// write lock across the check and the writes, which makes them atomic
/// with respect to every other operation on this store.
pub struct MemoryStorage {
	/// The in-memory store protected by a read-write lock.
	store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}

	async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
		let store = self.store.read().await;
		let mut entries: Vec<(String, Vec<u8>)> = store
			.iter()
			.filter(|(key, _)| key.starts_with(prefix))
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect();
		entries.sort_by(|a, b| a.0.cmp(&b.0));
		Ok(entries)
	}

	async fn compare_and_swap(
		&self,
		guard_key: &str,
		expected: Option<&[u8]>,
		ops: Vec<WriteOp>,
	) -> Result<bool, StorageError> {
		let mut store = self.store.write().await;

		let current = store.get(guard_key).map(Vec::as_slice);
		if current != expected {
			return Ok(false);
		}

		for op in ops {
			match op {
				WriteOp::Put { key, value } => {
					store.insert(key, value);
				},
				WriteOp::Delete { key } => {
					store.remove(&key);
				},
			}
		}
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		// Test set and get
		let key = "test_key";
		let value = b"test_value".to_vec();
		storage.set_bytes(key, value.clone()).await.unwrap();

		let retrieved = storage.get_bytes(key).await.unwrap();
		assert_eq!(retrieved, value);

		// Test exists
		assert!(storage.exists(key).await.unwrap());

		// Test delete
		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());

		// Test get after delete
		let result = storage.get_bytes(key).await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_scan_prefix() {
		let storage = MemoryStorage::new();
		storage.set_bytes("orders:1", b"a".to_vec()).await.unwrap();
		storage.set_bytes("orders:2", b"b".to_vec()).await.unwrap();
		storage
			.set_bytes("order_history:1", b"c".to_vec())
			.await
			.unwrap();

		let entries = storage.scan_prefix("orders:").await.unwrap();
		let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(keys, vec!["orders:1", "orders:2"]);
	}

	#[tokio::test]
	async fn test_compare_and_swap_guard() {
		let storage = MemoryStorage::new();
		storage.set_bytes("orders:1", b"v1".to_vec()).await.unwrap();

		// Guard matches: batch applies.
		let applied = storage
			.compare_and_swap(
				"orders:1",
				Some(b"v1"),
				vec![
					WriteOp::Put {
						key: "orders:1".into(),
						value: b"v2".to_vec(),
					},
					WriteOp::Put {
						key: "order_history:1".into(),
						value: b"h".to_vec(),
					},
				],
			)
			.await
			.unwrap();
		assert!(applied);
		assert_eq!(storage.get_bytes("orders:1").await.unwrap(), b"v2");
		assert!(storage.exists("order_history:1").await.unwrap());

		// Stale guard: nothing applies.
		let applied = storage
			.compare_and_swap(
				"orders:1",
				Some(b"v1"),
				vec![WriteOp::Put {
					key: "orders:1".into(),
					value: b"v3".to_vec(),
				}],
			)
			.await
			.unwrap();
		assert!(!applied);
		assert_eq!(storage.get_bytes("orders:1").await.unwrap(), b"v2");
	}

	#[tokio::test]
	async fn test_compare_and_swap_insert_if_absent() {
		let storage = MemoryStorage::new();

		let applied = storage
			.compare_and_swap(
				"assignment_index:c1:v2",
				None,
				vec![WriteOp::Put {
					key: "assignment_index:c1:v2".into(),
					value: b"a1".to_vec(),
				}],
			)
			.await
			.unwrap();
		assert!(applied);

		// Second insert against the same absent-guard loses.
		let applied = storage
			.compare_and_swap(
				"assignment_index:c1:v2",
				None,
				vec![WriteOp::Put {
					key: "assignment_index:c1:v2".into(),
					value: b"a2".to_vec(),
				}],
			)
			.await
			.unwrap();
		assert!(!applied);
		assert_eq!(
			storage.get_bytes("assignment_index:c1:v2").await.unwrap(),
			b"a1"
		);
	}

	#[tokio::test]
	async fn test_batch_delete() {
		let storage = MemoryStorage::new();
		storage.set_bytes("a:1", b"x".to_vec()).await.unwrap();
		storage.set_bytes("b:1", b"y".to_vec()).await.unwrap();

		let applied = storage
			.compare_and_swap(
				"a:1",
				Some(b"x"),
				vec![
					WriteOp::Put {
						key: "a:1".into(),
						value: b"x2".to_vec(),
					},
					WriteOp::Delete { key: "b:1".into() },
				],
			)
			.await
			.unwrap();
		assert!(applied);
		assert!(!storage.exists("b:1").await.unwrap());
	}
}
