// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Object store
//!
//! Binary evidence lives outside the relational store. The client is built
//! once at start-up and handed to the components that need it.

mod memory;
mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ObjectStoreError {
    #[error("object '{0}' not found")]
    NotFound(String),

    #[error("object store error: {0}")]
    Backend(String),
}

/// An object as reported by the store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub size: u64,
    pub content_type: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create `bucket` if it does not exist.
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), ObjectStoreError>;

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;

    async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, ObjectStoreError>;

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError>;

    /// Cheap round-trip used by readiness checks.
    async fn ping(&self, bucket: &str) -> Result<(), ObjectStoreError>;
}
