// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! S3 / MinIO object store (path-style addressing).

use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info};

use super::{ObjectStore, ObjectStoreError, StoredObject};
use crate::config::Config;

pub struct S3ObjectStore {
    region: Region,
    credentials: Credentials,
}

impl S3ObjectStore {
    pub fn new(
        endpoint: String,
        region: String,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, ObjectStoreError> {
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| ObjectStoreError::Backend(format!("invalid credentials: {}", e)))?;
        Ok(Self {
            region: Region::Custom { region, endpoint },
            credentials,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ObjectStoreError> {
        Self::new(
            config.minio_url(),
            config.minio_region.clone(),
            &config.minio_access_key,
            &config.minio_secret_key,
        )
    }

    fn bucket(&self, name: &str) -> Result<Box<Bucket>, ObjectStoreError> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())
            .map_err(backend)?;
        Ok(bucket.with_path_style())
    }
}

fn backend(e: S3Error) -> ObjectStoreError {
    ObjectStoreError::Backend(e.to_string())
}

fn classify(key: &str, e: S3Error) -> ObjectStoreError {
    match e {
        S3Error::HttpFailWithBody(404, _) => ObjectStoreError::NotFound(key.to_string()),
        other => backend(other),
    }
}

fn check_status(key: &str, code: u16) -> Result<(), ObjectStoreError> {
    match code {
        200..=299 => Ok(()),
        404 => Err(ObjectStoreError::NotFound(key.to_string())),
        other => Err(ObjectStoreError::Backend(format!(
            "unexpected status {} for '{}'",
            other, key
        ))),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_bucket(&self, name: &str) -> Result<(), ObjectStoreError> {
        let bucket = self.bucket(name)?;
        if bucket.exists().await.map_err(backend)? {
            debug!(bucket = %name, "bucket already exists");
            return Ok(());
        }

        Bucket::create_with_path_style(
            name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(backend)?;
        info!(bucket = %name, "created bucket");
        Ok(())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let response = self
            .bucket(bucket)?
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| classify(key, e))?;
        check_status(key, response.status_code())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, ObjectStoreError> {
        let response = self
            .bucket(bucket)?
            .get_object(key)
            .await
            .map_err(|e| classify(key, e))?;
        check_status(key, response.status_code())?;

        let headers = response.headers();
        let content_type = headers
            .get("content-type")
            .cloned()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = response.bytes().clone();
        let size = headers
            .get("content-length")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(data.len() as u64);

        Ok(StoredObject {
            data,
            size,
            content_type,
        })
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError> {
        let response = self
            .bucket(bucket)?
            .delete_object(key)
            .await
            .map_err(|e| classify(key, e))?;
        check_status(key, response.status_code())
    }

    async fn ping(&self, bucket: &str) -> Result<(), ObjectStoreError> {
        if self.bucket(bucket)?.exists().await.map_err(backend)? {
            Ok(())
        } else {
            Err(ObjectStoreError::NotFound(bucket.to_string()))
        }
    }
}
