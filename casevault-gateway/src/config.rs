// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use serde::Deserialize;

/// Configuration loaded from environment variables.
///
/// All configuration is externalized to support 12-factor app deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "json" or "pretty" (default: json)
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Postgres connection URL. When unset, records are kept in memory.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Connection pool size (default: 10)
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    /// Object store backend: "s3" or "memory" (default: s3)
    #[serde(default = "default_storage_backend")]
    pub storage_backend: String,

    /// MinIO / S3 endpoint, host:port without scheme (default: localhost:9000)
    #[serde(default = "default_minio_endpoint")]
    pub minio_endpoint: String,

    #[serde(default = "default_minio_key")]
    pub minio_access_key: String,

    #[serde(default = "default_minio_key")]
    pub minio_secret_key: String,

    /// Use https for the object store endpoint (default: false)
    #[serde(default)]
    pub minio_use_ssl: bool,

    /// Evidence bucket (default: crime-management)
    #[serde(default = "default_minio_bucket")]
    pub minio_bucket: String,

    #[serde(default = "default_minio_region")]
    pub minio_region: String,

    /// HS256 secret for session tokens issued by /login
    #[serde(default = "default_auth_secret")]
    pub auth_secret: String,

    /// Session token lifetime in hours (default: 24)
    #[serde(default = "default_auth_expiry_hours")]
    pub auth_expiry_hours: i64,

    /// Create the default administrator when no admin exists (default: true)
    #[serde(default = "default_true")]
    pub seed_admin: bool,

    /// Backend readiness probe interval in seconds (default: 10)
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_storage_backend() -> String {
    "s3".to_string()
}

fn default_minio_endpoint() -> String {
    "localhost:9000".to_string()
}

fn default_minio_key() -> String {
    "minioadmin".to_string()
}

fn default_minio_bucket() -> String {
    "crime-management".to_string()
}

fn default_minio_region() -> String {
    "us-east-1".to_string()
}

fn default_auth_secret() -> String {
    "change-me".to_string()
}

fn default_auth_expiry_hours() -> i64 {
    24
}

fn default_true() -> bool {
    true
}

fn default_health_check_interval() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are uppercase with underscore separators.
    /// Example: `DATABASE_URL`, `MINIO_BUCKET`, `LOG_LEVEL`, etc.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Full object store URL including scheme.
    pub fn minio_url(&self) -> String {
        let scheme = if self.minio_use_ssl { "https" } else { "http" };
        format!("{}://{}", scheme, self.minio_endpoint)
    }

    pub fn uses_memory_objects(&self) -> bool {
        self.storage_backend.eq_ignore_ascii_case("memory")
    }
}
