// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
mod prometheus;

pub use self::prometheus::{track_requests, Metrics};
