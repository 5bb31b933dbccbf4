// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Content sniffing for uploads. The filename is never consulted.

/// Leading bytes inspected when detecting the media type.
pub const SNIFF_LEN: usize = 512;

/// Detected image type of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageType {
    pub mime: &'static str,
    pub extension: &'static str,
}

/// Detect the media type from the leading bytes of `data`.
pub fn detect(data: &[u8]) -> Option<infer::Type> {
    let head = &data[..data.len().min(SNIFF_LEN)];
    infer::get(head)
}

/// `Some` iff the content is an image.
pub fn sniff_image(data: &[u8]) -> Option<ImageType> {
    detect(data)
        .filter(|t| t.mime_type().starts_with("image/"))
        .map(|t| ImageType {
            mime: t.mime_type(),
            extension: t.extension(),
        })
}
