/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use atoi::FromRadix10;

use super::RtspLineParseError;

pub struct RtspStatusLine<'a> {
    pub version: u8,
    pub code: u16,
    pub reason: &'a str,
}

impl<'a> RtspStatusLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<RtspStatusLine<'a>, RtspLineParseError> {
        const MINIMAL_LENGTH: usize = 13; // RTSP/1.0 XYZ\n

        if buf.len() < MINIMAL_LENGTH {
            return Err(RtspLineParseError::NotLongEnough);
        }

        let Some(p) = memchr::memchr(b' ', buf) else {
            return Err(RtspLineParseError::NoDelimiterFound(' '));
        };
        let version: u8 = match &buf[0..p] {
            b"RTSP/1.0" => 1,
            b"RTSP/2.0" => 2,
            _ => return Err(RtspLineParseError::InvalidVersion),
        };

        let left = &buf[p + 1..];
        let (code, len) = u16::from_radix_10(left);
        if len != 3 {
            return Err(RtspLineParseError::InvalidStatusCode);
        }

        let reason = match left.get(len..) {
            Some(r) if !r.is_empty() => std::str::from_utf8(r)?.trim(),
            _ => "",
        };

        Ok(RtspStatusLine {
            version,
            code,
            reason,
        })
    }
}
