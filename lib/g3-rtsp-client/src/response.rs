/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::{RtspHeaderLine, RtspResponseParseError, RtspStatusLine};

pub struct RtspResponse {
    pub version: u8,
    pub code: u16,
    pub reason: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RtspResponse {
    /// Get the first value of the header, the name is compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    pub fn header_values<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub async fn parse<R>(
        reader: &mut R,
        max_header_size: usize,
        max_body_size: usize,
    ) -> Result<Self, RtspResponseParseError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line_buf = Vec::<u8>::with_capacity(1024);
        let mut header_size =
            read_line(reader, &mut line_buf, max_header_size, max_header_size).await?;

        let status = RtspStatusLine::parse(&line_buf)
            .map_err(RtspResponseParseError::InvalidStatusLine)?;
        let mut rsp = RtspResponse {
            version: status.version,
            code: status.code,
            reason: status.reason.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        };

        loop {
            if header_size >= max_header_size {
                return Err(RtspResponseParseError::TooLargeHeader(max_header_size));
            }
            line_buf.clear();
            header_size += read_line(
                reader,
                &mut line_buf,
                max_header_size - header_size,
                max_header_size,
            )
            .await?;
            if (line_buf.len() == 1 && line_buf[0] == b'\n')
                || (line_buf.len() == 2 && line_buf[0] == b'\r' && line_buf[1] == b'\n')
            {
                break;
            }

            let header = RtspHeaderLine::parse(&line_buf)
                .map_err(RtspResponseParseError::InvalidHeaderLine)?;
            rsp.headers
                .push((header.name.to_string(), header.value.to_string()));
        }

        if let Some(v) = rsp.header("Content-Length") {
            let len = v
                .parse::<usize>()
                .map_err(|_| RtspResponseParseError::InvalidContentLength)?;
            if len > max_body_size {
                return Err(RtspResponseParseError::TooLargeBody(max_body_size));
            }
            let mut body = vec![0u8; len];
            reader.read_exact(&mut body).await.map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    RtspResponseParseError::RemoteClosed
                } else {
                    RtspResponseParseError::IoFailed(e)
                }
            })?;
            rsp.body = body;
        }

        Ok(rsp)
    }
}

async fn read_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
    max_header_size: usize,
) -> Result<usize, RtspResponseParseError>
where
    R: AsyncBufRead + Unpin,
{
    let nr = (&mut *reader)
        .take(max_len as u64)
        .read_until(b'\n', buf)
        .await?;
    if nr == 0 {
        return Err(RtspResponseParseError::RemoteClosed);
    }
    if buf.last() != Some(&b'\n') {
        return if nr >= max_len {
            Err(RtspResponseParseError::TooLargeHeader(max_header_size))
        } else {
            Err(RtspResponseParseError::RemoteClosed)
        };
    }
    Ok(nr)
}
