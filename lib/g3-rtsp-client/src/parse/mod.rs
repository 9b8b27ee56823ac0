/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::RtspLineParseError;

mod header_line;
pub use header_line::RtspHeaderLine;

mod status_line;
pub use status_line::RtspStatusLine;
