/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use g3_rtsp_client::{RtspAuthChallenge, RtspAuthScheme};

use crate::stream::AuthType;

/// Classify the `WWW-Authenticate` values of a response.
pub fn classify_auth<'a, I>(values: I) -> AuthType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut has_value = false;
    let mut auth_type = AuthType::Unknown;
    for value in values {
        has_value = true;
        match RtspAuthChallenge::parse(value).map(|c| c.scheme()) {
            Some(RtspAuthScheme::Digest) => return AuthType::Digest,
            Some(RtspAuthScheme::Basic) => auth_type = AuthType::Basic,
            None => {}
        }
    }
    if has_value { auth_type } else { AuthType::None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_header() {
        assert_eq!(classify_auth([]), AuthType::None);
    }

    #[test]
    fn basic() {
        assert_eq!(classify_auth(["Basic realm=\"cam\""]), AuthType::Basic);
    }

    #[test]
    fn digest_preferred() {
        assert_eq!(
            classify_auth(["Basic realm=\"cam\"", "Digest realm=\"cam\", nonce=\"n\""]),
            AuthType::Digest
        );
        assert_eq!(
            classify_auth(["Digest realm=\"cam\", nonce=\"n\"", "Basic realm=\"cam\""]),
            AuthType::Digest
        );
    }

    #[test]
    fn unparsable() {
        assert_eq!(classify_auth(["Bearer abc"]), AuthType::Unknown);
        assert_eq!(classify_auth(["Digest realm=\"cam\""]), AuthType::Unknown);
    }
}
