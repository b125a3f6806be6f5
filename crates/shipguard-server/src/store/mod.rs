// SPDX-License-Identifier: Apache-2.0

//! Backends for the external cart store. The storefront and admin
//! surfaces speak different auth and field naming; the hybrid backend
//! resolves between them transparently.

pub mod admin;
pub mod fake;
pub mod hybrid;
pub mod storefront;

use crate::StoreError;
use serde_json::Value;
use std::time::Duration;

const UPSTREAM_MESSAGE_MAX: usize = 512;

pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Decodes a 2xx response body as JSON; non-2xx classifies into the
/// store error taxonomy.
pub(crate) async fn into_json(resp: reqwest::Response) -> Result<Value, StoreError> {
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .map_err(|e| StoreError::Transport(format!("read body failed: {e}")))?;
    if !(200..300).contains(&status) {
        return Err(classify_status(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| StoreError::Upstream {
        status: Some(status),
        message: format!("unparseable response body: {e}"),
    })
}

/// For calls whose response body carries nothing of interest, e.g.
/// line-item deletes.
pub(crate) async fn ensure_success(resp: reqwest::Response) -> Result<(), StoreError> {
    let status = resp.status().as_u16();
    if (200..300).contains(&status) {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(classify_status(status, &body))
}

/// Maps a non-2xx upstream status to the store error taxonomy. The
/// body is truncated so oversized upstream errors cannot bloat logs.
pub(crate) fn classify_status(status: u16, body: &str) -> StoreError {
    match status {
        401 | 403 => StoreError::Auth(truncate_message(body)),
        404 => StoreError::NotFound,
        other => StoreError::Upstream {
            status: Some(other),
            message: truncate_message(body),
        },
    }
}

pub(crate) fn truncate_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= UPSTREAM_MESSAGE_MAX {
        trimmed.to_string()
    } else {
        let mut cut = UPSTREAM_MESSAGE_MAX;
        while !trimmed.is_char_boundary(cut) {
            cut -= 1;
        }
        trimmed[..cut].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_classify_as_auth() {
        assert!(matches!(classify_status(401, "denied"), StoreError::Auth(_)));
        assert!(matches!(classify_status(403, "denied"), StoreError::Auth(_)));
    }

    #[test]
    fn missing_cart_classifies_as_not_found() {
        assert_eq!(classify_status(404, "no cart"), StoreError::NotFound);
    }

    #[test]
    fn other_statuses_carry_status_and_message() {
        assert_eq!(
            classify_status(422, " rejected "),
            StoreError::Upstream {
                status: Some(422),
                message: "rejected".to_string()
            }
        );
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundaries() {
        let body = "é".repeat(600);
        let StoreError::Upstream { message, .. } = classify_status(500, &body) else {
            panic!("expected upstream error");
        };
        assert!(message.len() <= UPSTREAM_MESSAGE_MAX);
    }
}
