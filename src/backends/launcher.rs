// SPDX-License-Identifier: GPL-3.0-only

//! URL hand-off to the desktop's default handler

use crate::errors::LaunchError;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{error, info};

/// URL-open capability
pub trait UrlOpener: Send + Sync {
    /// Whether `url` could be handed to a handler at all
    fn can_open(&self, url: &str) -> bool;

    /// Hand `url` to the default handler, exactly as given
    fn open(&self, url: &str) -> BoxFuture<'_, Result<(), LaunchError>>;
}

/// Check for an RFC 3986 scheme: a letter followed by letters, digits,
/// '+', '-' or '.', terminated by ':'
pub fn url_scheme(url: &str) -> Option<&str> {
    let (scheme, _) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}

/// Opens URLs through xdg-open (or the platform equivalent)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn can_open(&self, url: &str) -> bool {
        url == url.trim() && url_scheme(url).is_some()
    }

    fn open(&self, url: &str) -> BoxFuture<'_, Result<(), LaunchError>> {
        let url = url.to_string();
        async move {
            match open::that_detached(&url) {
                Ok(()) => {
                    info!(url = %url, "URL opened successfully");
                    Ok(())
                }
                Err(err) => {
                    error!(url = %url, error = %err, "Failed to open URL");
                    Err(LaunchError::Failed {
                        url,
                        reason: err.to_string(),
                    })
                }
            }
        }
        .boxed()
    }
}

/// Check and open a URL, the way the confirm prompt does it
pub async fn open_link(opener: &dyn UrlOpener, url: &str) -> Result<(), LaunchError> {
    if !opener.can_open(url) {
        info!(url = %url, "Cannot open URL");
        return Err(LaunchError::Unsupported(url.to_string()));
    }
    opener.open(url).await
}
