//! Access surfaces.
//!
//! Every surface a host exposes a file through (description page, raw
//! download, thumbnail, embedded rendering) asks the same question through an
//! [`Enforcer`], so the answer never depends on how the file is reached.
//! Denials carry only generic message keys; the required level is never
//! exposed.

use thiserror::Error;

use crate::evaluator::{GroupSource, PermissionEvaluator};
use crate::store::{Namespace, ResourceId, FILE_NAMESPACE};

/// Width used for a denied embed when the page requested none.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 220;

/// The only page action that is gated.
pub const READ_ACTION: &str = "read";

/// How the user is reaching the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessSurface {
    /// The file's description page.
    PageView,
    /// The original file bytes.
    RawDownload,
    /// A scaled rendition.
    Thumbnail,
    /// The file embedded in another page.
    Embedded,
}

impl AccessSurface {
    pub const ALL: [AccessSurface; 4] = [
        AccessSurface::PageView,
        AccessSurface::RawDownload,
        AccessSurface::Thumbnail,
        AccessSurface::Embedded,
    ];
}

/// Access was refused.
///
/// Display text and message keys are identical for every protected file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("access denied")]
pub struct AccessDenied {
    surface: AccessSurface,
}

impl AccessDenied {
    pub fn surface(&self) -> AccessSurface {
        self.surface
    }

    /// Message keys for the host to render.
    ///
    /// Raw downloads and thumbnails get a header key and a body key; other
    /// surfaces a single key.
    pub fn message_keys(&self) -> &'static [&'static str] {
        match self.surface {
            AccessSurface::RawDownload | AccessSurface::Thumbnail => {
                &["img-auth-accessdenied", "filepermissions-img-denied"]
            }
            AccessSurface::PageView | AccessSurface::Embedded => &["filepermissions-access-denied"],
        }
    }
}

/// Result of rendering an embedded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOutcome {
    pub render: EmbedRender,
    /// False when the file has an effective level: the embedding page then
    /// renders differently per user and must not be cached as one copy.
    pub cacheable: bool,
}

/// What to put in place of the embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedRender {
    /// Render the file normally.
    File,
    /// Render a same-sized placeholder instead.
    Placeholder { width: u32, height: u32 },
}

/// Gatekeeper for one request.
#[derive(Debug)]
pub struct Enforcer<'a> {
    evaluator: &'a PermissionEvaluator,
}

impl<'a> Enforcer<'a> {
    pub fn new(evaluator: &'a PermissionEvaluator) -> Self {
        Self { evaluator }
    }

    /// Check access to `resource` through `surface`.
    pub fn check<G: GroupSource + ?Sized>(
        &self,
        surface: AccessSurface,
        groups: &G,
        resource: ResourceId,
        namespace: Namespace,
    ) -> Result<(), AccessDenied> {
        if self
            .evaluator
            .can_access_resource(groups, resource, namespace)
        {
            Ok(())
        } else {
            log::debug!("Denied {:?} access to resource {}", surface, resource);
            Err(AccessDenied { surface })
        }
    }

    /// Gate a page action. Only `read` on file pages is checked; everything
    /// else passes through untouched.
    pub fn check_page_action<G: GroupSource + ?Sized>(
        &self,
        action: &str,
        groups: &G,
        resource: ResourceId,
        namespace: Namespace,
    ) -> Result<(), AccessDenied> {
        if namespace != FILE_NAMESPACE || action != READ_ACTION {
            return Ok(());
        }
        self.check(AccessSurface::PageView, groups, resource, namespace)
    }

    /// Decide how to render an embedded file at the requested size.
    pub fn embed<G: GroupSource + ?Sized>(
        &self,
        groups: &G,
        resource: ResourceId,
        namespace: Namespace,
        width: Option<u32>,
        height: Option<u32>,
    ) -> EmbedOutcome {
        // A read failure or a broken configuration leaves the page
        // uncacheable; check() denies anyway
        let cacheable = !self.evaluator.config().is_invalid()
            && matches!(
                self.evaluator.effective_level(resource, namespace),
                Ok(None)
            );

        let render = match self.check(AccessSurface::Embedded, groups, resource, namespace) {
            Ok(()) => EmbedRender::File,
            Err(_) => {
                let width = width.unwrap_or(DEFAULT_THUMBNAIL_WIDTH);
                EmbedRender::Placeholder {
                    width,
                    height: height.unwrap_or(width),
                }
            }
        };

        EmbedOutcome { render, cacheable }
    }
}
