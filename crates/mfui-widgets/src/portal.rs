#![forbid(unsafe_code)]

//! Attachment points for content rendered outside its caller's subtree.
//!
//! A component that must escape ancestor clipping and stacking (a modal, for
//! example) does not return its markup to its parent. It hands it to a
//! [`Portal`], which mounts it at a well-known [`AttachmentPoint`] in the
//! document's [`PortalHost`]. The mount stays tagged with the owner's
//! [`OwnerId`], so logical ownership remains with the calling component.
//!
//! # Invariants
//!
//! - A hidden portal has no mount at all. It is absent, not merely empty.
//! - A visible portal has exactly one mount per owner, replaced on each render.
//! - Mounts at a point are kept in mount order; later mounts stack on top.
//!
//! # Failure Modes
//!
//! - Rendering to a point the host never registered returns
//!   [`PortalError::UnknownAttachmentPoint`] and mounts nothing.
//! - `detach()` on a detached portal is a no-op.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::node::Node;

/// Global counter for owner ids.
static OWNER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static GLOBAL_HOST: PortalHost = PortalHost::new();
}

/// Identity of the component that owns a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(OWNER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner-{}", self.0)
    }
}

/// A named mount target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AttachmentPoint(Cow<'static, str>);

impl AttachmentPoint {
    /// The document body. Every host has it.
    pub const BODY: Self = Self(Cow::Borrowed("body"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for AttachmentPoint {
    fn default() -> Self {
        Self::BODY
    }
}

impl fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from routing content to an attachment point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// The host has no attachment point with this name.
    UnknownAttachmentPoint(String),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAttachmentPoint(name) => {
                write!(f, "unknown attachment point: {name}")
            }
        }
    }
}

impl std::error::Error for PortalError {}

/// Where a render pass puts its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// No output.
    Absent,
    /// Output mounted at the point.
    Attached(AttachmentPoint),
}

#[derive(Debug)]
struct Mount {
    owner: OwnerId,
    node: Node,
}

#[derive(Debug)]
struct PointSlot {
    point: AttachmentPoint,
    mounts: Vec<Mount>,
}

/// The attachment points of one document.
#[derive(Clone)]
pub struct PortalHost {
    slots: Rc<RefCell<Vec<PointSlot>>>,
}

impl fmt::Debug for PortalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        let mut map = f.debug_map();
        for slot in slots.iter() {
            map.entry(&slot.point.name(), &slot.mounts.len());
        }
        map.finish()
    }
}

impl Default for PortalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalHost {
    /// A host with only [`AttachmentPoint::BODY`].
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(vec![PointSlot {
                point: AttachmentPoint::BODY,
                mounts: Vec::new(),
            }])),
        }
    }

    /// The UI thread's document host.
    pub fn global() -> Self {
        GLOBAL_HOST.with(Clone::clone)
    }

    /// Add a point. Returns `false` if it already existed.
    pub fn register(&self, point: AttachmentPoint) -> bool {
        if self.has_point(&point) {
            return false;
        }
        self.slots.borrow_mut().push(PointSlot {
            point,
            mounts: Vec::new(),
        });
        true
    }

    pub fn has_point(&self, point: &AttachmentPoint) -> bool {
        self.slots.borrow().iter().any(|s| s.point == *point)
    }

    /// Mount `node` for `owner`, replacing that owner's previous mount.
    pub fn mount(
        &self,
        point: &AttachmentPoint,
        owner: OwnerId,
        node: Node,
    ) -> Result<(), PortalError> {
        let mut slots = self.slots.borrow_mut();
        let slot = slots
            .iter_mut()
            .find(|s| s.point == *point)
            .ok_or_else(|| PortalError::UnknownAttachmentPoint(point.name().to_owned()))?;
        match slot.mounts.iter_mut().find(|m| m.owner == owner) {
            Some(mount) => mount.node = node,
            None => slot.mounts.push(Mount { owner, node }),
        }
        Ok(())
    }

    /// Remove `owner`'s mount. Returns whether anything was removed.
    pub fn unmount(&self, point: &AttachmentPoint, owner: OwnerId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let Some(slot) = slots.iter_mut().find(|s| s.point == *point) else {
            return false;
        };
        let before = slot.mounts.len();
        slot.mounts.retain(|m| m.owner != owner);
        slot.mounts.len() != before
    }

    /// Mounted nodes at `point`, bottom to top.
    pub fn mounted(&self, point: &AttachmentPoint) -> Vec<Node> {
        self.with_slot(point, |s| s.mounts.iter().map(|m| m.node.clone()).collect())
            .unwrap_or_default()
    }

    /// Owners mounted at `point`, bottom to top.
    pub fn owners(&self, point: &AttachmentPoint) -> Vec<OwnerId> {
        self.with_slot(point, |s| s.mounts.iter().map(|m| m.owner).collect())
            .unwrap_or_default()
    }

    /// The node `owner` has mounted at `point`.
    pub fn mounted_by(&self, point: &AttachmentPoint, owner: OwnerId) -> Option<Node> {
        self.with_slot(point, |s| {
            s.mounts
                .iter()
                .find(|m| m.owner == owner)
                .map(|m| m.node.clone())
        })
        .flatten()
    }

    /// Number of mounts at `point`.
    pub fn mount_count(&self, point: &AttachmentPoint) -> usize {
        self.with_slot(point, |s| s.mounts.len()).unwrap_or(0)
    }

    fn with_slot<R>(&self, point: &AttachmentPoint, f: impl FnOnce(&PointSlot) -> R) -> Option<R> {
        self.slots.borrow().iter().find(|s| s.point == *point).map(f)
    }
}

/// One owner's slot at one attachment point.
///
/// Detaches on drop.
#[derive(Debug)]
pub struct Portal {
    host: PortalHost,
    point: AttachmentPoint,
    owner: OwnerId,
    attached: bool,
}

impl Portal {
    pub fn new(host: PortalHost, point: AttachmentPoint, owner: OwnerId) -> Self {
        Self {
            host,
            point,
            owner,
            attached: false,
        }
    }

    /// Decide where output goes for this visibility.
    pub fn route(&self, visible: bool) -> Placement {
        if visible {
            Placement::Attached(self.point.clone())
        } else {
            Placement::Absent
        }
    }

    /// Produce output for one render pass.
    ///
    /// `build` only runs when `visible` is true.
    pub fn render(
        &mut self,
        visible: bool,
        build: impl FnOnce() -> Node,
    ) -> Result<Placement, PortalError> {
        let placement = self.route(visible);
        match &placement {
            Placement::Absent => {
                self.detach();
            }
            Placement::Attached(point) => {
                self.host.mount(point, self.owner, build())?;
                self.attached = true;
            }
        }
        Ok(placement)
    }

    /// Remove any output. Returns whether something was mounted.
    pub fn detach(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.attached = false;
        self.host.unmount(&self.point, self.owner)
    }

    /// Move to another point. Existing output is detached first.
    pub fn set_point(&mut self, point: AttachmentPoint) {
        if point != self.point {
            self.detach();
            self.point = point;
        }
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[inline]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    #[inline]
    pub fn point(&self) -> &AttachmentPoint {
        &self.point
    }

    pub fn host(&self) -> &PortalHost {
        &self.host
    }
}

impl Drop for Portal {
    fn drop(&mut self) {
        self.detach();
    }
}
