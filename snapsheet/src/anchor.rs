//! Scroll anchor records and preferred-anchor ranking.
//!
//! Every scrollable descendant of the sheet is registered as a
//! [`ScrollAnchorRecord`]. Exactly one of them, the preferred anchor, takes
//! part in gesture capture and velocity handoff: the first record, in
//! structural order, whose tag equals the sheet's current anchor tag.
//! Re-ranking after mounts and unmounts is debounced so bursts of tree
//! changes settle before the preferred anchor moves.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::handoff::ScrollHandle;
use crate::timer::Debounce;

/// Delay before re-ranking after an anchor unmounts.
pub const UNMOUNT_RERANK_DELAY: Duration = Duration::from_millis(100);

/// Delay before re-ranking after an anchor mounts or changes tag.
pub const MOUNT_RERANK_DELAY: Duration = Duration::from_millis(300);

/// Stable identity of a mounted scrollable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u64);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor-{}", self.0)
    }
}

/// One mounted scrollable descendant.
pub struct ScrollAnchorRecord {
    pub id: AnchorId,
    /// Last reported vertical scroll offset.
    pub scroll_offset: f64,
    /// Child indices from the sheet root to this node.
    pub path: Vec<usize>,
    pub tag: Option<String>,
    handle: Option<Box<dyn ScrollHandle>>,
}

impl fmt::Debug for ScrollAnchorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAnchorRecord")
            .field("id", &self.id)
            .field("scroll_offset", &self.scroll_offset)
            .field("path", &self.path)
            .field("tag", &self.tag)
            .field("handle", &self.handle.is_some())
            .finish()
    }
}

/// Order two structural paths.
///
/// Segments compare pairwise; the first differing segment decides, and a
/// path that is a strict prefix of the other sorts first. This is exactly
/// the lexicographic order of slices.
pub fn compare_paths(a: &[usize], b: &[usize]) -> Ordering {
    a.cmp(b)
}

/// Registered anchors plus the debounced preferred-anchor selection.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    records: HashMap<AnchorId, ScrollAnchorRecord>,
    current_tag: Option<String>,
    preferred: Option<AnchorId>,
    rerank_task: Debounce,
}

impl AnchorRegistry {
    pub fn new(current_tag: Option<String>) -> Self {
        Self {
            current_tag,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Register a mounted scrollable or refresh an existing record.
    ///
    /// Returns true if the record is new. A new record or a tag change
    /// schedules a re-rank.
    pub fn register(
        &mut self,
        id: AnchorId,
        path: Vec<usize>,
        tag: Option<String>,
        now: Instant,
    ) -> bool {
        if let Some(record) = self.records.get_mut(&id) {
            record.path = path;
            if record.tag != tag {
                log::debug!("[anchor] {id} tag {:?} -> {:?}", record.tag, tag);
                record.tag = tag;
                self.rerank_task.schedule(now, MOUNT_RERANK_DELAY);
            }
            return false;
        }

        log::debug!("[anchor] register {id} path={path:?} tag={tag:?}");
        self.records.insert(
            id,
            ScrollAnchorRecord {
                id,
                scroll_offset: 0.0,
                path,
                tag,
                handle: None,
            },
        );
        self.rerank_task.schedule(now, MOUNT_RERANK_DELAY);
        true
    }

    /// Remove an unmounted scrollable. Schedules a re-rank if it existed.
    pub fn unregister(&mut self, id: AnchorId, now: Instant) -> Option<ScrollAnchorRecord> {
        let record = self.records.remove(&id)?;
        log::debug!("[anchor] unregister {id}");
        self.rerank_task.schedule(now, UNMOUNT_RERANK_DELAY);
        Some(record)
    }

    /// Attach the host's scroll capability to a record.
    pub fn attach_handle(&mut self, id: AnchorId, handle: Box<dyn ScrollHandle>) -> bool {
        match self.records.get_mut(&id) {
            Some(record) => {
                record.handle = Some(handle);
                true
            }
            None => false,
        }
    }

    pub fn record(&self, id: AnchorId) -> Option<&ScrollAnchorRecord> {
        self.records.get(&id)
    }

    /// Store the latest scroll offset of a record.
    pub fn set_scroll_offset(&mut self, id: AnchorId, offset: f64) -> bool {
        match self.records.get_mut(&id) {
            Some(record) => {
                record.scroll_offset = offset;
                true
            }
            None => false,
        }
    }

    /// Ids of every registered record, in structural order.
    pub fn ids(&self) -> Vec<AnchorId> {
        self.ranked().iter().map(|r| r.id).collect()
    }

    /// Records in structural order. Ties (equal paths) break on id.
    pub fn ranked(&self) -> Vec<&ScrollAnchorRecord> {
        let mut ranked: Vec<&ScrollAnchorRecord> = self.records.values().collect();
        ranked.sort_by(|a, b| compare_paths(&a.path, &b.path).then_with(|| a.id.cmp(&b.id)));
        ranked
    }

    pub fn current_tag(&self) -> Option<&str> {
        self.current_tag.as_deref()
    }

    /// Change the tag that selects the preferred anchor. Re-ranks immediately.
    ///
    /// Returns true if the preferred anchor changed.
    pub fn set_current_tag(&mut self, tag: Option<String>) -> bool {
        self.current_tag = tag;
        self.rerank()
    }

    /// Recompute the preferred anchor now, cancelling any scheduled re-rank.
    ///
    /// Returns true if the preferred anchor changed.
    pub fn rerank(&mut self) -> bool {
        self.rerank_task.cancel();
        let preferred = self
            .ranked()
            .into_iter()
            .find(|r| r.tag == self.current_tag)
            .map(|r| r.id);

        if preferred == self.preferred {
            return false;
        }
        log::debug!(
            "[anchor] preferred {:?} -> {:?} (tag={:?})",
            self.preferred,
            preferred,
            self.current_tag
        );
        self.preferred = preferred;
        true
    }

    /// Run the scheduled re-rank if due. Returns true if the preferred anchor changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.rerank_task.fire(now) {
            self.rerank()
        } else {
            false
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.rerank_task.deadline()
    }

    /// The preferred anchor, if it is still mounted.
    pub fn preferred(&self) -> Option<AnchorId> {
        self.preferred.filter(|id| self.records.contains_key(id))
    }

    pub fn preferred_record(&self) -> Option<&ScrollAnchorRecord> {
        self.preferred.and_then(|id| self.records.get(&id))
    }

    /// Scroll capability of the preferred anchor.
    pub fn preferred_handle_mut(&mut self) -> Option<&mut (dyn ScrollHandle + 'static)> {
        let id = self.preferred?;
        self.records.get_mut(&id)?.handle.as_deref_mut()
    }
}
