//! Bookkeeping of the overlays attached to the viewer
//!
//! The registry is the only component that calls `add_overlay` and
//! `remove_overlay`. Every reconcile is total: after it returns, the
//! attached set equals the desired set passed in, minus overlays for
//! elements the viewer does not know.

use std::collections::BTreeMap;

use log::debug;

use crate::viewer::{DiagramViewer, OverlayHandle};

use super::{Overlay, OverlayKey};

#[derive(Debug, Clone)]
struct AttachedOverlay {
    overlay: Overlay,
    handle: OverlayHandle,
}

/// Counts of what a reconcile pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub attached: usize,
    pub detached: usize,
    pub unchanged: usize,
    /// Desired overlays dropped because their element is unknown
    pub skipped: usize,
}

/// Tracks every overlay currently attached, keyed by flow node and kind
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    attached: BTreeMap<OverlayKey, AttachedOverlay>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the attached set equal to `desired`
    ///
    /// Overlays whose position and payload are unchanged stay attached with
    /// their original handle. Later duplicates of a key replace earlier ones.
    pub fn reconcile<V, I>(&mut self, viewer: &mut V, desired: I) -> ReconcileStats
    where
        V: DiagramViewer + ?Sized,
        I: IntoIterator<Item = Overlay>,
    {
        let mut stats = ReconcileStats::default();
        let mut wanted: BTreeMap<OverlayKey, Overlay> = BTreeMap::new();
        for overlay in desired {
            if !viewer.has_element(overlay.flow_node_id.as_str()) {
                debug!(
                    "skipping {:?} overlay for unknown element '{}'",
                    overlay.kind(),
                    overlay.flow_node_id
                );
                stats.skipped += 1;
                continue;
            }
            wanted.insert(overlay.key(), overlay);
        }

        let stale: Vec<OverlayKey> = self
            .attached
            .iter()
            .filter(|(key, entry)| wanted.get(*key) != Some(&entry.overlay))
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            if let Some(entry) = self.attached.remove(&key) {
                Self::remove_from_viewer(viewer, &key, entry.handle);
                stats.detached += 1;
            }
        }

        for (key, overlay) in wanted {
            if self.attached.contains_key(&key) {
                stats.unchanged += 1;
                continue;
            }
            let handle = viewer.add_overlay(
                overlay.flow_node_id.as_str(),
                overlay.position,
                &overlay.payload,
            );
            self.attached.insert(key, AttachedOverlay { overlay, handle });
            stats.attached += 1;
        }

        stats
    }

    /// Attach or update a single overlay
    ///
    /// Returns `false` if the element is unknown to the viewer.
    pub fn attach<V>(&mut self, viewer: &mut V, overlay: Overlay) -> bool
    where
        V: DiagramViewer + ?Sized,
    {
        if !viewer.has_element(overlay.flow_node_id.as_str()) {
            debug!(
                "skipping {:?} overlay for unknown element '{}'",
                overlay.kind(),
                overlay.flow_node_id
            );
            return false;
        }
        let key = overlay.key();
        if let Some(entry) = self.attached.get(&key) {
            if entry.overlay == overlay {
                return true;
            }
        }
        self.detach(viewer, &key);
        let handle = viewer.add_overlay(
            overlay.flow_node_id.as_str(),
            overlay.position,
            &overlay.payload,
        );
        self.attached.insert(key, AttachedOverlay { overlay, handle });
        true
    }

    /// Detach the overlay for `key`, if any
    pub fn detach<V>(&mut self, viewer: &mut V, key: &OverlayKey) -> bool
    where
        V: DiagramViewer + ?Sized,
    {
        match self.attached.remove(key) {
            Some(entry) => {
                Self::remove_from_viewer(viewer, key, entry.handle);
                true
            }
            None => false,
        }
    }

    /// Detach everything
    pub fn clear<V>(&mut self, viewer: &mut V)
    where
        V: DiagramViewer + ?Sized,
    {
        for (key, entry) in std::mem::take(&mut self.attached) {
            Self::remove_from_viewer(viewer, &key, entry.handle);
        }
    }

    fn remove_from_viewer<V>(viewer: &mut V, key: &OverlayKey, handle: OverlayHandle)
    where
        V: DiagramViewer + ?Sized,
    {
        if !viewer.remove_overlay(handle) {
            debug!(
                "{:?} overlay on '{}' was already gone from the viewer",
                key.1, key.0
            );
        }
    }

    pub fn get(&self, key: &OverlayKey) -> Option<&Overlay> {
        self.attached.get(key).map(|entry| &entry.overlay)
    }

    pub fn handle(&self, key: &OverlayKey) -> Option<OverlayHandle> {
        self.attached.get(key).map(|entry| entry.handle)
    }

    /// Reverse lookup from a viewer handle to the overlay key
    pub fn key_for_handle(&self, handle: OverlayHandle) -> Option<&OverlayKey> {
        self.attached
            .iter()
            .find(|(_, entry)| entry.handle == handle)
            .map(|(key, _)| key)
    }

    /// Attached overlays in key order
    pub fn overlays(&self) -> impl Iterator<Item = &Overlay> {
        self.attached.values().map(|entry| &entry.overlay)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}
