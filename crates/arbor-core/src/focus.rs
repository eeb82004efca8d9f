use indexmap::IndexMap;

use crate::app::InstanceId;
use crate::backend::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FocusEntry {
    pub(crate) key: String,
    pub(crate) node: NodeId,
    matched: bool,
}

/// Keyed-identity cache, one entry per component instance: the last keyed
/// node that received an event, remembered so the next rebuild of that
/// instance can splice the same native node back in and restore focus to it.
/// Keying per instance keeps identical key strings in unrelated components
/// from colliding.
#[derive(Default)]
pub(crate) struct FocusRegistry {
    entries: IndexMap<InstanceId, FocusEntry>,
}

impl FocusRegistry {
    /// Records the keyed node that just received an event.
    pub(crate) fn record(&mut self, instance: InstanceId, key: String, node: NodeId) {
        self.entries.insert(
            instance,
            FocusEntry {
                key,
                node,
                matched: false,
            },
        );
    }

    /// Forgets the instance's entry; called when an unkeyed element fires, and
    /// on instance disposal.
    pub(crate) fn clear(&mut self, instance: InstanceId) {
        self.entries.shift_remove(&instance);
    }

    pub(crate) fn begin_pass(&mut self, instance: InstanceId) {
        if let Some(entry) = self.entries.get_mut(&instance) {
            entry.matched = false;
        }
    }

    /// Hands back the cached node when the rebuild reaches the same key, and
    /// marks the entry as seen this pass.
    pub(crate) fn try_reuse(&mut self, instance: InstanceId, key: &str) -> Option<NodeId> {
        let entry = self.entries.get_mut(&instance)?;
        if entry.key == key {
            entry.matched = true;
            Some(entry.node)
        } else {
            None
        }
    }

    /// Ends the instance's pass: a matched entry yields the node to focus, an
    /// unmatched one is stale (its node left the tree) and is evicted so it is
    /// never focused.
    pub(crate) fn finish_pass(&mut self, instance: InstanceId) -> Option<NodeId> {
        match self.entries.get(&instance) {
            Some(entry) if entry.matched => Some(entry.node),
            Some(entry) => {
                log::debug!(
                    "evicting stale focus key {:?} for instance {instance}",
                    entry.key
                );
                self.entries.shift_remove(&instance);
                None
            }
            None => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn entry(&self, instance: InstanceId) -> Option<&FocusEntry> {
        self.entries.get(&instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuse_requires_a_key_match() {
        let mut registry = FocusRegistry::default();
        registry.record(0, "field".to_string(), 7);
        assert_eq!(registry.try_reuse(0, "other"), None);
        assert_eq!(registry.try_reuse(1, "field"), None);
        assert_eq!(registry.try_reuse(0, "field"), Some(7));
    }

    #[test]
    fn unmatched_entries_are_evicted_at_pass_end() {
        let mut registry = FocusRegistry::default();
        registry.record(0, "field".to_string(), 7);
        registry.begin_pass(0);
        assert_eq!(registry.finish_pass(0), None);
        assert!(registry.entry(0).is_none());
    }

    #[test]
    fn matched_entries_survive_and_focus() {
        let mut registry = FocusRegistry::default();
        registry.record(0, "field".to_string(), 7);
        registry.begin_pass(0);
        assert_eq!(registry.try_reuse(0, "field"), Some(7));
        assert_eq!(registry.finish_pass(0), Some(7));
        assert!(registry.entry(0).is_some());
    }

    #[test]
    fn instances_do_not_share_entries() {
        let mut registry = FocusRegistry::default();
        registry.record(0, "shared".to_string(), 7);
        registry.record(1, "shared".to_string(), 9);
        assert_eq!(registry.try_reuse(0, "shared"), Some(7));
        assert_eq!(registry.try_reuse(1, "shared"), Some(9));
    }
}
