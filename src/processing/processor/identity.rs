use std::collections::{HashMap, HashSet};

use crate::model::Channel;

/// Stream url to the provider ids seen for it in any playlist snapshot.
#[derive(Debug, Default, Clone)]
pub struct IdentityIndex {
    ids_by_url: HashMap<String, HashSet<String>>,
}

impl IdentityIndex {
    pub fn build(filtered: &[Channel], unfiltered: &[Channel]) -> Self {
        let mut index = Self::default();
        index.add_snapshot(filtered);
        index.add_snapshot(unfiltered);
        index
    }

    /// Urls and ids are trimmed, channels with an empty url are skipped.
    /// Empty ids are recorded too, they never count as identifier.
    pub fn add_snapshot(&mut self, channels: &[Channel]) {
        for channel in channels {
            let url = channel.url.trim();
            if url.is_empty() {
                continue;
            }
            self.ids_by_url.entry(url.to_string()).or_default().insert(channel.id.trim().to_string());
        }
    }

    pub fn has_identifier(&self, url: &str) -> bool {
        self.ids_by_url.get(url.trim())
            .is_some_and(|ids| ids.iter().any(|id| !id.is_empty()))
    }

    pub fn len(&self) -> usize {
        self.ids_by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_url.is_empty()
    }
}
