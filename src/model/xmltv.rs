use std::sync::Arc;

use indexmap::IndexMap;

pub const EPG_TAG_PROGRAMME: &str = "programme";
pub const EPG_TAG_TITLE: &str = "title";
pub const EPG_ATTRIB_CHANNEL: &str = "channel";
pub const EPG_ATTRIB_START: &str = "start";
pub const EPG_ATTRIB_STOP: &str = "stop";

pub const EPG_DEFAULT_TITLE: &str = "No title";

/// A scheduled programme. `start` and `stop` are kept as the raw xmltv
/// timestamps (`20240101000000 +0000`), they sort lexically within one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideEntry {
    pub start: String,
    pub stop: String,
    pub title: String,
}

/// Programmes per channel key, keys and entries in document order.
#[derive(Debug, Clone, Default)]
pub struct GuideIndex {
    programs: IndexMap<String, Arc<Vec<GuideEntry>>>,
}

impl GuideIndex {
    pub fn new(programs: IndexMap<String, Vec<GuideEntry>>) -> Self {
        Self {
            programs: programs.into_iter().map(|(key, entries)| (key, Arc::new(entries))).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arc<Vec<GuideEntry>>> {
        self.programs.get(key)
    }

    pub fn get_key(&self, key: &str) -> Option<&str> {
        self.programs.get_key_value(key).map(|(k, _)| k.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item=&str> {
        self.programs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn program_count(&self) -> usize {
        self.programs.values().map(|entries| entries.len()).sum()
    }
}
