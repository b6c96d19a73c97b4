use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use deunicode::deunicode;
use log::debug;
use regex::Regex;

use crate::model::{Channel, ConfigGuideMatch, GuideIndex, GuideMatchStrategy};
use crate::trace_if_enabled;

static NORMALIZE_CHANNEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s]+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const TERMS_TO_REMOVE: &[&str] = &[" network", " tv", " hd", " uhd", " channel", " east", " west"];

/// Lowercase ascii form of a channel name without punctuation and common suffixes.
pub fn normalize_channel_name(name: &str) -> String {
    let lowered = deunicode(name).to_lowercase();
    let cleaned = NORMALIZE_CHANNEL.replace_all(lowered.trim(), "");
    let stripped = TERMS_TO_REMOVE.iter().fold(cleaned.to_string(), |acc, term| acc.replace(term, ""));
    WHITESPACE.replace_all(stripped.trim(), " ").to_string()
}

/// Decides which guide key belongs to a channel.
pub trait GuideMatcher {
    fn match_key<'a>(&self, channel: &Channel, guide: &'a GuideIndex) -> Option<&'a str>;

    /// Attaches the matched programmes to every channel, channels without match get
    /// an empty list. Returns the number of matched channels.
    fn attach(&self, channels: &mut [Channel], guide: &GuideIndex) -> usize {
        let mut matched = 0;
        for channel in channels.iter_mut() {
            let programs = self.match_key(channel, guide).and_then(|key| guide.get(key));
            match programs {
                Some(entries) => {
                    channel.programs = Arc::clone(entries);
                    matched += 1;
                }
                None => channel.programs = Arc::default(),
            }
        }
        matched
    }
}

/// Joins on the display name, exact and case sensitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactNameMatcher;

impl GuideMatcher for ExactNameMatcher {
    fn match_key<'a>(&self, channel: &Channel, guide: &'a GuideIndex) -> Option<&'a str> {
        guide.get_key(&channel.name)
    }
}

/// Exact name first, then the most similar normalized guide key.
/// Ties keep the key which comes first in the guide.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyNameMatcher {
    threshold: f64,
}

impl FuzzyNameMatcher {
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    fn best_match<'a>(&self, name: &str, normalized_keys: &[(String, &'a str)]) -> Option<&'a str> {
        let normalized_name = normalize_channel_name(name);
        if normalized_name.is_empty() {
            return None;
        }
        let mut best: Option<(f64, &'a str)> = None;
        for (normalized_key, key) in normalized_keys {
            let score = strsim::normalized_levenshtein(&normalized_name, normalized_key);
            if score >= self.threshold && best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, *key));
            }
        }
        if let Some((score, key)) = best {
            trace_if_enabled!("fuzzy guide match {} -> {} ({:.2})", name, key, score);
        }
        best.map(|(_, key)| key)
    }

    fn normalized_keys(guide: &GuideIndex) -> Vec<(String, &str)> {
        guide.keys()
            .map(|key| (normalize_channel_name(key), key))
            .filter(|(normalized, _)| !normalized.is_empty())
            .collect()
    }
}

impl GuideMatcher for FuzzyNameMatcher {
    fn match_key<'a>(&self, channel: &Channel, guide: &'a GuideIndex) -> Option<&'a str> {
        ExactNameMatcher.match_key(channel, guide)
            .or_else(|| self.best_match(&channel.name, &Self::normalized_keys(guide)))
    }

    fn attach(&self, channels: &mut [Channel], guide: &GuideIndex) -> usize {
        let normalized_keys = Self::normalized_keys(guide);
        let mut resolved: HashMap<String, Option<&str>> = HashMap::new();
        let mut matched = 0;
        for channel in channels.iter_mut() {
            let key = match guide.get(&channel.name) {
                Some(_) => Some(channel.name.as_str()),
                None => *resolved.entry(channel.name.clone())
                    .or_insert_with(|| self.best_match(&channel.name, &normalized_keys)),
            };
            match key.and_then(|k| guide.get(k)) {
                Some(entries) => {
                    channel.programs = Arc::clone(entries);
                    matched += 1;
                }
                None => channel.programs = Arc::default(),
            }
        }
        matched
    }
}

pub fn create_guide_matcher(cfg: &ConfigGuideMatch) -> Box<dyn GuideMatcher> {
    debug!("guide match strategy: {}", cfg.strategy);
    match cfg.strategy {
        GuideMatchStrategy::Exact => Box::new(ExactNameMatcher),
        GuideMatchStrategy::Fuzzy => Box::new(FuzzyNameMatcher::new(cfg.threshold)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;

    use crate::model::{Channel, GuideEntry, GuideIndex};
    use crate::processing::processor::epg::{normalize_channel_name, ExactNameMatcher, FuzzyNameMatcher, GuideMatcher};

    fn create_guide(keys: &[&str]) -> GuideIndex {
        let mut programs = IndexMap::new();
        for key in keys {
            programs.insert(key.to_string(), vec![GuideEntry {
                start: "20240101000000".to_string(),
                stop: "20240101003000".to_string(),
                title: format!("{key} Morning"),
            }]);
        }
        GuideIndex::new(programs)
    }

    fn create_channel(name: &str) -> Channel {
        Channel {
            name: name.to_string(),
            url: format!("http://x/{name}.ts"),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_match() {
        let guide = create_guide(&["CNN", "BBC One"]);
        let mut channels = vec![create_channel("CNN"), create_channel("cnn"), create_channel("ESPN")];
        let matched = ExactNameMatcher.attach(&mut channels, &guide);
        assert_eq!(matched, 1);
        assert_eq!(channels[0].programs.len(), 1);
        assert_eq!(channels[0].programs[0].title, "CNN Morning");
        assert!(Arc::ptr_eq(&channels[0].programs, guide.get("CNN").unwrap()));
        assert!(channels[1].programs.is_empty());
        assert!(channels[2].programs.is_empty());
    }

    #[test]
    fn test_attach_clears_previous_programs() {
        let mut channels = vec![create_channel("CNN")];
        ExactNameMatcher.attach(&mut channels, &create_guide(&["CNN"]));
        assert!(channels[0].has_programs());
        ExactNameMatcher.attach(&mut channels, &GuideIndex::default());
        assert!(!channels[0].has_programs());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_channel_name("CNN HD"), "cnn");
        assert_eq!(normalize_channel_name("  Télé-Québec  Network "), "telequebec");
        assert_eq!(normalize_channel_name("FOX 5 East"), "fox 5");
        assert_eq!(normalize_channel_name("!!!"), "");
    }

    #[test]
    fn test_fuzzy_match() {
        let guide = create_guide(&["CNN", "BBC One", "Fox Sports 1"]);
        let mut channels = vec![create_channel("CNN HD"), create_channel("BBC ONE"), create_channel("Fox Sport 1"), create_channel("Discovery")];
        let matched = FuzzyNameMatcher::new(0.8).attach(&mut channels, &guide);
        assert_eq!(matched, 3);
        assert_eq!(channels[0].programs[0].title, "CNN Morning");
        assert_eq!(channels[1].programs[0].title, "BBC One Morning");
        assert_eq!(channels[2].programs[0].title, "Fox Sports 1 Morning");
        assert!(channels[3].programs.is_empty());
    }

    #[test]
    fn test_fuzzy_prefers_exact() {
        let guide = create_guide(&["CNN HD", "CNN"]);
        let channel = create_channel("CNN");
        assert_eq!(FuzzyNameMatcher::new(0.8).match_key(&channel, &guide), Some("CNN"));
        let channel = create_channel("CNN UHD");
        assert_eq!(FuzzyNameMatcher::new(0.8).match_key(&channel, &guide), Some("CNN HD"));
    }
}
