use std::collections::HashSet;

use log::{debug, info};

use crate::debug_if_enabled;
use crate::model::{Channel, GuideIndex};
use crate::processing::processor::epg::GuideMatcher;
use crate::processing::processor::identity::IdentityIndex;
use crate::processing::processor::selection::SelectionSet;

/// Decides which channels of the unfiltered playlist are hidden from the catalog.
pub trait ChannelExclusion {
    fn is_excluded(&self, channel: &Channel) -> bool;
}

/// Excludes channels by group label, exact and case sensitive.
/// The default list is empty and excludes nothing.
#[derive(Debug, Default, Clone)]
pub struct GroupBlocklist {
    groups: HashSet<String>,
}

impl GroupBlocklist {
    pub fn new(groups: &[String]) -> Self {
        Self {
            groups: groups.iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl ChannelExclusion for GroupBlocklist {
    fn is_excluded(&self, channel: &Channel) -> bool {
        self.groups.contains(&channel.group)
    }
}

/// Filtered and guide enriched view of the unfiltered playlist.
#[derive(Debug, Default, Clone)]
pub struct ChannelCatalog {
    channels: Vec<Channel>,
    identity: IdentityIndex,
}

impl ChannelCatalog {
    /// The identity index sees the raw playlist, the exclusion only shapes the channel list.
    pub fn new(unfiltered: Vec<Channel>, exclusion: &dyn ChannelExclusion) -> Self {
        let identity = IdentityIndex::build(&[], &unfiltered);
        let total = unfiltered.len();
        let channels: Vec<Channel> = unfiltered.into_iter().filter(|c| !exclusion.is_excluded(c)).collect();
        if channels.len() < total {
            info!("excluded {} of {} channels", total - channels.len(), total);
        }
        Self { channels, identity }
    }

    pub fn attach_guide(&mut self, guide: &GuideIndex, matcher: &dyn GuideMatcher) -> usize {
        let matched = matcher.attach(&mut self.channels, guide);
        debug!("guide matched {} of {} channels", matched, self.channels.len());
        matched
    }

    /// Registers a further playlist snapshot (the saved selection) for identifier lookups.
    pub fn add_identity_snapshot(&mut self, channels: &[Channel]) {
        self.identity.add_snapshot(channels);
        debug_if_enabled!("identity index holds {} urls", self.identity.len());
    }

    pub fn all_channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channels whose group is one of `groups`, an empty list means all channels.
    pub fn channels_in_groups<S: AsRef<str>>(&self, groups: &[S]) -> Vec<&Channel> {
        if groups.is_empty() {
            return self.channels.iter().collect();
        }
        let wanted: HashSet<&str> = groups.iter().map(|g| g.as_ref()).collect();
        self.channels.iter().filter(|c| wanted.contains(c.group.as_str())).collect()
    }

    pub fn has_stable_identifier(&self, url: &str) -> bool {
        self.identity.has_identifier(url)
    }

    /// Distinct non empty groups in first seen order.
    pub fn groups(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.channels.iter()
            .map(|c| c.group.as_str())
            .filter(|group| !group.is_empty() && seen.insert(*group))
            .collect()
    }

    pub fn find_by_url(&self, url: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.url == url)
    }

    pub fn find_by_name(&self, name: &str) -> Vec<&Channel> {
        self.channels.iter().filter(|c| c.name == name).collect()
    }

    /// Selected urls without a catalog channel, sorted. They are not part of a saved playlist.
    pub fn orphaned_selection<'a>(&self, selection: &'a SelectionSet) -> Vec<&'a str> {
        let known: HashSet<&str> = self.channels.iter().map(|c| c.url.as_str()).collect();
        let mut orphaned: Vec<&str> = selection.iter().filter(|url| !known.contains(url)).collect();
        orphaned.sort_unstable();
        orphaned
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Channel;
    use crate::processing::parser::m3u::parse_m3u;
    use crate::processing::parser::xmltv::parse_guide;
    use crate::processing::processor::catalog::{ChannelCatalog, ChannelExclusion, GroupBlocklist};
    use crate::processing::processor::epg::ExactNameMatcher;
    use crate::processing::processor::selection::SelectionSet;

    const PLAYLIST: &str = "#EXTM3U\n\
        #EXTINF:-1 tvg-ID=\"cnn.us\" tvg-name=\"CNN\" group-title=\"US NEWS NETWORK\",CNN\n\
        http://x/cnn.ts\n\
        #EXTINF:-1 tvg-name=\"ESPN\" group-title=\"US SPORTS NETWORK\",ESPN\n\
        http://x/espn.ts\n\
        #EXTINF:-1 tvg-name=\"Local 5\" group-title=\"US LOCAL\",Local 5\n\
        http://x/local5.ts\n\
        #EXTINF:-1 tvg-ID=\"fox.us\" tvg-name=\"FOX\",FOX\n\
        http://x/fox.ts\n\
        #EXTINF:-1 tvg-name=\"MSNBC\" group-title=\"US NEWS NETWORK\",MSNBC\n\
        http://x/msnbc.ts\n";

    struct NoLogo;

    impl ChannelExclusion for NoLogo {
        fn is_excluded(&self, channel: &Channel) -> bool {
            channel.logo.trim().is_empty()
        }
    }

    fn names(channels: &[&Channel]) -> Vec<String> {
        channels.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_default_blocklist_keeps_everything() {
        let catalog = ChannelCatalog::new(parse_m3u(PLAYLIST), &GroupBlocklist::default());
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_blocklist_is_exact() {
        let blocklist = GroupBlocklist::new(&["US LOCAL".to_string(), "us sports network".to_string()]);
        let catalog = ChannelCatalog::new(parse_m3u(PLAYLIST), &blocklist);
        let all: Vec<&Channel> = catalog.all_channels().iter().collect();
        assert_eq!(names(&all), vec!["CNN", "ESPN", "FOX", "MSNBC"]);
    }

    #[test]
    fn test_custom_exclusion() {
        let catalog = ChannelCatalog::new(parse_m3u(PLAYLIST), &NoLogo);
        assert!(catalog.is_empty());
        assert!(catalog.has_stable_identifier("http://x/cnn.ts"));
    }

    #[test]
    fn test_channels_in_groups() {
        let catalog = ChannelCatalog::new(parse_m3u(PLAYLIST), &GroupBlocklist::default());
        assert_eq!(names(&catalog.channels_in_groups(&["US NEWS NETWORK"])), vec!["CNN", "MSNBC"]);
        assert_eq!(names(&catalog.channels_in_groups(&["US LOCAL".to_string(), "US NEWS NETWORK".to_string()])), vec!["CNN", "Local 5", "MSNBC"]);
        let no_groups: [&str; 0] = [];
        assert_eq!(catalog.channels_in_groups(&no_groups).len(), 5);
        assert!(catalog.channels_in_groups(&["Unknown"]).is_empty());
    }

    #[test]
    fn test_groups() {
        let catalog = ChannelCatalog::new(parse_m3u(PLAYLIST), &GroupBlocklist::default());
        assert_eq!(catalog.groups(), vec!["US NEWS NETWORK", "US SPORTS NETWORK", "US LOCAL"]);
    }

    #[test]
    fn test_stable_identifier_across_snapshots() {
        let blocklist = GroupBlocklist::new(&["US NEWS NETWORK".to_string()]);
        let mut catalog = ChannelCatalog::new(parse_m3u(PLAYLIST), &blocklist);
        assert!(catalog.has_stable_identifier("http://x/cnn.ts"));
        assert!(!catalog.has_stable_identifier("http://x/espn.ts"));
        catalog.add_identity_snapshot(&parse_m3u("#EXTINF:-1 tvg-ID=\"espn.us\" tvg-name=\"ESPN\",ESPN\nhttp://x/espn.ts"));
        assert!(catalog.has_stable_identifier("http://x/espn.ts"));
        assert!(!catalog.has_stable_identifier("http://x/msnbc.ts"));
    }

    #[test]
    fn test_attach_guide() {
        let mut catalog = ChannelCatalog::new(parse_m3u(PLAYLIST), &GroupBlocklist::default());
        let guide = parse_guide(r#"<tv><programme channel="CNN" start="20240101000000" stop="20240101003000"><title>Morning</title></programme></tv>"#).unwrap();
        assert_eq!(catalog.attach_guide(&guide, &ExactNameMatcher), 1);
        let cnn = catalog.find_by_url("http://x/cnn.ts").unwrap();
        assert_eq!(cnn.programs.len(), 1);
        assert_eq!(cnn.programs[0].title, "Morning");
        assert!(catalog.find_by_name("ESPN")[0].programs.is_empty());
    }

    #[test]
    fn test_orphaned_selection() {
        let catalog = ChannelCatalog::new(parse_m3u(PLAYLIST), &GroupBlocklist::default());
        let mut selection = SelectionSet::new();
        selection.add_all(["http://x/zzz.ts", "http://x/cnn.ts", "http://x/gone.ts"]);
        assert_eq!(catalog.orphaned_selection(&selection), vec!["http://x/gone.ts", "http://x/zzz.ts"]);
    }
}
