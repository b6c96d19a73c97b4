use std::collections::HashSet;

use crate::model::{to_m3u_playlist, Channel};
use crate::processing::processor::catalog::ChannelCatalog;

/// Stream urls the operator picked for the next saved playlist.
#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    urls: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole selection with the urls of `channels`.
    pub fn seed_from(&mut self, channels: &[Channel]) {
        self.urls = channels.iter().map(|c| c.url.clone()).collect();
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn add(&mut self, url: &str) {
        if !self.urls.contains(url) {
            self.urls.insert(url.to_string());
        }
    }

    pub fn remove(&mut self, url: &str) {
        self.urls.remove(url);
    }

    /// Returns the membership after toggling.
    pub fn toggle(&mut self, url: &str) -> bool {
        if self.urls.remove(url) {
            false
        } else {
            self.urls.insert(url.to_string());
            true
        }
    }

    pub fn add_all<'a, I>(&mut self, urls: I)
    where
        I: IntoIterator<Item=&'a str>,
    {
        urls.into_iter().for_each(|url| self.add(url));
    }

    pub fn remove_all<'a, I>(&mut self, urls: I)
    where
        I: IntoIterator<Item=&'a str>,
    {
        urls.into_iter().for_each(|url| self.remove(url));
    }

    /// Select-all for a visible set of urls: if every url is already selected they are
    /// all removed, otherwise all are added. Returns the resulting membership.
    pub fn toggle_all(&mut self, urls: &[&str]) -> bool {
        let all_selected = urls.iter().all(|url| self.contains(url));
        if all_selected {
            self.remove_all(urls.iter().copied());
        } else {
            self.add_all(urls.iter().copied());
        }
        !all_selected
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item=&str> {
        self.urls.iter().map(String::as_str)
    }

    /// Catalog channels which are selected, in catalog order.
    pub fn selected_channels<'a>(&self, catalog: &'a ChannelCatalog) -> Vec<&'a Channel> {
        catalog.all_channels().iter().filter(|c| self.contains(&c.url)).collect()
    }

    /// Renders the selected catalog channels with their original metadata.
    /// Nothing selected renders the playlist header alone.
    pub fn serialize(&self, catalog: &ChannelCatalog) -> String {
        to_m3u_playlist(self.selected_channels(catalog).into_iter())
    }
}
