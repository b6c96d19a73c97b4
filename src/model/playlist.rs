use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::model::xmltv::GuideEntry;

// https://de.wikipedia.org/wiki/M3U
// https://siptv.eu/howto/playlist.html

pub const M3U_HEADER: &str = "#EXTM3U";
pub const M3U_EXTINF: &str = "#EXTINF";
pub const M3U_STREAM_SCHEME: &str = "http";

pub const M3U_ATTRIB_ID: &str = "tvg-id";
pub const M3U_ATTRIB_NAME: &str = "tvg-name";
pub const M3U_ATTRIB_LOGO: &str = "tvg-logo";
pub const M3U_ATTRIB_GROUP: &str = "group-title";

/// One entry of a playlist snapshot.
///
/// `url` is the identity of a channel across snapshots, the position inside a
/// playlist carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub group: String,
    pub url: String,
    pub programs: Arc<Vec<GuideEntry>>,
}

impl Channel {
    pub fn has_programs(&self) -> bool {
        !self.programs.is_empty()
    }

    /// Renders the channel with its unmodified metadata, the url on the following line.
    pub fn to_m3u(&self) -> String {
        format!("{M3U_EXTINF}:-1 tvg-ID=\"{}\" tvg-name=\"{}\" tvg-logo=\"{}\" group-title=\"{}\",{}\n{}",
                self.id, self.name, self.logo, self.group, self.name, self.url)
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name, self.group)
    }
}

/// Renders a complete playlist, header first. No channels renders the header alone.
pub fn to_m3u_playlist<'a, I>(channels: I) -> String
where
    I: Iterator<Item=&'a Channel>,
{
    let mut lines = vec![M3U_HEADER.to_string()];
    lines.extend(channels.map(Channel::to_m3u));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use crate::model::playlist::{to_m3u_playlist, Channel};

    fn create_channel(id: &str, name: &str, url: &str) -> Channel {
        Channel {
            id: id.to_string(),
            name: name.to_string(),
            logo: String::new(),
            group: "News".to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_channel_to_m3u() {
        let channel = create_channel("1", "CNN", "http://x/cnn.ts");
        assert_eq!(channel.to_m3u(),
                   "#EXTINF:-1 tvg-ID=\"1\" tvg-name=\"CNN\" tvg-logo=\"\" group-title=\"News\",CNN\nhttp://x/cnn.ts");
    }

    #[test]
    fn test_empty_playlist_is_header_only() {
        let channels: Vec<Channel> = vec![];
        assert_eq!(to_m3u_playlist(channels.iter()), "#EXTM3U");
    }

    #[test]
    fn test_playlist_keeps_order() {
        let channels = vec![create_channel("", "B", "http://b"), create_channel("", "A", "http://a")];
        let text = to_m3u_playlist(channels.iter());
        let urls: Vec<&str> = text.lines().filter(|l| l.starts_with("http")).collect();
        assert_eq!(urls, vec!["http://b", "http://a"]);
    }
}
