use indexmap::IndexMap;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::m3u_curator_error::{M3uCuratorError, M3uCuratorErrorKind, create_m3u_curator_error};
use crate::model::{GuideEntry, GuideIndex, EPG_ATTRIB_CHANNEL, EPG_ATTRIB_START, EPG_ATTRIB_STOP, EPG_DEFAULT_TITLE, EPG_TAG_PROGRAMME, EPG_TAG_TITLE};

// programme currently read, the title is the first non empty <title> inside
struct ProgrammeTag {
    channel: Option<String>,
    start: String,
    stop: String,
    title: Option<String>,
}

impl ProgrammeTag {
    fn into_entry(self) -> Option<(String, GuideEntry)> {
        let channel = self.channel.filter(|c| !c.is_empty())?;
        Some((channel, GuideEntry {
            start: self.start,
            stop: self.stop,
            title: self.title.unwrap_or_else(|| EPG_DEFAULT_TITLE.to_string()),
        }))
    }
}

fn parse_error(reader: &Reader<&[u8]>, err: &dyn std::fmt::Display) -> M3uCuratorError {
    create_m3u_curator_error!(M3uCuratorErrorKind::Parse, "malformed guide at position {}: {}", reader.buffer_position(), err)
}

fn read_programme(reader: &Reader<&[u8]>, tag: &BytesStart) -> Result<ProgrammeTag, M3uCuratorError> {
    let mut programme = ProgrammeTag {
        channel: None,
        start: String::new(),
        stop: String::new(),
        title: None,
    };
    for attribute in tag.attributes() {
        let attribute = attribute.map_err(|err| parse_error(reader, &err))?;
        let value = attribute.unescape_value().map_err(|err| parse_error(reader, &err))?;
        match attribute.key.as_ref() {
            key if key == EPG_ATTRIB_CHANNEL.as_bytes() => programme.channel = Some(value.to_string()),
            key if key == EPG_ATTRIB_START.as_bytes() => programme.start = value.to_string(),
            key if key == EPG_ATTRIB_STOP.as_bytes() => programme.stop = value.to_string(),
            _ => {}
        }
    }
    Ok(programme)
}

fn set_title(programme: Option<&mut ProgrammeTag>, in_title: bool, text: &str) {
    if let Some(prog) = programme {
        if in_title && prog.title.is_none() && !text.is_empty() {
            prog.title = Some(text.to_string());
        }
    }
}

/// Collects all `<programme>` elements per `channel` attribute, keys in document order.
/// Programmes without channel are skipped, a missing or empty title becomes the placeholder.
pub fn parse_guide(content: &str) -> Result<GuideIndex, M3uCuratorError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut programs: IndexMap<String, Vec<GuideEntry>> = IndexMap::new();
    let mut current: Option<ProgrammeTag> = None;
    let mut in_title = false;
    let mut depth: usize = 0;
    let mut has_root = false;

    let mut add_programme = |programme: ProgrammeTag| {
        if let Some((channel, entry)) = programme.into_entry() {
            programs.entry(channel).or_default().push(entry);
        }
    };

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => {
                if depth > 0 || current.is_some() {
                    return Err(parse_error(&reader, &format!("document ends with {depth} unclosed elements")));
                }
                if !has_root && !content.trim().is_empty() {
                    return Err(parse_error(&reader, &"no root element"));
                }
                break;
            }
            Ok(Event::Start(e)) => {
                depth += 1;
                has_root = true;
                let name = e.name();
                if name.as_ref() == EPG_TAG_PROGRAMME.as_bytes() {
                    current = Some(read_programme(&reader, &e)?);
                } else if name.as_ref() == EPG_TAG_TITLE.as_bytes() {
                    in_title = current.is_some();
                }
            }
            Ok(Event::Empty(e)) => {
                has_root = true;
                if e.name().as_ref() == EPG_TAG_PROGRAMME.as_bytes() {
                    add_programme(read_programme(&reader, &e)?);
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                let name = e.name();
                if name.as_ref() == EPG_TAG_PROGRAMME.as_bytes() {
                    in_title = false;
                    if let Some(programme) = current.take() {
                        add_programme(programme);
                    }
                } else if name.as_ref() == EPG_TAG_TITLE.as_bytes() {
                    in_title = false;
                }
            }
            Ok(Event::Text(e)) => {
                if depth == 0 && !e.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err(parse_error(&reader, &"text outside of the root element"));
                }
                if in_title {
                    let text = e.unescape().map_err(|err| parse_error(&reader, &err))?;
                    set_title(current.as_mut(), in_title, text.trim());
                }
            }
            Ok(Event::CData(e)) => {
                if in_title {
                    let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                    set_title(current.as_mut(), in_title, text.trim());
                }
            }
            Ok(_) => {}
            Err(err) => return Err(parse_error(&reader, &err)),
        }
    }

    let guide = GuideIndex::new(programs);
    debug!("parsed {} programmes for {} guide channels", guide.program_count(), guide.len());
    Ok(guide)
}

#[cfg(test)]
mod tests {
    use crate::m3u_curator_error::M3uCuratorErrorKind;
    use crate::processing::parser::xmltv::parse_guide;

    const GUIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE tv SYSTEM "xmltv.dtd">
<tv generator-info-name="test">
  <channel id="CNN"><display-name>CNN</display-name><icon src="http://l/cnn.png"/></channel>
  <programme channel="CNN" start="20240101000000 +0000" stop="20240101003000 +0000">
    <title lang="en">Morning</title>
    <desc>News &amp; more</desc>
  </programme>
  <programme channel="BBC" start="20240101000000 +0000" stop="20240101010000 +0000">
    <title><![CDATA[Tom & Jerry]]></title>
  </programme>
  <programme channel="CNN" start="20240101003000 +0000" stop="20240101010000 +0000">
    <title></title>
  </programme>
  <programme channel="CNN" start="20240101010000 +0000" stop="20240101020000 +0000"/>
  <programme start="20240101010000 +0000" stop="20240101020000 +0000"><title>Lost</title></programme>
</tv>"#;

    #[test]
    fn test_parse_single_programme() {
        let guide = parse_guide(r#"<tv><programme channel="CNN" start="20240101000000" stop="20240101003000"><title>Morning</title></programme></tv>"#).unwrap();
        let entries = guide.get("CNN").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start, "20240101000000");
        assert_eq!(entries[0].stop, "20240101003000");
        assert_eq!(entries[0].title, "Morning");
    }

    #[test]
    fn test_parse_guide_document_order() {
        let guide = parse_guide(GUIDE).unwrap();
        assert_eq!(guide.keys().collect::<Vec<&str>>(), vec!["CNN", "BBC"]);
        let cnn = guide.get("CNN").unwrap();
        let titles: Vec<&str> = cnn.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Morning", "No title", "No title"]);
        assert_eq!(guide.get("BBC").unwrap()[0].title, "Tom & Jerry");
        assert_eq!(guide.program_count(), 4);
        assert!(guide.get("cnn").is_none());
    }

    #[test]
    fn test_parse_empty_guide() {
        assert!(parse_guide("").unwrap().is_empty());
        assert!(parse_guide("<tv></tv>").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_guide() {
        let err = parse_guide(r#"<tv><programme channel="CNN"><title>A</title></tv>"#).unwrap_err();
        assert_eq!(err.kind, M3uCuratorErrorKind::Parse);
    }

    #[test]
    fn test_parse_truncated_guide() {
        let truncated = r#"<tv><programme channel="CNN" start="1" stop="2"><title>A</title></programme><programme channel="CNN" start="2" stop="3"><title>B</title>"#;
        assert_eq!(parse_guide(truncated).unwrap_err().kind, M3uCuratorErrorKind::Parse);
        assert_eq!(parse_guide(r#"<tv><programme channel="CNN" start="1" stop="2"/>"#).unwrap_err().kind, M3uCuratorErrorKind::Parse);
    }

    #[test]
    fn test_parse_non_xml_guide() {
        assert_eq!(parse_guide("this is not xml at all").unwrap_err().kind, M3uCuratorErrorKind::Parse);
        assert_eq!(parse_guide("<tv></tv> trailing").unwrap_err().kind, M3uCuratorErrorKind::Parse);
    }
}
