use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;

use indexmap::IndexMap;
use log::debug;
use regex::Regex;

use crate::model::{Channel, M3U_ATTRIB_GROUP, M3U_ATTRIB_ID, M3U_ATTRIB_LOGO, M3U_ATTRIB_NAME, M3U_EXTINF, M3U_HEADER, M3U_STREAM_SCHEME};
use crate::trace_if_enabled;
use crate::utils::sanitize_sensitive_info;

// Field lookups on the raw directive, used when a malformed attribute swallowed a field.
static FIELD_REGEXES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [M3U_ATTRIB_ID, M3U_ATTRIB_NAME, M3U_ATTRIB_LOGO, M3U_ATTRIB_GROUP].iter()
        .map(|key| (*key, Regex::new(&format!(r#"(?i)(?:^|[\s,:]){}="([^"]*)""#, regex::escape(key))).unwrap()))
        .collect()
});

fn find_field(line: &str, key: &str) -> Option<String> {
    FIELD_REGEXES.iter()
        .find(|(field, _)| *field == key)
        .and_then(|(_, re)| re.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Tokens of one `#EXTINF` directive. Attribute keys are lowercased,
/// the first occurrence of a key wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtInf {
    pub duration: String,
    pub attributes: IndexMap<String, String>,
    pub title: String,
}

impl ExtInf {
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    // every field is looked up on its own, a broken neighbour attribute must not hide it
    fn field(&self, line: &str, key: &str) -> String {
        self.get_attribute(key).map(str::to_string)
            .or_else(|| find_field(line, key))
            .unwrap_or_default()
    }
}

#[inline]
fn skip_whitespace(it: &mut Peekable<Chars>) {
    while it.next_if(|c| c.is_whitespace()).is_some() {}
}

fn token_till(it: &mut Peekable<Chars>, stop_char: char) -> String {
    let mut result = String::new();
    for ch in it.by_ref() {
        if ch == stop_char {
            break;
        }
        result.push(ch);
    }
    result
}

fn token_while<F: Fn(char) -> bool>(it: &mut Peekable<Chars>, accept: F) -> String {
    let mut result = String::new();
    while let Some(ch) = it.next_if(|c| accept(*c)) {
        result.push(ch);
    }
    result
}

// None for a value with a missing closing quote
fn token_value(it: &mut Peekable<Chars>) -> Option<String> {
    if it.next_if_eq(&'"').is_some() {
        let mut result = String::with_capacity(64);
        for ch in it.by_ref() {
            if ch == '"' {
                return Some(result);
            }
            result.push(ch);
        }
        None
    } else {
        Some(token_while(it, |c| !c.is_whitespace() && c != ','))
    }
}

/// Splits `#EXTINF:<duration> key="value" ...,<title>` into its tokens.
/// Returns `None` if the line is not an `#EXTINF` directive. Unknown keys are kept,
/// bare words without `=` are skipped.
pub fn tokenize_extinf(line: &str) -> Option<ExtInf> {
    let mut it = line.trim().chars().peekable();
    if token_till(&mut it, ':').trim_end() != M3U_EXTINF {
        return None;
    }
    let mut extinf = ExtInf::default();
    skip_whitespace(&mut it);
    extinf.duration = token_while(&mut it, |c| c == '-' || c == '+' || c == '.' || c.is_ascii_digit());
    loop {
        skip_whitespace(&mut it);
        match it.peek() {
            None => break,
            Some(',') => {
                it.next();
                extinf.title = it.collect::<String>().trim().to_string();
                break;
            }
            Some(_) => {
                let key = token_while(&mut it, |c| c != '=' && c != ',' && !c.is_whitespace());
                if it.next_if_eq(&'=').is_some() {
                    if let Some(value) = token_value(&mut it) {
                        if !key.is_empty() {
                            extinf.attributes.entry(key.to_lowercase()).or_insert(value);
                        }
                    }
                }
            }
        }
    }
    Some(extinf)
}

fn create_channel(extinf: &ExtInf, line: &str, url: &str) -> Channel {
    Channel {
        id: extinf.field(line, M3U_ATTRIB_ID),
        name: extinf.field(line, M3U_ATTRIB_NAME),
        logo: extinf.field(line, M3U_ATTRIB_LOGO),
        group: extinf.field(line, M3U_ATTRIB_GROUP),
        url: url.to_string(),
        ..Default::default()
    }
}

/// Visits every channel of a playlist. A directive is held until the next stream url,
/// a url without directive is dropped, other lines are ignored.
pub fn consume_m3u<'a, I, F: FnMut(Channel)>(lines: I, mut visit: F)
where
    I: Iterator<Item=&'a str>,
{
    let mut header: Option<(ExtInf, &str)> = None;
    for raw_line in lines {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(M3U_HEADER) {
            continue;
        }
        if line.starts_with(M3U_EXTINF) {
            header = tokenize_extinf(line).map(|extinf| (extinf, line));
            continue;
        }
        if line.starts_with(M3U_STREAM_SCHEME) {
            match header.take() {
                Some((extinf, directive)) => visit(create_channel(&extinf, directive, line)),
                None => trace_if_enabled!("skipping stream without #EXTINF: {}", sanitize_sensitive_info(line)),
            }
        }
    }
}

pub fn parse_m3u(content: &str) -> Vec<Channel> {
    let mut channels = vec![];
    consume_m3u(content.lines(), |channel| channels.push(channel));
    debug!("parsed {} channels from m3u", channels.len());
    channels
}
