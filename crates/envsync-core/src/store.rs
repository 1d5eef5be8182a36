//! Flat `KEY=VALUE` key-value store
//!
//! Both the template and the live store are files in this format. Parsing is
//! delegated to `dotenvy`, so comments, blank lines, `export` prefixes and
//! quoted values are accepted on load.
//!
//! A loaded store remembers the text of every line it read. Saving writes
//! comments, blank lines and untouched entries back exactly as they were;
//! only entries that were set to a new value are rendered again, and new
//! keys are appended at the end. Rendering writes `KEY=VALUE` unquoted and
//! only falls back to quoting when a value would not otherwise read back as
//! the same string.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{EnvSyncError, Result};

/// One line (or multi-line quoted entry) of a store file.
#[derive(Debug, Clone)]
enum Line {
    /// Comment or blank line, kept as read
    Verbatim(String),
    /// An entry; `raw` is the text it was read from, `None` once it changed
    Entry {
        key: String,
        value: String,
        raw: Option<String>,
    },
}

/// Ordered mapping from key to value; order follows the file.
#[derive(Debug, Clone, Default)]
pub struct KeyValueStore {
    lines: Vec<Line>,
}

/// True when `key` can be written to and read back from a store file:
/// an ASCII letter or `_`, then ASCII letters, digits, `_` or `.`.
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from pairs; a repeated key keeps its first position and
    /// its last value.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut store = Self::new();
        for (key, value) in pairs {
            store.set(key, value)?;
        }
        Ok(store)
    }

    /// Load a store from disk.
    ///
    /// Fails with [`EnvSyncError::NotFound`] when the file does not exist;
    /// the caller decides whether that is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EnvSyncError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let store = Self::parse(&contents).map_err(|message| EnvSyncError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::debug!("Loaded {} entries from {}", store.len(), path.display());
        Ok(store)
    }

    /// Parse the flat text format.
    ///
    /// Values come from one `dotenvy` pass over the whole text, so `$VAR`
    /// references resolve the same way they do when the file is loaded into
    /// the environment. The text of each entry is kept alongside its value.
    pub fn parse(contents: &str) -> std::result::Result<Self, String> {
        let values = dotenvy::from_read_iter(contents.as_bytes())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;

        let segments = split_lines(contents)?;
        let entry_count = segments.iter().filter(|s| s.is_entry()).count();
        if entry_count != values.len() {
            return Err(format!(
                "found {entry_count} entries but parsed {} values",
                values.len()
            ));
        }

        let mut store = Self::new();
        let mut values = values.into_iter();
        for segment in segments {
            match segment {
                Segment::Verbatim(text) => store.lines.push(Line::Verbatim(text)),
                Segment::Entry { key, raw } => {
                    let (parsed_key, value) = values
                        .next()
                        .ok_or_else(|| format!("no value parsed for {key}"))?;
                    if parsed_key != key {
                        return Err(format!("expected {key}, parsed {parsed_key}"));
                    }
                    store.insert_read(key, value, raw);
                }
            }
        }
        Ok(store)
    }

    /// Write the store to `path`, overwriting whatever was there.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render())?;
        tracing::debug!("Saved {} entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Serialize to the flat text format, one line per entry.
    ///
    /// Lines read from a file come back unchanged unless their value was set.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Verbatim(text) => out.push_str(text),
                Line::Entry { raw: Some(raw), .. } => out.push_str(raw),
                Line::Entry {
                    key,
                    value,
                    raw: None,
                } => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(&render_value(value));
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.find(key).and_then(|idx| match &self.lines[idx] {
            Line::Entry { value, .. } => Some(value.as_str()),
            Line::Verbatim(_) => None,
        })
    }

    /// Value for `key`, or `default` when the key is absent.
    ///
    /// An empty value is returned as-is; it is not the same as absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Insert or replace. Replacing keeps the key's position.
    ///
    /// Fails with [`EnvSyncError::InvalidKey`] for a key the file format
    /// cannot hold; the store is left unchanged.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if !is_valid_key(&key) {
            return Err(EnvSyncError::InvalidKey(key));
        }
        let value = value.into();

        match self.find(&key) {
            Some(idx) => {
                if let Line::Entry {
                    value: current,
                    raw,
                    ..
                } = &mut self.lines[idx]
                {
                    if *current != value {
                        *current = value;
                        *raw = None;
                    }
                }
            }
            None => self.lines.push(Line::Entry {
                key,
                value,
                raw: None,
            }),
        }
        Ok(())
    }

    /// Remove `key`, returning its previous value.
    pub fn unset(&mut self, key: &str) -> Option<String> {
        let idx = self.find(key)?;
        match self.lines.remove(idx) {
            Line::Entry { value, .. } => Some(value),
            Line::Verbatim(_) => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry { key, value, .. } => Some((key.as_str(), value.as_str())),
            Line::Verbatim(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn find(&self, key: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| matches!(line, Line::Entry { key: k, .. } if k == key))
    }

    /// A repeated key keeps its first position and takes the later line.
    fn insert_read(&mut self, key: String, value: String, raw: String) {
        match self.find(&key) {
            Some(idx) => {
                self.lines[idx] = Line::Entry {
                    key,
                    value,
                    raw: Some(raw),
                }
            }
            None => self.lines.push(Line::Entry {
                key,
                value,
                raw: Some(raw),
            }),
        }
    }
}

/// Stores are equal when they hold the same entries in the same order;
/// comments and formatting are not compared.
impl PartialEq for KeyValueStore {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for KeyValueStore {}

impl fmt::Display for KeyValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

enum Segment {
    Verbatim(String),
    Entry { key: String, raw: String },
}

impl Segment {
    fn is_entry(&self) -> bool {
        matches!(self, Segment::Entry { .. })
    }
}

/// Split `contents` into comment/blank lines and entries. A quoted value
/// spanning several lines becomes one entry.
fn split_lines(contents: &str) -> std::result::Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut pending: Option<String> = None;

    for line in contents.lines() {
        let chunk = match pending.take() {
            Some(mut chunk) => {
                chunk.push('\n');
                chunk.push_str(line);
                chunk
            }
            None => {
                let trimmed = line.trim_start();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    segments.push(Segment::Verbatim(line.to_string()));
                    continue;
                }
                line.to_string()
            }
        };

        match entry_key(&chunk) {
            Some(key) => segments.push(Segment::Entry { key, raw: chunk }),
            None => pending = Some(chunk),
        }
    }

    match pending {
        Some(chunk) => Err(format!("unterminated entry: {chunk}")),
        None => Ok(segments),
    }
}

/// Key of `chunk` when it holds exactly one complete entry.
fn entry_key(chunk: &str) -> Option<String> {
    let mut items = dotenvy::from_read_iter(chunk.as_bytes());
    match (items.next(), items.next()) {
        (Some(Ok((key, _))), None) => Some(key),
        _ => None,
    }
}

/// Characters that change meaning in an unquoted value.
fn needs_quoting(value: &str) -> bool {
    value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '$' | '\\' | '`'))
}

fn render_value(value: &str) -> String {
    if !needs_quoting(value) {
        return value.to_string();
    }

    // Single quotes are literal, so they win whenever the value allows it.
    if !value.contains('\'') {
        return format!("'{value}'");
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let contents = "# header\n\nA=1\n# another\nB=two\n";
        let store = KeyValueStore::parse(contents).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("A"), Some("1"));
        assert_eq!(store.get("B"), Some("two"));
    }

    #[test]
    fn test_empty_value_is_not_absent() {
        let store = KeyValueStore::parse("EMPTY=\n").unwrap();

        assert!(store.contains("EMPTY"));
        assert_eq!(store.get("EMPTY"), Some(""));
        assert_eq!(store.get_or("EMPTY", "fallback"), "");
        assert_eq!(store.get_or("MISSING", "fallback"), "fallback");
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let store = KeyValueStore::parse("Z=1\nA=2\nM=3\n").unwrap();
        let keys: Vec<_> = store.keys().collect();
        assert_eq!(keys, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut store = KeyValueStore::from_pairs([("A", "1"), ("B", "2")]).unwrap();
        store.set("A", "10").unwrap();
        store.set("C", "3").unwrap();

        let pairs: Vec<_> = store.iter().collect();
        assert_eq!(pairs, vec![("A", "10"), ("B", "2"), ("C", "3")]);
    }

    #[test]
    fn test_set_rejects_unreadable_keys() {
        let mut store = KeyValueStore::from_pairs([("A", "1")]).unwrap();

        for key in ["", "BAD KEY", "A=B", "#A", "1ST", "KEY\n"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(matches!(err, EnvSyncError::InvalidKey(ref k) if k == key));
        }
        assert_eq!(store.render(), "A=1\n");
        assert!(KeyValueStore::from_pairs([("BAD KEY", "1")]).is_err());
    }

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key("OPENAI_API_KEY"));
        assert!(is_valid_key("_private"));
        assert!(is_valid_key("app.port2"));
        assert!(!is_valid_key("2FA"));
        assert!(!is_valid_key("has-dash"));
    }

    #[test]
    fn test_unset_returns_previous_value() {
        let mut store = KeyValueStore::from_pairs([("A", "1")]).unwrap();
        assert_eq!(store.unset("A"), Some("1".to_string()));
        assert_eq!(store.unset("A"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_render_plain_values_unquoted() {
        let store = KeyValueStore::from_pairs([("A", "1"), ("B", ""), ("C", "gpt-4")]).unwrap();
        assert_eq!(store.render(), "A=1\nB=\nC=gpt-4\n");
    }

    #[test]
    fn test_render_quotes_only_when_needed() {
        assert_eq!(render_value("plain"), "plain");
        assert_eq!(render_value("has space"), "'has space'");
        assert_eq!(render_value("it's $HOME"), "\"it's \\$HOME\"");
    }

    #[test]
    fn test_quoted_values_read_back() {
        let store = KeyValueStore::from_pairs([
            ("SPACED", "two words"),
            ("HASH", "a#b"),
            ("DOLLAR", "$NOT_EXPANDED"),
            ("MIXED", "it's \"quoted\""),
        ])
        .unwrap();

        let parsed = KeyValueStore::parse(&store.render()).unwrap();
        assert_eq!(parsed, store);
    }

    #[test]
    fn test_render_keeps_untouched_lines() {
        let contents = "# header\nA='single quoted'\n\nB=${HOME}/x\nexport C=3\n";
        let mut store = KeyValueStore::parse(contents).unwrap();
        assert_eq!(store.render(), contents);

        store.set("C", "4").unwrap();
        store.set("D", "new").unwrap();
        assert_eq!(
            store.render(),
            "# header\nA='single quoted'\n\nB=${HOME}/x\nC=4\nD=new\n"
        );
    }

    #[test]
    fn test_set_same_value_keeps_line() {
        let mut store = KeyValueStore::parse("A=\"1\"\n").unwrap();
        store.set("A", "1").unwrap();
        assert_eq!(store.render(), "A=\"1\"\n");
    }

    #[test]
    fn test_unset_drops_only_that_line() {
        let mut store = KeyValueStore::parse("# a\nA=1\n# b\nB=2\n").unwrap();
        store.unset("A");
        assert_eq!(store.render(), "# a\n# b\nB=2\n");
    }

    #[test]
    fn test_multiline_quoted_value_is_one_entry() {
        let contents = "A=\"first\nsecond\"\nB=2\n";
        let store = KeyValueStore::parse(contents).unwrap();

        assert_eq!(store.get("A"), Some("first\nsecond"));
        assert_eq!(store.get("B"), Some("2"));
        assert_eq!(store.render(), contents);
    }

    #[test]
    fn test_repeated_key_keeps_first_position_last_value() {
        let store = KeyValueStore::parse("A=1\nB=2\nA=3\n").unwrap();
        let pairs: Vec<_> = store.iter().collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
        assert_eq!(store.render(), "A=3\nB=2\n");
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        assert!(KeyValueStore::parse("NOT A PAIR\n").is_err());
    }
}
