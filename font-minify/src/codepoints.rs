//! Icon name to code point tables.
//!
//! Icon fonts such as Material Icons render an icon either from its private
//! use code point or from a ligature of its name (`home` → U+E88A). To know
//! which glyph a name refers to we need the table that ships alongside the
//! font, in the line oriented format:
//!
//! ```text
//! home e88a
//! menu e5d2
//! ```

use std::{collections::BTreeMap, fmt, path::PathBuf};

use crate::Error;

static EMBEDDED_TABLE: &str = include_str!("../data/material-icons.codepoints");

/// A mapping from icon name to Unicode code point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodepointTable {
    entries: BTreeMap<String, u32>,
    skipped: usize,
}

impl CodepointTable {
    /// Parse a codepoints file.
    ///
    /// A record is accepted only if it has exactly two whitespace separated
    /// fields and the second is a hexadecimal Unicode scalar value. Other
    /// records are skipped and counted, see [`CodepointTable::skipped`].
    /// Blank lines and lines starting with `#` are not records.
    pub fn parse(text: &str) -> CodepointTable {
        let mut table = CodepointTable::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_record(line) {
                Some((name, codepoint)) => {
                    table.entries.insert(name.to_owned(), codepoint);
                }
                None => {
                    log::debug!("skipping malformed codepoint record '{line}'");
                    table.skipped += 1;
                }
            }
        }
        table
    }

    /// The table compiled into this crate.
    pub fn embedded() -> CodepointTable {
        CodepointTable::parse(EMBEDDED_TABLE)
    }

    /// Returns the code point for an icon name, if the name is known.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of malformed records encountered while parsing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> FromIterator<(&'a str, u32)> for CodepointTable {
    fn from_iter<T: IntoIterator<Item = (&'a str, u32)>>(iter: T) -> Self {
        CodepointTable {
            entries: iter
                .into_iter()
                .map(|(name, cp)| (name.to_owned(), cp))
                .collect(),
            skipped: 0,
        }
    }
}

fn parse_record(line: &str) -> Option<(&str, u32)> {
    let mut fields = line.split_whitespace();
    let (name, hex) = (fields.next()?, fields.next()?);
    if fields.next().is_some() {
        return None;
    }
    let codepoint = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(codepoint).map(|_| (name, codepoint))
}

/// Where to load a [`CodepointTable`] from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CodepointSource {
    /// The table compiled into this crate.
    #[default]
    Embedded,
    /// A codepoints file on disk.
    File(PathBuf),
    /// A codepoints file fetched over http(s).
    Url(String),
}

impl CodepointSource {
    /// Interpret a command line argument: URLs are fetched, anything else is
    /// a path.
    pub fn from_arg(arg: &str) -> CodepointSource {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            CodepointSource::Url(arg.to_owned())
        } else {
            CodepointSource::File(PathBuf::from(arg))
        }
    }

    /// Load and parse the table.
    ///
    /// Any failure to obtain the table, including a table without a single
    /// valid record, is fatal: resolving icon names without it would quietly
    /// treat every name as unrecognized text.
    pub fn load(&self) -> Result<CodepointTable, Error> {
        let text = match self {
            CodepointSource::Embedded => EMBEDDED_TABLE.to_owned(),
            CodepointSource::File(path) => {
                std::fs::read_to_string(path).map_err(|e| self.unavailable(e))?
            }
            CodepointSource::Url(url) => fetch(url).map_err(|e| self.unavailable(e))?,
        };
        let table = CodepointTable::parse(&text);
        if table.is_empty() {
            return Err(self.unavailable("no valid `<name> <hex>` records"));
        }
        log::info!(
            "loaded {} icon codepoints from {self} ({} malformed records skipped)",
            table.len(),
            table.skipped()
        );
        Ok(table)
    }

    fn unavailable(&self, reason: impl fmt::Display) -> Error {
        Error::MappingUnavailable {
            source_name: self.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for CodepointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodepointSource::Embedded => write!(f, "embedded table"),
            CodepointSource::File(path) => write!(f, "'{}'", path.display()),
            CodepointSource::Url(url) => write!(f, "<{url}>"),
        }
    }
}

#[cfg(feature = "fetch")]
fn fetch(url: &str) -> Result<String, String> {
    log::info!("fetching icon codepoints from {url}");
    ureq::get(url)
        .call()
        .map_err(|e| e.to_string())?
        .into_string()
        .map_err(|e| e.to_string())
}

#[cfg(not(feature = "fetch"))]
fn fetch(_url: &str) -> Result<String, String> {
    Err("built without the 'fetch' feature".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_two_field_records() {
        let table = CodepointTable::parse("home e88a\nmenu E5D2\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("home"), Some(0xE88A));
        assert_eq!(table.get("menu"), Some(0xE5D2));
        assert_eq!(table.skipped(), 0);
    }

    #[test]
    fn parse_skips_malformed_records() {
        let text = "home e88a\n\
                    three fields here\n\
                    lonely\n\
                    bad_hex zz12\n\
                    surrogate d800\n\
                    \n\
                    # a comment\n\
                    menu e5d2";
        let table = CodepointTable::parse(text);
        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped(), 4);
        assert!(!table.contains("three"));
        assert!(!table.contains("bad_hex"));
        assert!(!table.contains("surrogate"));
    }

    #[test]
    fn comment_lines_are_neither_records_nor_skipped() {
        let table = CodepointTable::parse("# name codepoint\n#home e88b\n  # indented\nhome e88a");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("home"), Some(0xE88A));
        assert!(!table.contains("#home"));
        assert_eq!(table.skipped(), 0);
    }

    #[test]
    fn later_records_win() {
        let table = CodepointTable::parse("home e88a\nhome e88b");
        assert_eq!(table.get("home"), Some(0xE88B));
    }

    #[test]
    fn embedded_table_is_usable() {
        let table = CodepointTable::embedded();
        assert!(table.len() > 100);
        assert_eq!(table.skipped(), 0);
        assert_eq!(table.get("home"), Some(0xE88A));
        assert_eq!(table.get("menu"), Some(0xE5D2));
        assert_eq!(table.get("settings"), Some(0xE8B8));
    }

    #[test]
    fn source_from_arg() {
        assert_eq!(
            CodepointSource::from_arg("https://example.com/codepoints"),
            CodepointSource::Url("https://example.com/codepoints".into())
        );
        assert_eq!(
            CodepointSource::from_arg("fonts/codepoints"),
            CodepointSource::File("fonts/codepoints".into())
        );
    }

    #[test]
    fn missing_file_is_fatal() {
        let source = CodepointSource::File("/definitely/not/here/codepoints".into());
        let err = source.load().unwrap_err();
        assert!(matches!(err, Error::MappingUnavailable { .. }));
    }

    #[test]
    fn empty_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codepoints");
        std::fs::write(&path, "not a table\n").unwrap();
        let err = CodepointSource::File(path).load().unwrap_err();
        assert!(matches!(err, Error::MappingUnavailable { .. }));
    }

    #[test]
    fn unreachable_url_is_fatal() {
        // nothing listens on the discard port
        let source = CodepointSource::Url("http://127.0.0.1:9/codepoints".into());
        let err = source.load().unwrap_err();
        assert!(matches!(err, Error::MappingUnavailable { .. }));
    }
}
