//! The usage collected from a project's assets.

use std::{collections::BTreeSet, path::PathBuf};

use crate::codepoints::CodepointTable;

/// One piece of evidence that something may be rendered.
///
/// Plain text contributes single characters; ligature markup and `icon`
/// fields contribute icon names, which only mean something through a
/// [`CodepointTable`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UsageToken {
    Character(char),
    IconName(String),
}

impl UsageToken {
    /// Classify a piece of icon text.
    ///
    /// Known icon names win over the single character reading; anything that
    /// is neither a known name nor exactly one character is not a token.
    pub fn classify(text: &str, table: &CodepointTable) -> Option<UsageToken> {
        if text.is_empty() {
            return None;
        }
        if table.contains(text) {
            return Some(UsageToken::IconName(text.to_owned()));
        }
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(UsageToken::Character(c)),
            _ => None,
        }
    }

    /// The code point this token asks a font to render.
    ///
    /// Returns `None` for an icon name missing from `table`.
    pub fn codepoint(&self, table: &CodepointTable) -> Option<u32> {
        match self {
            UsageToken::Character(c) => Some(*c as u32),
            UsageToken::IconName(name) => table.get(name),
        }
    }
}

/// The run context filled while walking the assets.
///
/// Both sets only ever grow; once the walk is done the context is frozen
/// with [`Usage::freeze`].
#[derive(Clone, Debug, Default)]
pub struct Usage {
    fonts: BTreeSet<String>,
    tokens: BTreeSet<UsageToken>,
    skipped_assets: Vec<(PathBuf, String)>,
    assets_scanned: usize,
}

impl Usage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a font reference, already normalized to a project relative
    /// path. Returns `true` if it was not seen before.
    pub fn add_font(&mut self, path: impl Into<String>) -> bool {
        self.fonts.insert(path.into())
    }

    /// Record a token. Returns `true` if it was not seen before.
    pub fn add_token(&mut self, token: UsageToken) -> bool {
        self.tokens.insert(token)
    }

    /// Record an asset that could not be scanned.
    pub fn skip_asset(&mut self, path: PathBuf, reason: impl Into<String>) {
        self.skipped_assets.push((path, reason.into()));
    }

    pub(crate) fn count_asset(&mut self) {
        self.assets_scanned += 1;
    }

    pub fn fonts(&self) -> &BTreeSet<String> {
        &self.fonts
    }

    pub fn tokens(&self) -> &BTreeSet<UsageToken> {
        &self.tokens
    }

    /// Stop collecting; the result can only be read.
    pub fn freeze(self) -> FrozenUsage {
        FrozenUsage(self)
    }
}

/// A [`Usage`] that no longer accepts new evidence.
#[derive(Clone, Debug, Default)]
pub struct FrozenUsage(Usage);

impl FrozenUsage {
    pub fn fonts(&self) -> &BTreeSet<String> {
        &self.0.fonts
    }

    pub fn tokens(&self) -> &BTreeSet<UsageToken> {
        &self.0.tokens
    }

    pub fn skipped_assets(&self) -> &[(PathBuf, String)] {
        &self.0.skipped_assets
    }

    pub fn assets_scanned(&self) -> usize {
        self.0.assets_scanned
    }

    /// The number of (characters, icon names) collected.
    pub fn token_counts(&self) -> (usize, usize) {
        self.0
            .tokens
            .iter()
            .fold((0, 0), |(chars, names), token| match token {
                UsageToken::Character(_) => (chars + 1, names),
                UsageToken::IconName(_) => (chars, names + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CodepointTable {
        [("home", 0xE88A), ("menu", 0xE5D2)].into_iter().collect()
    }

    #[test]
    fn classify_known_name() {
        assert_eq!(
            UsageToken::classify("home", &table()),
            Some(UsageToken::IconName("home".into()))
        );
    }

    #[test]
    fn classify_single_character() {
        assert_eq!(
            UsageToken::classify("x", &table()),
            Some(UsageToken::Character('x'))
        );
        assert_eq!(
            UsageToken::classify("\u{e88a}", &table()),
            Some(UsageToken::Character('\u{e88a}'))
        );
    }

    #[test]
    fn classify_rejects_other_text() {
        assert_eq!(UsageToken::classify("", &table()), None);
        assert_eq!(UsageToken::classify("bogus_name", &table()), None);
        assert_eq!(UsageToken::classify("ab", &table()), None);
    }

    #[test]
    fn codepoint_lookup() {
        let table = table();
        assert_eq!(UsageToken::Character('H').codepoint(&table), Some(0x48));
        assert_eq!(
            UsageToken::IconName("menu".into()).codepoint(&table),
            Some(0xE5D2)
        );
        assert_eq!(UsageToken::IconName("nope".into()).codepoint(&table), None);
    }

    #[test]
    fn sets_collapse_duplicates() {
        let mut usage = Usage::new();
        assert!(usage.add_font("assets/icons.woff"));
        assert!(!usage.add_font("assets/icons.woff"));
        assert!(usage.add_token(UsageToken::Character('l')));
        assert!(!usage.add_token(UsageToken::Character('l')));
        assert!(usage.add_token(UsageToken::IconName("home".into())));

        let frozen = usage.freeze();
        assert_eq!(frozen.fonts().len(), 1);
        assert_eq!(frozen.token_counts(), (1, 1));
    }
}
