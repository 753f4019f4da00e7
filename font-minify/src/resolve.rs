//! Turn collected usage into the glyphs a particular font must keep.

use std::collections::BTreeMap;

use read_fonts::{collections::IntSet, types::GlyphId};

use crate::{
    codepoints::CodepointTable,
    glyph::{FontInventory, GlyphName},
    usage::UsageToken,
};

/// The glyphs of one font that are reachable from the collected usage.
///
/// Always a subset of the font's [`FontInventory`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedGlyphSet {
    glyphs: BTreeMap<GlyphName, GlyphId>,
}

impl ResolvedGlyphSet {
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = GlyphName> + '_ {
        self.glyphs.keys().copied()
    }

    /// The glyph ids to retain, in the font being resolved against.
    pub fn glyph_ids(&self) -> IntSet<GlyphId> {
        self.glyphs.values().copied().collect()
    }

    /// The code points whose mappings should survive subsetting.
    pub fn codepoints(&self) -> IntSet<u32> {
        self.glyphs.keys().map(|name| name.codepoint()).collect()
    }
}

/// The outcome of resolving usage against one font.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub glyphs: ResolvedGlyphSet,
    /// Tokens whose glyph the font does not have.
    pub omitted: usize,
    /// Icon names with no entry in the codepoint table.
    pub unknown_names: usize,
}

/// Resolve usage tokens against the inventory of one font.
///
/// Icon names go through `table`, characters map to their own code point.
/// Glyphs the font does not have are dropped; that is expected whenever
/// several fonts share one set of usage.
pub fn resolve<'a>(
    tokens: impl IntoIterator<Item = &'a UsageToken>,
    table: &CodepointTable,
    inventory: &FontInventory,
) -> Resolution {
    let mut resolution = Resolution::default();
    for token in tokens {
        let Some(name) = token.codepoint(table).and_then(GlyphName::from_codepoint) else {
            resolution.unknown_names += 1;
            continue;
        };
        match inventory.get(name) {
            Some(gid) => {
                resolution.glyphs.glyphs.insert(name, gid);
            }
            None => {
                log::trace!("font has no glyph for {token:?} ({name})");
                resolution.omitted += 1;
            }
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn table() -> CodepointTable {
        [("home", 0xE88A), ("menu", 0xE5D2)].into_iter().collect()
    }

    fn inventory(chars: &[char]) -> FontInventory {
        chars
            .iter()
            .enumerate()
            .map(|(i, c)| (GlyphName::from(*c), GlyphId::new(i as u32 + 1)))
            .collect()
    }

    fn text_tokens(text: &str) -> BTreeSet<UsageToken> {
        text.chars().map(UsageToken::Character).collect()
    }

    #[test]
    fn icon_name_resolves_through_table() {
        let tokens = BTreeSet::from([UsageToken::IconName("home".into())]);
        let inventory = inventory(&['\u{e88a}', '\u{e5d2}']);
        let resolution = resolve(&tokens, &table(), &inventory);
        assert_eq!(
            resolution.glyphs.names().map(|n| n.to_string()).collect::<Vec<_>>(),
            vec!["uniE88A"]
        );
    }

    #[test]
    fn duplicate_characters_collapse() {
        let tokens = text_tokens("Hello");
        let inventory = inventory(&['H', 'e', 'l', 'o', 'x']);
        let resolution = resolve(&tokens, &table(), &inventory);
        let expected: Vec<GlyphName> = ['H', 'e', 'l', 'o'].into_iter().map(Into::into).collect();
        let mut found: Vec<_> = resolution.glyphs.names().collect();
        found.sort();
        let mut expected = expected;
        expected.sort();
        assert_eq!(found, expected);
        assert_eq!(resolution.glyphs.len(), 4);
    }

    #[test]
    fn missing_glyphs_are_dropped() {
        let mut tokens = text_tokens("Hi!");
        tokens.insert(UsageToken::IconName("menu".into()));
        tokens.insert(UsageToken::IconName("not_in_table".into()));
        let inventory = inventory(&['H', '\u{e88a}']);
        let resolution = resolve(&tokens, &table(), &inventory);
        assert_eq!(
            resolution.glyphs.names().collect::<Vec<_>>(),
            vec![GlyphName::from('H')]
        );
        assert_eq!(resolution.omitted, 3);
        assert_eq!(resolution.unknown_names, 1);
    }

    #[test]
    fn resolved_set_is_within_inventory() {
        let mut tokens = text_tokens("The quick brown fox");
        tokens.insert(UsageToken::IconName("home".into()));
        let inventory = inventory(&['T', 'q', 'x', ' ', 'z', '\u{e88a}']);
        let resolution = resolve(&tokens, &table(), &inventory);
        for name in resolution.glyphs.names() {
            assert!(inventory.contains(name));
        }
        assert_eq!(resolution.glyphs.len(), 5);
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut tokens = text_tokens("deterministic");
        tokens.insert(UsageToken::IconName("menu".into()));
        let inventory = inventory(&['d', 'e', 't', 'r', '\u{e5d2}']);
        let first = resolve(&tokens, &table(), &inventory);
        let second = resolve(&tokens, &table(), &inventory);
        assert_eq!(first, second);
    }

    #[test]
    fn ids_and_codepoints() {
        let tokens = text_tokens("AB");
        let inventory = inventory(&['A', 'B', 'C']);
        let glyphs = resolve(&tokens, &table(), &inventory).glyphs;
        let gids: Vec<_> = glyphs.glyph_ids().iter().collect();
        assert_eq!(gids, vec![GlyphId::new(1), GlyphId::new(2)]);
        let codepoints: Vec<_> = glyphs.codepoints().iter().collect();
        assert_eq!(codepoints, vec![0x41, 0x42]);
    }
}
