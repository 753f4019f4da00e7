//! Canonical glyph identifiers and font inventories.

use std::{collections::BTreeMap, fmt, str::FromStr};

use read_fonts::{types::GlyphId, TableProvider};
use skrifa::MetadataProvider;

/// A glyph identifier derived from the code point it renders.
///
/// This follows the AGL naming convention: `uniXXXX` for code points in the
/// Basic Multilingual Plane and `uXXXXX` (five or six digits) above it, with
/// uppercase hex digits. `uniE88A` names U+E88A.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphName(u32);

impl GlyphName {
    /// Returns `None` if `codepoint` is not a Unicode scalar value.
    pub fn from_codepoint(codepoint: u32) -> Option<GlyphName> {
        char::from_u32(codepoint).map(|_| GlyphName(codepoint))
    }

    pub fn codepoint(self) -> u32 {
        self.0
    }
}

impl From<char> for GlyphName {
    fn from(c: char) -> Self {
        GlyphName(c as u32)
    }
}

impl fmt::Display for GlyphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 <= 0xFFFF {
            write!(f, "uni{:04X}", self.0)
        } else {
            write!(f, "u{:05X}", self.0)
        }
    }
}

/// An error parsing a [`GlyphName`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidGlyphName(String);

impl fmt::Display for InvalidGlyphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a uniXXXX or uXXXXX glyph name", self.0)
    }
}

impl std::error::Error for InvalidGlyphName {}

impl FromStr for GlyphName {
    type Err = InvalidGlyphName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidGlyphName(s.to_owned());
        let (digits, range) = if let Some(digits) = s.strip_prefix("uni") {
            (digits, 4..=4)
        } else if let Some(digits) = s.strip_prefix('u') {
            (digits, 5..=6)
        } else {
            return Err(invalid());
        };
        // lowercase hex is not a valid AGL name
        if !range.contains(&digits.len())
            || !digits
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
        {
            return Err(invalid());
        }
        let codepoint = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        if digits.len() > 4 && codepoint <= 0xFFFF {
            return Err(invalid());
        }
        GlyphName::from_codepoint(codepoint).ok_or_else(invalid)
    }
}

/// The glyphs a font can render by code point.
///
/// Every code point mapped by the font's character map contributes one
/// [`GlyphName`], associated with the glyph id it maps to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontInventory {
    glyphs: BTreeMap<GlyphName, GlyphId>,
    num_glyphs: u16,
}

impl FontInventory {
    pub fn new<'a>(font: &(impl MetadataProvider<'a> + TableProvider<'a>)) -> FontInventory {
        let glyphs = font
            .charmap()
            .mappings()
            .filter_map(|(cp, gid)| GlyphName::from_codepoint(cp).map(|name| (name, gid)))
            .collect();
        let num_glyphs = font.maxp().map(|maxp| maxp.num_glyphs()).unwrap_or_default();
        FontInventory { glyphs, num_glyphs }
    }

    /// Returns the glyph id addressed by `name`, if the font has it.
    pub fn get(&self, name: GlyphName) -> Option<GlyphId> {
        self.glyphs.get(&name).copied()
    }

    pub fn contains(&self, name: GlyphName) -> bool {
        self.glyphs.contains_key(&name)
    }

    /// The number of mapped code points.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// The total number of glyphs in the font, mapped or not.
    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    pub fn names(&self) -> impl Iterator<Item = GlyphName> + '_ {
        self.glyphs.keys().copied()
    }
}

impl FromIterator<(GlyphName, GlyphId)> for FontInventory {
    fn from_iter<T: IntoIterator<Item = (GlyphName, GlyphId)>>(iter: T) -> Self {
        let glyphs: BTreeMap<_, _> = iter.into_iter().collect();
        let num_glyphs = glyphs
            .values()
            .map(|gid| gid.to_u32() + 1)
            .max()
            .unwrap_or(1)
            .min(u16::MAX as u32) as u16;
        FontInventory { glyphs, num_glyphs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_for_codepoints() {
        assert_eq!(GlyphName::from('A').to_string(), "uni0041");
        assert_eq!(GlyphName::from('\u{e88a}').to_string(), "uniE88A");
        assert_eq!(
            GlyphName::from_codepoint(0x1F600).unwrap().to_string(),
            "u1F600"
        );
        assert_eq!(
            GlyphName::from_codepoint(0x10FFFD).unwrap().to_string(),
            "u10FFFD"
        );
        assert_eq!(GlyphName::from_codepoint(0xD800), None);
    }

    #[test]
    fn parse_names() {
        assert_eq!("uniE88A".parse(), Ok(GlyphName::from('\u{e88a}')));
        assert_eq!("u1F600".parse(), Ok(GlyphName::from('\u{1f600}')));
        assert!("unie88a".parse::<GlyphName>().is_err());
        assert!("uni41".parse::<GlyphName>().is_err());
        assert!("u0041".parse::<GlyphName>().is_err());
        assert!("u00041".parse::<GlyphName>().is_err());
        assert!("uniD800".parse::<GlyphName>().is_err());
        assert!("home".parse::<GlyphName>().is_err());
    }

    #[test]
    fn names_round_trip_through_display() {
        for cp in [0x20, 0x41, 0xE88A, 0xFFFD, 0x1F600, 0x10FFFF] {
            let name = GlyphName::from_codepoint(cp).unwrap();
            assert_eq!(name.to_string().parse(), Ok(name));
        }
    }

    #[test]
    fn inventory_from_font() {
        let font_data = minify_test_data::build_font(&['A', 'B', '\u{e88a}']);
        let font = read_fonts::FontRef::new(&font_data).unwrap();
        let inventory = FontInventory::new(&font);
        assert_eq!(inventory.len(), 3);
        assert_eq!(inventory.num_glyphs(), 4);
        assert!(inventory.contains(GlyphName::from('A')));
        assert!(inventory.contains("uniE88A".parse().unwrap()));
        assert!(!inventory.contains(GlyphName::from('C')));
        // glyph 0 is .notdef, the rest follow the order they were given in
        assert_eq!(inventory.get(GlyphName::from('A')), Some(GlyphId::new(1)));
        assert_eq!(
            inventory.get(GlyphName::from('\u{e88a}')),
            Some(GlyphId::new(3))
        );
    }
}
