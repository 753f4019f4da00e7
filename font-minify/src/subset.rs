//! Subsetting a font down to a resolved glyph set.

use read_fonts::{
    collections::IntSet,
    types::{NameId, Tag},
    FontRef,
};
use skera::{parse_tag_list, subset_font, Plan, SubsetError, SubsetFlags, DEFAULT_LAYOUT_FEATURES};

use crate::{font::FontError, resolve::ResolvedGlyphSet};

/// Tables dropped unless told otherwise.
///
/// These are tables the subsetter either cannot subset or that no browser
/// uses for rendering web fonts.
pub const DEFAULT_DROP_TABLES: &str =
    "morx,mort,kerx,kern,JSTF,DSIG,EBDT,EBLC,EBSC,SVG,PCLT,LTSH,feat,Glat,Gloc,Silf,Sill";

/// Something that can reduce a font to a set of glyphs.
pub trait SubsetBackend {
    /// Produce a new sfnt containing at least the glyphs in `glyphs`.
    ///
    /// Every glyph in the set must remain reachable through the code point
    /// it was resolved from.
    fn subset(&self, font: &FontRef, glyphs: &ResolvedGlyphSet) -> Result<Vec<u8>, FontError>;
}

/// A [`SubsetBackend`] backed by the `skera` subsetter.
#[derive(Clone)]
pub struct SkeraBackend {
    no_hinting: bool,
    desubroutinize: bool,
    drop_tables: IntSet<Tag>,
    layout_scripts: IntSet<Tag>,
    layout_features: IntSet<Tag>,
    name_ids: IntSet<NameId>,
    name_languages: IntSet<u16>,
}

impl Default for SkeraBackend {
    fn default() -> Self {
        let mut layout_scripts = IntSet::empty();
        layout_scripts.invert();
        let mut name_ids = IntSet::empty();
        name_ids.insert_range(NameId::from(0)..=NameId::from(6));
        SkeraBackend {
            no_hinting: false,
            desubroutinize: true,
            drop_tables: parse_tag_list(DEFAULT_DROP_TABLES).unwrap_or_default(),
            layout_scripts,
            layout_features: DEFAULT_LAYOUT_FEATURES.iter().copied().collect(),
            name_ids,
            name_languages: [0x0409].into_iter().collect(),
        }
    }
}

impl SkeraBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove hinting instructions from the output.
    pub fn no_hinting(mut self, no_hinting: bool) -> Self {
        self.no_hinting = no_hinting;
        self
    }

    /// Flatten CFF subroutines into the charstrings that use them.
    pub fn desubroutinize(mut self, desubroutinize: bool) -> Self {
        self.desubroutinize = desubroutinize;
        self
    }

    /// Replace the tables to drop with a comma or space separated tag list.
    pub fn drop_tables(mut self, tags: &str) -> Result<Self, SubsetError> {
        self.drop_tables = parse_tag_list(tags)?;
        Ok(self)
    }

    pub fn flags(&self) -> SubsetFlags {
        let mut flags = SubsetFlags::default();
        if self.no_hinting {
            flags |= SubsetFlags::SUBSET_FLAGS_NO_HINTING;
        }
        if self.desubroutinize {
            flags |= SubsetFlags::SUBSET_FLAGS_DESUBROUTINIZE;
        }
        flags
    }
}

impl SubsetBackend for SkeraBackend {
    fn subset(&self, font: &FontRef, glyphs: &ResolvedGlyphSet) -> Result<Vec<u8>, FontError> {
        let plan = Plan::new(
            &glyphs.glyph_ids(),
            &glyphs.codepoints(),
            font,
            self.flags(),
            &self.drop_tables,
            &self.layout_scripts,
            &self.layout_features,
            &self.name_ids,
            &self.name_languages,
        );
        Ok(subset_font(font, &plan)?)
    }
}
