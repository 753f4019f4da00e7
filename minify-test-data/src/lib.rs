//! Test data shared by the font-minify tests.
//!
//! Fonts are built on the fly so tests can ask for exactly the character
//! coverage they need; [`project`] has the assets of a small built
//! single-page application that references them.

use std::io::Write;

use brotlic::CompressorWriter;
use read_fonts::FontRef;
use write_fonts::{
    tables::{
        cmap::Cmap,
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::{Loca, LocaFormat},
        maxp::Maxp,
    },
    types::{FWord, GlyphId, Tag, UfWord},
    FontBuilder,
};

const ADVANCE: u16 = 600;
const X_MAX: i16 = 500;
const Y_MAX: i16 = 700;

/// A simple glyph with a single rectangular contour.
#[rustfmt::skip]
static BOX_GLYPH: &[u8] = &[
    0x00, 0x01,             // numberOfContours 1
    0x00, 0x00, 0x00, 0x00, // xMin 0, yMin 0
    0x01, 0xF4, 0x02, 0xBC, // xMax 500, yMax 700
    0x00, 0x03,             // endPtsOfContours [3]
    0x00, 0x00,             // instructionLength 0
    0x01, 0x01, 0x01, 0x01, // flags: on curve, long coordinates
    0x00, 0x00, 0x00, 0x00, // x deltas: 0, 0,
    0x01, 0xF4, 0x00, 0x00, //           500, 0
    0x00, 0x00, 0x02, 0xBC, // y deltas: 0, 700,
    0x00, 0x00, 0xFD, 0x44, //           0, -700
];

/// Build a TrueType font mapping each of `chars` to its own glyph.
///
/// Glyph 0 is `.notdef`; the glyph for `chars[i]` is glyph `i + 1`. Every
/// glyph is the same box, which is all the subsetter needs.
pub fn build_font(chars: &[char]) -> Vec<u8> {
    let num_glyphs = chars.len() as u16 + 1;

    let mut glyf = Vec::with_capacity(BOX_GLYPH.len() * num_glyphs as usize);
    let mut offsets = vec![0u32];
    for _ in 0..num_glyphs {
        glyf.extend_from_slice(BOX_GLYPH);
        offsets.push(glyf.len() as u32);
    }
    let loca = Loca::new(offsets);

    let head = Head {
        units_per_em: 1000,
        x_max: X_MAX,
        y_max: Y_MAX,
        index_to_loc_format: match loca.format() {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
        ..Default::default()
    };
    let maxp = Maxp {
        num_glyphs,
        max_points: Some(4),
        max_contours: Some(1),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };
    let hhea = Hhea {
        ascender: FWord::new(800),
        descender: FWord::new(-200),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(ADVANCE),
        min_left_side_bearing: FWord::new(0),
        min_right_side_bearing: FWord::new((ADVANCE as i16) - X_MAX),
        x_max_extent: FWord::new(X_MAX),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
    };
    let hmtx = Hmtx {
        h_metrics: (0..num_glyphs)
            .map(|_| LongMetric {
                advance: ADVANCE,
                side_bearing: 0,
            })
            .collect(),
        left_side_bearings: Vec::new(),
    };
    let cmap = Cmap::from_mappings(
        chars
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, GlyphId::new(i as u32 + 1))),
    )
    .expect("chars must be unique");

    let mut builder = FontBuilder::new();
    builder
        .add_table(&head)
        .and_then(|b| b.add_table(&maxp))
        .and_then(|b| b.add_table(&hhea))
        .and_then(|b| b.add_table(&hmtx))
        .and_then(|b| b.add_table(&cmap))
        .and_then(|b| b.add_table(&loca))
        .expect("test font tables are valid");
    builder.add_raw(Tag::new(b"glyf"), glyf);
    builder.build()
}

/// Wrap an sfnt in a WOFF 2.0 container.
///
/// Every table is stored untransformed: `glyf` and `loca` use transform
/// version 3, everything else version 0. That is enough for any decoder
/// without needing a real WOFF2 encoder.
pub fn build_woff2(sfnt: &[u8]) -> Vec<u8> {
    let font = FontRef::new(sfnt).expect("sfnt must parse");
    let records = font.table_directory().table_records();

    let mut directory = Vec::new();
    let mut stream = Vec::new();
    for record in records {
        let tag = record.tag();
        let data = font.table_data(tag).expect("table in bounds");
        let data: &[u8] = data.as_ref();
        let transform = if tag == Tag::new(b"glyf") || tag == Tag::new(b"loca") {
            0xC0
        } else {
            0x00
        };
        // tag index 63: the tag follows the flags
        directory.push(0x3F | transform);
        directory.extend_from_slice(&tag.to_be_bytes());
        push_base128(&mut directory, data.len() as u32);
        stream.extend_from_slice(data);
    }

    let mut compressor = CompressorWriter::new(Vec::new());
    compressor.write_all(&stream).unwrap();
    let compressed = compressor.into_inner().unwrap();

    let unpadded = 48 + directory.len() + compressed.len();
    let length = (unpadded + 3) & !3;
    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(b"wOF2");
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    out.extend_from_slice(&(length as u32).to_be_bytes());
    out.extend_from_slice(&(records.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(sfnt.len() as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    // no metadata or private data
    out.extend_from_slice(&[0; 20]);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(length, 0);
    out
}

/// Append `value` as a WOFF2 UIntBase128.
fn push_base128(out: &mut Vec<u8>, value: u32) {
    let mut groups = Vec::with_capacity(5);
    let mut rest = value;
    loop {
        groups.push((rest & 0x7F) as u8);
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    while let Some(group) = groups.pop() {
        let more = if groups.is_empty() { 0 } else { 0x80 };
        out.push(group | more);
    }
}

/// The code points of the Material Icons glyphs used by the sample project.
pub mod icons {
    pub const HOME: char = '\u{e88a}';
    pub const MENU: char = '\u{e5d2}';
    pub const SETTINGS: char = '\u{e8b8}';
    pub const SEARCH: char = '\u{e8b6}';
    pub const DELETE: char = '\u{e872}';

    /// Every icon in the sample icon font, used or not.
    pub const ALL: &[char] = &[HOME, MENU, SETTINGS, SEARCH, DELETE];
}

/// A codepoints file in the format published alongside Material Icons.
pub static CODEPOINTS: &str = "\
# name codepoint
delete e872
home e88a
menu e5d2
search e8b6
settings e8b8
";

/// The assets of a small built application.
///
/// The stylesheet references `fonts/icons.woff` and `fonts/text.ttf`
/// relative to `css/`. The markup uses `home` as a ligature icon, the
/// script uses `menu` through an `icon` field and the JSON data uses
/// `settings`; `search` and `delete` are never used.
pub mod project {
    pub static INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><link rel="stylesheet" href="/css/app.css"></head>
<body>
  <header><i class="material-icons md-24">home</i><h1>Hi</h1></header>
  <div id="app"></div>
  <script src="/js/app.js"></script>
</body>
</html>
"#;

    pub static APP_CSS: &str = r#"@font-face {
  font-family: 'Material Icons';
  src: url("../fonts/icons.woff?v=4") format('woff');
}
@font-face {
  font-family: 'Text';
  src: url('/fonts/text.ttf') format('truetype');
}
.material-icons { font-family: 'Material Icons'; }
"#;

    pub static APP_JS: &str = r#"const nav = [{ label: "x", icon: 'menu' }];
export default nav;
"#;

    pub static NAV_JSON: &str = r#"{"items": [{"icon": "settings"}, {"icon": "bogus_name"}]}"#;

    /// `(path, content)` for every asset, relative to the project root.
    pub static ASSETS: &[(&str, &str)] = &[
        ("index.html", INDEX_HTML),
        ("css/app.css", APP_CSS),
        ("js/app.js", APP_JS),
        ("data/nav.json", NAV_JSON),
    ];
}
