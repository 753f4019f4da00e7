//! Reading and writing the WOFF containers.
//!
//! A WOFF file wraps the tables of an sfnt, each compressed on its own with
//! zlib, and may carry an extended metadata block and a private data block.
//! Decoding yields a plain sfnt along with the parts of the wrapper that
//! should survive a round trip; encoding puts them back.
//!
//! WOFF2 files can only be decoded.
//!
//! See <https://www.w3.org/TR/WOFF/> and <https://www.w3.org/TR/WOFF2/>

use std::io::{self, Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use read_fonts::{types::Tag, FontData, FontRef, ReadError};
use thiserror::Error;
use write_fonts::FontBuilder;

/// The signature of a WOFF 1.0 file, `wOFF`.
pub const WOFF_SIGNATURE: Tag = Tag::new(b"wOFF");
/// The signature of a WOFF 2.0 file, `wOF2`.
pub const WOFF2_SIGNATURE: Tag = Tag::new(b"wOF2");

const HEADER_LEN: usize = 44;
const TABLE_ENTRY_LEN: usize = 20;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_RECORD_LEN: usize = 16;

/// An error decoding or encoding a WOFF file.
#[derive(Debug, Error)]
pub enum WoffError {
    #[error("missing '{0}' signature")]
    BadSignature(Tag),

    #[error("WOFF header or table directory is truncated")]
    Truncated,

    #[error("header length {declared} does not match file length {actual}")]
    LengthMismatch { declared: u32, actual: usize },

    #[error("table '{tag}' lies outside the file")]
    TableOutOfBounds { tag: Tag },

    #[error("{block} block lies outside the file")]
    BlockOutOfBounds { block: &'static str },

    #[error("table '{tag}' failed to decompress: {source}")]
    Inflate { tag: Tag, source: io::Error },

    #[error("table '{tag}' decompressed to {actual} bytes, expected {expected}")]
    TableLength {
        tag: Tag,
        expected: u32,
        actual: usize,
    },

    #[error("invalid sfnt: {0}")]
    Sfnt(#[from] ReadError),

    #[error("compression failed: {0}")]
    Deflate(io::Error),

    #[error("WOFF2 decoding failed: {0}")]
    Woff2(String),
}

/// The parts of a WOFF wrapper that are not sfnt tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WoffExtras {
    pub major_version: u16,
    pub minor_version: u16,
    /// The extended metadata block, still compressed.
    pub metadata: Option<Metadata>,
    pub private_data: Option<Vec<u8>>,
}

/// The compressed extended metadata block of a WOFF file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub compressed: Vec<u8>,
    pub orig_length: u32,
}

/// A WOFF file decoded to a plain sfnt.
#[derive(Clone, Debug)]
pub struct DecodedWoff {
    pub sfnt: Vec<u8>,
    pub extras: WoffExtras,
}

/// Returns `true` if `data` starts with the WOFF 1.0 signature.
pub fn is_woff(data: &[u8]) -> bool {
    data.get(..4) == Some(&WOFF_SIGNATURE.to_be_bytes()[..])
}

/// Returns `true` if `data` starts with the WOFF 2.0 signature.
pub fn is_woff2(data: &[u8]) -> bool {
    data.get(..4) == Some(&WOFF2_SIGNATURE.to_be_bytes()[..])
}

struct Reader<'a>(FontData<'a>);

impl Reader<'_> {
    fn u32(&self, offset: usize) -> Result<u32, WoffError> {
        self.0.read_at(offset).map_err(|_| WoffError::Truncated)
    }

    fn u16(&self, offset: usize) -> Result<u16, WoffError> {
        self.0.read_at(offset).map_err(|_| WoffError::Truncated)
    }

    fn tag(&self, offset: usize) -> Result<Tag, WoffError> {
        self.0.read_at(offset).map_err(|_| WoffError::Truncated)
    }

    fn block(&self, offset: u32, len: u32) -> Option<&[u8]> {
        let start = offset as usize;
        let end = start.checked_add(len as usize)?;
        self.0.as_ref().get(start..end)
    }

    /// An extension block, which is absent when its length is zero.
    fn optional_block(
        &self,
        offset: u32,
        len: u32,
        block: &'static str,
    ) -> Result<Option<&[u8]>, WoffError> {
        if len == 0 {
            return Ok(None);
        }
        self.block(offset, len)
            .map(Some)
            .ok_or(WoffError::BlockOutOfBounds { block })
    }
}

/// Decode a WOFF 1.0 file into an sfnt.
pub fn decode(data: &[u8]) -> Result<DecodedWoff, WoffError> {
    if !is_woff(data) {
        return Err(WoffError::BadSignature(WOFF_SIGNATURE));
    }
    let reader = Reader(FontData::new(data));
    let flavor = reader.u32(4)?;
    let declared = reader.u32(8)?;
    if declared as usize != data.len() {
        return Err(WoffError::LengthMismatch {
            declared,
            actual: data.len(),
        });
    }
    let num_tables = reader.u16(12)? as usize;
    let major_version = reader.u16(20)?;
    let minor_version = reader.u16(22)?;
    let meta_offset = reader.u32(24)?;
    let meta_length = reader.u32(28)?;
    let meta_orig_length = reader.u32(32)?;
    let priv_offset = reader.u32(36)?;
    let priv_length = reader.u32(40)?;

    let mut builder = FontBuilder::new();
    for i in 0..num_tables {
        let entry = HEADER_LEN + i * TABLE_ENTRY_LEN;
        let tag = reader.tag(entry)?;
        let offset = reader.u32(entry + 4)?;
        let comp_length = reader.u32(entry + 8)?;
        let orig_length = reader.u32(entry + 12)?;
        let stored = reader
            .block(offset, comp_length)
            .ok_or(WoffError::TableOutOfBounds { tag })?;
        let table = if comp_length < orig_length {
            inflate(tag, stored, orig_length)?
        } else {
            stored.to_vec()
        };
        if table.len() != orig_length as usize {
            return Err(WoffError::TableLength {
                tag,
                expected: orig_length,
                actual: table.len(),
            });
        }
        builder.add_raw(tag, table);
    }
    let mut sfnt = builder.build();
    // the builder always writes the TrueType version
    sfnt[..4].copy_from_slice(&flavor.to_be_bytes());

    let metadata = reader
        .optional_block(meta_offset, meta_length, "metadata")?
        .map(|block| Metadata {
            compressed: block.to_vec(),
            orig_length: meta_orig_length,
        });
    let private_data = reader
        .optional_block(priv_offset, priv_length, "private data")?
        .map(<[u8]>::to_vec);

    Ok(DecodedWoff {
        sfnt,
        extras: WoffExtras {
            major_version,
            minor_version,
            metadata,
            private_data,
        },
    })
}

/// Decode a WOFF 2.0 file into an sfnt.
pub fn decode_woff2(data: &[u8]) -> Result<Vec<u8>, WoffError> {
    if !is_woff2(data) {
        return Err(WoffError::BadSignature(WOFF2_SIGNATURE));
    }
    let mut input = data;
    let sfnt = woff2_patched::decode::convert_woff2_to_ttf(&mut input)
        .map_err(|e| WoffError::Woff2(e.to_string()))?;
    FontRef::new(&sfnt)?;
    Ok(sfnt)
}

fn inflate(tag: Tag, stored: &[u8], orig_length: u32) -> Result<Vec<u8>, WoffError> {
    let mut table = Vec::with_capacity(orig_length as usize);
    ZlibDecoder::new(stored)
        .take(orig_length as u64 + 1)
        .read_to_end(&mut table)
        .map_err(|source| WoffError::Inflate { tag, source })?;
    Ok(table)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, WoffError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).map_err(WoffError::Deflate)?;
    encoder.finish().map_err(WoffError::Deflate)
}

fn round4(len: usize) -> usize {
    (len + 3) & !3
}

fn pad4(data: &mut Vec<u8>) {
    data.resize(round4(data.len()), 0);
}

/// Wrap an sfnt in a WOFF 1.0 container.
///
/// Tables are stored compressed unless compression does not make them
/// smaller. The metadata and private blocks in `extras` are carried over
/// unchanged.
pub fn encode(sfnt: &[u8], extras: &WoffExtras) -> Result<Vec<u8>, WoffError> {
    let font = FontRef::new(sfnt)?;
    let directory = font.table_directory();
    let flavor = directory.sfnt_version();

    let mut tables = Vec::new();
    for record in directory.table_records() {
        let tag = record.tag();
        let Some(data) = font.table_data(tag) else {
            log::warn!("table '{tag}' lies outside the font, dropping it");
            continue;
        };
        let data: &[u8] = data.as_ref();
        let compressed = deflate(data)?;
        let stored = if compressed.len() < data.len() {
            compressed
        } else {
            data.to_vec()
        };
        tables.push((tag, record.checksum(), data.len() as u32, stored));
    }
    tables.sort_by_key(|(tag, ..)| *tag);

    let total_sfnt_size = SFNT_HEADER_LEN
        + SFNT_RECORD_LEN * tables.len()
        + tables
            .iter()
            .map(|(_, _, orig_length, _)| round4(*orig_length as usize))
            .sum::<usize>();

    let mut body = Vec::new();
    let mut directory_entries = Vec::with_capacity(tables.len() * TABLE_ENTRY_LEN);
    let body_start = HEADER_LEN + tables.len() * TABLE_ENTRY_LEN;
    for (tag, checksum, orig_length, stored) in &tables {
        let offset = (body_start + body.len()) as u32;
        directory_entries.extend_from_slice(&tag.to_be_bytes());
        directory_entries.extend_from_slice(&offset.to_be_bytes());
        directory_entries.extend_from_slice(&(stored.len() as u32).to_be_bytes());
        directory_entries.extend_from_slice(&orig_length.to_be_bytes());
        directory_entries.extend_from_slice(&checksum.to_be_bytes());
        body.extend_from_slice(stored);
        pad4(&mut body);
    }

    let (mut meta_offset, mut meta_length, mut meta_orig_length) = (0u32, 0u32, 0u32);
    if let Some(metadata) = &extras.metadata {
        meta_offset = (body_start + body.len()) as u32;
        meta_length = metadata.compressed.len() as u32;
        meta_orig_length = metadata.orig_length;
        body.extend_from_slice(&metadata.compressed);
    }
    let (mut priv_offset, mut priv_length) = (0u32, 0u32);
    if let Some(private_data) = &extras.private_data {
        pad4(&mut body);
        priv_offset = (body_start + body.len()) as u32;
        priv_length = private_data.len() as u32;
        body.extend_from_slice(private_data);
    }

    let length = (body_start + body.len()) as u32;
    let mut out = Vec::with_capacity(length as usize);
    out.extend_from_slice(&WOFF_SIGNATURE.to_be_bytes());
    out.extend_from_slice(&flavor.to_be_bytes());
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
    out.extend_from_slice(&extras.major_version.to_be_bytes());
    out.extend_from_slice(&extras.minor_version.to_be_bytes());
    for field in [
        meta_offset,
        meta_length,
        meta_orig_length,
        priv_offset,
        priv_length,
    ] {
        out.extend_from_slice(&field.to_be_bytes());
    }
    out.extend_from_slice(&directory_entries);
    out.extend_from_slice(&body);
    Ok(out)
}
