//! Apply resolved usage to every referenced font.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use crate::{
    codepoints::CodepointTable,
    font::{FontError, FontFile},
    resolve::resolve,
    subset::SubsetBackend,
    usage::{FrozenUsage, UsageToken},
};

/// What happened to one font.
#[derive(Debug)]
pub enum FontOutcome {
    /// The font was subset and written back.
    Subset {
        glyphs: usize,
        omitted: usize,
        original_size: usize,
        new_size: usize,
    },
    /// The font would have been subset to `glyphs` glyphs.
    DryRun { glyphs: usize, omitted: usize },
    /// Nothing used the font; it was left as is.
    SkippedEmpty,
    Failed(FontError),
}

impl FontOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FontOutcome::Failed(_))
    }
}

/// The outcome for one font, by its project relative path.
#[derive(Debug)]
pub struct FontReport {
    pub path: String,
    pub outcome: FontOutcome,
}

/// A summary of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// One entry per referenced font, sorted by path.
    pub fonts: Vec<FontReport>,
    /// Assets that could not be read, with the reason.
    pub skipped_assets: Vec<(PathBuf, String)>,
    pub assets_scanned: usize,
    pub characters: usize,
    pub icon_names: usize,
}

impl RunReport {
    /// Returns `true` if any font failed to process.
    pub fn has_failures(&self) -> bool {
        self.fonts.iter().any(|font| font.outcome.is_failure())
    }

    pub fn outcome(&self, path: &str) -> Option<&FontOutcome> {
        self.fonts
            .iter()
            .find(|font| font.path == path)
            .map(|font| &font.outcome)
    }
}

/// Processes fonts one at a time against a shared set of usage.
pub struct Driver<'a, B> {
    root: &'a Path,
    table: &'a CodepointTable,
    backend: B,
    dry_run: bool,
}

impl<'a, B: SubsetBackend> Driver<'a, B> {
    pub fn new(root: &'a Path, table: &'a CodepointTable, backend: B) -> Self {
        Driver {
            root,
            table,
            backend,
            dry_run: false,
        }
    }

    /// Resolve and report, but do not touch any font.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every font referenced by `usage`.
    ///
    /// A failing font is recorded in the report and does not stop the others.
    pub fn run(&self, usage: &FrozenUsage) -> RunReport {
        let (characters, icon_names) = usage.token_counts();
        let fonts = usage
            .fonts()
            .iter()
            .map(|path| FontReport {
                path: path.clone(),
                outcome: self.process_font(path, usage.tokens()),
            })
            .collect();
        RunReport {
            fonts,
            skipped_assets: usage.skipped_assets().to_vec(),
            assets_scanned: usage.assets_scanned(),
            characters,
            icon_names,
        }
    }

    /// Process the font at `relative`, a `/` separated path below the root.
    pub fn process_font(&self, relative: &str, tokens: &BTreeSet<UsageToken>) -> FontOutcome {
        match self.try_process_font(relative, tokens) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("failed to process '{relative}': {e}");
                FontOutcome::Failed(e)
            }
        }
    }

    fn try_process_font(
        &self,
        relative: &str,
        tokens: &BTreeSet<UsageToken>,
    ) -> Result<FontOutcome, FontError> {
        let font = FontFile::load(self.root.join(relative))?;
        let inventory = font.inventory()?;
        let resolution = resolve(tokens, self.table, &inventory);
        log::debug!(
            "'{relative}': {} of {} mapped glyphs used, {} tokens not in font",
            resolution.glyphs.len(),
            inventory.len(),
            resolution.omitted
        );

        if resolution.glyphs.is_empty() {
            log::warn!("no used glyphs found in '{relative}', leaving it untouched");
            return Ok(FontOutcome::SkippedEmpty);
        }
        let glyphs = resolution.glyphs.len();
        let omitted = resolution.omitted;
        if self.dry_run {
            log::info!("'{relative}': would keep {glyphs} glyphs");
            return Ok(FontOutcome::DryRun { glyphs, omitted });
        }

        let subset = self.backend.subset(&font.font_ref()?, &resolution.glyphs)?;
        let original_size = font.file_size();
        if font.output_container() != font.container() {
            log::info!(
                "'{relative}': writing {} font as {}",
                font.container(),
                font.output_container()
            );
        }
        let new_size = font.with_sfnt(subset)?.save()?;
        log::info!("'{relative}': kept {glyphs} glyphs, {original_size} -> {new_size} bytes");
        Ok(FontOutcome::Subset {
            glyphs,
            omitted,
            original_size,
            new_size,
        })
    }
}
