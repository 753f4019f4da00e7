//! The end to end minification run.

use std::path::{Path, PathBuf};

use crate::{
    codepoints::{CodepointSource, CodepointTable},
    driver::{Driver, RunReport},
    extract::{Extractor, DEFAULT_FONT_EXTENSIONS, DEFAULT_ICON_CLASSES},
    subset::{SkeraBackend, SubsetBackend},
    usage::{FrozenUsage, Usage},
    walk::AssetWalker,
    Error,
};

/// Everything that configures a run.
#[derive(Clone, Debug)]
pub struct Options {
    pub root: PathBuf,
    pub codepoints: CodepointSource,
    /// Class names marking elements whose text is a ligature icon name.
    pub icon_classes: Vec<String>,
    /// File extensions (without the dot) of font references to follow.
    pub font_extensions: Vec<String>,
    pub no_hinting: bool,
    pub desubroutinize: bool,
    /// Comma or space separated tags of tables to drop; `None` for the
    /// default list.
    pub drop_tables: Option<String>,
    pub dry_run: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            root: PathBuf::from("."),
            codepoints: CodepointSource::Embedded,
            icon_classes: DEFAULT_ICON_CLASSES.iter().map(|s| s.to_string()).collect(),
            font_extensions: DEFAULT_FONT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            no_hinting: false,
            desubroutinize: true,
            drop_tables: None,
            dry_run: false,
        }
    }
}

impl Options {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Options {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn codepoints(mut self, source: CodepointSource) -> Self {
        self.codepoints = source;
        self
    }

    pub fn icon_classes(mut self, classes: Vec<String>) -> Self {
        self.icon_classes = classes;
        self
    }

    pub fn font_extensions(mut self, extensions: Vec<String>) -> Self {
        self.font_extensions = extensions;
        self
    }

    pub fn no_hinting(mut self, no_hinting: bool) -> Self {
        self.no_hinting = no_hinting;
        self
    }

    pub fn desubroutinize(mut self, desubroutinize: bool) -> Self {
        self.desubroutinize = desubroutinize;
        self
    }

    pub fn drop_tables(mut self, tags: impl Into<String>) -> Self {
        self.drop_tables = Some(tags.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn backend(&self) -> Result<SkeraBackend, Error> {
        let backend = SkeraBackend::new()
            .no_hinting(self.no_hinting)
            .desubroutinize(self.desubroutinize);
        match &self.drop_tables {
            Some(tags) => backend
                .drop_tables(tags)
                .map_err(|e| Error::InvalidOption(format!("--drop-tables: {e}"))),
            None => Ok(backend),
        }
    }
}

/// Run the whole pipeline with the default subsetter.
///
/// Fatal problems (a bad root, bad options, or no codepoint table) are
/// detected before any font is touched. Problems with single assets or
/// fonts are collected in the returned [`RunReport`].
pub fn run(options: &Options) -> Result<RunReport, Error> {
    let backend = options.backend()?;
    run_with_backend(options, backend)
}

/// Run the whole pipeline, subsetting with `backend`.
pub fn run_with_backend<B: SubsetBackend>(
    options: &Options,
    backend: B,
) -> Result<RunReport, Error> {
    if !options.root.is_dir() {
        return Err(Error::InvalidRoot(options.root.clone()));
    }
    let extractor = Extractor::new(
        options.icon_classes.as_slice(),
        options.font_extensions.as_slice(),
    )?;
    let table = options.codepoints.load()?;

    let usage = collect_usage(&options.root, &extractor, &table);
    let (characters, icon_names) = usage.token_counts();
    log::info!(
        "scanned {} assets: {} fonts, {characters} characters, {icon_names} icon names",
        usage.assets_scanned(),
        usage.fonts().len(),
    );
    if usage.fonts().is_empty() {
        log::warn!("no font references found below '{}'", options.root.display());
    }

    let report = Driver::new(&options.root, &table, backend)
        .dry_run(options.dry_run)
        .run(&usage);
    Ok(report)
}

/// Walk every asset below `root` and collect what it uses.
pub fn collect_usage(root: &Path, extractor: &Extractor, table: &CodepointTable) -> FrozenUsage {
    let mut usage = Usage::new();
    for asset in AssetWalker::new(root) {
        match asset {
            Ok(asset) => {
                log::trace!("scanning '{}'", asset.relative);
                extractor.extract(&asset, table, &mut usage);
                usage.count_asset();
            }
            Err(e) => {
                log::warn!("skipping asset: {e}");
                usage.skip_asset(e.path().to_owned(), e.to_string());
            }
        }
    }
    usage.freeze()
}
