//! Minify the fonts of a built web application.
//!
//! `font-minify minify dist/` walks the assets below `dist/`, finds the fonts
//! they reference and subsets each one, in place, to the characters and icons
//! the assets can actually render.
//!
//! `font-minify glyphs font.woff` lists the glyphs a font maps from code
//! points, which is handy for checking the result.

use std::path::PathBuf;

use font_minify::{
    codepoints::CodepointSource,
    driver::{FontOutcome, RunReport},
    font::FontFile,
    Options,
};

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Subset every font referenced by the assets below a project root
    Minify {
        /// The root directory of the built project
        root: PathBuf,
        /// Icon codepoints file, as a path or an http(s) URL
        ///
        /// Defaults to the table bundled with this tool.
        #[arg(long, value_name = "PATH|URL")]
        codepoints: Option<String>,
        /// Class marking elements whose text is an icon name (repeatable)
        #[arg(long = "icon-class", value_name = "CLASS")]
        icon_classes: Vec<String>,
        /// Extension of font files to follow in url() references (repeatable)
        #[arg(long = "font-ext", value_name = "EXT")]
        font_extensions: Vec<String>,
        /// Remove hinting instructions
        #[arg(long)]
        no_hinting: bool,
        /// Keep CFF subroutines
        #[arg(long)]
        no_desubroutinize: bool,
        /// Comma separated tags of tables to drop, replacing the default list
        #[arg(long, value_name = "TAGS")]
        drop_tables: Option<String>,
        /// Report what would be kept without writing any font
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the glyph identifiers a font maps, one per line
    Glyphs {
        /// The font file (ttf, otf or woff)
        font: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,skera=warn")).init();

    use clap::Parser as _;
    let args = Args::parse();
    let ok = match args.command {
        Command::Minify {
            root,
            codepoints,
            icon_classes,
            font_extensions,
            no_hinting,
            no_desubroutinize,
            drop_tables,
            dry_run,
        } => {
            let mut options = Options::new(root)
                .no_hinting(no_hinting)
                .desubroutinize(!no_desubroutinize)
                .dry_run(dry_run);
            if let Some(arg) = codepoints {
                options = options.codepoints(CodepointSource::from_arg(&arg));
            }
            if !icon_classes.is_empty() {
                options = options.icon_classes(icon_classes);
            }
            if !font_extensions.is_empty() {
                options = options.font_extensions(font_extensions);
            }
            if let Some(tags) = drop_tables {
                options = options.drop_tables(tags);
            }
            minify(&options)
        }
        Command::Glyphs { font } => glyphs(font),
    };
    if !ok {
        std::process::exit(1);
    }
}

fn minify(options: &Options) -> bool {
    match font_minify::run(options) {
        Ok(report) => {
            print_summary(&report);
            !report.has_failures()
        }
        Err(e) => {
            log::error!("{e}");
            false
        }
    }
}

fn print_summary(report: &RunReport) {
    for (path, reason) in &report.skipped_assets {
        println!("skipped asset {}: {reason}", path.display());
    }
    for font in &report.fonts {
        let status = match &font.outcome {
            FontOutcome::Subset {
                glyphs,
                original_size,
                new_size,
                ..
            } => format!("{glyphs} glyphs, {original_size} -> {new_size} bytes"),
            FontOutcome::DryRun { glyphs, omitted } => {
                format!("would keep {glyphs} glyphs ({omitted} used characters missing)")
            }
            FontOutcome::SkippedEmpty => "nothing used, left untouched".to_string(),
            FontOutcome::Failed(e) => format!("FAILED: {e}"),
        };
        println!("{}: {status}", font.path);
    }
    println!(
        "{} assets, {} characters, {} icon names, {} fonts",
        report.assets_scanned,
        report.characters,
        report.icon_names,
        report.fonts.len()
    );
}

fn glyphs(path: PathBuf) -> bool {
    let inventory = match FontFile::load(&path).and_then(|font| font.inventory()) {
        Ok(inventory) => inventory,
        Err(e) => {
            log::error!("{}: {e}", path.display());
            return false;
        }
    };
    for name in inventory.names() {
        println!("{name}");
    }
    log::info!(
        "{}: {} of {} glyphs mapped from code points",
        path.display(),
        inventory.len(),
        inventory.num_glyphs()
    );
    true
}
