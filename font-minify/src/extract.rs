//! Collect font references and rendered text from asset content.
//!
//! Every word or whitespace character in any asset counts as rendered by
//! every font.

use std::sync::OnceLock;

use regex::Regex;

use crate::{
    codepoints::CodepointTable,
    usage::{Usage, UsageToken},
    walk::AssetFile,
    Error,
};

pub static DEFAULT_ICON_CLASSES: &[&str] = &["material-icons"];
pub static DEFAULT_FONT_EXTENSIONS: &[&str] = &["woff", "woff2", "ttf", "otf"];

fn word_or_space() -> &'static Regex {
    static WORD_OR_SPACE: OnceLock<Regex> = OnceLock::new();
    WORD_OR_SPACE.get_or_init(|| Regex::new(r"[\w\s]").unwrap())
}

fn icon_field() -> &'static Regex {
    // `"icon": "home"` in JSON, `icon: 'home'` in scripts, `icon="home"` in markup
    static ICON_FIELD: OnceLock<Regex> = OnceLock::new();
    ICON_FIELD.get_or_init(|| {
        Regex::new(r#"["']?\bicon\b["']?\s*[:=]\s*(?:"([^"\\\r\n]*)"|'([^'\\\r\n]*)')"#).unwrap()
    })
}

/// Finds the usage signals in a single asset.
#[derive(Clone, Debug)]
pub struct Extractor {
    font_refs: Regex,
    ligatures: Option<Regex>,
}

impl Extractor {
    /// Create an extractor recognizing the given icon class markers and font
    /// file extensions.
    ///
    /// Class markers must start and end with a word character so they can be
    /// matched as whole words; extensions must be alphanumeric.
    pub fn new<S: AsRef<str>>(icon_classes: &[S], font_extensions: &[S]) -> Result<Self, Error> {
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        for class in icon_classes.iter().map(AsRef::as_ref) {
            let bounded = class.chars().next().is_some_and(is_word)
                && class.chars().next_back().is_some_and(is_word);
            if !bounded {
                return Err(Error::InvalidOption(format!("bad icon class '{class}'")));
            }
        }
        if font_extensions.is_empty() {
            return Err(Error::InvalidOption("no font extensions given".into()));
        }
        for ext in font_extensions.iter().map(AsRef::as_ref) {
            if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(Error::InvalidOption(format!("bad font extension '{ext}'")));
            }
        }

        let extensions = join_escaped(font_extensions);
        let font_refs = Regex::new(&format!(
            r#"url\(\s*["']?([^"'()\s]+?\.(?i:{extensions}))(?:[?#][^"'()\s]*)?["']?\s*\)"#
        ))
        .map_err(|e| Error::InvalidOption(e.to_string()))?;

        let ligatures = if icon_classes.is_empty() {
            None
        } else {
            let classes = join_escaped(icon_classes);
            Some(
                Regex::new(&format!(r"<[^<>]*\b(?:{classes})\b[^<>]*>([^<]*)<"))
                    .map_err(|e| Error::InvalidOption(e.to_string()))?,
            )
        };

        Ok(Extractor {
            font_refs,
            ligatures,
        })
    }

    /// Add everything found in `asset` to `usage`.
    pub fn extract(&self, asset: &AssetFile, table: &CodepointTable, usage: &mut Usage) {
        let content = asset.content.as_str();

        for reference in self.font_references(content) {
            match normalize_font_reference(reference, &asset.relative) {
                Some(path) => {
                    if usage.add_font(path.clone()) {
                        log::info!("found font '{path}' referenced from '{}'", asset.relative);
                    }
                }
                None => log::debug!(
                    "ignoring font reference '{reference}' in '{}'",
                    asset.relative
                ),
            }
        }

        for c in characters(content) {
            usage.add_token(UsageToken::Character(c));
        }

        let icon_texts = self
            .ligature_texts(content)
            .chain(icon_field_values(content));
        for text in icon_texts {
            match UsageToken::classify(text, table) {
                Some(token) => {
                    usage.add_token(token);
                }
                None => log::trace!("unrecognized icon text '{text}' in '{}'", asset.relative),
            }
        }
    }

    /// The raw targets of `url(...)` references to font files.
    pub fn font_references<'s, 'c: 's>(
        &'s self,
        content: &'c str,
    ) -> impl Iterator<Item = &'c str> + 's {
        self.font_refs
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// The trimmed text content of elements carrying an icon class.
    pub fn ligature_texts<'s, 'c: 's>(
        &'s self,
        content: &'c str,
    ) -> impl Iterator<Item = &'c str> + 's {
        self.ligatures
            .iter()
            .flat_map(move |re| re.captures_iter(content))
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
    }
}

/// Every word or whitespace character in `content`.
pub fn characters(content: &str) -> impl Iterator<Item = char> + '_ {
    word_or_space()
        .find_iter(content)
        .filter_map(|m| m.as_str().chars().next())
}

/// String values bound to an `icon` key or attribute.
pub fn icon_field_values(content: &str) -> impl Iterator<Item = &str> + '_ {
    icon_field()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim())
}

/// Turn a font reference into a `/` separated path relative to the project
/// root.
///
/// A leading `/` means the reference is already root relative, anything
/// else is relative to the directory of the referencing asset. Returns
/// `None` for references with a scheme, protocol relative references, and
/// paths that climb out of the root.
pub fn normalize_font_reference(reference: &str, asset_relative: &str) -> Option<String> {
    if reference.starts_with("//") || has_scheme(reference) {
        return None;
    }

    let mut parts: Vec<&str> = Vec::new();
    let rest = match reference.strip_prefix('/') {
        Some(rest) => rest,
        None => {
            parts.extend(asset_relative.split('/'));
            // drop the asset's own file name
            parts.pop();
            reference
        }
    };

    for part in rest.split('/') {
        match part {
            "" | "." => (),
            ".." => {
                parts.pop()?;
            }
            part => parts.push(part),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn has_scheme(reference: &str) -> bool {
    match reference.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn join_escaped<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| regex::escape(item.as_ref()))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::walk::AssetKind;

    fn extractor() -> Extractor {
        Extractor::new(DEFAULT_ICON_CLASSES, DEFAULT_FONT_EXTENSIONS).unwrap()
    }

    fn table() -> CodepointTable {
        [("home", 0xE88A), ("menu", 0xE5D2), ("check_circle", 0xE86C)]
            .into_iter()
            .collect()
    }

    fn asset(relative: &str, content: &str) -> AssetFile {
        AssetFile {
            path: PathBuf::from(relative),
            relative: relative.to_owned(),
            kind: AssetKind::from_path(relative.as_ref()).unwrap(),
            content: content.to_owned(),
        }
    }

    #[test]
    fn finds_font_urls() {
        let css = r#"@font-face{src:url(/assets/flUhRq6tzZclQEJ-Vdg-IuiaDsNa.woff2) format("woff2"),url("/assets/flUhRq6tzZclQEJ-Vdg-IuiaDsNa.woff") format("woff")}
            .a{background:url(/assets/bg.png)} @font-face{src:url('../fonts/Roboto.TTF?v=3#iefix')}"#;
        let refs: Vec<_> = extractor().font_references(css).collect();
        assert_eq!(
            refs,
            vec![
                "/assets/flUhRq6tzZclQEJ-Vdg-IuiaDsNa.woff2",
                "/assets/flUhRq6tzZclQEJ-Vdg-IuiaDsNa.woff",
                "../fonts/Roboto.TTF",
            ]
        );
    }

    #[test]
    fn found_text_outlives_the_extractor() {
        let content = String::from(
            r#"src: url(fonts/a.woff); <i class="material-icons">home</i>"#,
        );
        let (refs, texts): (Vec<&str>, Vec<&str>) = {
            let extractor = extractor();
            (
                extractor.font_references(&content).collect(),
                extractor.ligature_texts(&content).collect(),
            )
        };
        assert_eq!(refs, vec!["fonts/a.woff"]);
        assert_eq!(texts, vec!["home"]);
    }

    #[test]
    fn normalizes_references() {
        assert_eq!(
            normalize_font_reference("/assets/a.woff", "css/app.css").as_deref(),
            Some("assets/a.woff")
        );
        assert_eq!(
            normalize_font_reference("../fonts/x.woff", "css/app.css").as_deref(),
            Some("fonts/x.woff")
        );
        assert_eq!(
            normalize_font_reference("./x.woff", "css/app.css").as_deref(),
            Some("css/x.woff")
        );
        assert_eq!(
            normalize_font_reference("x.woff", "app.css").as_deref(),
            Some("x.woff")
        );
        assert_eq!(normalize_font_reference("../../x.woff", "css/app.css"), None);
        assert_eq!(
            normalize_font_reference("https://cdn.example.com/x.woff", "app.css"),
            None
        );
        assert_eq!(normalize_font_reference("//cdn.example.com/x.woff", "app.css"), None);
        assert_eq!(normalize_font_reference("data:font/woff;base64,AAA.woff", "a.css"), None);
    }

    #[test]
    fn characters_are_word_or_space() {
        let found: String = characters("a-b\t_é!").collect();
        assert_eq!(found, "ab\t_é");
    }

    #[test]
    fn ligature_text_inside_icon_markup() {
        let html = r#"<i class="q-icon notranslate material-icons" aria-hidden="true">home</i>
            <span class="material-icons-outlined"> menu </span>
            <span class="not-material-iconsx">bogus</span>
            <p>plain</p>"#;
        let found: Vec<_> = extractor().ligature_texts(html).collect();
        assert_eq!(found, vec!["home", "menu"]);
    }

    #[test]
    fn icon_fields_in_json_script_and_markup() {
        let content = r#"{"icon": "home"} notify({ icon: 'check_circle' }) <q-btn icon="menu" />
            {icon:"x"} <q-btn :icon="item.icon" /> iconic: "nope" "iconName": "nope""#;
        let found: Vec<_> = icon_field_values(content).collect();
        assert_eq!(found, vec!["home", "check_circle", "menu", "x", "item.icon"]);
    }

    #[test]
    fn ligature_icon_is_resolved_to_a_name() {
        let mut usage = Usage::new();
        let page = asset("index.html", r#"<i class="material-icons">home</i>"#);
        extractor().extract(&page, &table(), &mut usage);
        assert!(usage
            .tokens()
            .contains(&UsageToken::IconName("home".into())));
    }

    #[test]
    fn unknown_icon_field_is_discarded() {
        let mut usage = Usage::new();
        let data = asset("data.json", r#"{"icon": "bogus_name"}"#);
        extractor().extract(&data, &table(), &mut usage);
        assert!(!usage
            .tokens()
            .iter()
            .any(|t| matches!(t, UsageToken::IconName(_))));
    }

    #[test]
    fn retained_tokens_are_chars_or_known_names() {
        let table = table();
        let mut usage = Usage::new();
        let page = asset(
            "app.vue",
            r#"<template><i class="material-icons">{{ dynamic }}</i><i class="material-icons">menu</i>
            <i class="material-icons">x</i></template><script>export default { icon: "not a name" }</script>"#,
        );
        extractor().extract(&page, &table, &mut usage);
        for token in usage.tokens() {
            match token {
                UsageToken::Character(_) => (),
                UsageToken::IconName(name) => assert!(table.contains(name), "{name}"),
            }
        }
        assert!(usage.tokens().contains(&UsageToken::IconName("menu".into())));
    }

    #[test]
    fn repeated_font_references_collapse() {
        let extractor = extractor();
        let table = table();
        let mut usage = Usage::new();
        let css = "@font-face{src:url(/assets/icons.woff)} .b{src:url(/assets/icons.woff)}";
        extractor.extract(&asset("a.css", css), &table, &mut usage);
        extractor.extract(&asset("sub/b.css", css), &table, &mut usage);
        extractor.extract(
            &asset("sub/c.css", "@font-face{src:url(../assets/icons.woff)}"),
            &table,
            &mut usage,
        );
        assert_eq!(
            usage.fonts().iter().collect::<Vec<_>>(),
            vec!["assets/icons.woff"]
        );
    }

    #[test]
    fn rejects_bad_options() {
        assert!(Extractor::new(&["-icons"], &["woff"]).is_err());
        assert!(Extractor::new(&["material-icons"], &["wo.ff"]).is_err());
        assert!(Extractor::new::<&str>(&["material-icons"], &[]).is_err());
        assert!(Extractor::new::<&str>(&[], &["woff"]).is_ok());
    }
}
