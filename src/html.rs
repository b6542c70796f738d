//! HTML export of generated READMEs.
//!
//! Renders `<module>/README.rst` to `<module>/static/description/index.html`
//! using a safe-subset reStructuredText renderer:
//!
//! - document title (overline/underline), underlined sections
//! - paragraphs, bullet lists, literal blocks (`::`)
//! - inline ``**strong**``, ``*emphasis*``, ````literal````, and
//!   `` `text <url>`__ `` links
//! - image and figure directives, substitution definitions and references
//! - `.. contents::`
//!
//! Nothing else. There is no file inclusion and no raw HTML passthrough, and
//! any unknown directive or malformed inline markup is a hard error that
//! stops the run — generated HTML is either trustworthy or absent.
//!
//! ## Manual-edit protection
//!
//! An existing `index.html` is only overwritten when it still carries the
//! generator marker in its `<meta name="generator">` tag. A file without the
//! marker was created or taken over by hand and is left untouched.
//!
//! ## Diff stability
//!
//! The generator meta tag is post-processed to strip the tool version, so
//! regenerating with a newer release does not touch otherwise-unchanged
//! files.

use maud::{DOCTYPE, Markup, html};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

use crate::render::README_NAME;

/// Marker identifying machine-generated HTML. Its absence from an existing
/// file means the file is manually maintained.
pub const GENERATOR_MARKER: &str = "addon-readme";

/// Output path of the HTML index, relative to the module directory.
pub const INDEX_PATH: &str = "static/description/index.html";

const CSS: &str = include_str!("../static/style.css");

#[derive(Error, Debug)]
pub enum HtmlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("markup error in {path}: {source}")]
    Markup {
        path: PathBuf,
        source: MarkupError,
    },
}

/// A markup problem that halts conversion, carrying the offending line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct MarkupError {
    pub line: usize,
    pub message: String,
}

impl MarkupError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Result of exporting one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// HTML was (re)generated at this path.
    Written(PathBuf),
    /// An existing file without the generator marker was left untouched.
    SkippedManual(PathBuf),
}

/// Export a module's README to its HTML index.
pub fn export(module_dir: &Path) -> Result<ExportOutcome, HtmlError> {
    let readme_path = module_dir.join(README_NAME);
    let index_path = module_dir.join(INDEX_PATH);

    if index_path.exists() {
        let existing = fs::read_to_string(&index_path)?;
        if !existing.contains(GENERATOR_MARKER) {
            return Ok(ExportOutcome::SkippedManual(index_path));
        }
    }

    let rst = fs::read_to_string(&readme_path)?;
    let page = render_html(&rst).map_err(|source| HtmlError::Markup {
        path: readme_path.clone(),
        source,
    })?;

    if let Some(parent) = index_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&index_path, strip_generator_version(&page))?;
    Ok(ExportOutcome::Written(index_path))
}

/// Remove the tool version from the generator meta tag, so that re-runs with
/// a different release do not produce spurious diffs.
pub fn strip_generator_version(page: &str) -> String {
    static VERSION: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(<meta[^>]*generator[^>]*addon-readme)\s*[0-9][0-9.]*")
            .expect("generator version pattern")
    });
    VERSION.replace(page, "$1").into_owned()
}

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct ImageSpec {
    src: String,
    target: Option<String>,
    alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Title(String),
    Section { text: String, level: usize },
    Paragraph { text: String, line: usize },
    BulletList { items: Vec<String>, line: usize },
    Literal(String),
    Image(ImageSpec),
    Figure { image: ImageSpec, caption: Option<String>, line: usize },
    Contents,
    Transition,
}

#[derive(Debug, Clone)]
struct SectionRef {
    text: String,
    id: String,
    level: usize,
}

/// Render an RST document to a complete HTML page.
pub fn render_html(rst: &str) -> Result<String, MarkupError> {
    let mut parser = DocParser::new(rst);
    let blocks = parser.parse()?;

    let title = blocks
        .iter()
        .find_map(|b| match b {
            Block::Title(t) => Some(t.clone()),
            _ => None,
        })
        .or_else(|| {
            blocks.iter().find_map(|b| match b {
                Block::Section { text, .. } => Some(text.clone()),
                _ => None,
            })
        })
        .unwrap_or_else(|| "README".to_string());

    let body = render_blocks(&blocks, &parser.subs, &parser.sections)?;
    let generator = format!("{GENERATOR_MARKER} {}", env!("CARGO_PKG_VERSION"));

    let page = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="generator" content=(generator);
                title { (title) }
                style { (CSS) }
            }
            body {
                div class="document" {
                    (body)
                }
            }
        }
    };

    Ok(page.into_string())
}

// ---------------------------------------------------------------------------
// Block parsing
// ---------------------------------------------------------------------------

const ADORNMENT_CHARS: &str = "=-~^\"'`#*+.:_";

/// A line consisting of one repeated section punctuation character.
fn is_adornment(line: &str) -> bool {
    let trimmed = line.trim_end();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    ADORNMENT_CHARS.contains(first) && trimmed.len() >= 2 && chars.all(|c| c == first)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn slugify(text: &str) -> String {
    let mut out = String::new();
    let mut last_dash = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_end_matches('-').to_string()
}

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\.\s+([\w-]+)::\s*(.*)$").expect("directive pattern")
});

static SUBSTITUTION_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\.\s+\|([^|]+)\|\s+([\w-]+)::\s*(.*)$").expect("substitution pattern")
});

static DIRECTIVE_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([\w-]+):\s*(.*)$").expect("option pattern"));

struct DocParser {
    lines: Vec<String>,
    pos: usize,
    subs: BTreeMap<String, ImageSpec>,
    sections: Vec<SectionRef>,
    level_chars: Vec<char>,
    has_title: bool,
}

impl DocParser {
    fn new(source: &str) -> Self {
        Self {
            lines: source.lines().map(str::to_string).collect(),
            pos: 0,
            subs: BTreeMap::new(),
            sections: Vec::new(),
            level_chars: Vec::new(),
            has_title: false,
        }
    }

    fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    fn error(&self, message: impl Into<String>) -> MarkupError {
        MarkupError::new(self.pos + 1, message)
    }

    fn parse(&mut self) -> Result<Vec<Block>, MarkupError> {
        let mut blocks = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos].clone();
            if is_blank(&line) {
                self.pos += 1;
                continue;
            }

            // Comment/directive markers before adornments, so a bare `..`
            // comment is not mistaken for a transition
            let trimmed = line.trim_start();
            if trimmed == ".." || trimmed.starts_with(".. ") {
                if let Some(block) = self.parse_directive(trimmed)? {
                    blocks.push(block);
                }
                continue;
            }

            if is_adornment(&line) {
                blocks.push(self.parse_adorned(&line)?);
                continue;
            }

            if trimmed.starts_with("* ") || trimmed.starts_with("- ") {
                blocks.push(self.parse_bullet_list());
                continue;
            }

            self.parse_paragraph(&mut blocks)?;
        }
        Ok(blocks)
    }

    /// A construct starting with an adornment line: either an
    /// overline/underline title or a transition.
    fn parse_adorned(&mut self, line: &str) -> Result<Block, MarkupError> {
        let text_line = self.line(self.pos + 1).unwrap_or("");
        let under_line = self.line(self.pos + 2).unwrap_or("");

        if !is_blank(text_line)
            && !is_adornment(text_line)
            && is_adornment(under_line)
            && under_line.trim_end().starts_with(line.trim_end().chars().next().unwrap_or('='))
        {
            let text = text_line.trim().to_string();
            if line.trim_end().len() < text.chars().count() {
                return Err(self.error("title overline too short"));
            }
            self.pos += 3;
            if self.has_title {
                let adornment = line.trim_end().chars().next().unwrap_or('=');
                return Ok(self.make_section(text, adornment));
            }
            self.has_title = true;
            return Ok(Block::Title(text));
        }

        // A lone adornment line is a transition
        self.pos += 1;
        Ok(Block::Transition)
    }

    fn make_section(&mut self, text: String, adornment: char) -> Block {
        let level = match self.level_chars.iter().position(|&c| c == adornment) {
            Some(i) => i + 1,
            None => {
                self.level_chars.push(adornment);
                self.level_chars.len()
            }
        };
        let mut id = slugify(&text);
        let duplicates = self.sections.iter().filter(|s| s.id.starts_with(&id)).count();
        if duplicates > 0 {
            id = format!("{id}-{duplicates}");
        }
        self.sections.push(SectionRef {
            text: text.clone(),
            id,
            level,
        });
        Block::Section { text, level }
    }

    /// Parse a directive or comment starting at the current line. Comments
    /// return `None`.
    fn parse_directive(&mut self, trimmed: &str) -> Result<Option<Block>, MarkupError> {
        if let Some(caps) = SUBSTITUTION_DEF.captures(trimmed) {
            let name = caps[1].trim().to_string();
            let kind = caps[2].to_string();
            let argument = caps[3].trim().to_string();
            if kind != "image" {
                return Err(self.error(format!(
                    "substitution directive '{kind}' is not allowed"
                )));
            }
            self.pos += 1;
            let options = self.parse_options();
            self.subs.insert(
                name,
                ImageSpec {
                    src: argument,
                    target: options.get("target").cloned(),
                    alt: options.get("alt").cloned(),
                },
            );
            return Ok(None);
        }

        if let Some(caps) = DIRECTIVE.captures(trimmed) {
            let name = caps[1].to_string();
            let argument = caps[2].trim().to_string();
            let directive_line = self.pos + 1;
            self.pos += 1;
            let options = self.parse_options();
            return match name.as_str() {
                "image" => Ok(Some(Block::Image(ImageSpec {
                    src: argument,
                    target: options.get("target").cloned(),
                    alt: options.get("alt").cloned(),
                }))),
                "figure" => {
                    let caption = self.parse_indented_text();
                    Ok(Some(Block::Figure {
                        image: ImageSpec {
                            src: argument,
                            target: options.get("target").cloned(),
                            alt: options.get("alt").cloned(),
                        },
                        caption,
                        line: directive_line,
                    }))
                }
                "contents" => Ok(Some(Block::Contents)),
                other => Err(MarkupError::new(
                    directive_line,
                    format!("directive '{other}' is not allowed"),
                )),
            };
        }

        // `..` comment: skip the marker line and everything indented under it
        self.pos += 1;
        while let Some(next) = self.line(self.pos) {
            if is_blank(next) || next.starts_with(char::is_whitespace) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(None)
    }

    /// Consume indented `:key: value` option lines following a directive.
    fn parse_options(&mut self) -> BTreeMap<String, String> {
        let mut options = BTreeMap::new();
        while let Some(line) = self.line(self.pos) {
            if is_blank(line) || !line.starts_with(char::is_whitespace) {
                break;
            }
            let Some(caps) = DIRECTIVE_OPTION.captures(line.trim()) else {
                break;
            };
            options.insert(caps[1].to_string(), caps[2].trim().to_string());
            self.pos += 1;
        }
        options
    }

    /// Consume an indented text block (e.g. a figure caption), skipping one
    /// leading blank line.
    fn parse_indented_text(&mut self) -> Option<String> {
        while let Some(line) = self.line(self.pos) {
            if is_blank(line) {
                self.pos += 1;
            } else {
                break;
            }
        }
        let mut collected = Vec::new();
        while let Some(line) = self.line(self.pos) {
            if is_blank(line) || !line.starts_with(char::is_whitespace) {
                break;
            }
            collected.push(line.trim().to_string());
            self.pos += 1;
        }
        if collected.is_empty() {
            None
        } else {
            Some(collected.join(" "))
        }
    }

    fn parse_bullet_list(&mut self) -> Block {
        let start_line = self.pos + 1;
        let mut items = Vec::new();
        while let Some(line) = self.line(self.pos) {
            let trimmed = line.trim_start();
            if !(trimmed.starts_with("* ") || trimmed.starts_with("- ")) {
                break;
            }
            let mut item = trimmed[2..].trim().to_string();
            self.pos += 1;
            // Continuation lines are indented deeper than the bullet marker
            while let Some(next) = self.line(self.pos) {
                let next_trimmed = next.trim_start();
                if is_blank(next)
                    || !next.starts_with(char::is_whitespace)
                    || next_trimmed.starts_with("* ")
                    || next_trimmed.starts_with("- ")
                {
                    break;
                }
                item.push(' ');
                item.push_str(next_trimmed);
                self.pos += 1;
            }
            items.push(item);
        }
        Block::BulletList {
            items,
            line: start_line,
        }
    }

    fn parse_paragraph(&mut self, blocks: &mut Vec<Block>) -> Result<(), MarkupError> {
        let start = self.pos;
        let first = self.lines[self.pos].trim().to_string();

        // A single line followed by an adornment is a section header
        if let Some(next) = self.line(self.pos + 1)
            && is_adornment(next)
        {
            if next.trim_end().len() < first.chars().count() {
                return Err(MarkupError::new(
                    self.pos + 2,
                    "section underline too short",
                ));
            }
            let adornment = next.trim_end().chars().next().unwrap_or('=');
            self.pos += 2;
            if !self.has_title && blocks.is_empty() {
                // A lone leading section is promoted to the document title
                self.has_title = true;
                blocks.push(Block::Title(first));
            } else {
                let section = self.make_section(first, adornment);
                blocks.push(section);
            }
            return Ok(());
        }

        let mut collected = vec![first];
        self.pos += 1;
        while let Some(line) = self.line(self.pos) {
            if is_blank(line) || is_adornment(line) {
                break;
            }
            let trimmed = line.trim_start();
            if trimmed.starts_with(".. ") || trimmed.starts_with("* ") || trimmed.starts_with("- ")
            {
                break;
            }
            collected.push(line.trim().to_string());
            self.pos += 1;
        }

        let mut text = collected.join("\n");

        // A paragraph ending in `::` introduces a literal block
        let literal_follows = text.ends_with("::");
        if literal_follows {
            text.truncate(text.len() - 2);
            let trimmed_end = text.trim_end().to_string();
            // `text ::` drops the marker entirely; `text::` keeps one colon
            text = if trimmed_end.is_empty() {
                String::new()
            } else if text.ends_with(char::is_whitespace) {
                trimmed_end
            } else {
                format!("{text}:")
            };
        }

        if !text.is_empty() {
            blocks.push(Block::Paragraph {
                text,
                line: start + 1,
            });
        }

        if literal_follows {
            if let Some(literal) = self.parse_literal_block() {
                blocks.push(Block::Literal(literal));
            }
        }
        Ok(())
    }

    /// Consume the indented block following a `::` paragraph.
    fn parse_literal_block(&mut self) -> Option<String> {
        while let Some(line) = self.line(self.pos) {
            if is_blank(line) {
                self.pos += 1;
            } else {
                break;
            }
        }

        let mut collected: Vec<String> = Vec::new();
        while let Some(line) = self.line(self.pos) {
            if is_blank(line) {
                collected.push(String::new());
                self.pos += 1;
            } else if line.starts_with(char::is_whitespace) {
                collected.push(line.to_string());
                self.pos += 1;
            } else {
                break;
            }
        }
        while collected.last().is_some_and(String::is_empty) {
            collected.pop();
        }
        if collected.is_empty() {
            return None;
        }

        let indent = collected
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| l.len() - l.trim_start().len())
            .min()
            .unwrap_or(0);
        let stripped: Vec<&str> = collected
            .iter()
            .map(|l| if l.is_empty() { "" } else { &l[indent..] })
            .collect();
        Some(format!("{}\n", stripped.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// HTML rendering
// ---------------------------------------------------------------------------

fn render_blocks(
    blocks: &[Block],
    subs: &BTreeMap<String, ImageSpec>,
    sections: &[SectionRef],
) -> Result<Markup, MarkupError> {
    let mut rendered = Vec::new();
    for block in blocks {
        rendered.push(render_block(block, subs, sections)?);
    }
    Ok(html! {
        @for markup in rendered {
            (markup)
        }
    })
}

fn render_block(
    block: &Block,
    subs: &BTreeMap<String, ImageSpec>,
    sections: &[SectionRef],
) -> Result<Markup, MarkupError> {
    let markup = match block {
        Block::Title(text) => html! { h1 { (text) } },
        Block::Section { text, level } => {
            let id = sections
                .iter()
                .find(|s| s.text == *text)
                .map(|s| s.id.clone())
                .unwrap_or_else(|| slugify(text));
            heading(*level, &id, text)
        }
        Block::Paragraph { text, line } => {
            let inline = render_inline(text, subs)
                .map_err(|message| MarkupError::new(*line, message))?;
            // A paragraph of substitution references only (the badge line)
            // gets the badges class so images line up
            let badge_line = text
                .split_whitespace()
                .all(|w| w.starts_with('|') && w.trim_end_matches('_').ends_with('|'));
            html! {
                @if badge_line { p class="badges" { (inline) } }
                @else { p { (inline) } }
            }
        }
        Block::BulletList { items, line } => {
            let mut rendered = Vec::new();
            for item in items {
                rendered.push(
                    render_inline(item, subs)
                        .map_err(|message| MarkupError::new(*line, message))?,
                );
            }
            html! {
                ul {
                    @for item in rendered {
                        li { (item) }
                    }
                }
            }
        }
        Block::Literal(content) => html! { pre { (content) } },
        Block::Image(image) => render_image(image),
        Block::Figure {
            image,
            caption,
            line,
        } => {
            let caption_markup = match caption {
                Some(text) => Some(
                    render_inline(text, subs)
                        .map_err(|message| MarkupError::new(*line, message))?,
                ),
                None => None,
            };
            html! {
                div class="figure" {
                    (render_image(image))
                    @if let Some(caption) = caption_markup {
                        p class="caption" { (caption) }
                    }
                }
            }
        }
        Block::Contents => render_contents(sections),
        Block::Transition => html! { hr; },
    };
    Ok(markup)
}

fn heading(level: usize, id: &str, text: &str) -> Markup {
    match level {
        1 => html! { h2 id=(id) { (text) } },
        2 => html! { h3 id=(id) { (text) } },
        3 => html! { h4 id=(id) { (text) } },
        4 => html! { h5 id=(id) { (text) } },
        _ => html! { h6 id=(id) { (text) } },
    }
}

fn render_image(image: &ImageSpec) -> Markup {
    let alt = image.alt.clone().unwrap_or_default();
    html! {
        @if let Some(target) = &image.target {
            a href=(target) {
                img src=(image.src) alt=(alt);
            }
        } @else {
            img src=(image.src) alt=(alt);
        }
    }
}

/// Render the `.. contents::` directive as a nested outline of all sections.
fn render_contents(sections: &[SectionRef]) -> Markup {
    fn render_level(sections: &[SectionRef], index: &mut usize, level: usize) -> Markup {
        let mut items = Vec::new();
        while *index < sections.len() {
            let section = &sections[*index];
            if section.level < level {
                break;
            }
            if section.level > level {
                // Deeper sections nest under the previous item; orphans
                // (deeper with no parent item) are flattened
                let nested = render_level(sections, index, section.level);
                items.push(html! { li { (nested) } });
                continue;
            }
            *index += 1;
            let has_children = sections.get(*index).is_some_and(|s| s.level > level);
            let text = &section.text;
            let href = format!("#{}", section.id);
            if has_children {
                let nested = render_level(sections, index, level + 1);
                items.push(html! { li { a href=(href) { (text) } (nested) } });
            } else {
                items.push(html! { li { a href=(href) { (text) } } });
            }
        }
        html! {
            ul {
                @for item in items {
                    (item)
                }
            }
        }
    }

    let mut index = 0;
    let list = render_level(sections, &mut index, 1);
    html! {
        div class="contents" {
            p class="topic-title" { "Contents" }
            (list)
        }
    }
}

// ---------------------------------------------------------------------------
// Inline markup
// ---------------------------------------------------------------------------

/// Render inline markup within one paragraph, list item, or caption.
///
/// Errors are plain messages; callers attach the line number.
fn render_inline(text: &str, subs: &BTreeMap<String, ImageSpec>) -> Result<Markup, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts: Vec<Markup> = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    fn flush(plain: &mut String, parts: &mut Vec<Markup>) {
        if !plain.is_empty() {
            let text = std::mem::take(plain);
            parts.push(html! { (text) });
        }
    }

    fn find(chars: &[char], from: usize, needle: &[char]) -> Option<usize> {
        (from..=chars.len().saturating_sub(needle.len()))
            .find(|&i| chars[i..i + needle.len()] == *needle)
    }

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                plain.push(chars[i + 1]);
                i += 2;
            }
            '`' if chars.get(i + 1) == Some(&'`') => {
                let close = find(&chars, i + 2, &['`', '`'])
                    .ok_or("inline literal start-string without end-string")?;
                let content: String = chars[i + 2..close].iter().collect();
                flush(&mut plain, &mut parts);
                parts.push(html! { code { (content) } });
                i = close + 2;
            }
            '`' => {
                let close = find(&chars, i + 1, &['`'])
                    .ok_or("interpreted text start-string without end-string")?;
                let inner: String = chars[i + 1..close].iter().collect();
                let mut end = close + 1;
                let mut underscores = 0;
                while chars.get(end) == Some(&'_') {
                    underscores += 1;
                    end += 1;
                }
                flush(&mut plain, &mut parts);
                if underscores > 0 {
                    let (label, url) = split_link_target(&inner);
                    parts.push(html! { a href=(url) { (label) } });
                } else {
                    parts.push(html! { cite { (inner) } });
                }
                i = end;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2).is_none_or(|c| c.is_whitespace()) {
                    plain.push_str("**");
                    i += 2;
                    continue;
                }
                let close = find(&chars, i + 2, &['*', '*'])
                    .ok_or("inline strong start-string without end-string")?;
                let content: String = chars[i + 2..close].iter().collect();
                flush(&mut plain, &mut parts);
                parts.push(html! { strong { (content) } });
                i = close + 2;
            }
            '*' => {
                if chars.get(i + 1).is_none_or(|c| c.is_whitespace()) {
                    plain.push('*');
                    i += 1;
                    continue;
                }
                let close = find(&chars, i + 1, &['*'])
                    .ok_or("inline emphasis start-string without end-string")?;
                let content: String = chars[i + 1..close].iter().collect();
                flush(&mut plain, &mut parts);
                parts.push(html! { em { (content) } });
                i = close + 1;
            }
            '|' => {
                let reference = find(&chars, i + 1, &['|']).and_then(|close| {
                    let name: String = chars[i + 1..close].iter().collect();
                    subs.contains_key(&name).then_some((name, close))
                });
                match reference {
                    Some((name, close)) => {
                        flush(&mut plain, &mut parts);
                        parts.push(render_image(&subs[&name]));
                        i = close + 1;
                        // reference-style trailing underscores
                        while chars.get(i) == Some(&'_') {
                            i += 1;
                        }
                    }
                    None => {
                        plain.push('|');
                        i += 1;
                    }
                }
            }
            c => {
                plain.push(c);
                i += 1;
            }
        }
    }

    flush(&mut plain, &mut parts);
    Ok(html! {
        @for part in parts {
            (part)
        }
    })
}

/// Split `` `label <url>` `` link content; without an embedded target the
/// whole content is both label and URL.
fn split_link_target(inner: &str) -> (String, String) {
    let trimmed = inner.trim();
    if trimmed.ends_with('>')
        && let Some(open) = trimmed.rfind('<')
    {
        let label = trimmed[..open].trim();
        let url = trimmed[open + 1..trimmed.len() - 1].trim();
        if !label.is_empty() {
            return (label.to_string(), url.to_string());
        }
        return (url.to_string(), url.to_string());
    }
    (trimmed.to_string(), trimmed.to_string())
}
