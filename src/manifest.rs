//! Manifest locating and parsing.
//!
//! Each addon module carries a static metadata file — `__manifest__.py` or a
//! legacy equivalent — containing a single Python mapping literal:
//!
//! ```text
//! {
//!     "name": "Invoice Fixes",
//!     "author": "Quilsoft",
//!     "license": "AGPL-3",
//!     "development_status": "Beta",
//!     "website": "https://quilsoft.com",
//!     "installable": True,
//! }
//! ```
//!
//! The file is parsed with a restricted literal parser: strings (single,
//! double, and triple-quoted, with adjacent-literal concatenation), numbers,
//! `True`/`False`/`None`, lists, tuples, and dicts. Nothing is executed —
//! anything beyond a literal is a parse error. Parsed values land in
//! [`serde_json::Value`]; the typed [`Manifest`] extracts the fields the
//! pipeline cares about and keeps the raw mapping for the template.

use serde_json::{Map, Number, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Candidate manifest file names, newest convention first.
pub const MANIFEST_NAMES: &[&str] = &["__manifest__.py", "__openerp__.py", "__terp__.py"];

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("no manifest found in {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("manifest parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Typed view of a module manifest.
///
/// `name` and `author` stay optional — their absence is a validation error
/// reported at the end of the run, not a reason to stop generating.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub name: Option<String>,
    pub author: Option<String>,
    /// License identifier; defaults to `AGPL-3` when absent.
    pub license: String,
    /// Maturity string; defaults to `Beta` when absent.
    pub development_status: String,
    pub website: Option<String>,
    pub installable: bool,
    /// The full parsed mapping, for template fields outside the typed set.
    pub raw: Map<String, Value>,
}

impl Manifest {
    fn from_value(value: Value, path: &Path) -> Result<Self, ManifestError> {
        let Value::Object(raw) = value else {
            return Err(ManifestError::Parse {
                path: path.to_path_buf(),
                message: "manifest is not a mapping".to_string(),
            });
        };

        Ok(Manifest {
            name: string_field(&raw, "name"),
            author: string_field(&raw, "author"),
            license: string_field(&raw, "license").unwrap_or_else(|| "AGPL-3".to_string()),
            development_status: string_field(&raw, "development_status")
                .unwrap_or_else(|| "Beta".to_string()),
            website: string_field(&raw, "website"),
            installable: raw
                .get("installable")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            raw,
        })
    }
}

/// Extract a string field; a list of strings (some manifests list several
/// authors) is joined with `", "`.
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

/// Locate the manifest file inside a module directory, trying each candidate
/// name in order.
pub fn manifest_path(module_dir: &Path) -> Option<PathBuf> {
    MANIFEST_NAMES
        .iter()
        .map(|name| module_dir.join(name))
        .find(|path| path.is_file())
}

/// Read and parse the manifest of a module directory.
pub fn read_manifest(module_dir: &Path) -> Result<Manifest, ManifestError> {
    let path = manifest_path(module_dir)
        .ok_or_else(|| ManifestError::NotFound(module_dir.to_path_buf()))?;
    let source = fs::read_to_string(&path)?;
    let value = parse_literal(&source).map_err(|message| ManifestError::Parse {
        path: path.clone(),
        message,
    })?;
    Manifest::from_value(value, &path)
}

/// Parse a Python literal expression into a JSON value.
///
/// Supports the literal subset `ast.literal_eval` accepts for manifests:
/// strings, numbers, booleans, `None`, lists, tuples, and dicts, plus `#`
/// comments and trailing commas. Errors carry a line number.
pub fn parse_literal(source: &str) -> Result<Value, String> {
    let mut parser = LiteralParser::new(source);
    parser.skip_ws();
    let value = parser.parse_value()?;
    parser.skip_ws();
    match parser.peek() {
        None => Ok(value),
        Some(c) => Err(parser.error(&format!("unexpected trailing input '{c}'"))),
    }
}

// ---------------------------------------------------------------------------
// Literal parser
// ---------------------------------------------------------------------------

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Skip whitespace and `#` comments.
    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn error(&self, message: &str) -> String {
        let line = self.chars[..self.pos.min(self.chars.len())]
            .iter()
            .filter(|&&c| c == '\n')
            .count()
            + 1;
        format!("line {line}: {message}")
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        match self.peek() {
            Some('{') => self.parse_dict(),
            Some('[') => self.parse_sequence(']'),
            Some('(') => self.parse_sequence(')'),
            Some('"') | Some('\'') => self.parse_string_group().map(Value::String),
            Some(c) if c == 'u' || c == 'U' => {
                if matches!(self.peek_at(1), Some('"') | Some('\'')) {
                    self.parse_string_group().map(Value::String)
                } else {
                    self.parse_keyword()
                }
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.parse_number(),
            Some(c) if c.is_alphabetic() => self.parse_keyword(),
            Some(c) => Err(self.error(&format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Parse one or more adjacent string literals, concatenated (Python
    /// concatenates `"a" "b"` into `"ab"`).
    fn parse_string_group(&mut self) -> Result<String, String> {
        let mut out = self.parse_string()?;
        loop {
            let checkpoint = self.pos;
            self.skip_ws();
            let next_is_string = match self.peek() {
                Some('"') | Some('\'') => true,
                Some('u') | Some('U') => matches!(self.peek_at(1), Some('"') | Some('\'')),
                _ => false,
            };
            if next_is_string {
                out.push_str(&self.parse_string()?);
            } else {
                self.pos = checkpoint;
                return Ok(out);
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, String> {
        if matches!(self.peek(), Some('u') | Some('U')) {
            self.pos += 1;
        }
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string literal")),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or_else(|| self.error("unterminated string literal"))?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' | '\'' | '"' => out.push(escaped),
                        '\n' => {} // line continuation
                        // Unknown escapes pass through, as Python does
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                Some(c) if c == quote => {
                    if !triple {
                        return Ok(out);
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.pos += 2;
                        return Ok(out);
                    }
                    out.push(c);
                }
                Some('\n') if !triple => {
                    return Err(self.error("unterminated string literal"));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => self.pos += 1,
                '.' => {
                    is_float = true;
                    self.pos += 1;
                }
                'e' | 'E' => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(self.peek(), Some('-') | Some('+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }

        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|&&c| c != '_')
            .collect();
        if is_float {
            let parsed: f64 = text
                .parse()
                .map_err(|_| self.error(&format!("invalid number '{text}'")))?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| self.error(&format!("invalid number '{text}'")))
        } else {
            let parsed: i64 = text
                .parse()
                .map_err(|_| self.error(&format!("invalid number '{text}'")))?;
            Ok(Value::Number(parsed.into()))
        }
    }

    fn parse_keyword(&mut self) -> Result<Value, String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            _ => Err(self.error(&format!("'{word}' is not a literal"))),
        }
    }

    fn parse_sequence(&mut self, close: char) -> Result<Value, String> {
        self.pos += 1; // opening bracket
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                Some(c) if c == close => {}
                _ => return Err(self.error(&format!("expected ',' or '{close}'"))),
            }
        }
    }

    fn parse_dict(&mut self) -> Result<Value, String> {
        self.pos += 1; // '{'
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }
            let key = match self.parse_value()? {
                Value::String(s) => s,
                _ => return Err(self.error("dict keys must be string literals")),
            };
            self.skip_ws();
            if self.bump() != Some(':') {
                return Err(self.error("expected ':' after dict key"));
            }
            self.skip_ws();
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                Some('}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn parses_basic_manifest() {
        let value = parse_literal(
            r#"{
                "name": "Invoice Fixes",
                "author": "Quilsoft",
                "version": "16.0.1.0.0",
                "installable": True,
                "depends": ["account", "sale"],
            }"#,
        )
        .unwrap();
        assert_eq!(value["name"], json!("Invoice Fixes"));
        assert_eq!(value["installable"], json!(true));
        assert_eq!(value["depends"], json!(["account", "sale"]));
    }

    #[test]
    fn parses_comments_and_trailing_commas() {
        let value = parse_literal(
            "{\n    # the module name\n    'name': 'X',  # inline\n}\n",
        )
        .unwrap();
        assert_eq!(value["name"], json!("X"));
    }

    #[test]
    fn parses_triple_quoted_strings() {
        let value = parse_literal("{'summary': \"\"\"Multi\nline\"\"\"}").unwrap();
        assert_eq!(value["summary"], json!("Multi\nline"));
    }

    #[test]
    fn parses_adjacent_string_concatenation() {
        let value = parse_literal("{'summary': 'part one, ' 'part two'}").unwrap();
        assert_eq!(value["summary"], json!("part one, part two"));
    }

    #[test]
    fn parses_numbers_and_none() {
        let value = parse_literal("{'sequence': 10, 'weight': 1.5, 'extra': None}").unwrap();
        assert_eq!(value["sequence"], json!(10));
        assert_eq!(value["weight"], json!(1.5));
        assert_eq!(value["extra"], json!(null));
    }

    #[test]
    fn parses_tuples_as_arrays() {
        let value = parse_literal("{'pair': (1, 2)}").unwrap();
        assert_eq!(value["pair"], json!([1, 2]));
    }

    #[test]
    fn parses_escapes() {
        let value = parse_literal(r#"{'name': 'it\'s', 'note': "a\nb"}"#).unwrap();
        assert_eq!(value["name"], json!("it's"));
        assert_eq!(value["note"], json!("a\nb"));
    }

    #[test]
    fn rejects_function_calls() {
        let err = parse_literal("{'name': open('/etc/passwd')}").unwrap_err();
        assert!(err.contains("not a literal"), "{err}");
    }

    #[test]
    fn rejects_trailing_input() {
        let err = parse_literal("{} {}").unwrap_err();
        assert!(err.contains("trailing input"), "{err}");
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = parse_literal("{'name': 'oops}").unwrap_err();
        assert!(err.contains("unterminated"), "{err}");
    }

    #[test]
    fn error_carries_line_number() {
        let err = parse_literal("{\n'name':\nbad}").unwrap_err();
        assert!(err.starts_with("line 3:"), "{err}");
    }

    #[test]
    fn manifest_defaults_applied() {
        let value = parse_literal("{'name': 'X', 'author': 'A'}").unwrap();
        let manifest = Manifest::from_value(value, Path::new("m")).unwrap();
        assert_eq!(manifest.license, "AGPL-3");
        assert_eq!(manifest.development_status, "Beta");
        assert!(manifest.installable);
        assert_eq!(manifest.website, None);
    }

    #[test]
    fn manifest_author_list_joined() {
        let value = parse_literal("{'author': ['One', 'Two']}").unwrap();
        let manifest = Manifest::from_value(value, Path::new("m")).unwrap();
        assert_eq!(manifest.author.as_deref(), Some("One, Two"));
    }

    #[test]
    fn non_mapping_manifest_is_error() {
        let value = parse_literal("[1, 2]").unwrap();
        let err = Manifest::from_value(value, Path::new("m")).unwrap_err();
        assert!(err.to_string().contains("not a mapping"));
    }

    #[test]
    fn read_manifest_prefers_newest_name() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("__terp__.py"), "{'name': 'old'}").unwrap();
        std::fs::write(tmp.path().join("__manifest__.py"), "{'name': 'new'}").unwrap();
        let manifest = read_manifest(tmp.path()).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("new"));
    }

    #[test]
    fn read_manifest_falls_back_to_legacy_names() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("__openerp__.py"), "{'name': 'legacy'}").unwrap();
        let manifest = read_manifest(tmp.path()).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("legacy"));
    }

    #[test]
    fn missing_manifest_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = read_manifest(tmp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }
}
