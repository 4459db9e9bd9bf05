//! Minimal XML element tree
//!
//! Handles the subset of XML the query API produces: a prolog, comments,
//! elements with attributes, character data with entity references, and
//! CDATA sections. Namespace prefixes are dropped, so `opensearch:startIndex`
//! is addressed as `startIndex`.

use crate::error::{Error, Result};

/// Deepest element nesting accepted before the document is rejected
pub const MAX_DEPTH: usize = 256;

/// A parsed XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Local name (prefix stripped)
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Concatenated character data directly inside this element
    pub text: String,
}

impl XmlElement {
    /// Attribute value by local name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given local name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of the first child with the given name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }
}

/// Parse a whole document and return its root element
pub fn parse_document(input: &str) -> Result<XmlElement> {
    let mut parser = Parser { input, pos: 0 };
    parser.skip_misc()?;
    if !parser.rest().starts_with('<') {
        return Err(malformed("input does not appear to be XML"));
    }
    let root = parser.parse_element(1)?;
    parser.skip_misc()?;
    if !parser.rest().is_empty() {
        return Err(malformed("unexpected content after root element"));
    }
    Ok(root)
}

fn malformed(message: impl AsRef<str>) -> Error {
    Error::fatal(format!("Malformed XML: {}", message.as_ref()))
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        let input = self.input;
        &input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Advance past the next occurrence of `terminator`
    fn skip_past(&mut self, terminator: &str) -> Result<&'a str> {
        let rest = self.rest();
        let end = rest
            .find(terminator)
            .ok_or_else(|| malformed(format!("missing '{terminator}'")))?;
        self.pos += end + terminator.len();
        Ok(&rest[..end])
    }

    /// Skip whitespace, declarations, comments and doctype
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<!DOCTYPE") {
                self.skip_past(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn read_name(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '='))
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(malformed("expected a name"));
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    fn expect(&mut self, token: char) -> Result<()> {
        if self.rest().starts_with(token) {
            self.pos += token.len_utf8();
            Ok(())
        } else {
            Err(malformed(format!("expected '{token}' at offset {}", self.pos)))
        }
    }

    fn parse_element(&mut self, depth: usize) -> Result<XmlElement> {
        if depth > MAX_DEPTH {
            return Err(malformed(format!(
                "nesting too deep (more than {MAX_DEPTH} levels)"
            )));
        }
        self.expect('<')?;
        let raw_name = self.read_name()?;
        let mut element = XmlElement {
            name: local_name(raw_name).to_string(),
            ..XmlElement::default()
        };

        // Attributes
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.pos += 2;
                return Ok(element);
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            let key = self.read_name()?;
            self.skip_whitespace();
            self.expect('=')?;
            self.skip_whitespace();
            let quote = self
                .rest()
                .chars()
                .next()
                .filter(|c| matches!(c, '"' | '\''))
                .ok_or_else(|| malformed(format!("unquoted value for attribute '{key}'")))?;
            self.pos += 1;
            let raw_value = self.skip_past(if quote == '"' { "\"" } else { "'" })?;
            if !key.starts_with("xmlns") {
                element
                    .attributes
                    .push((local_name(key).to_string(), unescape(raw_value)?));
            }
        }

        // Content
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(malformed(format!("missing closing tag for '{raw_name}'")));
            }
            if rest.starts_with("</") {
                self.pos += 2;
                let closing = self.read_name()?;
                if closing != raw_name {
                    return Err(malformed(format!(
                        "expected </{raw_name}>, found </{closing}>"
                    )));
                }
                self.skip_whitespace();
                self.expect('>')?;
                return Ok(element);
            }
            if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let data = self.skip_past("]]>")?;
                element.text.push_str(data);
            } else if rest.starts_with('<') {
                let child = self.parse_element(depth + 1)?;
                element.children.push(child);
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                element.text.push_str(&unescape(&rest[..end])?);
                self.pos += end;
            }
        }
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Resolve predefined and numeric entity references
fn unescape(raw: &str) -> Result<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| malformed("unterminated entity reference"))?;
        let entity = &after[..semi];
        let resolved = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| malformed(format!("unknown entity '&{entity};'")))?
            }
        };
        out.push(resolved);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
