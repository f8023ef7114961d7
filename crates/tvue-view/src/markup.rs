#![forbid(unsafe_code)]

//! Lenient HTML-subset parser and serializer.
//!
//! The parser accepts the markup a template author writes by hand: elements
//! with quoted, unquoted or bare attributes, text, comments, void elements and
//! `/>` self-closing tags. It never fails: unclosed elements are closed at the
//! end of input and stray closing tags are dropped.
//!
//! Attribute names are kept verbatim, so directive syntax such as
//! `@click.stop` or `v-on:input` survives parsing untouched.

use std::borrow::Cow;

use thiserror::Error;

use crate::node::{NodeKind, ViewNode};

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("template has no root element")]
    NoRootElement,

    #[error("template must have exactly one root element, found {count} top-level nodes")]
    MultipleRoots { count: usize },
}

/// Parse `markup` into a list of top-level nodes.
#[must_use]
pub fn parse_fragment(markup: &str) -> Vec<ViewNode> {
    Parser::new(markup).run()
}

/// Parse a template that must consist of exactly one root element.
/// Comments and whitespace-only text around the root are ignored.
pub fn parse_template(markup: &str) -> Result<ViewNode, ParseError> {
    let significant: Vec<ViewNode> = parse_fragment(markup)
        .into_iter()
        .filter(|node| match node.kind() {
            NodeKind::Element => true,
            NodeKind::Text => !node.text_content().trim().is_empty(),
            NodeKind::Comment => false,
        })
        .collect();

    match significant.as_slice() {
        [] => Err(ParseError::NoRootElement),
        [root] if root.is_element() => Ok(root.clone()),
        [_] => Err(ParseError::NoRootElement),
        many => Err(ParseError::MultipleRoots { count: many.len() }),
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    roots: Vec<ViewNode>,
    open: Vec<ViewNode>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            roots: Vec::new(),
            open: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn run(mut self) -> Vec<ViewNode> {
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.comment();
            } else if starts_close_tag(rest) {
                self.close_tag();
            } else if starts_open_tag(rest) {
                self.open_tag();
            } else {
                self.text();
            }
        }
        tracing::trace!(roots = self.roots.len(), "markup parsed");
        self.roots
    }

    fn attach(&mut self, node: &ViewNode) {
        match self.open.last() {
            Some(parent) => parent.append_child(node),
            None => self.roots.push(node.clone()),
        }
    }

    fn comment(&mut self) {
        let body_start = self.pos + "<!--".len();
        let (body, next) = match self.src[body_start..].find("-->") {
            Some(end) => (
                &self.src[body_start..body_start + end],
                body_start + end + "-->".len(),
            ),
            None => (&self.src[body_start..], self.src.len()),
        };
        self.pos = next;
        self.attach(&ViewNode::comment(body));
    }

    fn text(&mut self) {
        let rest = self.rest();
        // A `<` that does not start markup is literal text.
        let mut end = rest.len();
        for (i, _) in rest.char_indices().filter(|&(_, c)| c == '<').skip_while(|&(i, _)| i == 0) {
            let tail = &rest[i..];
            if tail.starts_with("<!--") || starts_close_tag(tail) || starts_open_tag(tail) {
                end = i;
                break;
            }
        }
        self.pos += end;
        let node = ViewNode::text(decode_entities(&rest[..end]));
        self.attach(&node);
    }

    fn close_tag(&mut self) {
        let rest = self.rest();
        let name_start = "</".len();
        let name_len = tag_name_len(&rest[name_start..]);
        let name = rest[name_start..name_start + name_len].to_ascii_lowercase();
        self.pos += match rest.find('>') {
            Some(gt) => gt + 1,
            None => rest.len(),
        };

        if let Some(depth) = self.open.iter().rposition(|node| node.tag() == name) {
            self.open.truncate(depth);
        } else {
            tracing::trace!(tag = %name, "dropping stray closing tag");
        }
    }

    fn open_tag(&mut self) {
        self.pos += 1;
        let name_len = tag_name_len(self.rest());
        let element = ViewNode::element(&self.rest()[..name_len]);
        self.pos += name_len;

        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                break;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            let (name, value) = self.attribute();
            element.set_attribute(&name, value);
        }

        self.attach(&element);
        if !self_closing && !is_void(element.tag()) {
            self.open.push(element);
        }
    }

    fn attribute(&mut self) -> (String, String) {
        let rest = self.rest();
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        // A lone `=` with no name still has to make progress.
        let name_len = if name_len == 0 { rest.chars().next().map_or(0, char::len_utf8) } else { name_len };
        let name = rest[..name_len].to_owned();
        self.pos += name_len;

        self.skip_whitespace();
        if !self.rest().starts_with('=') {
            return (name, String::new());
        }
        self.pos += 1;
        self.skip_whitespace();

        let rest = self.rest();
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                match body.find(quote) {
                    Some(end) => {
                        self.pos += end + 2;
                        &body[..end]
                    }
                    None => {
                        self.pos = self.src.len();
                        body
                    }
                }
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                &rest[..end]
            }
        };
        (name, decode_entities(value).into_owned())
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')
}

fn tag_name_len(s: &str) -> usize {
    s.find(|c: char| !is_tag_char(c)).unwrap_or(s.len())
}

fn starts_open_tag(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn starts_close_tag(s: &str) -> bool {
    s.starts_with("</") && s[2..].chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Decode the named entities the serializer emits plus numeric references.
/// Unknown or malformed references are kept literally.
fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

// ---------------------------------------------------------------------------
// Serializer
// ---------------------------------------------------------------------------

pub(crate) fn write_node(node: &ViewNode, out: &mut String) {
    use std::fmt::Write as _;

    match node.kind() {
        NodeKind::Text => {
            let _ = write!(out, "{}", v_htmlescape::escape(&node.text_content()));
        }
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(&node.text_content());
            out.push_str("-->");
        }
        NodeKind::Element => {
            out.push('<');
            out.push_str(node.tag());
            for (name, value) in node.attributes() {
                let _ = write!(out, " {name}=\"{}\"", v_htmlescape::escape(&value));
            }
            out.push('>');
            if is_void(node.tag()) {
                return;
            }
            for child in node.children() {
                write_node(&child, out);
            }
            out.push_str("</");
            out.push_str(node.tag());
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_text() {
        let nodes = parse_fragment("<div id=\"app\"><p>Hello <b>world</b></p></div>");
        assert_eq!(nodes.len(), 1);
        let div = &nodes[0];
        assert_eq!(div.tag(), "div");
        assert_eq!(div.attribute("id").as_deref(), Some("app"));
        assert_eq!(div.text_content(), "Hello world");
    }

    #[test]
    fn keeps_directive_attribute_names() {
        let node = parse_template(
            r#"<button @click.stop.prevent="save" v-on:input='sync' v-text=msg disabled>x</button>"#,
        )
        .unwrap();
        assert_eq!(
            node.attributes(),
            vec![
                ("@click.stop.prevent".to_owned(), "save".to_owned()),
                ("v-on:input".to_owned(), "sync".to_owned()),
                ("v-text".to_owned(), "msg".to_owned()),
                ("disabled".to_owned(), String::new()),
            ]
        );
    }

    #[test]
    fn void_and_self_closing_elements_have_no_children() {
        let div = parse_template("<div><input value=\"a\"><br/><span/>tail</div>").unwrap();
        let tags: Vec<String> = div
            .children()
            .iter()
            .map(|c| if c.is_element() { c.tag().to_owned() } else { c.text_content() })
            .collect();
        assert_eq!(tags, vec!["input", "br", "span", "tail"]);
        assert_eq!(div.find_by_tag("input").unwrap().value(), "a");
    }

    #[test]
    fn comments_become_comment_nodes() {
        let nodes = parse_fragment("<!-- note -->text<!-- unterminated");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].kind(), NodeKind::Comment);
        assert_eq!(nodes[0].text_content(), " note ");
        assert_eq!(nodes[2].text_content(), " unterminated");
    }

    #[test]
    fn lenient_recovery() {
        let nodes = parse_fragment("</nope>a < b<p>open");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text_content(), "a < b");
        assert_eq!(nodes[1].text_content(), "open");
    }

    #[test]
    fn closing_tag_closes_intervening_elements() {
        let div = parse_template("<div><p><b>x</div>").unwrap();
        assert_eq!(div.outer_html(), "<div><p><b>x</b></p></div>");
    }

    #[test]
    fn decodes_entities() {
        let p = parse_template("<p title=\"&quot;q&quot;\">&lt;a&gt; &amp;amp; &#65;&#x42; &bogus;</p>").unwrap();
        assert_eq!(p.attribute("title").as_deref(), Some("\"q\""));
        assert_eq!(p.text_content(), "<a> &amp; AB &bogus;");
    }

    #[test]
    fn template_requires_single_root() {
        assert_eq!(parse_template("  ").err(), Some(ParseError::NoRootElement));
        assert_eq!(parse_template("just text").err(), Some(ParseError::NoRootElement));
        assert_eq!(
            parse_template("<a></a><b></b>").err(),
            Some(ParseError::MultipleRoots { count: 2 })
        );
        assert!(parse_template("<!-- c -->\n<main></main>\n").is_ok());
    }

    #[test]
    fn serializes_with_escaping() {
        let p = ViewNode::element("p");
        p.set_attribute("title", "a\"b");
        p.append_child(&ViewNode::text("1 < 2"));
        let html = p.outer_html();
        assert!(html.starts_with("<p title=\""));
        assert!(!html.contains("1 < 2"));

        let reparsed = parse_template(&html).unwrap();
        assert_eq!(reparsed.attribute("title").as_deref(), Some("a\"b"));
        assert_eq!(reparsed.text_content(), "1 < 2");
    }

    #[test]
    fn inner_html_round_trip() {
        let div = ViewNode::element("div");
        div.set_inner_html("<em>hi</em> there");
        assert_eq!(div.children().len(), 2);
        assert_eq!(div.inner_html(), "<em>hi</em> there");
    }
}
