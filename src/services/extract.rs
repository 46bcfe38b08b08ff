//! Main-content text extraction and title extraction.
//!
//! `extract_text` runs a single left-to-right scan over the markup's tag/text
//! token stream (no DOM is built). A stack of open elements plus an optional
//! capture depth locates the primary content region: the first `<article>`,
//! `<main>` or `<div id="content">` opens capture, and capture ends exactly
//! when that element's stack depth is popped. Text outside any recognized
//! region falls back to body-level collection, and a document where nothing
//! is collected at all falls back to wholesale tag stripping.
//!
//! Both entry points are total: any byte salad that survived UTF-8 lossy
//! decoding produces a string, possibly empty.

use std::collections::VecDeque;
use std::sync::OnceLock;

use regex::Regex;

/// Tags whose directly-enclosed text is collected inside a capture region.
const LEAF_TEXT_TAGS: &[&str] = &[
    "p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "th", "td", "pre", "code", "blockquote",
];

/// Tags whose opening inserts a paragraph break while capturing.
const BLOCK_BREAK_TAGS: &[&str] = &[
    "p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote",
];

/// Inline formatting tags skipped when finding the enclosing block of a text
/// run, so `<p>Hello <b>world</b></p>` keeps "world".
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "em", "i", "mark", "small", "span", "strong", "sub", "sup", "time", "u",
];

/// Extract reading-order plain text from raw markup. Never fails.
pub fn extract_text(html: &str) -> String {
    let mut extractor = TextExtractor::new();
    let mut tokenizer = Tokenizer::new(html);
    while let Some(token) = tokenizer.next_token() {
        match token {
            Token::Open { tag, attrs } => extractor.handle_open(tag, attrs),
            Token::Close(tag) => extractor.handle_close(&tag),
            Token::Text(text) => extractor.handle_text(&text),
        }
    }

    let text = extractor.finish();
    if text.is_empty() {
        // Nothing captured anywhere: strip all tags wholesale.
        strip_tags(html)
    } else {
        text
    }
}

/// Extract the first `<title>` content; empty string when absent.
pub fn extract_title(html: &str) -> String {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    let re = TITLE_RE
        .get_or_init(|| Regex::new(r"(?is)<title>(.*?)</title>").expect("hardcoded regex"));

    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_whitespace(m.as_str()))
        .unwrap_or_default()
}

/// Strip every tag and collapse whitespace; the last-resort degrade path.
fn strip_tags(html: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("hardcoded regex"));
    normalize_whitespace(&re.replace_all(html, " "))
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tag-nesting state machine that accumulates text fragments.
struct TextExtractor {
    /// Currently-open elements, innermost last
    stack: Vec<(String, Vec<(String, String)>)>,

    /// Stack depth at which the capture region began, if one is active
    capture_depth: Option<usize>,

    /// Collected fragments; "\n" entries are paragraph-break markers
    buffer: Vec<String>,
}

impl TextExtractor {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            capture_depth: None,
            buffer: Vec::new(),
        }
    }

    fn handle_open(&mut self, tag: String, attrs: Vec<(String, String)>) {
        let opens_capture = self.capture_depth.is_none()
            && (tag == "article"
                || tag == "main"
                || (tag == "div" && attr_value(&attrs, "id") == Some("content")));

        self.stack.push((tag, attrs));

        if opens_capture {
            self.capture_depth = Some(self.stack.len());
        }

        if self.capture_depth.is_some() {
            if let Some((tag, _)) = self.stack.last() {
                if BLOCK_BREAK_TAGS.contains(&tag.as_str()) {
                    self.buffer.push("\n".to_string());
                }
            }
        }
    }

    fn handle_close(&mut self, tag: &str) {
        // Pop whatever is on top; unmatched closes must not wedge the scan.
        self.stack.pop();

        if let Some(depth) = self.capture_depth {
            if self.stack.len() < depth {
                // The capturing ancestor has closed; a later container may
                // re-open capture.
                self.capture_depth = None;
            }
        }

        if BLOCK_BREAK_TAGS.contains(&tag) || tag == "tr" {
            self.buffer.push("\n".to_string());
        }
    }

    fn handle_text(&mut self, data: &str) {
        let text = data.trim();
        if text.is_empty() {
            return;
        }

        if self.capture_depth.is_none() {
            // Body-level fallback for documents without a recognizable
            // content container.
            if self.stack.iter().any(|(tag, _)| tag == "body") {
                self.buffer.push(text.to_string());
            }
            return;
        }

        // Inside the capture region, keep text only when the nearest
        // non-inline enclosing tag bears leaf text.
        let enclosing = self
            .stack
            .iter()
            .rev()
            .find(|(tag, _)| !INLINE_TAGS.contains(&tag.as_str()));
        if let Some((tag, _)) = enclosing {
            if LEAF_TEXT_TAGS.contains(&tag.as_str()) {
                self.buffer.push(text.to_string());
            }
        }
    }

    fn finish(self) -> String {
        static WS_BEFORE_BREAK_RE: OnceLock<Regex> = OnceLock::new();
        static MULTI_BREAK_RE: OnceLock<Regex> = OnceLock::new();
        let ws_before_break =
            WS_BEFORE_BREAK_RE.get_or_init(|| Regex::new(r"\s+\n").expect("hardcoded regex"));
        let multi_break =
            MULTI_BREAK_RE.get_or_init(|| Regex::new(r"\n{3,}").expect("hardcoded regex"));

        let joined = self.buffer.join(" ");
        let collapsed = ws_before_break.replace_all(&joined, "\n");
        let collapsed = multi_break.replace_all(&collapsed, "\n\n");
        collapsed.trim().to_string()
    }
}

fn attr_value<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    // Last occurrence wins, matching attribute-map semantics.
    attrs
        .iter()
        .rev()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

enum Token {
    Open {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Close(String),
    Text(String),
}

/// Streaming HTML tokenizer.
///
/// Comments, doctypes and processing instructions are skipped; `<script>` and
/// `<style>` bodies are swallowed without emitting text; `<... />` emits an
/// open immediately followed by a close; a stray `<` that does not begin a
/// tag is passed through as text. Character references in text and attribute
/// values are decoded.
struct Tokenizer<'s> {
    html: &'s str,
    pos: usize,
    pending: VecDeque<Token>,
}

impl<'s> Tokenizer<'s> {
    fn new(html: &'s str) -> Self {
        Self {
            html,
            pos: 0,
            pending: VecDeque::new(),
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }

        loop {
            let rest = &self.html[self.pos..];
            if rest.is_empty() {
                return None;
            }

            if !rest.starts_with('<') {
                let end = rest.find('<').unwrap_or(rest.len());
                self.pos += end;
                return Some(Token::Text(decode_entities(&rest[..end])));
            }

            if rest.starts_with("<!--") {
                match rest[4..].find("-->") {
                    Some(i) => self.pos += 4 + i + 3,
                    None => self.pos = self.html.len(),
                }
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                match rest.find('>') {
                    Some(i) => self.pos += i + 1,
                    None => self.pos = self.html.len(),
                }
                continue;
            }

            if rest.starts_with("</") {
                let name: String = rest[2..]
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect();
                match rest.find('>') {
                    Some(i) => self.pos += i + 1,
                    None => self.pos = self.html.len(),
                }
                if name.is_empty() {
                    continue;
                }
                return Some(Token::Close(name.to_ascii_lowercase()));
            }

            if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                return Some(self.read_open_tag());
            }

            // '<' not starting a tag: emit it literally.
            self.pos += 1;
            return Some(Token::Text("<".to_string()));
        }
    }

    /// Parse an open tag starting at `self.pos` (which points at '<').
    fn read_open_tag(&mut self) -> Token {
        let bytes = self.html.as_bytes();
        let n = bytes.len();
        let mut i = self.pos + 1;

        let name_start = i;
        while i < n && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        let tag = self.html[name_start..i].to_ascii_lowercase();

        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            while i < n && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= n {
                break;
            }
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    if i + 1 < n && bytes[i + 1] == b'>' {
                        self_closing = true;
                        i += 2;
                        break;
                    }
                    i += 1;
                }
                _ => {
                    let attr_start = i;
                    while i < n
                        && !bytes[i].is_ascii_whitespace()
                        && !matches!(bytes[i], b'=' | b'>' | b'/')
                    {
                        i += 1;
                    }
                    let name = self.html[attr_start..i].to_ascii_lowercase();

                    while i < n && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    let mut value = String::new();
                    if i < n && bytes[i] == b'=' {
                        i += 1;
                        while i < n && bytes[i].is_ascii_whitespace() {
                            i += 1;
                        }
                        if i < n && (bytes[i] == b'"' || bytes[i] == b'\'') {
                            let quote = bytes[i];
                            i += 1;
                            let value_start = i;
                            while i < n && bytes[i] != quote {
                                i += 1;
                            }
                            value = decode_entities(&self.html[value_start..i]);
                            if i < n {
                                i += 1;
                            }
                        } else {
                            let value_start = i;
                            while i < n && bytes[i] != b'>' && !bytes[i].is_ascii_whitespace() {
                                i += 1;
                            }
                            value = decode_entities(&self.html[value_start..i]);
                        }
                    }
                    if !name.is_empty() {
                        attrs.push((name, value));
                    }
                }
            }
        }
        self.pos = i;

        // Raw-text elements: swallow the body so script/style source never
        // leaks into the body-level fallback.
        if !self_closing && (tag == "script" || tag == "style") {
            let close_pattern = format!("</{tag}");
            match find_case_insensitive(self.html, &close_pattern, self.pos) {
                Some(idx) => self.pos = idx,
                None => self.pos = self.html.len(),
            }
        }

        if self_closing {
            self.pending.push_back(Token::Close(tag.clone()));
        }
        Token::Open { tag, attrs }
    }
}

/// Find an ASCII-case-insensitive needle in `haystack` starting at `from`.
fn find_case_insensitive(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let haystack_bytes = haystack.as_bytes();
    let needle_bytes = needle.as_bytes();
    if needle_bytes.is_empty() || from >= haystack_bytes.len() {
        return None;
    }
    let last_start = haystack_bytes.len().checked_sub(needle_bytes.len())?;
    for i in from..=last_start {
        if haystack_bytes[i..i + needle_bytes.len()].eq_ignore_ascii_case(needle_bytes) {
            return Some(i);
        }
    }
    None
}

/// Decode common character references; unknown entities pass through.
fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let entity = tail[1..]
            .find(';')
            .filter(|&i| i <= 10)
            .and_then(|i| resolve_entity(&tail[1..1 + i]).map(|decoded| (decoded, 1 + i + 1)));
        match entity {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_entity(body: &str) -> Option<String> {
    let named = match body {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some("\u{a0}"),
        _ => None,
    };
    if let Some(s) = named {
        return Some(s.to_string());
    }

    let num = body.strip_prefix('#')?;
    let code = match num.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => num.parse::<u32>().ok()?,
    };
    char::from_u32(code).map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_headings_and_paragraphs() {
        let text =
            extract_text("<article><h2>Title</h2><p>Hello <b>world</b></p></article>");
        assert!(text.contains("Title"));
        assert!(text.contains("Hello world"));
        assert!(!text.contains('<'));
        assert!(!text.contains('>'));

        // Title and body separated by at least one line break
        let title_pos = text.find("Title").unwrap();
        let hello_pos = text.find("Hello").unwrap();
        assert!(text[title_pos..hello_pos].contains('\n'));
    }

    #[test]
    fn main_element_opens_capture() {
        let text = extract_text("<main><p>From main</p></main>");
        assert_eq!(text, "From main");
    }

    #[test]
    fn div_id_content_opens_capture() {
        let html = r#"<div id="content"><p>In content</p></div>
            <div id="sidebar"><p>Sidebar</p></div>"#;
        let text = extract_text(html);
        assert!(text.contains("In content"));
        // No body element here, so the sidebar text has nowhere to fall back
        // to once capture has closed.
        assert!(!text.contains("Sidebar"));
    }

    #[test]
    fn body_text_outside_capture_flows_through_fallback() {
        let html = "<body><article><p>Main</p></article><p>Footer note</p></body>";
        let text = extract_text(html);
        assert!(text.contains("Main"));
        assert!(text.contains("Footer note"));
    }

    #[test]
    fn body_fallback_without_semantic_container() {
        let text = extract_text("<html><body><p>Only text</p></body></html>");
        assert_eq!(text, "Only text");
    }

    #[test]
    fn generic_wrappers_inside_capture_are_discarded() {
        let html = "<article><div>nav junk</div><p>Real content</p></article>";
        let text = extract_text(html);
        assert!(text.contains("Real content"));
        assert!(!text.contains("nav junk"));
    }

    #[test]
    fn text_between_sibling_containers_is_not_collected() {
        let html = "<article><p>First</p></article> stray <article><p>Second</p></article>";
        let text = extract_text(html);
        assert!(text.contains("First"));
        assert!(text.contains("Second"));
        assert!(!text.contains("stray"));
    }

    #[test]
    fn table_cells_collected_with_row_breaks() {
        let html = "<article><table><tr><th>Key</th><td>Value</td></tr>\
                    <tr><td>Second</td></tr></table></article>";
        let text = extract_text(html);
        assert!(text.contains("Key Value"));
        assert!(text.contains("Second"));
        let first_row_end = text.find("Value").unwrap() + "Value".len();
        assert!(text[first_row_end..].contains('\n'));
    }

    #[test]
    fn script_and_style_bodies_are_excluded() {
        let html = "<article><p>A</p><script>var x = 1;</script>\
                    <style>p { color: red }</style><p>B</p></article>";
        let text = extract_text(html);
        assert!(text.contains('A'));
        assert!(text.contains('B'));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn script_in_body_fallback_is_excluded() {
        let html = "<body><script>var hidden = true;</script><p>Visible</p></body>";
        let text = extract_text(html);
        assert_eq!(text, "Visible");
    }

    #[test]
    fn entities_are_decoded() {
        let text = extract_text("<article><p>a &amp; b &lt;c&gt; &#8212; d</p></article>");
        assert_eq!(text, "a & b <c> \u{2014} d");
    }

    #[test]
    fn self_closing_tags_do_not_unbalance_the_stack() {
        let html = "<article><p>Before<br/>After</p><p>Next</p></article>";
        let text = extract_text(html);
        assert!(text.contains("Before"));
        assert!(text.contains("After"));
        assert!(text.contains("Next"));
    }

    #[test]
    fn full_strip_fallback_when_nothing_is_captured() {
        let text = extract_text("<div>Hello <span>world</span></div>");
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(extract_text(""), "");
    }

    #[test]
    fn never_panics_on_malformed_input() {
        let nasty = [
            "<",
            "<<<<",
            "</",
            "<p",
            "<p foo",
            "<p foo=",
            "<p foo=\"unterminated",
            "<article><p>truncated",
            "</closed></never></opened>",
            "<!-- unterminated comment",
            "<script>never closed",
            "<a href='mixed\">&#xZZ; &#999999999;",
            "text < 5 and > 3",
            "<article>\u{0}\u{fffd}<p>\u{202e}bidi</p>",
        ];
        for input in nasty {
            let _ = extract_text(input);
            let _ = extract_title(input);
        }
    }

    #[test]
    fn never_panics_on_pseudo_random_bytes() {
        // Cheap LCG; enough to shake out index arithmetic without a fuzzer.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..50 {
            let mut bytes = Vec::with_capacity(512);
            for _ in 0..512 {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                bytes.push((state >> 33) as u8);
            }
            let input = String::from_utf8_lossy(&bytes);
            let _ = extract_text(&input);
            let _ = extract_title(&input);
        }
    }

    #[test]
    fn title_is_extracted_and_normalized() {
        let html = "<html><head><TITLE>\n  Manual   Page \n Title </TITLE></head></html>";
        assert_eq!(extract_title(html), "Manual Page Title");
    }

    #[test]
    fn title_missing_gives_empty() {
        assert_eq!(extract_title("<html><head></head></html>"), "");
    }

    #[test]
    fn title_takes_first_occurrence() {
        let html = "<title>First</title><title>Second</title>";
        assert_eq!(extract_title(html), "First");
    }
}
