use alloc::{string::String, vec::Vec};

use super::html_entities::decode_html_entity;

const ENTITY_MAX_BYTES: usize = 10;
const FLAG_IN_SCRIPT: u8 = 1 << 0;
const FLAG_IN_STYLE: u8 = 1 << 1;

const BLOCK_TAGS: [&str; 24] = [
    "p", "div", "section", "article", "aside", "header", "footer", "nav", "li", "ul", "ol", "h1",
    "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "table", "tr", "br", "hr", "title",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct TagInfo<'a> {
    local_name: &'a str,
    is_closing: bool,
    is_self_closing: bool,
}

/// Collects normalized text into paragraphs.
#[derive(Debug, Default)]
struct ParagraphWriter {
    current: String,
    pending_space: bool,
    done: Vec<String>,
}

impl ParagraphWriter {
    fn push(&mut self, ch: char) {
        if ch.is_whitespace() {
            self.space();
            return;
        }
        if self.pending_space && !self.current.is_empty() {
            self.current.push(' ');
        }
        self.pending_space = false;
        self.current.push(ch);
    }

    fn space(&mut self) {
        self.pending_space = true;
    }

    fn break_paragraph(&mut self) {
        if !self.current.is_empty() {
            self.done.push(core::mem::take(&mut self.current));
        }
        self.pending_space = false;
    }

    fn finish(mut self) -> Vec<String> {
        self.break_paragraph();
        self.done
    }
}

/// Split raw text into whitespace-normalized paragraphs.
///
/// Markup tags are removed, `<script>`/`<style>` bodies dropped and entities
/// decoded. Block-level tags and blank lines start a new paragraph.
pub(super) fn paragraphs(raw: &str) -> Vec<String> {
    let mut out = ParagraphWriter::default();
    let mut flags = 0u8;
    let mut newlines = 0usize;
    let mut cursor = 0usize;

    while let Some(ch) = raw[cursor..].chars().next() {
        let rest = &raw[cursor..];

        if ch == '<'
            && let Some(tag_len) = tag_length(rest)
        {
            if let Some(info) = parse_tag(&rest[1..tag_len - 1]) {
                apply_tag_state(info, &mut flags);
                if BLOCK_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(info.local_name)) {
                    out.break_paragraph();
                } else {
                    out.space();
                }
            }
            cursor += tag_len;
            continue;
        }

        cursor += ch.len_utf8();
        if flags & (FLAG_IN_SCRIPT | FLAG_IN_STYLE) != 0 {
            continue;
        }

        if ch == '&'
            && let Some((decoded, len)) = entity_at(rest)
        {
            newlines = 0;
            out.push(decoded);
            cursor += len - 1;
            continue;
        }

        if ch == '\n' {
            newlines += 1;
            if newlines >= 2 {
                out.break_paragraph();
            } else {
                out.space();
            }
        } else if ch.is_whitespace() {
            out.space();
        } else if !ch.is_control() {
            newlines = 0;
            out.push(ch);
        }
    }

    out.finish()
}

/// Byte length of the tag at the start of `rest`, `<` and `>` included.
/// A `<` that does not open a tag is plain text.
fn tag_length(rest: &str) -> Option<usize> {
    let opener = rest[1..].chars().next()?;
    if !(opener.is_ascii_alphabetic() || matches!(opener, '/' | '!' | '?')) {
        return None;
    }

    if rest.starts_with("<!--") {
        return rest.find("-->").map(|end| end + 3);
    }
    rest.find('>').map(|end| end + 1)
}

fn parse_tag(tag: &str) -> Option<TagInfo<'_>> {
    let tag = tag.trim();
    if tag.is_empty() || tag.starts_with(['!', '?']) {
        return None;
    }

    let (is_closing, rest) = match tag.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, tag),
    };
    let is_self_closing = rest.ends_with('/');
    let name_end = rest
        .find(|ch: char| ch.is_whitespace() || ch == '/')
        .unwrap_or(rest.len());
    if name_end == 0 {
        return None;
    }

    let name = &rest[..name_end];
    let local_name = name.rsplit(':').next().unwrap_or(name);
    Some(TagInfo {
        local_name,
        is_closing,
        is_self_closing,
    })
}

fn apply_tag_state(info: TagInfo<'_>, flags: &mut u8) {
    let flag = if info.local_name.eq_ignore_ascii_case("script") {
        FLAG_IN_SCRIPT
    } else if info.local_name.eq_ignore_ascii_case("style") {
        FLAG_IN_STYLE
    } else {
        return;
    };

    if info.is_closing || info.is_self_closing {
        *flags &= !flag;
    } else {
        *flags |= flag;
    }
}

/// Decoded char and byte length of the entity at the start of `rest`.
fn entity_at(rest: &str) -> Option<(char, usize)> {
    let body_end = rest[1..]
        .char_indices()
        .take(ENTITY_MAX_BYTES + 1)
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '#'))
        .filter(|(_, ch)| *ch == ';')
        .map(|(idx, _)| idx + 1)?;

    let decoded = decode_html_entity(&rest[1..body_end])?;
    Some((decoded, body_end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_paragraphs_split_on_blank_lines() {
        let text = "First line\ncontinues here.\n\n\nSecond   paragraph.";
        assert_eq!(
            paragraphs(text),
            vec!["First line continues here.", "Second paragraph."]
        );
    }

    #[test]
    fn block_tags_break_and_inline_tags_do_not() {
        let html = "<html><body><p>Hello <b>big</b> world.</p><div>Next</div></body></html>";
        assert_eq!(paragraphs(html), vec!["Hello big world.", "Next"]);
    }

    #[test]
    fn script_style_and_comments_are_dropped() {
        let html = "<style>p { color: red; }</style><p>Kept<!-- not > this --> text</p>\
                    <script>if (a < b) { x(); }</script>";
        assert_eq!(paragraphs(html), vec!["Kept text"]);
    }

    #[test]
    fn entities_are_decoded() {
        let html = "<p>Fish &amp; chips&nbsp;for&#160;two &unknown; &#x41;</p>";
        assert_eq!(paragraphs(html), vec!["Fish & chips for two &unknown; A"]);
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        assert_eq!(paragraphs("a < b and c > d"), vec!["a < b and c > d"]);
    }
}
