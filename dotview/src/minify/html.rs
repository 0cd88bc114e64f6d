//! Markup minifier
//!
//! Comments are dropped and whitespace touching a tag boundary is removed.
//! Whitespace inside a text node is left alone unless it spans a line break
//! or tab, in which case it becomes a single space. Processing instructions
//! (compiled `<?= ... ?>` output) are copied as-is and do not count as tag
//! boundaries, so `Hello <?= $name ?>` keeps its space. The content of
//! `pre`, `textarea`, `script` and `style` elements is never touched.

/// Elements whose content is copied verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];

enum Segment<'a> {
    Tag(String),
    Opaque(&'a str),
    Text(String),
}

fn is_tag_start(tail: &str) -> bool {
    let mut chars = tail.chars().skip(1);
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '!' => true,
        Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

/// Index just past the `>` closing the tag at the start of `tail`
fn tag_end(tail: &str) -> usize {
    let mut quote: Option<u8> = None;
    for (i, b) in tail.bytes().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => (),
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return i + 1,
                _ => (),
            },
        }
    }
    tail.len()
}

/// Collapses whitespace inside a tag, leaving quoted attribute values alone
fn collapse_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut quote: Option<char> = None;
    let mut space = false;
    for c in tag.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_ascii_whitespace() {
            space = true;
            continue;
        }
        if space && c != '>' {
            out.push(' ');
        }
        space = false;
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        out.push(c);
    }
    out
}

/// Name of the raw-text element this opening tag starts, if any
fn raw_text_element(tag: &str) -> Option<&'static str> {
    if tag.ends_with("/>") {
        return None;
    }
    let name: String = tag[1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    RAW_TEXT_ELEMENTS.iter().copied().find(|element| *element == name)
}

/// Collapses whitespace runs that contain a line break or tab
fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            run.push(c);
            continue;
        }
        flush_run(&mut run, &mut out);
        out.push(c);
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut String, out: &mut String) {
    if run.is_empty() {
        return;
    }
    if run.chars().all(|c| c == ' ') {
        out.push_str(run);
    } else {
        out.push(' ');
    }
    run.clear();
}

fn flush_text(text: &mut String, segments: &mut Vec<Segment<'_>>) {
    if !text.is_empty() {
        segments.push(Segment::Text(std::mem::take(text)));
    }
}

fn scan(src: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = src;
    while let Some(pos) = rest.find('<') {
        text.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
        } else if tail.starts_with("<?") {
            let end = tail.find("?>").map_or(tail.len(), |end| end + 2);
            flush_text(&mut text, &mut segments);
            segments.push(Segment::Opaque(&tail[..end]));
            rest = &tail[end..];
        } else if is_tag_start(tail) {
            let end = tag_end(tail);
            let tag = &tail[..end];
            flush_text(&mut text, &mut segments);
            segments.push(Segment::Tag(collapse_tag(tag)));
            rest = &tail[end..];
            if let Some(element) = raw_text_element(tag) {
                let close = rest
                    .to_ascii_lowercase()
                    .find(&format!("</{element}"))
                    .unwrap_or(rest.len());
                if close > 0 {
                    segments.push(Segment::Opaque(&rest[..close]));
                }
                rest = &rest[close..];
            }
        } else {
            text.push('<');
            rest = &tail[1..];
        }
    }
    text.push_str(rest);
    flush_text(&mut text, &mut segments);
    segments
}

/// Minifies markup
pub fn minify_html(src: &str) -> String {
    let segments = scan(src);
    let mut out = String::with_capacity(src.len());
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Tag(tag) => out.push_str(tag),
            Segment::Opaque(raw) => out.push_str(raw),
            Segment::Text(text) => {
                let mut text = text.as_str();
                if i == 0 || matches!(segments[i - 1], Segment::Tag(_)) {
                    text = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
                }
                if matches!(segments.get(i + 1), None | Some(Segment::Tag(_))) {
                    text = text.trim_end_matches(|c: char| c.is_ascii_whitespace());
                }
                out.push_str(&normalize_text(text));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_inter_tag_whitespace() {
        assert_eq!(
            minify_html("<div>  Test  </div> <!-- comment --> <p>  Text  </p>"),
            "<div>Test</div><p>Text</p>"
        );
    }

    #[test]
    fn keeps_intra_text_spacing() {
        assert_eq!(minify_html("<p>Hello  big world</p>"), "<p>Hello  big world</p>");
    }

    #[test]
    fn line_breaks_in_text_become_spaces() {
        assert_eq!(minify_html("<p>Hello\n\t  world</p>"), "<p>Hello world</p>");
    }

    #[test]
    fn collapses_tag_whitespace() {
        assert_eq!(
            minify_html("<a\n   href=\"/x\"\n   title=\"two  spaces\" >link</a>"),
            "<a href=\"/x\" title=\"two  spaces\">link</a>"
        );
    }

    #[test]
    fn instructions_are_not_boundaries() {
        assert_eq!(
            minify_html("<p>\n  Hello <?= $name ?>!\n</p>"),
            "<p>Hello <?= $name ?>!</p>"
        );
    }

    #[test]
    fn raw_text_elements_are_verbatim() {
        let src = "<pre>  a\n   b </pre>\n<script>if (a < b) { x(); }</script>";
        assert_eq!(
            minify_html(src),
            "<pre>  a\n   b </pre><script>if (a < b) { x(); }</script>"
        );
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        assert_eq!(minify_html("<p>1 < 2</p>"), "<p>1 < 2</p>");
    }

    #[test]
    fn doctype_is_a_tag() {
        assert_eq!(
            minify_html("<!DOCTYPE html>\n<html>\n</html>\n"),
            "<!DOCTYPE html><html></html>"
        );
    }

    #[test]
    fn unterminated_comment_drops_the_rest() {
        assert_eq!(minify_html("<b>x</b><!-- open"), "<b>x</b>");
    }

    #[test]
    fn idempotent_on_sample() {
        let once = minify_html("<ul>\n  <li> a  b </li>\n  <li>\tc</li>\n</ul>");
        assert_eq!(minify_html(&once), once);
    }
}
