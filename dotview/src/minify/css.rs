//! Stylesheet minifier

use std::iter::Peekable;

/// Characters that never need whitespace around them
const TIGHT: &[char] = &['{', '}', ':', ';', ',', '>'];

type Chars<'a> = Peekable<std::str::Chars<'a>>;

fn copy_string(first: char, chars: &mut Chars<'_>, out: &mut String) {
    out.push(first);
    let mut escaped = false;
    for c in chars.by_ref() {
        out.push(c);
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == first {
            return;
        }
    }
}

fn skip_comment(chars: &mut Chars<'_>) {
    let mut star = false;
    for c in chars.by_ref() {
        if star && c == '/' {
            return;
        }
        star = c == '*';
    }
}

/// Minifies a stylesheet
///
/// Comments go, whitespace next to `{ } : ; , >` goes, any other whitespace
/// run becomes one space (so `red !important` keeps its space) and the last
/// `;` of a declaration block is dropped. Strings are copied unchanged.
pub fn minify_css(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut space = false;
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            skip_comment(&mut chars);
            space = true;
            continue;
        }
        if c.is_ascii_whitespace() {
            space = true;
            continue;
        }
        if space {
            let after_tight = out.chars().last().is_some_and(|last| TIGHT.contains(&last));
            if !out.is_empty() && !after_tight && !TIGHT.contains(&c) {
                out.push(' ');
            }
            space = false;
        }
        match c {
            '"' | '\'' => copy_string(c, &mut chars, &mut out),
            '}' => {
                while out.ends_with(';') {
                    out.pop();
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_whitespace() {
        assert_eq!(
            minify_css("body {  color:  red;  } /* comment */ div { margin: 10px; }"),
            "body{color:red}div{margin:10px}"
        );
    }

    #[test]
    fn keeps_space_before_important() {
        assert_eq!(
            minify_css("p {\n  color: red !important;\n}"),
            "p{color:red !important}"
        );
    }

    #[test]
    fn keeps_value_spacing() {
        assert_eq!(
            minify_css(".a, .b > .c { margin: 0 auto; font: 12px / 1.5 sans-serif }"),
            ".a,.b>.c{margin:0 auto;font:12px / 1.5 sans-serif}"
        );
    }

    #[test]
    fn strings_are_verbatim() {
        assert_eq!(
            minify_css("a::after { content: \"  ;  } /* x */\"; }"),
            "a::after{content:\"  ;  } /* x */\"}"
        );
    }

    #[test]
    fn escaped_quotes_and_comments_share_the_scanner() {
        assert_eq!(
            minify_css("a { content: '\\' }' /* x */ } b { c: d }"),
            "a{content:'\\' }'}b{c:d}"
        );
    }

    #[test]
    fn media_queries() {
        assert_eq!(
            minify_css("@media (max-width: 600px) {\n  .nav { display: none; }\n}\n"),
            "@media (max-width:600px){.nav{display:none}}"
        );
    }

    #[test]
    fn empty_declarations_before_close() {
        assert_eq!(minify_css("a { b: c;; }"), "a{b:c}");
    }

    #[test]
    fn unterminated_comment() {
        assert_eq!(minify_css("a{b:c} /* open"), "a{b:c}");
    }
}
