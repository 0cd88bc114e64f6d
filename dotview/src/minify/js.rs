//! Script minifier
//!
//! A single forward scan. String, template and regular-expression literals
//! are copied unchanged, so comment markers inside them are never seen as
//! comments. Whitespace survives only where removing it would join two
//! words, turn `+ +` into `++`, or lose a line break that automatic
//! semicolon insertion depends on.

/// Characters after which a `/` starts a regular expression
const REGEX_PREFIX: &str = "(,=:[!&|?{};+-*%<>~^";

/// Keywords after which a `/` starts a regular expression
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "void", "throw", "new", "delete",
    "instanceof", "yield", "await",
];

/// Characters after which a `{` opens an object literal, or `function`
/// starts a function expression (`=>` ends in `>`)
const EXPRESSION_PREFIX: &str = "(,=:[!&|?+-*%<>~^";

/// Keywords after which a `{` or `function` is an expression
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "in", "of", "void", "throw", "new", "delete", "instanceof",
    "yield", "await",
];

/// Keywords whose parenthesised head may be followed by an empty `;` body
const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "with"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Gap {
    Space,
    Newline,
}

/// What a `(` opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paren {
    /// Parameters of a function expression, whose body ends an expression
    Function,
    /// Head of `if`, `for`, `while` or `with`
    Control,
    Other,
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

/// Splits `out` into the text before its trailing word and the word itself
fn last_word(out: &str) -> (&str, &str) {
    let trimmed = out.trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word(*c))
        .last()
        .map_or(trimmed.len(), |(i, _)| i);
    (&trimmed[..start], &trimmed[start..])
}

fn regex_allowed(out: &str) -> bool {
    let (before, word) = last_word(out);
    if !word.is_empty() {
        return REGEX_KEYWORDS.contains(&word);
    }
    before.chars().last().is_none_or(|c| REGEX_PREFIX.contains(c))
}

/// Whether a value is expected after `out`
fn expression_position(out: &str) -> bool {
    let (before, word) = last_word(out);
    if !word.is_empty() {
        return EXPRESSION_KEYWORDS.contains(&word);
    }
    before.chars().last().is_some_and(|c| EXPRESSION_PREFIX.contains(c))
}

/// Classifies a `(` about to be appended to `out`
fn paren_kind(out: &str) -> Paren {
    let (before, word) = last_word(out);
    if CONTROL_KEYWORDS.contains(&word) {
        return Paren::Control;
    }
    // `function (` or `function name (`
    let function = if word == "function" {
        Some(before)
    } else {
        let (outer, keyword) = last_word(before);
        (!word.is_empty() && keyword == "function").then_some(outer)
    };
    match function {
        Some(before) if expression_position(before) => Paren::Function,
        _ => Paren::Other,
    }
}

/// `closed_expression` tells whether a trailing `}` closed an object
/// literal or a function expression body rather than a statement block
fn ends_statement(out: &str, prev: char, closed_expression: bool) -> bool {
    is_word(prev)
        || is_quote(prev)
        || matches!(prev, ')' | ']' | '/')
        || (prev == '}' && closed_expression)
        || out.ends_with("++")
        || out.ends_with("--")
}

fn starts_statement(next: char, after: Option<char>) -> bool {
    is_word(next) || is_quote(next) || (matches!(next, '+' | '-') && after == Some(next))
}

/// The whitespace to keep between `out` and the upcoming `next` character
fn separator(
    out: &str,
    gap: Gap,
    next: char,
    after: Option<char>,
    closed_expression: bool,
) -> Option<char> {
    let prev = out.chars().last()?;
    if is_word(prev) && is_word(next) {
        return Some(if gap == Gap::Newline { '\n' } else { ' ' });
    }
    if matches!(prev, '+' | '-') && next == prev {
        return Some(' ');
    }
    if gap == Gap::Newline
        && ends_statement(out, prev, closed_expression)
        && starts_statement(next, after)
    {
        return Some('\n');
    }
    None
}

/// Copies a quoted literal starting at `start`, returning the index after it
fn copy_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    out.push(quote);
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        if c == '\\' {
            if let Some(&escaped) = chars.get(i) {
                out.push(escaped);
                i += 1;
            }
        } else if c == quote {
            break;
        }
    }
    i
}

/// Copies a regular-expression literal starting at `start`
fn copy_regex(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('/');
    let mut i = start + 1;
    let mut class = false;
    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            break;
        }
        out.push(c);
        i += 1;
        match c {
            '\\' => {
                if let Some(&escaped) = chars.get(i).filter(|c| **c != '\n') {
                    out.push(escaped);
                    i += 1;
                }
            }
            '[' => class = true,
            ']' => class = false,
            '/' if !class => break,
            _ => (),
        }
    }
    i
}

/// Index of the line break ending a `//` comment (or the end of input)
fn skip_line_comment(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| *c == '\n')
        .map_or(chars.len(), |pos| start + pos)
}

/// Index after a `/* */` comment and whether it spanned a line break
fn skip_block_comment(chars: &[char], start: usize) -> (usize, bool) {
    let mut i = start + 2;
    let mut newline = false;
    while i < chars.len() {
        if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
            return (i + 2, newline);
        }
        newline |= chars[i] == '\n';
        i += 1;
    }
    (chars.len(), newline)
}

/// Minifies a script
pub fn minify_js(src: &str) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut gap: Option<Gap> = None;
    // true for braces that opened an expression
    let mut braces: Vec<bool> = Vec::new();
    let mut parens: Vec<Paren> = Vec::new();
    let mut last_paren = Paren::Other;
    let mut closed_expression = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        if c == '/' && next == Some('/') {
            gap = gap.max(Some(Gap::Space));
            i = skip_line_comment(&chars, i);
            continue;
        }
        if c == '/' && next == Some('*') {
            let (end, newline) = skip_block_comment(&chars, i);
            gap = gap.max(Some(if newline { Gap::Newline } else { Gap::Space }));
            i = end;
            continue;
        }
        if c.is_whitespace() {
            let kind = if c == '\n' || c == '\r' { Gap::Newline } else { Gap::Space };
            gap = gap.max(Some(kind));
            i += 1;
            continue;
        }
        if let Some(kind) = gap.take() {
            if let Some(sep) = separator(&out, kind, c, next, closed_expression) {
                out.push(sep);
            }
        }
        match c {
            _ if is_quote(c) => {
                i = copy_string(&chars, i, &mut out);
                continue;
            }
            '/' if regex_allowed(&out) => {
                i = copy_regex(&chars, i, &mut out);
                continue;
            }
            '(' => parens.push(paren_kind(&out)),
            ')' => last_paren = parens.pop().unwrap_or(Paren::Other),
            '{' => {
                let expression = if out.trim_end().ends_with(')') {
                    last_paren == Paren::Function
                } else {
                    expression_position(&out)
                };
                braces.push(expression);
            }
            '}' => {
                // `while (x);` keeps the `;` that is its whole body
                while out.ends_with(';') {
                    let empty_body =
                        last_paren == Paren::Control && out[..out.len() - 1].ends_with(')');
                    if empty_body {
                        break;
                    }
                    out.pop();
                }
                closed_expression = braces.pop().unwrap_or(false);
            }
            _ => (),
        }
        out.push(c);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_whitespace() {
        assert_eq!(
            minify_js("function test() {  return 1;  } // comment \n var x = 2;"),
            "function test(){return 1}var x=2;"
        );
    }

    #[test]
    fn comment_markers_inside_strings() {
        assert_eq!(
            minify_js("var url = \"http://example.com\"; // real\nvar c = '/* not */';"),
            "var url=\"http://example.com\";var c='/* not */';"
        );
    }

    #[test]
    fn escaped_quotes_in_strings() {
        assert_eq!(
            minify_js(r#"say("a \" // b") ;"#),
            r#"say("a \" // b");"#
        );
    }

    #[test]
    fn template_literals_are_verbatim() {
        assert_eq!(
            minify_js("const t = `a  // b\n  c`;"),
            "const t=`a  // b\n  c`;"
        );
    }

    #[test]
    fn regex_literals_are_verbatim() {
        assert_eq!(
            minify_js("var re = /\\/\\/ [a/b]  x/g;\nreturn re;"),
            "var re=/\\/\\/ [a/b]  x/g;return re;"
        );
    }

    #[test]
    fn division_is_not_a_regex() {
        assert_eq!(minify_js("var x = (a) / 2 / b;"), "var x=(a)/2/b;");
    }

    #[test]
    fn keeps_plus_plus_apart() {
        assert_eq!(minify_js("a = b + +c - -d;"), "a=b+ +c- -d;");
    }

    #[test]
    fn keeps_line_breaks_for_asi() {
        assert_eq!(
            minify_js("let a = 1\nlet b = foo()\nb++\nreturn"),
            "let a=1\nlet b=foo()\nb++\nreturn"
        );
    }

    #[test]
    fn drops_semicolon_before_close() {
        assert_eq!(minify_js("if (a) { b = 1; }"), "if(a){b=1}");
        assert_eq!(minify_js("while (x) { step(); }"), "while(x){step()}");
        assert_eq!(minify_js("for (;;) { a(); }"), "for(;;){a()}");
    }

    #[test]
    fn keeps_empty_loop_body() {
        assert_eq!(minify_js("if (a) { while (b()); }"), "if(a){while(b());}");
        assert_eq!(minify_js("function f() { for (;;); }"), "function f(){for(;;);}");
    }

    #[test]
    fn keeps_line_break_after_expression_braces() {
        assert_eq!(
            minify_js("var f = function () {}\nvar x = 1"),
            "var f=function(){}\nvar x=1"
        );
        assert_eq!(minify_js("const o = { a: 1 }\nlet b = 2"), "const o={a:1}\nlet b=2");
        assert_eq!(
            minify_js("let g = (a) => {\n  return a\n}\ng(1)"),
            "let g=(a)=>{return a}\ng(1)"
        );
        assert_eq!(
            minify_js("x = function named(a) { return a }\ny = 2"),
            "x=function named(a){return a}\ny=2"
        );
    }

    #[test]
    fn drops_line_break_after_statement_braces() {
        assert_eq!(
            minify_js("function f() {\n  go()\n}\nf()"),
            "function f(){go()}f()"
        );
        assert_eq!(minify_js("if (a) {\n  b()\n}\nc()"), "if(a){b()}c()");
        assert_eq!(minify_js("if (a) { b() } else {\n c()\n}\nd()"), "if(a){b()}else{c()}d()");
    }

    #[test]
    fn block_comment_with_newline_counts_as_line_break() {
        assert_eq!(minify_js("a = 1 /*\n*/ b = 2"), "a=1\nb=2");
    }
}
