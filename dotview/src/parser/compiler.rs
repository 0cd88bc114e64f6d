//! Template compilation
//!
//! Compiles directive templates into host-evaluator instructions. It handles:
//! - Variable interpolation
//! - Translation calls
//! - Conditionals
//! - Block resolution through the [`BlockRegistry`]
//!
//! # Compilation Process
//!
//! 1. Optionally strip embedded server code with the escape filter
//! 2. Scan the template into expressions and classify each one
//! 3. Build a directive tree, tracking open scopes on a stack
//! 4. Emit instructions, rendering blocks bottom-up
//!
//! | directive | emitted |
//! |---|---|
//! | `{{ var: $x }}` | `<?= $x ?>` |
//! | `{{_ "Hello" }}` | `<?= translate("Hello") ?>` |
//! | `{{ if $c }}` | `<? if ($c): ?>` |
//! | `{{ else }}` | `<? else: ?>` |
//! | `{{ /if }}` | `<? endif; ?>` |
//!
//! # Examples
//!
//! ```rust
//! use dotview::parser::compiler::Compiler;
//! use dotview::{BlockRegistry, Context, Options};
//!
//! let options = Options::default();
//! let blocks = BlockRegistry::new();
//! let compiler = Compiler::new(&options, &blocks);
//!
//! let code = compiler
//!     .compile("{{ if $user }}Hi {{ var: $user }}{{ /if }}", &Context::new(), true)
//!     .unwrap();
//! assert_eq!(code, "<? if ($user): ?>Hi <?= $user ?><? endif; ?>");
//! ```

use tracing::debug;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::escape::EscapeFilter;
use crate::options::Options;
use crate::parser::{
    block::Block,
    directive::Directive,
    expression::{Expression, ExpressionType},
};
use crate::registry::BlockRegistry;

/// A node of the directive tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    /// Literal text, copied as-is
    Text(&'a str),
    /// `var:` interpolation
    Var(&'a str),
    /// Translation of a quoted literal
    Translate(&'a str),
    /// Conditional with an optional `else` branch
    If {
        condition: &'a str,
        then: Vec<Node<'a>>,
        otherwise: Option<Vec<Node<'a>>>,
    },
    /// A block span and its children
    Block {
        block: Block<'a>,
        children: Vec<Node<'a>>,
    },
}

/// What opened a scope
enum Opened<'a> {
    Root,
    If {
        condition: &'a str,
        then: Option<Vec<Node<'a>>>,
    },
    Block {
        name: &'a str,
        attributes: &'a str,
    },
}

/// A scope in the template
struct Scope<'a> {
    /// The directive that opened this scope
    opened: Opened<'a>,
    /// The opening directive as written
    raw: &'a str,
    /// Nodes collected so far
    nodes: Vec<Node<'a>>,
}

impl<'a> Scope<'a> {
    fn new(opened: Opened<'a>, raw: &'a str) -> Self {
        Self {
            opened,
            raw,
            nodes: Vec::new(),
        }
    }
}

/// Which directives a parse acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every directive
    Full,
    /// Block directives only. Everything else, `\{{` escapes included,
    /// is left as written for a later full compile
    Blocks,
}

/// Tree builder state
struct Build<'a> {
    /// Stack of open scopes, the root at the bottom
    open_stack: Vec<Scope<'a>>,
}

impl<'a> Build<'a> {
    fn new() -> Self {
        Self {
            open_stack: vec![Scope::new(Opened::Root, "")],
        }
    }

    fn push(&mut self, node: Node<'a>) {
        if let Some(scope) = self.open_stack.last_mut() {
            scope.nodes.push(node);
        }
    }

    fn text(&mut self, text: &'a str) {
        if !text.is_empty() {
            self.push(Node::Text(text));
        }
    }

    fn open(&mut self, opened: Opened<'a>, expression: &Expression<'a>) {
        self.open_stack.push(Scope::new(opened, expression.raw));
    }

    /// Handles an else directive
    fn handle_else(&mut self, expression: &Expression<'a>) -> Result<()> {
        match self.open_stack.last_mut() {
            Some(Scope {
                opened: Opened::If { then, .. },
                nodes,
                ..
            }) if then.is_none() => {
                *then = Some(std::mem::take(nodes));
                Ok(())
            }
            _ => Err(Error::malformed("else not expected here", expression.raw)),
        }
    }

    /// Closes the innermost scope, which must be an if
    fn close_if(&mut self, expression: &Expression<'a>) -> Result<()> {
        let Some(Scope {
            opened: Opened::If { condition, then },
            nodes,
            ..
        }) = self.open_stack.pop()
        else {
            return Err(Error::malformed("/if not expected here", expression.raw));
        };
        let node = match then {
            Some(then) => Node::If {
                condition,
                then,
                otherwise: Some(nodes),
            },
            None => Node::If {
                condition,
                then: nodes,
                otherwise: None,
            },
        };
        self.push(node);
        Ok(())
    }

    /// Closes the innermost scope, which must be a block of the same name
    fn close_block(&mut self, name: &str, expression: &Expression<'a>) -> Result<()> {
        match self.open_stack.pop() {
            Some(Scope {
                opened: Opened::Block { name: open, attributes },
                raw,
                nodes,
            }) if open == name => {
                self.push(Node::Block {
                    block: Block {
                        name: open,
                        attributes,
                        open: raw,
                        close: expression.raw,
                    },
                    children: nodes,
                });
                Ok(())
            }
            Some(Scope {
                opened: Opened::Block { name: open, .. },
                ..
            }) => Err(Error::malformed(
                format!("expected /block:{open}, found /block:{name}"),
                expression.raw,
            )),
            _ => Err(Error::malformed("block close not expected here", expression.raw)),
        }
    }

    /// Handles one scanned expression
    fn handle(&mut self, expression: &Expression<'a>, mode: Mode) -> Result<()> {
        self.text(expression.prefix);
        if expression.expression_type == ExpressionType::Escaped {
            self.text(match mode {
                Mode::Full => expression.content,
                Mode::Blocks => expression.raw,
            });
            return Ok(());
        }
        let directive = match mode {
            Mode::Full => Directive::parse(expression)?,
            Mode::Blocks => Directive::parse_blocks(expression)?,
        };
        match directive {
            Directive::Var(var) => self.push(Node::Var(var)),
            Directive::Translate(literal) => self.push(Node::Translate(literal)),
            Directive::If(condition) => self.open(Opened::If { condition, then: None }, expression),
            Directive::Else => self.handle_else(expression)?,
            Directive::EndIf => self.close_if(expression)?,
            Directive::Open { name, attributes } => {
                self.open(Opened::Block { name, attributes }, expression)
            }
            Directive::Close(name) => self.close_block(name, expression)?,
            Directive::Unknown => self.text(expression.raw),
        }
        Ok(())
    }

    /// Returns the root nodes, failing if any scope is left open
    fn finish(mut self) -> Result<Vec<Node<'a>>> {
        let scope = self.open_stack.pop();
        match scope {
            Some(Scope {
                opened: Opened::Root,
                nodes,
                ..
            }) => Ok(nodes),
            Some(Scope {
                opened: Opened::If { .. },
                raw,
                ..
            }) => Err(Error::malformed("unclosed if", raw)),
            Some(Scope {
                opened: Opened::Block { name, .. },
                raw,
                ..
            }) => Err(Error::malformed(format!("unclosed block:{name}"), raw)),
            None => Err(Error::malformed("mismatched directive", "")),
        }
    }
}

/// Builds the directive tree of `src`
pub fn parse(src: &str, mode: Mode) -> Result<Vec<Node<'_>>> {
    let mut build = Build::new();
    let mut rest = src;
    let mut expression = Expression::from(src)?;
    while let Some(expr) = expression {
        rest = expr.postfix;
        build.handle(&expr, mode)?;
        expression = expr.next()?;
    }
    build.text(rest);
    build.finish()
}

/// Template compiler
pub struct Compiler<'a> {
    /// Compiler options
    options: &'a Options,
    /// Registered block handlers
    blocks: &'a BlockRegistry,
}

impl<'a> Compiler<'a> {
    /// Creates a new compiler
    pub fn new(options: &'a Options, blocks: &'a BlockRegistry) -> Self {
        Self { options, blocks }
    }

    /// Compiles every directive in a template
    ///
    /// With `escape` set, embedded server code is removed first so it can
    /// never reach the output.
    pub fn compile(&self, src: &str, context: &Context, escape: bool) -> Result<String> {
        let src = if escape {
            EscapeFilter::shared().sanitize(src)
        } else {
            src.into()
        };
        let nodes = parse(&src, Mode::Full)?;
        debug!(len = src.len(), nodes = nodes.len(), "compiling template");
        let mut code = String::with_capacity(src.len());
        self.emit(&nodes, context, &mut code)?;
        Ok(code)
    }

    /// Resolves block directives only, leaving everything else as written
    pub fn resolve_blocks(&self, src: &str, context: &Context) -> Result<String> {
        let nodes = parse(src, Mode::Blocks)?;
        debug!(len = src.len(), nodes = nodes.len(), "resolving blocks");
        let mut code = String::with_capacity(src.len());
        self.emit(&nodes, context, &mut code)?;
        Ok(code)
    }

    /// Writes instructions for `nodes`
    fn emit(&self, nodes: &[Node<'_>], context: &Context, code: &mut String) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => code.push_str(text),
                Node::Var(var) => {
                    code.push_str("<?= ");
                    code.push_str(var);
                    code.push_str(" ?>");
                }
                Node::Translate(literal) => {
                    code.push_str("<?= ");
                    code.push_str(&self.options.translator);
                    code.push('(');
                    code.push_str(literal);
                    code.push_str(") ?>");
                }
                Node::If {
                    condition,
                    then,
                    otherwise,
                } => {
                    code.push_str("<? if (");
                    code.push_str(condition);
                    code.push_str("): ?>");
                    self.emit(then, context, code)?;
                    if let Some(otherwise) = otherwise {
                        code.push_str("<? else: ?>");
                        self.emit(otherwise, context, code)?;
                    }
                    code.push_str("<? endif; ?>");
                }
                Node::Block { block, children } => {
                    let mut inner = String::new();
                    self.emit(children, context, &mut inner)?;
                    code.push_str(&block.render(
                        &inner,
                        self.blocks,
                        context,
                        self.options.unknown_blocks,
                    )?);
                }
            }
        }
        Ok(())
    }
}
