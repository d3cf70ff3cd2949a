//! Configuration options for parsing and encoding.
//!
//! - [`XdlOptions`]: grammar selection, pretty-printing and nesting limit
//! - [`Syntax`]: the XDL or strict JSON grammar
//!
//! ## Examples
//!
//! ```rust
//! use serde_xdl::{encode_with_options, Var, XdlOptions};
//!
//! let v = Var::tagged("A").with("x", 1);
//!
//! let compact = encode_with_options(&v, &XdlOptions::new()).unwrap();
//! assert_eq!(compact, "A{x=1}");
//!
//! let json = encode_with_options(&v, &XdlOptions::json()).unwrap();
//! assert_eq!(json, "{\"x\":1}");
//!
//! let pretty = encode_with_options(&v, &XdlOptions::pretty()).unwrap();
//! assert_eq!(pretty, "A{\n  x = 1\n}");
//! ```

/// Grammar used by the tokenizer, parser and encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Syntax {
    /// Relaxed notation: comments, bare keys, type tags, `Y`/`N`, `NUL`.
    #[default]
    Xdl,
    /// Strict JSON subset.
    Json,
}

impl Syntax {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Syntax::Xdl => "XDL",
            Syntax::Json => "JSON",
        }
    }
}

/// Default nesting limit shared by the parser and the encoder.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration for parsing and encoding.
///
/// # Examples
///
/// ```rust
/// use serde_xdl::{Syntax, XdlOptions};
///
/// let options = XdlOptions::new()
///     .with_syntax(Syntax::Json)
///     .with_indent(4)
///     .with_pretty(true)
///     .with_max_depth(64);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug)]
pub struct XdlOptions {
    pub syntax: Syntax,
    pub pretty: bool,
    pub indent: usize,
    pub max_depth: usize,
}

impl Default for XdlOptions {
    fn default() -> Self {
        XdlOptions {
            syntax: Syntax::default(),
            pretty: false,
            indent: 2,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl XdlOptions {
    /// Compact XDL with the default nesting limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compact strict JSON.
    #[must_use]
    pub fn json() -> Self {
        XdlOptions {
            syntax: Syntax::Json,
            ..Default::default()
        }
    }

    /// Pretty-printed XDL with newlines and 2-space indentation.
    #[must_use]
    pub fn pretty() -> Self {
        XdlOptions {
            pretty: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Only affects pretty-printed output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the maximum container nesting accepted by the parser and encoder.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
