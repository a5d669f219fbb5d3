//! Glyphs and colors for test states

use crate::stats::TestState;
use owo_colors::{OwoColorize, Style};

/// Glyph for a passing test unless the theme says otherwise
pub const DEFAULT_OK_GLYPH: &str = "✓";

/// A color category. The theme decides what each one looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorKind {
    /// Passing tests
    Green,
    /// Skipped tests
    Pending,
    /// Failing tests
    Fail,
}

/// The color category of a state. Unset tests have none.
pub fn color_for(state: TestState) -> Option<ColorKind> {
    match state {
        TestState::Pass => Some(ColorKind::Green),
        TestState::Pending => Some(ColorKind::Pending),
        TestState::Fail => Some(ColorKind::Fail),
        TestState::Unset => None,
    }
}

/// How glyphs and colors look
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Glyph for passing tests
    pub ok_glyph: String,
    /// Emit ANSI color codes
    pub colors: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::plain()
    }
}

impl Theme {
    /// Colored output with the default glyphs
    pub fn colored() -> Self {
        Self {
            ok_glyph: DEFAULT_OK_GLYPH.to_string(),
            colors: true,
        }
    }

    /// Uncolored output with the default glyphs
    pub fn plain() -> Self {
        Self {
            ok_glyph: DEFAULT_OK_GLYPH.to_string(),
            colors: false,
        }
    }

    fn style(kind: ColorKind) -> Style {
        match kind {
            ColorKind::Green => Style::new().green(),
            ColorKind::Pending => Style::new().cyan(),
            ColorKind::Fail => Style::new().red(),
        }
    }

    /// Paint `text` in a color category. No category, or a theme without colors, leaves the
    /// text as is.
    pub fn paint<T: AsRef<str>>(&self, kind: Option<ColorKind>, text: T) -> String {
        let text = text.as_ref();
        match kind {
            Some(kind) if self.colors => text.style(Self::style(kind)).to_string(),
            _ => text.to_string(),
        }
    }
}

/// Resolves the glyph shown in front of a test.
///
/// Failing tests are numbered rather than given a glyph, so [`Symbols::symbol_for`] is *not* a
/// pure lookup: every call with [`TestState::Fail`] consumes the next number. Call it exactly
/// once per printed test line.
#[derive(Debug, Clone)]
pub struct Symbols {
    ok_glyph: String,
    errors: usize,
}

impl Symbols {
    /// Create a resolver using the theme's glyphs
    pub fn new(theme: &Theme) -> Self {
        Self {
            ok_glyph: theme.ok_glyph.clone(),
            errors: 0,
        }
    }

    /// The glyph for a state. Failures yield `"1)"`, `"2)"`, ... and bump the error count.
    pub fn symbol_for(&mut self, state: TestState) -> String {
        match state {
            TestState::Pass => self.ok_glyph.clone(),
            TestState::Pending => String::from("-"),
            TestState::Fail => {
                self.errors += 1;
                format!("{})", self.errors)
            }
            TestState::Unset => String::from("?"),
        }
    }

    /// Number of failure glyphs handed out since the last reset
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Start numbering failures from 1 again
    pub fn reset_errors(&mut self) {
        self.errors = 0;
    }
}
