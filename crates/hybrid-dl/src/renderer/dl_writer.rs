// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Line-based writer for dL text with indentation.

use std::fmt::Write;

/// Tracks indentation and line starts.
/// In inline mode everything lands on one line.
pub struct DlWriter<W: Write> {
    out: W,
    indent: usize,
    at_line_start: bool,
    inline: bool,
}

impl<W: Write> DlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            indent: 0,
            at_line_start: true,
            inline: false,
        }
    }

    pub fn new_inline(out: W) -> Self {
        Self {
            out,
            indent: 0,
            at_line_start: true,
            inline: true,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.inline
    }

    /// Write a string, indenting at line starts.
    /// In inline mode, newlines become single spaces.
    pub fn write(&mut self, s: &str) {
        for c in s.chars() {
            if c == '\n' {
                if self.inline {
                    let _ = self.out.write_char(' ');
                    self.at_line_start = false;
                } else {
                    let _ = self.out.write_char('\n');
                    self.at_line_start = true;
                }
            } else {
                if self.at_line_start && !self.inline {
                    for _ in 0..self.indent {
                        let _ = self.out.write_str("  ");
                    }
                }
                self.at_line_start = false;
                let _ = self.out.write_char(c);
            }
        }
    }

    pub fn line(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.write("\n");
    }

    /// Increase indentation, optionally starting a new line first.
    pub fn indent(&mut self, newline: bool) {
        if newline {
            self.newline();
        }
        if !self.inline {
            self.indent += 1;
        }
    }

    /// Decrease indentation, optionally starting a new line afterwards.
    pub fn dedent(&mut self, newline: bool) {
        if !self.inline && self.indent > 0 {
            self.indent -= 1;
        }
        if newline {
            self.newline();
        }
    }

    /// Write items separated by `separator`, each with `render`
    pub fn sep_with<I, T, F>(&mut self, separator: &str, items: I, mut render: F)
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Self, T),
    {
        let mut first = true;
        for item in items {
            if !first {
                self.write(separator);
            }
            first = false;
            render(self, item);
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render to a string using multi-line mode.
pub fn render_to_string<F>(f: F) -> String
where
    F: FnOnce(&mut DlWriter<String>),
{
    let mut writer = DlWriter::new(String::new());
    f(&mut writer);
    writer.into_inner()
}

/// Render to a single-line string.
pub fn render_to_string_inline<F>(f: F) -> String
where
    F: FnOnce(&mut DlWriter<String>),
{
    let mut writer = DlWriter::new_inline(String::new());
    f(&mut writer);
    writer.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_and_inline() {
        let render = |w: &mut DlWriter<String>| {
            w.write("{");
            w.indent(true);
            w.line("x := 1;");
            w.write("y := *;");
            w.dedent(true);
            w.write("}");
        };
        assert_eq!(render_to_string(render), "{\n  x := 1;\n  y := *;\n}");
        assert_eq!(render_to_string_inline(render), "{ x := 1; y := *; }");
    }

    #[test]
    fn test_separators() {
        let text = render_to_string(|w| w.sep_with(", ", ["Real x", "Real xder"], |w, item| w.write(item)));
        assert_eq!(text, "Real x, Real xder");
    }
}
