//! Markdown → ratatui `Text` renderer for tutor answers.
//!
//! Converts `pulldown_cmark` events into styled `Line`/`Span` values.
//! Covers headings, emphasis, inline code, fenced code blocks (syntect
//! highlighted), lists and blockquotes. TeX math is not typeset: `$...$`
//! stays inline in a math style, and `$$...$$` is framed as a formula block
//! the same way code blocks are. Links show their text only.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";

fn math_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::ITALIC)
}

fn border_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Parse markdown into owned, styled `Text`.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let opts = Options::ENABLE_MATH;

    let mut w = Writer::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        w.handle(event);
    }
    w.text
}

struct Writer {
    text: Text<'static>,
    base_fg: Color,
    /// Inline style stack; entries are patched onto their parent.
    styles: Vec<Style>,
    /// Per-line prefix spans (blockquote and code block borders).
    line_prefixes: Vec<Span<'static>>,
    /// None = bullet list, Some(n) = ordered list at n.
    list_indices: Vec<Option<u64>>,
    highlighter: Option<HighlightLines<'static>>,
    in_plain_code: bool,
    /// The last line is a block border; inline text must start a new line.
    line_closed: bool,
    needs_newline: bool,
}

impl Writer {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: vec![],
            line_prefixes: vec![],
            list_indices: vec![],
            highlighter: None,
            in_plain_code: false,
            line_closed: false,
            needs_newline: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn push_line(&mut self, line: Line<'static>) {
        let mut out = line;
        for pfx in self.line_prefixes.iter().rev().cloned() {
            out.spans.insert(0, pfx);
        }
        self.text.lines.push(out);
        self.line_closed = false;
    }

    fn push_span(&mut self, span: Span<'static>) {
        if !self.line_closed
            && let Some(line) = self.text.lines.last_mut()
        {
            line.push_span(span);
        } else {
            self.push_line(Line::from(vec![span]));
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => {
                let style = Style::default().fg(Color::White).bg(Color::DarkGray);
                self.push_span(Span::styled(c.to_string(), style));
            }
            Event::InlineMath(m) => self.push_span(Span::styled(m.to_string(), math_style())),
            Event::DisplayMath(m) => self.display_math(m),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.push_line(Line::default()),
            Event::Rule => {
                self.blank_line_if_needed();
                self.push_line(Line::from(Span::styled("─".repeat(40), border_style())));
                self.needs_newline = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let hs = heading_style(self.base_fg, level);
                self.push_line(Line::from(Span::styled(
                    format!("{} ", "#".repeat(level as usize)),
                    hs,
                )));
                self.push_style(hs);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes.push(Span::styled("│ ", border_style()));
                self.push_style(
                    Style::default()
                        .fg(self.base_fg)
                        .add_modifier(Modifier::DIM | Modifier::ITALIC),
                );
            }
            Tag::CodeBlock(kind) => {
                if !self.text.lines.is_empty() {
                    self.push_line(Line::default());
                }
                let lang = match &kind {
                    CodeBlockKind::Fenced(l) => l.as_ref(),
                    CodeBlockKind::Indented => "",
                };
                let top = if lang.is_empty() {
                    Line::from(Span::styled("╭──", border_style()))
                } else {
                    Line::from(vec![
                        Span::styled("╭── ", border_style()),
                        Span::styled(lang.to_owned(), border_style().add_modifier(Modifier::BOLD)),
                        Span::styled(" ──", border_style()),
                    ])
                };
                self.push_line(top);
                self.line_prefixes.push(Span::styled("│ ", border_style()));

                if !lang.is_empty()
                    && let Some(syn) = SYNTAX_SET.find_syntax_by_token(lang)
                    && let Some(theme) = THEME_SET.themes.get(CODE_THEME)
                {
                    self.highlighter = Some(HighlightLines::new(syn, theme));
                }
                if self.highlighter.is_none() {
                    self.in_plain_code = true;
                }
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.push_line(Line::default());
                let indent = "  ".repeat(self.list_indices.len().saturating_sub(1));
                if let Some(idx) = self.list_indices.last_mut() {
                    let marker = match idx {
                        None => format!("{indent}• "),
                        Some(n) => {
                            let s = format!("{indent}{n}. ");
                            *n += 1;
                            s
                        }
                    };
                    self.push_span(Span::styled(marker, border_style()));
                }
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Link { .. } => self.push_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_newline = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.highlighter = None;
                self.in_plain_code = false;
                self.line_prefixes.pop();
                self.push_line(Line::from(Span::styled("╰──", border_style())));
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Link => self.pop_style(),
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");

        if let Some(mut hl) = self.highlighter.take() {
            for line in LinesWithEndings::from(text.as_str()) {
                let Ok(ranges) = hl.highlight_line(line, &SYNTAX_SET) else {
                    continue;
                };
                let spans: Vec<Span<'static>> = ranges
                    .into_iter()
                    .filter_map(|(hl_style, frag)| {
                        let content = frag.trim_end_matches('\n');
                        if content.is_empty() {
                            return None;
                        }
                        let fg = Color::Rgb(
                            hl_style.foreground.r,
                            hl_style.foreground.g,
                            hl_style.foreground.b,
                        );
                        Some(Span::styled(content.to_owned(), Style::default().fg(fg)))
                    })
                    .collect();
                if !spans.is_empty() {
                    self.push_line(Line::from(spans));
                }
            }
            self.highlighter = Some(hl);
            return;
        }

        if self.in_plain_code {
            for line in text.lines() {
                self.push_line(Line::from(Span::styled(
                    line.to_owned(),
                    Style::default().fg(Color::White),
                )));
            }
            return;
        }

        let style = self.style();
        self.push_span(Span::styled(text, style));
    }

    /// Display math is framed like a code block, one row per source line.
    fn display_math(&mut self, math: CowStr<'_>) {
        // A paragraph holding only the formula opens with an empty line.
        if self.text.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.text.lines.pop();
        }
        self.push_line(Line::from(vec![
            Span::styled("╭── ", border_style()),
            Span::styled("formula", border_style().add_modifier(Modifier::BOLD)),
            Span::styled(" ──", border_style()),
        ]));
        self.line_prefixes.push(Span::styled("│ ", border_style()));
        for line in math.trim().lines() {
            self.push_line(Line::from(Span::styled(line.trim().to_owned(), math_style())));
        }
        self.line_prefixes.pop();
        self.push_line(Line::from(Span::styled("╰──", border_style())));
        self.line_closed = true;
    }
}

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    let style = Style::default().fg(base_fg);
    match level {
        HeadingLevel::H1 => style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => style.add_modifier(Modifier::BOLD),
        _ => style.add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_lines(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_text_inherits_heading_style() {
        let text = render("## Pythagoras", Color::Blue);
        let line = &text.lines[0];
        assert!(line.spans.len() >= 2, "expected >= 2 spans, got {:?}", line);
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.spans[1].style.fg, Some(Color::Blue));
    }

    #[test]
    fn bold_text_is_bold() {
        let text = render("I have received **\"notes.pdf\"**", Color::Blue);
        let bold = text.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "\"notes.pdf\"")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn emphasis_is_italic() {
        let text = render("question\n\n*[Attached Image: graph.png]*", Color::Green);
        let italic: String = text
            .lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .filter(|s| s.style.add_modifier.contains(Modifier::ITALIC))
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(italic, "[Attached Image: graph.png]");
    }

    #[test]
    fn inline_math_is_kept_verbatim_and_styled() {
        let text = render("Area is $\\pi r^2$ here", Color::Blue);
        let span = text.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "\\pi r^2")
            .unwrap();
        assert_eq!(span.style, math_style());
    }

    #[test]
    fn display_math_is_framed() {
        let text = render("Solve:\n\n$$x^2 + 1 = 0$$\n\nDone.", Color::Blue);
        let lines = plain_lines(&text);
        let top = lines.iter().position(|l| l == "╭── formula ──").unwrap();
        assert_eq!(lines[top + 1], "│ x^2 + 1 = 0");
        assert_eq!(lines[top + 2], "╰──");
        assert_eq!(lines.last().unwrap(), "Done.");
        // One separator line, none from the formula's own paragraph.
        assert_eq!(lines[top - 1], "", "{lines:?}");
        assert_eq!(lines[top - 2], "Solve:", "{lines:?}");
    }

    #[test]
    fn text_after_display_math_starts_new_line() {
        let lines = plain_lines(&render("$$a = b$$ so we are done", Color::Blue));
        assert_eq!(lines.last().unwrap().trim(), "so we are done", "{lines:?}");
        assert!(lines.iter().any(|l| l == "╰──"));
    }

    #[test]
    fn multi_line_display_math_keeps_rows() {
        let lines = plain_lines(&render("$$\na + b\n= c\n$$", Color::Blue));
        assert!(lines.contains(&"│ a + b".to_string()), "{lines:?}");
        assert!(lines.contains(&"│ = c".to_string()), "{lines:?}");
    }

    #[test]
    fn links_show_text_only() {
        let text = render("See [the notes](https://example.com/notes)", Color::Blue);
        let lines = plain_lines(&text);
        assert_eq!(lines[0], "See the notes");
        let link = text.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "the notes")
            .unwrap();
        assert!(link.style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn ordered_list_numbers_increment() {
        let text = render("1. factor\n2. solve\n3. check", Color::Blue);
        let lines = plain_lines(&text);
        assert!(lines.iter().any(|l| l.starts_with("1. factor")));
        assert!(lines.iter().any(|l| l.starts_with("2. solve")));
        assert!(lines.iter().any(|l| l.starts_with("3. check")));
    }

    #[test]
    fn code_block_has_border_structure() {
        let lines = plain_lines(&render("```\nline1\nline2\n```", Color::Blue));
        assert!(lines[0].starts_with('╭'), "{:?}", lines[0]);
        assert!(lines[1].starts_with("│ ") && lines[1].contains("line1"));
        assert!(lines[2].starts_with("│ ") && lines[2].contains("line2"));
        assert!(lines.last().unwrap().starts_with('╰'));
    }

    #[test]
    fn highlighted_code_block_keeps_text() {
        let lines = plain_lines(&render("```python\nx = 1\n```", Color::Blue));
        assert!(lines.iter().any(|l| l.contains("x = 1")), "{lines:?}");
    }

    #[test]
    fn plain_text_uses_base_color() {
        let text = render("hello", Color::Green);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn tabs_expanded_to_spaces() {
        let text = render("```\n\tindented\n```", Color::Blue);
        let all: String = plain_lines(&text).concat();
        assert!(all.contains("    indented"));
        assert!(!all.contains('\t'));
    }
}
