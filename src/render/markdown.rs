//! Markdown to terminal lines.
//!
//! Walks the `pulldown-cmark` event stream and produces one `String` per
//! output line, optionally carrying ANSI styling.  Lines are not wrapped; the
//! terminal does that.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{ANSI_BOLD, ANSI_CYAN, ANSI_DIM, ANSI_ITALIC, ANSI_RESET, ANSI_UNDERLINE, ANSI_YELLOW};

const ANSI_STRIKE: &str = "\x1b[9m";

/// Renders `content` as markdown into display lines.
///
/// With `use_color` off, structure is kept with plain-text markers: `#` for
/// headings, backticks for inline code, `>` for quotes.
pub fn render_markdown(content: &str, use_color: bool) -> Vec<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(content, options);

    let mut builder = LineBuilder::new(use_color);
    for event in parser {
        builder.handle(event);
    }
    builder.finish()
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct CodeBlock {
    language: Option<String>,
    text: String,
}

struct LineBuilder {
    use_color: bool,
    lines: Vec<String>,
    current: String,
    styles: Vec<&'static str>,
    lists: Vec<ListKind>,
    quote_depth: usize,
    code_block: Option<CodeBlock>,
    links: Vec<String>,
    pending_marker: Option<String>,
}

impl LineBuilder {
    fn new(use_color: bool) -> Self {
        Self {
            use_color,
            lines: Vec::new(),
            current: String::new(),
            styles: Vec::new(),
            lists: Vec::new(),
            quote_depth: 0,
            code_block: None,
            links: Vec::new(),
            pending_marker: None,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(block) = self.code_block.as_mut() {
                    block.text.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => {
                if self.use_color {
                    self.push_styled(&code, ANSI_YELLOW);
                } else {
                    self.push_text(&format!("`{code}`"));
                }
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => self.push_text(&math),
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                let rule = "\u{2500}".repeat(40);
                let line = if self.use_color {
                    format!("{ANSI_DIM}{rule}{ANSI_RESET}")
                } else {
                    rule
                };
                self.lines.push(line);
                self.blank_line();
            }
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(name) => self.push_text(&format!("[^{name}]")),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.flush_line();
                if self.use_color {
                    self.styles.push(ANSI_BOLD);
                    if level == HeadingLevel::H1 {
                        self.styles.push(ANSI_UNDERLINE);
                    }
                } else {
                    let hashes = "#".repeat(heading_depth(level));
                    self.push_text(&format!("{hashes} "));
                }
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
                if self.use_color {
                    self.styles.push(ANSI_ITALIC);
                }
            }
            Tag::CodeBlock(kind) => {
                self.flush_line();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string)
                        .filter(|lang| !lang.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                self.code_block = Some(CodeBlock {
                    language,
                    text: String::new(),
                });
            }
            Tag::List(start) => {
                self.flush_line();
                self.lists.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => {
                self.flush_line();
                let marker = match self.lists.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "\u{2022} ".to_string(),
                };
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                self.pending_marker = Some(format!("{indent}{marker}"));
            }
            Tag::Emphasis => self.push_style(ANSI_ITALIC),
            Tag::Strong => self.push_style(ANSI_BOLD),
            Tag::Strikethrough => self.push_style(ANSI_STRIKE),
            Tag::Link { dest_url, .. } => {
                self.push_style(ANSI_UNDERLINE);
                self.links.push(dest_url.to_string());
            }
            Tag::Image { dest_url, .. } => {
                self.push_text("[image: ");
                self.links.push(dest_url.to_string());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Heading(level) => {
                if self.use_color {
                    self.styles.pop();
                    if level == HeadingLevel::H1 {
                        self.styles.pop();
                    }
                }
                self.flush_line();
                self.blank_line();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                if self.use_color {
                    self.styles.pop();
                }
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                if let Some(block) = self.code_block.take() {
                    self.emit_code_block(block);
                }
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => {
                if let Some(marker) = self.pending_marker.take() {
                    self.lines.push(marker.trim_end().to_string());
                }
                self.flush_line();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.links.pop() {
                    self.push_link_target(&url);
                }
            }
            TagEnd::Image => {
                if let Some(url) = self.links.pop() {
                    self.push_text(&format!("] ({url})"));
                }
            }
            _ => {}
        }
    }

    fn push_style(&mut self, style: &'static str) {
        if self.use_color {
            self.styles.push(style);
        }
    }

    fn pop_style(&mut self) {
        if self.use_color {
            self.styles.pop();
        }
    }

    fn push_link_target(&mut self, url: &str) {
        if url.is_empty() || self.current.ends_with(url) {
            return;
        }
        if self.use_color {
            self.push_styled(&format!(" ({url})"), ANSI_DIM);
        } else {
            self.push_text(&format!(" ({url})"));
        }
    }

    /// Starts the line with quote bars and any list marker.
    fn begin_line(&mut self) {
        if !self.current.is_empty() {
            return;
        }
        for _ in 0..self.quote_depth {
            if self.use_color {
                self.current
                    .push_str(&format!("{ANSI_DIM}\u{2502}{ANSI_RESET} "));
            } else {
                self.current.push_str("> ");
            }
        }
        if let Some(marker) = self.pending_marker.take() {
            self.current.push_str(&marker);
        } else if !self.lists.is_empty() {
            self.current.push_str(&"  ".repeat(self.lists.len()));
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.begin_line();
        if self.use_color && !self.styles.is_empty() {
            let styles: String = self.styles.concat();
            self.current
                .push_str(&format!("{styles}{text}{ANSI_RESET}"));
        } else {
            self.current.push_str(text);
        }
    }

    fn push_styled(&mut self, text: &str, style: &'static str) {
        self.begin_line();
        let styles: String = self.styles.concat();
        self.current
            .push_str(&format!("{styles}{style}{text}{ANSI_RESET}"));
    }

    fn emit_code_block(&mut self, block: CodeBlock) {
        let label = block.language.as_deref().unwrap_or("code");
        let header = if self.use_color {
            format!("{ANSI_DIM}\u{250c}\u{2500} {label}{ANSI_RESET}")
        } else {
            format!("```{}", block.language.as_deref().unwrap_or(""))
        };
        self.push_raw_line(header);
        let text = block.text.strip_suffix('\n').unwrap_or(&block.text);
        for line in text.split('\n') {
            let line = if self.use_color {
                format!(
                    "{ANSI_DIM}\u{2502}{ANSI_RESET} {ANSI_CYAN}{line}{ANSI_RESET}"
                )
            } else {
                line.to_string()
            };
            self.push_raw_line(line);
        }
        let footer = if self.use_color {
            format!("{ANSI_DIM}\u{2514}\u{2500}{ANSI_RESET}")
        } else {
            "```".to_string()
        };
        self.push_raw_line(footer);
    }

    /// Pushes a complete line that only receives quote and list decoration.
    fn push_raw_line(&mut self, line: String) {
        self.begin_line();
        self.current.push_str(&line);
        self.lines.push(std::mem::take(&mut self.current));
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush_line();
        while self.lines.last().is_some_and(|line| line.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(content: &str) -> Vec<String> {
        render_markdown(content, false)
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        assert_eq!(
            plain("First line\ncontinues.\n\nSecond."),
            vec!["First line continues.", "", "Second."]
        );
    }

    #[test]
    fn headings_keep_their_level() {
        assert_eq!(plain("## Title\n\nBody"), vec!["## Title", "", "Body"]);
    }

    #[test]
    fn inline_code_and_emphasis() {
        assert_eq!(
            plain("Use `cargo` *now* and **always**."),
            vec!["Use `cargo` now and always."]
        );
    }

    #[test]
    fn fenced_code_block_keeps_lines_and_language() {
        let source = "Before\n\n```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\nAfter";
        let lines = plain(source);
        assert_eq!(
            lines,
            vec![
                "Before",
                "",
                "```rust",
                "fn main() {",
                "    println!(\"hi\");",
                "}",
                "```",
                "",
                "After",
            ]
        );
    }

    #[test]
    fn bullet_and_numbered_lists() {
        assert_eq!(
            plain("- one\n- two\n\n3. three\n4. four"),
            vec!["\u{2022} one", "\u{2022} two", "", "3. three", "4. four"]
        );
    }

    #[test]
    fn nested_list_is_indented() {
        assert_eq!(
            plain("- outer\n  - inner"),
            vec!["\u{2022} outer", "  \u{2022} inner"]
        );
    }

    #[test]
    fn block_quote_gets_a_bar() {
        assert_eq!(plain("> quoted text"), vec!["> quoted text"]);
    }

    #[test]
    fn links_show_their_target() {
        assert_eq!(
            plain("See [docs](https://example.com/docs)."),
            vec!["See docs (https://example.com/docs)."]
        );
        assert_eq!(plain("<https://example.com>"), vec!["https://example.com"]);
    }

    #[test]
    fn rule_is_drawn() {
        let lines = plain("above\n\n---\n\nbelow");
        assert_eq!(lines[0], "above");
        assert!(lines[2].starts_with('\u{2500}'));
        assert_eq!(lines.last().unwrap(), "below");
    }

    #[test]
    fn color_mode_styles_headings_and_code() {
        let lines = render_markdown("# Big\n\n`x`", true);
        assert!(lines[0].contains(ANSI_BOLD));
        assert!(lines[0].contains("Big"));
        assert!(lines[2].contains(ANSI_YELLOW));
        assert!(lines.iter().all(|line| !line.contains('`')));
    }

    #[test]
    fn color_mode_labels_code_blocks() {
        let lines = render_markdown("```python\nprint(1)\n```", true);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("python"));
        assert!(lines[1].contains("print(1)"));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(plain("").is_empty());
    }
}
