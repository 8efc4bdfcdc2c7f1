//! Plain-text rendering of transcript turns for the terminal.
//!
//! Assistant content is markdown and is laid out as text: headings are
//! underlined, list items get bullets or numbers, code blocks are indented and
//! block quotes get a `│ ` gutter. User content is printed as typed.

use chatmeter_client::{Role, Turn, UsageReport};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

const RULE_WIDTH: usize = 24;

/// Render one transcript entry, including its usage line.
pub fn render_turn(turn: &Turn) -> String {
    match turn.role {
        Role::User => format!("you: {}", turn.content),
        Role::Assistant if turn.is_error => format!("error: {}", turn.content),
        Role::Assistant => {
            let mut out = render_markdown(&turn.content);
            if let Some(usage) = &turn.usage {
                out.push_str("\n\n");
                out.push_str(&usage_line(usage));
            }
            out
        }
    }
}

pub fn usage_line(usage: &UsageReport) -> String {
    format!(
        "Tokens: {} in / {} out • Cost: ${} (${} in / ${} out)",
        usage.input_tokens,
        usage.output_tokens,
        usage.total_cost,
        usage.input_cost,
        usage.output_cost
    )
}

pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = Renderer::default();
    for event in Parser::new_ext(source, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct Renderer {
    lines: Vec<String>,
    line: String,
    quote_depth: usize,
    /// Next number for ordered lists, `None` for bullets.
    lists: Vec<Option<u64>>,
    code: Option<String>,
    links: Vec<String>,
}

impl Renderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.code.as_mut() {
                Some(code) => code.push_str(&text),
                None => self.line.push_str(&text),
            },
            Event::Code(code) => {
                self.line.push('`');
                self.line.push_str(&code);
                self.line.push('`');
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.line.push_str(html.trim_end_matches('\n'));
            }
            Event::SoftBreak => self.line.push(' '),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                let rule = format!("{}{}", self.prefix(), "─".repeat(RULE_WIDTH));
                self.lines.push(rule);
                self.separate();
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } | Tag::Paragraph => self.flush(),
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.code = Some(String::new());
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.line.push_str(&marker);
            }
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.separate();
                }
            }
            TagEnd::Heading(level) => {
                let text = std::mem::take(&mut self.line);
                let width = text.chars().count();
                let prefix = self.prefix();
                self.lines.push(format!("{prefix}{text}"));
                match level {
                    HeadingLevel::H1 => self.lines.push(format!("{prefix}{}", "=".repeat(width))),
                    HeadingLevel::H2 => self.lines.push(format!("{prefix}{}", "-".repeat(width))),
                    _ => {}
                }
                self.separate();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                // Swap the inner gutter blank for one at the outer depth.
                if self.lines.last().is_some_and(|l| is_separator(l)) {
                    self.lines.pop();
                }
                if self.lists.is_empty() {
                    self.separate();
                }
            }
            TagEnd::CodeBlock => {
                let code = self.code.take().unwrap_or_default();
                let prefix = self.prefix();
                for line in code.lines() {
                    let rendered = format!("{prefix}    {line}");
                    self.lines.push(rendered.trim_end().to_string());
                }
                if self.lists.is_empty() {
                    self.separate();
                }
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.separate();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Link => {
                if let Some(dest) = self.links.pop()
                    && !dest.is_empty()
                {
                    self.line.push_str(&format!(" ({dest})"));
                }
            }
            _ => {}
        }
    }

    /// Gutter for quotes plus indentation for nested lists.
    fn prefix(&self) -> String {
        let mut prefix = "│ ".repeat(self.quote_depth);
        prefix.push_str(&"  ".repeat(self.lists.len().saturating_sub(1)));
        prefix
    }

    fn flush(&mut self) {
        if self.line.is_empty() {
            return;
        }
        let line = format!("{}{}", self.prefix(), std::mem::take(&mut self.line));
        self.lines.push(line.trim_end().to_string());
    }

    /// Blank line between blocks, never doubled.
    fn separate(&mut self) {
        let blank = "│ ".repeat(self.quote_depth).trim_end().to_string();
        match self.lines.last() {
            Some(last) if !is_separator(last) => self.lines.push(blank),
            _ => {}
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        while self.lines.last().is_some_and(|l| is_separator(l)) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }
}

fn is_separator(line: &str) -> bool {
    line.chars().all(|c| c == '│' || c == ' ')
}
