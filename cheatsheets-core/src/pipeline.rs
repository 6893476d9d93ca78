//! Content pipeline: turns a raw cheatsheet body into markdown a plain
//! renderer can display.
//!
//! Three stages run in a fixed order, each a total function over arbitrary text:
//!
//! 1. [`strip_frontmatter`] drops the leading `---` metadata block.
//! 2. [`strip_template_tags`] drops Liquid/kramdown syntax the site generator
//!    would normally consume.
//! 3. [`format_tables`] re-pads pipe tables.
//!
//! Later stages assume the earlier ones already ran (a front matter block
//! can contain `{{ }}` or `|`), so callers should go through [`clean`].
//! Malformed input never fails; the worst outcome is an unchanged block.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Liquid tags `{% .. %}` and output placeholders `{{ .. }}` anywhere on a
/// line, plus kramdown attribute lists `{: .. }` standing alone on their own
/// line (inline `{:?}` is far more likely to be a format string). Never
/// spans a line break.
static TEMPLATE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%.*?%\}|\{\{.*?\}\}|(?mR:^[ \t]*\{:[^}\r\n]*\}[ \t]*$)")
        .expect("template tag pattern is valid")
});

const MIN_COLUMN_WIDTH: usize = 3;

/// Run all stages in order.
pub fn clean(markdown: &str) -> String {
    let cleaned = format_tables(&strip_template_tags(&strip_frontmatter(markdown)));
    debug!(
        raw_len = markdown.len(),
        cleaned_len = cleaned.len(),
        "Cleaned cheatsheet markdown"
    );
    cleaned
}

/// Remove a leading metadata block delimited by `---` lines.
///
/// The opening `---` must be the very first line. The block ends at the next
/// `---` (or YAML's `...`) line, which is removed together with its line
/// break. Without an opening delimiter, or without a closing one, the input
/// is returned unchanged.
pub fn strip_frontmatter(markdown: &str) -> String {
    match frontmatter_end(markdown) {
        Some(end) => markdown[end..].to_string(),
        None => markdown.to_string(),
    }
}

fn frontmatter_end(markdown: &str) -> Option<usize> {
    let mut lines = markdown.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" || !first.ends_with('\n') {
        return None;
    }
    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Some(offset);
        }
    }
    None
}

/// Remove template placeholders, leaving the surrounding text untouched.
pub fn strip_template_tags(markdown: &str) -> String {
    TEMPLATE_TAG.replace_all(markdown, "").into_owned()
}

/// Re-pad every GFM pipe table so all cells of a column share one width.
///
/// Only whitespace and delimiter dashes change: cell text, the number of
/// rows and each row's cell count stay as they were. Tables inside fenced
/// code blocks are left alone. Running it twice gives the same result as
/// running it once.
pub fn format_tables(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut fence: Option<Fence> = None;
    let mut tables = 0usize;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(open) = &fence {
            if open.is_closed_by(line) {
                fence = None;
            }
            out.push(line.to_string());
            i += 1;
            continue;
        }
        if let Some(open) = Fence::opened_by(line) {
            fence = Some(open);
            out.push(line.to_string());
            i += 1;
            continue;
        }
        if let Some(table) = Table::parse(&lines[i..]) {
            i += table.line_count();
            out.extend(table.render());
            tables += 1;
            continue;
        }

        out.push(line.to_string());
        i += 1;
    }

    if tables > 0 {
        debug!(tables, "Reformatted markdown tables");
    }
    out.join("\n")
}

struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn opened_by(line: &str) -> Option<Fence> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Fence { marker, len })
    }

    fn is_closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let run = trimmed.chars().take_while(|c| *c == self.marker).count();
        run >= self.len && run == trimmed.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    None,
    Left,
    Center,
    Right,
}

impl Align {
    fn parse(cell: &str) -> Option<Align> {
        let left = cell.starts_with(':');
        let inner = cell.strip_prefix(':').unwrap_or(cell);
        let right = inner.ends_with(':');
        let dashes = inner.strip_suffix(':').unwrap_or(inner);
        if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
            return None;
        }
        Some(match (left, right) {
            (true, true) => Align::Center,
            (true, false) => Align::Left,
            (false, true) => Align::Right,
            (false, false) => Align::None,
        })
    }

    fn render(self, width: usize) -> String {
        match self {
            Align::None => "-".repeat(width),
            Align::Left => format!(":{}", "-".repeat(width - 1)),
            Align::Right => format!("{}:", "-".repeat(width - 1)),
            Align::Center => format!(":{}:", "-".repeat(width - 2)),
        }
    }
}

struct Row {
    cells: Vec<String>,
    crlf: bool,
}

impl Row {
    fn parse(line: &str) -> Row {
        let crlf = line.ends_with('\r');
        Row {
            cells: split_cells(line.strip_suffix('\r').unwrap_or(line)),
            crlf,
        }
    }
}

struct Table {
    indent: String,
    header: Row,
    aligns: Vec<Align>,
    delimiter_crlf: bool,
    rows: Vec<Row>,
}

impl Table {
    /// Parse a table whose header row is `lines[0]`.
    fn parse(lines: &[&str]) -> Option<Table> {
        let (header_line, delimiter_line) = match lines {
            [header, delimiter, ..] => (*header, *delimiter),
            _ => return None,
        };
        if !is_row_candidate(header_line) || !delimiter_line.contains('|') {
            return None;
        }
        let indent: String = header_line
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        if indent.chars().count() >= 4 {
            return None;
        }

        let header = Row::parse(header_line);
        let delimiter = Row::parse(delimiter_line);
        let aligns = delimiter
            .cells
            .iter()
            .map(|cell| Align::parse(cell))
            .collect::<Option<Vec<_>>>()?;
        if aligns.len() != header.cells.len() {
            return None;
        }

        let rows = lines[2..]
            .iter()
            .take_while(|line| is_row_candidate(line) && Fence::opened_by(line).is_none())
            .map(|line| Row::parse(line))
            .collect();

        Some(Table {
            indent,
            header,
            aligns,
            delimiter_crlf: delimiter.crlf,
            rows,
        })
    }

    fn line_count(&self) -> usize {
        self.rows.len() + 2
    }

    fn widths(&self) -> Vec<usize> {
        let columns = std::iter::once(&self.header)
            .chain(&self.rows)
            .map(|row| row.cells.len())
            .max()
            .unwrap_or(0);
        let mut widths = vec![MIN_COLUMN_WIDTH; columns];
        for row in std::iter::once(&self.header).chain(&self.rows) {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    fn render(&self) -> Vec<String> {
        let widths = self.widths();
        let mut lines = Vec::with_capacity(self.rows.len() + 2);

        lines.push(self.render_row(&self.header, &widths));
        let delimiter: Vec<String> = self
            .aligns
            .iter()
            .zip(&widths)
            .map(|(align, width)| align.render(*width))
            .collect();
        lines.push(self.join(&delimiter, self.delimiter_crlf));
        for row in &self.rows {
            lines.push(self.render_row(row, &widths));
        }
        lines
    }

    fn render_row(&self, row: &Row, widths: &[usize]) -> String {
        let padded: Vec<String> = row
            .cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        self.join(&padded, row.crlf)
    }

    fn join(&self, cells: &[String], crlf: bool) -> String {
        format!(
            "{}| {} |{}",
            self.indent,
            cells.join(" | "),
            if crlf { "\r" } else { "" }
        )
    }
}

fn is_row_candidate(line: &str) -> bool {
    !line.trim().is_empty() && line.contains('|')
}

/// Split a table row into trimmed cells. Outer pipes are optional and an
/// escaped `\|` belongs to its cell.
fn split_cells(line: &str) -> Vec<String> {
    let mut row = line.trim();
    if let Some(rest) = row.strip_prefix('|') {
        row = rest;
    }
    if let Some(rest) = row.strip_suffix('|') {
        let backslashes = rest.chars().rev().take_while(|c| *c == '\\').count();
        if backslashes % 2 == 0 {
            row = rest;
        }
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in row.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                current.push(ch);
                escaped = true;
            }
            '|' => {
                cells.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());
    cells
}
