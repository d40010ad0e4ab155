use super::layout::{LayoutRow, SegmentStyle, TerminalLayout};
use crate::controller::Mode;
use crate::document_model::{DocumentTree, PositionEntry};
use crossterm::{
    cursor, execute,
    style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType, size},
};
use std::io::{self, Write, stdout};
use unicode_width::UnicodeWidthChar;

const CURRENT_MARKER_COLOR: Color = Color::Rgb { r: 255, g: 69, b: 0 };

#[derive(Clone)]
pub struct RenderParams<'a> {
    pub mode: &'a Mode,
    pub input_buffer: &'a str,
    pub status_message: &'a str,
    pub is_error: bool,
    pub position_label: &'a str,
    pub flags: &'a str,
    pub history: &'a [String],
    pub history_selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewCell {
    Empty,
    Match,
    Current,
}

pub struct View {
    last_lines: Vec<(String, OverviewCell)>,
    last_status: String,
    last_terminal_size: (u16, u16),
    scroll_offset: usize,
    needs_full_redraw: bool,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        Self {
            last_lines: Vec::new(),
            last_status: String::new(),
            last_terminal_size: (0, 0),
            scroll_offset: 0,
            needs_full_redraw: true,
        }
    }

    /// Columns available to text and rows available to the document.
    /// The last column is the overview strip and the last row the status line.
    pub fn text_area() -> io::Result<(usize, usize)> {
        let (width, height) = size()?;
        Ok((
            (width as usize).saturating_sub(1).max(1),
            (height as usize).saturating_sub(1),
        ))
    }

    fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))
    }

    fn move_cursor(&self, line: usize, column: usize) -> io::Result<()> {
        execute!(stdout(), cursor::MoveTo(column as u16, line as u16))
    }

    pub fn render(
        &mut self,
        tree: &DocumentTree,
        layout: &TerminalLayout,
        map: &[PositionEntry],
        params: &RenderParams<'_>,
    ) -> io::Result<()> {
        let (width, height) = size()?;
        let current_size = (width, height);
        if self.last_terminal_size != current_size {
            self.needs_full_redraw = true;
            self.last_terminal_size = current_size;
        }

        if self.needs_full_redraw {
            self.clear_screen()?;
            self.needs_full_redraw = false;
            self.last_lines.clear();
            self.last_status.clear();
        }

        let visible_rows = (height as usize).saturating_sub(1);
        let text_width = (width as usize).saturating_sub(1);
        self.clamp_scroll(layout.rows().len(), visible_rows);

        let strip = overview_cells(map, visible_rows);
        let visible_lines: Vec<(String, OverviewCell)> = (0..visible_rows)
            .map(|i| {
                let body = match params.mode {
                    Mode::History => history_line(params.history, params.history_selected, i, text_width),
                    _ => layout
                        .rows()
                        .get(self.scroll_offset + i)
                        .map(|row| styled_row(row, tree))
                        .unwrap_or_default(),
                };
                let cell = strip.get(i).copied().unwrap_or(OverviewCell::Empty);
                (body, cell)
            })
            .collect();

        if self.last_lines != visible_lines {
            for (i, line) in visible_lines.iter().enumerate() {
                if i >= self.last_lines.len() || self.last_lines[i] != *line {
                    let (body, cell) = line;
                    self.move_cursor(i, 0)?;
                    execute!(stdout(), Clear(ClearType::CurrentLine))?;
                    print!("{body}");
                    // The strip is positioned on its own so a short row cannot pull it left
                    self.move_cursor(i, text_width)?;
                    print!("{}", strip_cell(*cell));
                }
            }
            self.last_lines = visible_lines;
        }

        let current_status = status_line(params);
        if self.last_status != current_status {
            self.move_cursor(visible_rows, 0)?;
            execute!(stdout(), Clear(ClearType::CurrentLine))?;
            let clipped = clip_to_width(&current_status, width as usize);
            if params.is_error {
                print!("{}{clipped}{ResetColor}", SetForegroundColor(Color::Red));
            } else {
                print!("{clipped}");
            }
            self.last_status = current_status;
        }

        match params.mode {
            Mode::PatternInput => {
                let column = params
                    .input_buffer
                    .chars()
                    .map(|c| c.width().unwrap_or(0))
                    .sum::<usize>()
                    + 1;
                self.move_cursor(visible_rows, column)?;
                execute!(stdout(), cursor::Show)?;
            }
            _ => execute!(stdout(), cursor::Hide)?,
        }

        stdout().flush()?;
        Ok(())
    }

    pub fn force_redraw(&mut self) {
        self.needs_full_redraw = true;
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
        self.needs_full_redraw = true;
    }

    pub fn get_scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Centre rows `top..top + span` in a viewport of `visible_rows`.
    pub fn scroll_to_center(&mut self, top: usize, span: usize, content_rows: usize, visible_rows: usize) {
        self.scroll_offset = centered_offset(top, span, content_rows, visible_rows);
    }

    pub fn scroll_by(&mut self, delta: isize, content_rows: usize, visible_rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
        self.clamp_scroll(content_rows, visible_rows);
    }

    fn clamp_scroll(&mut self, content_rows: usize, visible_rows: usize) {
        let max = content_rows.saturating_sub(visible_rows);
        self.scroll_offset = self.scroll_offset.min(max);
    }
}

/// Scroll offset that puts the middle of a span in the middle of the viewport.
pub fn centered_offset(top: usize, span: usize, content_rows: usize, visible_rows: usize) -> usize {
    let middle = top + span / 2;
    let offset = middle.saturating_sub(visible_rows / 2);
    offset.min(content_rows.saturating_sub(visible_rows))
}

/// Project the position map onto `rows` strip cells.
pub fn overview_cells(map: &[PositionEntry], rows: usize) -> Vec<OverviewCell> {
    (0..rows)
        .map(|row| {
            let covering: Vec<&PositionEntry> = map
                .iter()
                .filter(|entry| covers(entry, row, rows))
                .collect();
            if covering.iter().any(|entry| entry.current) {
                OverviewCell::Current
            } else if covering.is_empty() {
                OverviewCell::Empty
            } else {
                OverviewCell::Match
            }
        })
        .collect()
}

/// Sequence index of the first entry drawn in strip row `row`.
pub fn entry_at(map: &[PositionEntry], row: usize, rows: usize) -> Option<usize> {
    map.iter()
        .find(|entry| covers(entry, row, rows))
        .map(|entry| entry.sequence_index)
}

fn covers(entry: &PositionEntry, row: usize, rows: usize) -> bool {
    if rows == 0 {
        return false;
    }
    let low = row as f64 / rows as f64 * 100.0;
    let high = (row + 1) as f64 / rows as f64 * 100.0;
    entry.top_percent < high && entry.top_percent + entry.height_percent > low
}

fn styled_row(row: &LayoutRow, tree: &DocumentTree) -> String {
    let mut result = String::new();
    for segment in &row.segments {
        match segment.style {
            SegmentStyle::Plain => result.push_str(&segment.text),
            SegmentStyle::Marker(marker) => {
                let background = if tree.is_current_marker(marker) {
                    CURRENT_MARKER_COLOR
                } else {
                    Color::Yellow
                };
                result.push_str(&format!(
                    "{}{}{}{}",
                    SetBackgroundColor(background),
                    SetForegroundColor(Color::Black),
                    segment.text,
                    ResetColor
                ));
            }
        }
    }
    result
}

fn strip_cell(cell: OverviewCell) -> String {
    match cell {
        OverviewCell::Empty => format!("{}│{ResetColor}", SetForegroundColor(Color::DarkGrey)),
        OverviewCell::Match => format!("{}█{ResetColor}", SetForegroundColor(Color::Yellow)),
        OverviewCell::Current => format!("{}█{ResetColor}", SetForegroundColor(CURRENT_MARKER_COLOR)),
    }
}

fn history_line(entries: &[String], selected: usize, row: usize, width: usize) -> String {
    if entries.is_empty() {
        return if row == 0 {
            "(no search history)".to_string()
        } else {
            String::new()
        };
    }
    let Some(entry) = entries.get(row) else {
        return String::new();
    };
    let text = clip_to_width(&format!("{:>3}. {entry}", row + 1), width);
    if row == selected {
        format!("{}{text}{}", SetAttribute(Attribute::Reverse), SetAttribute(Attribute::Reset))
    } else {
        text
    }
}

fn status_line(params: &RenderParams<'_>) -> String {
    match params.mode {
        Mode::PatternInput => format!("/{}", params.input_buffer),
        Mode::History => "-- HISTORY --  Enter: search  d: delete  Esc: back".to_string(),
        Mode::Normal => {
            let flags = if params.flags.is_empty() {
                String::new()
            } else {
                format!(" /{}", params.flags)
            };
            if params.status_message.is_empty() {
                format!("[{}]{flags}  / search  n/N next/prev  h history  q quit", params.position_label)
            } else {
                format!("[{}]{flags}  {}", params.position_label, params.status_message)
            }
        }
    }
}

/// Cut `text` to at most `width` display columns.
pub fn clip_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut clipped = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        clipped.push(ch);
    }
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(sequence_index: usize, top: f64, height: f64, current: bool) -> PositionEntry {
        PositionEntry {
            sequence_index,
            top_percent: top,
            height_percent: height,
            current,
        }
    }

    #[test]
    fn test_overview_cells() {
        let map = vec![entry(0, 0.0, 2.0, false), entry(1, 50.0, 2.0, true)];
        let cells = overview_cells(&map, 10);
        assert_eq!(cells[0], OverviewCell::Match);
        assert_eq!(cells[5], OverviewCell::Current);
        assert_eq!(cells.iter().filter(|c| **c == OverviewCell::Empty).count(), 8);
        assert!(overview_cells(&map, 0).is_empty());
    }

    #[test]
    fn test_current_wins_shared_cell() {
        let map = vec![entry(0, 10.0, 2.0, false), entry(1, 11.0, 2.0, true)];
        assert_eq!(overview_cells(&map, 5)[0], OverviewCell::Current);
        assert_eq!(entry_at(&map, 0, 5), Some(0));
        assert_eq!(entry_at(&map, 4, 5), None);
    }

    #[test]
    fn test_centered_offset() {
        assert_eq!(centered_offset(50, 1, 100, 20), 40);
        assert_eq!(centered_offset(3, 1, 100, 20), 0);
        assert_eq!(centered_offset(98, 1, 100, 20), 80);
        assert_eq!(centered_offset(5, 1, 8, 20), 0);
    }

    #[test]
    fn test_scroll_by_clamps() {
        let mut view = View::new();
        view.scroll_by(-3, 100, 20);
        assert_eq!(view.get_scroll_offset(), 0);
        view.scroll_by(500, 100, 20);
        assert_eq!(view.get_scroll_offset(), 80);
    }

    #[test]
    fn test_clip_to_width() {
        assert_eq!(clip_to_width("abcdef", 4), "abcd");
        assert_eq!(clip_to_width("a中b", 2), "a");
        assert_eq!(clip_to_width("a中b", 3), "a中");
    }

    #[test]
    fn test_status_line() {
        let mode = Mode::Normal;
        let params = RenderParams {
            mode: &mode,
            input_buffer: "",
            status_message: "3 matches",
            is_error: false,
            position_label: "1 / 3",
            flags: "gi",
            history: &[],
            history_selected: 0,
        };
        assert_eq!(status_line(&params), "[1 / 3] /gi  3 matches");

        let mode = Mode::PatternInput;
        let params = RenderParams {
            mode: &mode,
            input_buffer: "fo+",
            ..params
        };
        assert_eq!(status_line(&params), "/fo+");
    }

    #[test]
    fn test_history_line_selection() {
        let entries = vec!["foo".to_string(), "bar".to_string()];
        assert!(history_line(&entries, 1, 1, 40).contains("  2. bar"));
        assert_eq!(history_line(&entries, 1, 0, 40), "  1. foo");
        assert_eq!(history_line(&entries, 0, 5, 40), "");
        assert_eq!(history_line(&[], 0, 0, 40), "(no search history)");
    }
}
