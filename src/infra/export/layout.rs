use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Page geometry in millimetres. Defaults describe a US letter page with the
/// logo header and full-width footer image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub page_height: f32,
    pub header_height: f32,
    pub footer_height: f32,
    pub bottom_margin: f32,
    /// Space taken by a table's column header row.
    pub table_header_height: f32,
    pub line_height: f32,
    pub row_padding: f32,
    pub min_row_height: f32,
    pub chars_per_line: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_height: 279.4,
            header_height: 37.0,
            footer_height: 20.0,
            bottom_margin: 15.0,
            table_header_height: 10.0,
            line_height: 7.0,
            row_padding: 3.0,
            min_row_height: 10.0,
            chars_per_line: 70,
        }
    }
}

impl PageLayout {
    pub fn available_height(&self) -> f32 {
        self.page_height - self.header_height - self.footer_height - self.bottom_margin
    }

    pub fn row_height(&self, text: &str) -> f32 {
        let lines = wrapped_line_count(text, self.chars_per_line) as f32;
        (lines * self.line_height + self.row_padding).max(self.min_row_height)
    }

    /// Splits rows into pages by the vertical space they need. A row taller
    /// than a whole page still gets a page of its own.
    pub fn paginate<T>(&self, rows: &[T], text: impl Fn(&T) -> &str) -> Vec<Range<usize>> {
        let space = self.available_height() - self.table_header_height;
        let mut pages = Vec::new();
        let mut start = 0;
        let mut used = 0.0_f32;

        for (idx, row) in rows.iter().enumerate() {
            let height = self.row_height(text(row));
            if used + height > space && idx > start {
                pages.push(start..idx);
                start = idx;
                used = 0.0;
            }
            used += height;
        }
        if start < rows.len() {
            pages.push(start..rows.len());
        }
        pages
    }
}

/// Greedy word wrap; words longer than a line are broken.
pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    let width = width.max(1);
    let mut lines = 1;
    let mut current = 0;

    for word in text.split_whitespace() {
        let len = word.chars().count();
        let needed = if current == 0 { len } else { current + 1 + len };
        if needed <= width {
            current = needed;
            continue;
        }
        if current > 0 {
            lines += 1;
        }
        lines += (len.saturating_sub(1)) / width;
        current = match len % width {
            0 => width,
            rest => rest,
        };
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_layout() -> PageLayout {
        PageLayout {
            page_height: 100.0,
            header_height: 20.0,
            footer_height: 10.0,
            bottom_margin: 10.0,
            table_header_height: 10.0,
            line_height: 5.0,
            row_padding: 2.0,
            min_row_height: 10.0,
            chars_per_line: 10,
        }
    }

    #[test]
    fn wrapping_counts_lines() {
        assert_eq!(wrapped_line_count("", 10), 1);
        assert_eq!(wrapped_line_count("short", 10), 1);
        assert_eq!(wrapped_line_count("aaaa bbbbb", 10), 1);
        assert_eq!(wrapped_line_count("aaaa bbbbbb", 10), 2);
        assert_eq!(wrapped_line_count("abcdefghijklmnopqrstuvwxy", 10), 3);
    }

    #[test]
    fn row_height_has_a_floor() {
        let layout = small_layout();
        assert_eq!(layout.row_height("x"), 10.0);
        assert_eq!(layout.row_height("aaaaaaaaa bbbbbbbbb ccccccccc"), 17.0);
    }

    #[test]
    fn rows_spill_onto_new_pages() {
        let layout = small_layout();
        // 50 of usable space, 10 per short row
        let rows = vec!["a"; 12];
        let pages = layout.paginate(&rows, |row| *row);
        assert_eq!(pages, vec![0..5, 5..10, 10..12]);
    }

    #[test]
    fn oversized_row_gets_its_own_page() {
        let layout = small_layout();
        let long = "word ".repeat(200);
        let rows = vec!["a", long.as_str(), "b"];
        let pages = layout.paginate(&rows, |row| *row);
        assert_eq!(pages, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn no_rows_no_pages() {
        let rows: Vec<&str> = Vec::new();
        assert!(PageLayout::default().paginate(&rows, |row| *row).is_empty());
    }
}
