// src/render/layout.rs

//! Block layout and pagination.
//!
//! Typed blocks are broken into atomic vertical units (a wrapped text line,
//! a table row, a heading), which are stacked onto US-Letter pages. A
//! section marked `keep_together` moves to a fresh page when it would
//! otherwise be split, unless it is taller than a whole page.
//!
//! Positions are in points, measured from the left edge and down from the
//! top edge of the page.

use unicode_segmentation::UnicodeSegmentation;

use crate::render::qr::QrMatrix;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 72.0;

const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - MARGIN;
const USABLE_HEIGHT: f32 = CONTENT_BOTTOM - MARGIN;

const COLUMN_WIDTH: f32 = 200.0;
const TABLE_WIDTH: f32 = 2.0 * COLUMN_WIDTH;
const CELL_PADDING_X: f32 = 6.0;
const QR_SIZE: f32 = 64.0;
const QR_GAP: f32 = 12.0;

/// Fill colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const WHITESMOKE: Rgb = Rgb(0.961, 0.961, 0.961);
    pub const LIGHT_GREY: Rgb = Rgb(0.827, 0.827, 0.827);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub leading: f32,
}

impl TextStyle {
    pub const TITLE: TextStyle = TextStyle::new(Font::Bold, 18.0, 22.0);
    pub const HEADING: TextStyle = TextStyle::new(Font::Bold, 18.0, 22.0);
    pub const BODY: TextStyle = TextStyle::new(Font::Regular, 14.0, 20.0);
    pub const CELL: TextStyle = TextStyle::new(Font::Regular, 14.0, 16.0);
    pub const HEADER_CELL: TextStyle = TextStyle::new(Font::Bold, 16.0, 18.0);

    pub const fn new(font: Font, size: f32, leading: f32) -> Self {
        Self {
            font,
            size,
            leading,
        }
    }

    /// Baseline offset from the top of a line box.
    fn baseline(&self) -> f32 {
        self.leading - (self.leading - self.size) / 2.0 - self.size * 0.2
    }
}

/// Content block handed to the paginator.
#[derive(Debug, Clone)]
pub enum Block {
    /// Centered document title
    Title(String),
    /// Section heading with an optional QR code at the right margin
    Heading { text: String, qr: Option<QrMatrix> },
    /// Wrapped body text
    Paragraph(String),
    /// Two-column table; may break between rows
    Table {
        header: Option<[String; 2]>,
        rows: Vec<[String; 2]>,
    },
    /// Vertical space, dropped at the top of a page
    Spacer(f32),
}

/// Blocks laid out as a group.
#[derive(Debug, Clone)]
pub struct Section {
    pub blocks: Vec<Block>,
    pub keep_together: bool,
}

/// Positioned drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text {
        x: f32,
        baseline: f32,
        style: TextStyle,
        text: String,
    },
    Rect {
        x: f32,
        top: f32,
        width: f32,
        height: f32,
        fill: Rgb,
    },
    Qr {
        x: f32,
        top: f32,
        size: f32,
        matrix: QrMatrix,
    },
}

impl Item {
    fn shifted(self, dy: f32) -> Self {
        match self {
            Item::Text {
                x,
                baseline,
                style,
                text,
            } => Item::Text {
                x,
                baseline: baseline + dy,
                style,
                text,
            },
            Item::Rect {
                x,
                top,
                width,
                height,
                fill,
            } => Item::Rect {
                x,
                top: top + dy,
                width,
                height,
                fill,
            },
            Item::Qr {
                x,
                top,
                size,
                matrix,
            } => Item::Qr {
                x,
                top: top + dy,
                size,
                matrix,
            },
        }
    }
}

/// One laid-out page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Item>,
}

impl Page {
    /// All text on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            Item::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Atomic vertical unit; item positions are relative to its top.
struct Unit {
    height: f32,
    items: Vec<Item>,
    spacer: bool,
}

impl Unit {
    fn content(height: f32, items: Vec<Item>) -> Self {
        Self {
            height,
            items,
            spacer: false,
        }
    }
}

impl Block {
    fn units(&self) -> Vec<Unit> {
        match self {
            Block::Title(text) => {
                let style = TextStyle::TITLE;
                wrap(text, style, CONTENT_WIDTH)
                    .into_iter()
                    .map(|line| {
                        let x = MARGIN + (CONTENT_WIDTH - text_width(&line, style)).max(0.0) / 2.0;
                        Unit::content(style.leading, vec![text_item(x, 0.0, style, line)])
                    })
                    .collect()
            }
            Block::Heading { text, qr } => {
                let style = TextStyle::HEADING;
                let width = match qr {
                    Some(_) => CONTENT_WIDTH - QR_SIZE - QR_GAP,
                    None => CONTENT_WIDTH,
                };
                let mut items: Vec<Item> = wrap(text, style, width)
                    .into_iter()
                    .enumerate()
                    .map(|(i, line)| text_item(MARGIN, i as f32 * style.leading, style, line))
                    .collect();
                let mut height = items.len() as f32 * style.leading;
                if let Some(matrix) = qr {
                    items.push(Item::Qr {
                        x: PAGE_WIDTH - MARGIN - QR_SIZE,
                        top: 0.0,
                        size: QR_SIZE,
                        matrix: matrix.clone(),
                    });
                    height = height.max(QR_SIZE);
                }
                vec![Unit::content(height, items)]
            }
            Block::Paragraph(text) => {
                let style = TextStyle::BODY;
                wrap(text, style, CONTENT_WIDTH)
                    .into_iter()
                    .map(|line| Unit::content(style.leading, vec![text_item(MARGIN, 0.0, style, line)]))
                    .collect()
            }
            Block::Table { header, rows } => {
                let mut units = Vec::with_capacity(rows.len() + 1);
                if let Some(cells) = header {
                    units.push(table_row(cells, TextStyle::HEADER_CELL, (6.0, 12.0), Rgb::LIGHT_GREY));
                }
                for (i, cells) in rows.iter().enumerate() {
                    let fill = if i % 2 == 0 { Rgb::WHITE } else { Rgb::WHITESMOKE };
                    units.push(table_row(cells, TextStyle::CELL, (6.0, 6.0), fill));
                }
                units
            }
            Block::Spacer(height) => vec![Unit {
                height: *height,
                items: Vec::new(),
                spacer: true,
            }],
        }
    }
}

fn text_item(x: f32, top: f32, style: TextStyle, text: String) -> Item {
    Item::Text {
        x,
        baseline: top + style.baseline(),
        style,
        text,
    }
}

fn table_row(cells: &[String; 2], style: TextStyle, padding: (f32, f32), fill: Rgb) -> Unit {
    let (pad_top, pad_bottom) = padding;
    let x0 = MARGIN + (CONTENT_WIDTH - TABLE_WIDTH) / 2.0;
    let cell_width = COLUMN_WIDTH - 2.0 * CELL_PADDING_X;

    let wrapped: Vec<Vec<String>> = cells.iter().map(|c| wrap(c, style, cell_width)).collect();
    let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let height = pad_top + line_count as f32 * style.leading + pad_bottom;

    let mut items = vec![Item::Rect {
        x: x0,
        top: 0.0,
        width: TABLE_WIDTH,
        height,
        fill,
    }];
    for (col, lines) in wrapped.into_iter().enumerate() {
        let x = x0 + col as f32 * COLUMN_WIDTH + CELL_PADDING_X;
        for (i, line) in lines.into_iter().enumerate() {
            items.push(text_item(x, pad_top + i as f32 * style.leading, style, line));
        }
    }
    Unit::content(height, items)
}

/// Lay sections out onto pages.
pub fn paginate(sections: &[Section]) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut page = Page::default();
    let mut cursor = MARGIN;
    let mut fresh = true;

    for section in sections {
        let units: Vec<Unit> = section.blocks.iter().flat_map(Block::units).collect();
        let total: f32 = units.iter().map(|u| u.height).sum();

        if section.keep_together
            && !fresh
            && cursor + total > CONTENT_BOTTOM
            && total <= USABLE_HEIGHT
        {
            pages.push(std::mem::take(&mut page));
            cursor = MARGIN;
            fresh = true;
        }

        for unit in units {
            if !fresh && cursor + unit.height > CONTENT_BOTTOM {
                pages.push(std::mem::take(&mut page));
                cursor = MARGIN;
                fresh = true;
            }
            if unit.spacer {
                if !fresh {
                    cursor += unit.height;
                }
                continue;
            }
            page.items
                .extend(unit.items.into_iter().map(|item| item.shifted(cursor)));
            cursor += unit.height;
            fresh = false;
        }
    }

    pages.push(page);
    pages
}

/// Approximate advance width of `text` in points.
///
/// Uses coarse Helvetica character classes; good enough for line breaking.
pub fn text_width(text: &str, style: TextStyle) -> f32 {
    let em: f32 = text.chars().map(char_width).sum();
    let weight = match style.font {
        Font::Regular => 1.0,
        Font::Bold => 1.06,
    };
    em * style.size * weight
}

fn char_width(c: char) -> f32 {
    match c {
        ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' | 'I' => 0.278,
        'f' | 't' | 'r' | '(' | ')' | '-' | '[' | ']' | '/' => 0.333,
        'm' | 'M' | 'W' => 0.833,
        'w' | '—' => 0.722,
        '–' => 0.556,
        c if c.is_ascii_digit() => 0.556,
        c if c.is_uppercase() => 0.667,
        _ => 0.556,
    }
}

/// Greedy word wrap to `max_width`; words wider than a line are split
/// between graphemes.
pub fn wrap(text: &str, style: TextStyle, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, style) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, style) <= max_width {
            current = word.to_string();
            continue;
        }

        for grapheme in word.graphemes(true) {
            let extended = format!("{current}{grapheme}");
            if !current.is_empty() && text_width(&extended, style) > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(grapheme);
            } else {
                current = extended;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(prefix: &str, rows: usize) -> Block {
        Block::Table {
            header: None,
            rows: (0..rows)
                .map(|i| [format!("{prefix}{i}"), "Presenter".to_string()])
                .collect(),
        }
    }

    fn section(blocks: Vec<Block>, keep_together: bool) -> Section {
        Section {
            blocks,
            keep_together,
        }
    }

    fn page_of(pages: &[Page], text: &str) -> Option<usize> {
        pages.iter().position(|p| p.texts().any(|t| t == text))
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "PhD Candidate Graders: Alex Chen, Maria Garcia, Wei Zhang, Priya Patel, Tom Baker";
        let lines = wrap(text, TextStyle::BODY, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, TextStyle::BODY) <= 200.0, "too wide: {line}");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let word = "x".repeat(80);
        let lines = wrap(&word, TextStyle::CELL, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_empty_text() {
        assert!(wrap("   ", TextStyle::BODY, 100.0).is_empty());
    }

    #[test]
    fn test_small_document_fits_one_page() {
        let pages = paginate(&[section(
            vec![Block::Title("Schedule".into()), table("A", 3)],
            true,
        )]);
        assert_eq!(pages.len(), 1);
        assert_eq!(page_of(&pages, "A2"), Some(0));
    }

    #[test]
    fn test_keep_together_moves_section_to_next_page() {
        // 21 rows of 28pt leave 60pt on the first page.
        let pages = paginate(&[
            section(vec![table("A", 21)], false),
            section(vec![table("B", 5)], true),
        ]);
        assert_eq!(pages.len(), 2);
        assert_eq!(page_of(&pages, "A20"), Some(0));
        for i in 0..5 {
            assert_eq!(page_of(&pages, &format!("B{i}")), Some(1));
        }
    }

    #[test]
    fn test_flowing_section_splits_between_rows() {
        let pages = paginate(&[
            section(vec![table("A", 21)], false),
            section(vec![table("B", 5)], false),
        ]);
        assert_eq!(pages.len(), 2);
        assert_eq!(page_of(&pages, "B0"), Some(0));
        assert_eq!(page_of(&pages, "B1"), Some(0));
        assert_eq!(page_of(&pages, "B2"), Some(1));
    }

    #[test]
    fn test_oversized_section_still_flows() {
        let pages = paginate(&[section(vec![table("C", 60)], true)]);
        assert_eq!(pages.len(), 3);
        assert_eq!(page_of(&pages, "C0"), Some(0));
        assert_eq!(page_of(&pages, "C59"), Some(2));
    }

    #[test]
    fn test_spacer_dropped_at_page_top() {
        let pages = paginate(&[
            section(vec![table("A", 23)], false),
            section(vec![Block::Spacer(12.0), table("B", 1)], false),
        ]);
        // 23 rows end at 716pt; the spacer would overflow and is dropped.
        let first_item_top = pages[1].items.iter().find_map(|item| match item {
            Item::Rect { top, .. } => Some(*top),
            _ => None,
        });
        assert_eq!(first_item_top, Some(MARGIN));
    }

    #[test]
    fn test_table_header_and_row_backgrounds() {
        let pages = paginate(&[section(
            vec![Block::Table {
                header: Some(["Time".into(), "Presenter".into()]),
                rows: vec![["a".into(), "b".into()], ["c".into(), "d".into()]],
            }],
            true,
        )]);
        let fills: Vec<Rgb> = pages[0]
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Rect { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![Rgb::LIGHT_GREY, Rgb::WHITE, Rgb::WHITESMOKE]);
    }

    #[test]
    fn test_heading_with_qr() {
        let matrix = QrMatrix::encode("https://example.com/#001").unwrap();
        let pages = paginate(&[section(
            vec![Block::Heading {
                text: "Room 001".into(),
                qr: Some(matrix),
            }],
            true,
        )]);
        let qr = pages[0].items.iter().find_map(|item| match item {
            Item::Qr { x, size, .. } => Some((*x, *size)),
            _ => None,
        });
        assert_eq!(qr, Some((PAGE_WIDTH - MARGIN - QR_SIZE, QR_SIZE)));
    }
}
