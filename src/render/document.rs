// src/render/document.rs

//! Paginated schedule document.
//!
//! One section per room, in schedule order: heading, the advisor and grader
//! lines when present, then the time-slot table.

use crate::error::Result;
use crate::models::{RenderConfig, RoomSchedule, Schedule};
use crate::render::layout::{Block, Section, paginate};
use crate::render::pdf::write_pdf;
use crate::render::qr::QrMatrix;
use crate::utils::room_link;

/// Rendering options for the document; the `[render]` config section.
pub type DocumentOptions = RenderConfig;

const TITLE_SPACE: f32 = 12.0;
const HEADING_SPACE: f32 = 12.0;
const ROOM_SPACE: f32 = 24.0;

/// Renders a [`Schedule`] as a PDF document.
pub struct DocumentRenderer {
    options: DocumentOptions,
    base_url: String,
}

impl DocumentRenderer {
    /// `base_url` is the page the QR deep links point into.
    pub fn new(options: &DocumentOptions, base_url: impl Into<String>) -> Self {
        Self {
            options: options.clone(),
            base_url: base_url.into(),
        }
    }

    /// Render the schedule to PDF bytes.
    pub fn render(&self, schedule: &Schedule) -> Result<Vec<u8>> {
        let sections = self.build_sections(schedule)?;
        let pages = paginate(&sections);
        log::debug!(
            "Laid out {} section(s) on {} page(s)",
            sections.len(),
            pages.len()
        );
        write_pdf(&self.options.title, &pages)
    }

    /// Typed blocks for the whole document.
    pub fn build_sections(&self, schedule: &Schedule) -> Result<Vec<Section>> {
        let mut sections = Vec::with_capacity(schedule.len() + 1);

        if self.options.include_title {
            sections.push(Section {
                blocks: vec![
                    Block::Title(self.options.title.clone()),
                    Block::Spacer(TITLE_SPACE),
                ],
                keep_together: true,
            });
        }

        for room in schedule.rooms() {
            sections.push(self.room_section(room)?);
        }
        Ok(sections)
    }

    fn room_section(&self, room: &RoomSchedule) -> Result<Section> {
        let qr = if self.options.include_qr {
            Some(QrMatrix::encode(&room_link(&self.base_url, &room.room_id)?)?)
        } else {
            None
        };

        let mut blocks = vec![
            Block::Heading {
                text: self.options.heading(&room.room_id),
                qr,
            },
            Block::Spacer(HEADING_SPACE),
        ];
        for line in [&room.advisors, &room.graders] {
            if !line.trim().is_empty() {
                blocks.push(Block::Paragraph(line.clone()));
            }
        }

        let header = self
            .options
            .show_headers
            .then(|| ["Time".to_string(), "Presenter".to_string()]);
        if header.is_some() || !room.schedule.is_empty() {
            let rows = room
                .schedule
                .iter()
                .map(|slot| [slot.time_range.clone(), slot.presenter.clone()])
                .collect();
            blocks.push(Block::Table { header, rows });
        }
        blocks.push(Block::Spacer(ROOM_SPACE));

        Ok(Section {
            blocks,
            keep_together: !self.options.allow_breaks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSlot;

    const BASE_URL: &str = "https://symposium.orfe.princeton.edu";

    fn sample() -> Schedule {
        let mut first = RoomSchedule::new("001");
        first.advisors = "ORFE Advisors: Dr. Smith".into();
        first.graders = "PhD Candidate Graders: A. Lee".into();
        first.schedule = vec![
            TimeSlot::new("10:00 am – 10:20 am", "Jane Doe"),
            TimeSlot::new("10:20 am – 10:40 am", "John Roe"),
        ];
        let second = RoomSchedule::new("110");
        [first, second].into_iter().collect()
    }

    #[test]
    fn test_sections_follow_schedule_order() {
        let renderer = DocumentRenderer::new(&DocumentOptions::default(), BASE_URL);
        let sections = renderer.build_sections(&sample()).unwrap();

        assert_eq!(sections.len(), 3);
        assert!(matches!(&sections[0].blocks[0], Block::Title(t) if t.contains("Symposium")));

        let headings: Vec<&str> = sections[1..]
            .iter()
            .filter_map(|s| match &s.blocks[0] {
                Block::Heading { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headings,
            vec!["Room 001 - Sherrerd Hall", "Room 110 - Sherrerd Hall"]
        );
        assert!(sections.iter().all(|s| s.keep_together));
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let renderer = DocumentRenderer::new(&DocumentOptions::default(), BASE_URL);
        let sections = renderer.build_sections(&sample()).unwrap();

        let first = &sections[1].blocks;
        let paragraphs = first
            .iter()
            .filter(|b| matches!(b, Block::Paragraph(_)))
            .count();
        assert_eq!(paragraphs, 2);
        assert!(first.iter().any(|b| matches!(b, Block::Table { rows, .. } if rows.len() == 2)));

        let empty = &sections[2].blocks;
        assert!(!empty
            .iter()
            .any(|b| matches!(b, Block::Paragraph(_) | Block::Table { .. })));
    }

    #[test]
    fn test_options() {
        let options = DocumentOptions {
            show_headers: true,
            allow_breaks: true,
            include_title: false,
            include_qr: true,
            ..DocumentOptions::default()
        };
        let renderer = DocumentRenderer::new(&options, BASE_URL);
        let sections = renderer.build_sections(&sample()).unwrap();

        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| !s.keep_together));

        let expected = QrMatrix::encode("https://symposium.orfe.princeton.edu/#001").unwrap();
        match &sections[0].blocks[0] {
            Block::Heading { qr, .. } => assert_eq!(qr.as_ref(), Some(&expected)),
            other => panic!("expected heading, got {other:?}"),
        }

        // Header row is kept even for a room without slots.
        let header_only = sections[1].blocks.iter().any(|b| {
            matches!(b, Block::Table { header: Some(h), rows } if h[0] == "Time" && rows.is_empty())
        });
        assert!(header_only);
    }

    #[test]
    fn test_render_produces_pdf() {
        let renderer = DocumentRenderer::new(&DocumentOptions::default(), BASE_URL);
        let bytes = renderer.render(&sample()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_schedule() {
        let options = DocumentOptions {
            include_title: false,
            ..DocumentOptions::default()
        };
        let bytes = DocumentRenderer::new(&options, BASE_URL)
            .render(&Schedule::new())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
