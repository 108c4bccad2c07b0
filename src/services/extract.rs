// src/services/extract.rs

//! Schedule extractor service.
//!
//! Turns raw schedule markup into a [`Schedule`]. Two passes:
//!
//! 1. Room blocks: containers whose `id` looks like a room id. Advisor and
//!    grader lines are found by label, time slots by row elements.
//! 2. Text headings: if no block matched, the document is flattened into
//!    lines and scanned for "001 - Building" style headings.
//!
//! Rows that do not yield both a time range and a presenter are dropped
//! without affecting the rest of the room.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ExtractConfig, RoomSchedule, Schedule, TimeSlot};
use crate::utils::text::{element_text, normalize_whitespace, text_lines};

/// Outcome of reading a time slot that starts at a given line.
#[derive(Debug, PartialEq)]
enum SlotParse {
    /// A slot and the number of lines it used
    Slot(TimeSlot, usize),
    /// A time line without a usable presenter, and the lines to skip
    Malformed(usize),
}

/// Extracts room schedules from markup.
pub struct ScheduleExtractor {
    room_selector: Selector,
    row_selector: Selector,
    room_id: Regex,
    time_range: Regex,
    presenter_trailer: Regex,
    room_heading: Regex,
    advisor_label: String,
    grader_label: String,
    skip_lines: Vec<String>,
}

impl ScheduleExtractor {
    /// Compile the configured patterns.
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            room_selector: Self::parse_selector(&config.room_selector)?,
            row_selector: Self::parse_selector(&config.row_selector)?,
            room_id: Regex::new(&config.room_id_pattern)?,
            time_range: Regex::new(&config.time_range_pattern)?,
            presenter_trailer: Regex::new(&config.presenter_trailer_pattern)?,
            room_heading: Regex::new(&config.room_heading_pattern)?,
            advisor_label: config.advisor_label.clone(),
            grader_label: config.grader_label.clone(),
            skip_lines: config.skip_lines.clone(),
        })
    }

    /// Extract every room from the markup, in page order.
    pub fn extract(&self, markup: &str) -> Result<Schedule> {
        let document = Html::parse_document(markup);

        let mut schedule = self.extract_blocks(&document);
        if schedule.is_empty() {
            log::debug!("No room blocks found by id, scanning text headings");
            schedule = self.extract_from_lines(&text_lines(document.root_element()));
        }

        if schedule.is_empty() {
            return Err(AppError::extraction("no rooms found"));
        }

        log::debug!(
            "Extracted {} rooms with {} time slots",
            schedule.len(),
            schedule.slot_count()
        );
        Ok(schedule)
    }

    fn extract_blocks(&self, document: &Html) -> Schedule {
        let mut schedule = Schedule::new();

        for block in document.select(&self.room_selector) {
            let Some(room_id) = block.value().id().filter(|id| self.room_id.is_match(id)) else {
                continue;
            };
            if self.is_nested_room(block) {
                continue;
            }

            let room = self.parse_room_block(room_id, block);
            if !schedule.insert(room) {
                log::warn!("Duplicate room block '{room_id}' ignored");
            }
        }

        schedule
    }

    fn is_room_block(&self, element: ElementRef<'_>) -> bool {
        element.value().id().is_some_and(|id| self.room_id.is_match(id))
            && self.room_selector.matches(&element)
    }

    fn is_nested_room(&self, block: ElementRef<'_>) -> bool {
        block
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.is_room_block(ancestor))
    }

    fn parse_room_block(&self, room_id: &str, block: ElementRef<'_>) -> RoomSchedule {
        let mut room = RoomSchedule::new(room_id);
        let lines = text_lines(block);
        for line in &lines {
            self.apply_labels(&mut room, line);
        }

        for row in block.select(&self.row_selector) {
            match self.parse_slot(&text_lines(row)) {
                Some(SlotParse::Slot(slot, _)) => room.schedule.push(slot),
                _ => log::debug!("Room {room_id}: skipped row '{}'", element_text(row)),
            }
        }

        // No slot came from a row element: slots may be laid out as plain lines.
        if room.schedule.is_empty() {
            room.schedule = self.scan_slots(room_id, &lines);
        }

        room
    }

    fn scan_slots(&self, room_id: &str, lines: &[String]) -> Vec<TimeSlot> {
        let mut slots = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            match self.parse_slot(&lines[i..]) {
                Some(SlotParse::Slot(slot, used)) => {
                    slots.push(slot);
                    i += used;
                }
                Some(SlotParse::Malformed(used)) => {
                    log::debug!("Room {room_id}: skipped malformed slot '{}'", lines[i]);
                    i += used.max(1);
                }
                None => i += 1,
            }
        }
        slots
    }

    fn extract_from_lines(&self, lines: &[String]) -> Schedule {
        let mut rooms: Vec<RoomSchedule> = Vec::new();
        let mut current: Option<usize> = None;
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];

            if let Some(room_id) = self
                .room_heading
                .captures(line)
                .and_then(|caps| caps.name("room"))
                .map(|m| m.as_str())
            {
                // A heading seen again (e.g. in a navigation list) reopens the room.
                let idx = match rooms.iter().position(|r| r.room_id == room_id) {
                    Some(idx) => idx,
                    None => {
                        rooms.push(RoomSchedule::new(room_id));
                        rooms.len() - 1
                    }
                };
                current = Some(idx);
                i += 1;
                continue;
            }

            let Some(idx) = current else {
                i += 1;
                continue;
            };
            let room = &mut rooms[idx];

            if self.apply_labels(room, line) {
                i += 1;
                continue;
            }

            match self.parse_slot(&lines[i..]) {
                Some(SlotParse::Slot(slot, used)) => {
                    room.schedule.push(slot);
                    i += used;
                }
                Some(SlotParse::Malformed(used)) => {
                    log::debug!("Room {}: skipped malformed slot '{}'", room.room_id, line);
                    i += used.max(1);
                }
                None => i += 1,
            }
        }

        rooms.into_iter().collect()
    }

    /// Fill advisors/graders from a labelled line; first occurrence wins.
    fn apply_labels(&self, room: &mut RoomSchedule, line: &str) -> bool {
        let advisor_at = line.find(&self.advisor_label);
        let grader_at = line.find(&self.grader_label);

        let (advisors, graders) = match (advisor_at, grader_at) {
            (None, None) => return false,
            (Some(a), None) => (Some(&line[a..]), None),
            (None, Some(g)) => (None, Some(&line[g..])),
            (Some(a), Some(g)) if a < g => (Some(&line[a..g]), Some(&line[g..])),
            (Some(a), Some(g)) => (Some(&line[a..]), Some(&line[g..a])),
        };

        if let Some(text) = advisors {
            if room.advisors.is_empty() {
                room.advisors = text.trim().to_string();
            }
        }
        if let Some(text) = graders {
            if room.graders.is_empty() {
                room.graders = text.trim().to_string();
            }
        }
        true
    }

    /// Read a time slot whose time range is on `lines[0]`.
    ///
    /// The presenter is the rest of that line or, if nothing follows the
    /// time, the next line that is not a skip line. Returns `None` when
    /// `lines[0]` holds no time range.
    fn parse_slot(&self, lines: &[String]) -> Option<SlotParse> {
        let first = lines.first()?;
        let time = self.time_range.find(first)?;
        let time_range = normalize_whitespace(time.as_str());

        let rest = first[time.end()..].trim_start_matches(|c: char| {
            c.is_whitespace() || matches!(c, ':' | '|' | ',' | '-' | '–' | '—')
        });
        if !rest.is_empty() {
            return Some(self.slot_or_malformed(time_range, rest, 1));
        }

        for (offset, line) in lines.iter().enumerate().skip(1) {
            if self.skip_lines.iter().any(|skip| skip == line) {
                continue;
            }
            if self.is_structural(line) {
                return Some(SlotParse::Malformed(offset));
            }
            return Some(self.slot_or_malformed(time_range, line, offset + 1));
        }

        Some(SlotParse::Malformed(lines.len()))
    }

    fn slot_or_malformed(&self, time_range: String, raw_presenter: &str, used: usize) -> SlotParse {
        let presenter = self.clean_presenter(raw_presenter);
        if time_range.is_empty() || presenter.is_empty() {
            SlotParse::Malformed(used)
        } else {
            SlotParse::Slot(TimeSlot::new(time_range, presenter), used)
        }
    }

    fn clean_presenter(&self, raw: &str) -> String {
        let text = normalize_whitespace(raw);
        if self.skip_lines.iter().any(|skip| *skip == text) {
            return String::new();
        }
        self.presenter_trailer.replace(&text, "").trim().to_string()
    }

    /// Lines that start something else and so cannot be a presenter.
    fn is_structural(&self, line: &str) -> bool {
        self.time_range.is_match(line)
            || self.room_heading.is_match(line)
            || line.contains(&self.advisor_label)
            || line.contains(&self.grader_label)
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
