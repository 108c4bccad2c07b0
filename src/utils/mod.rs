//! Utility functions and helpers.

pub mod http;
pub mod progress;
pub mod text;

use url::Url;

use crate::error::Result;

/// Deep link to a room's anchor on the schedule page.
pub fn room_link(base_url: &str, room_id: &str) -> Result<String> {
    let mut url = Url::parse(base_url)?;
    url.set_fragment(Some(room_id));
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_link() {
        assert_eq!(
            room_link("https://symposium.orfe.princeton.edu", "001").unwrap(),
            "https://symposium.orfe.princeton.edu/#001"
        );
        assert_eq!(
            room_link("https://example.com/schedule", "110").unwrap(),
            "https://example.com/schedule#110"
        );
    }

    #[test]
    fn test_room_link_replaces_existing_fragment() {
        assert_eq!(
            room_link("https://example.com/page#top", "003").unwrap(),
            "https://example.com/page#003"
        );
    }

    #[test]
    fn test_room_link_rejects_relative_base() {
        assert!(room_link("schedule.html", "001").is_err());
    }
}
