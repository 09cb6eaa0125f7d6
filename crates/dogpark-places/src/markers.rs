//! Live marker set and popup state.
//!
//! [`MarkerBoard`] is the single owner of the markers currently on the map.
//! Every search starts with [`MarkerBoard::clear_all`], which also bumps the
//! board's generation. Markers are added against the [`SearchTicket`] of the
//! search that produced them, so results from a superseded search that arrive
//! late are dropped instead of lingering next to the new ones.

use std::sync::Arc;

use dogpark_core::LatLng;
use serde::Serialize;
use tokio::sync::Mutex;

/// Board shared between the pipeline and whoever renders it.
pub type SharedBoard = Arc<Mutex<MarkerBoard>>;

/// One pin on the map with its rendered popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerEntry {
    pub place_id: String,
    pub location: LatLng,
    pub title: String,
    pub popup_html: String,
    /// `None` when the place has no reviews.
    pub average_rating: Option<f64>,
    pub review_count: usize,
}

/// Identifies the search a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchTicket(u64);

#[derive(Debug, Default)]
pub struct MarkerBoard {
    markers: Vec<MarkerEntry>,
    open_popup: Option<usize>,
    generation: u64,
}

/// Serializable view of the board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub markers: Vec<MarkerEntry>,
    /// Index into `markers` of the marker whose popup is open.
    pub open_popup: Option<usize>,
}

impl MarkerBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> SharedBoard {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Closes any open popup, removes every marker, and starts a new search
    /// generation. Safe to call on an empty board.
    pub fn clear_all(&mut self) -> SearchTicket {
        self.open_popup = None;
        let removed = self.markers.len();
        self.markers.clear();
        self.generation += 1;
        tracing::debug!(removed, generation = self.generation, "cleared markers");
        self.current_ticket()
    }

    #[must_use]
    pub fn current_ticket(&self) -> SearchTicket {
        SearchTicket(self.generation)
    }

    /// Appends a marker to the current generation.
    pub fn add(&mut self, marker: MarkerEntry) {
        self.markers.push(marker);
    }

    /// Appends `marker` if `ticket` is still the current generation.
    ///
    /// Returns `false` (and drops the marker) when a newer search has cleared
    /// the board since the ticket was issued.
    pub fn add_for(&mut self, ticket: SearchTicket, marker: MarkerEntry) -> bool {
        if ticket != self.current_ticket() {
            tracing::debug!(
                place_id = %marker.place_id,
                "dropping marker from superseded search"
            );
            return false;
        }
        self.add(marker);
        true
    }

    /// Opens the popup of the first marker for `place_id`, closing any other.
    pub fn select(&mut self, place_id: &str) -> Option<&MarkerEntry> {
        let index = self.markers.iter().position(|m| m.place_id == place_id)?;
        self.open_popup = Some(index);
        self.markers.get(index)
    }

    /// Background click on the map: closes the open popup.
    ///
    /// Returns whether a popup was open.
    pub fn click_map(&mut self) -> bool {
        self.open_popup.take().is_some()
    }

    #[must_use]
    pub fn open_popup(&self) -> Option<&MarkerEntry> {
        self.open_popup.and_then(|i| self.markers.get(i))
    }

    #[must_use]
    pub fn markers(&self) -> &[MarkerEntry] {
        &self.markers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            markers: self.markers.clone(),
            open_popup: self.open_popup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(place_id: &str) -> MarkerEntry {
        MarkerEntry {
            place_id: place_id.to_string(),
            location: LatLng::new(59.3, 18.0),
            title: format!("Park {place_id}"),
            popup_html: String::new(),
            average_rating: None,
            review_count: 0,
        }
    }

    #[test]
    fn clear_all_is_idempotent() {
        let mut board = MarkerBoard::new();
        board.add(marker("a"));
        board.clear_all();
        assert!(board.is_empty());
        board.clear_all();
        assert!(board.is_empty());
        assert!(board.open_popup().is_none());
    }

    #[test]
    fn clear_all_closes_open_popup() {
        let mut board = MarkerBoard::new();
        board.add(marker("a"));
        board.select("a");
        assert!(board.open_popup().is_some());
        board.clear_all();
        assert!(board.open_popup().is_none());
    }

    #[test]
    fn add_keeps_insertion_order_and_duplicates() {
        let mut board = MarkerBoard::new();
        for id in ["b", "a", "b"] {
            board.add(marker(id));
        }
        let ids: Vec<&str> = board.markers().iter().map(|m| m.place_id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "b"]);
    }

    #[test]
    fn selecting_a_marker_closes_the_previous_popup() {
        let mut board = MarkerBoard::new();
        board.add(marker("a"));
        board.add(marker("b"));

        board.select("a");
        assert_eq!(board.open_popup().map(|m| m.place_id.as_str()), Some("a"));

        board.select("b");
        assert_eq!(board.open_popup().map(|m| m.place_id.as_str()), Some("b"));
        assert_eq!(board.snapshot().open_popup, Some(1));
    }

    #[test]
    fn selecting_unknown_marker_leaves_popup_unchanged() {
        let mut board = MarkerBoard::new();
        board.add(marker("a"));
        board.select("a");
        assert!(board.select("zzz").is_none());
        assert_eq!(board.open_popup().map(|m| m.place_id.as_str()), Some("a"));
    }

    #[test]
    fn map_click_closes_open_popup() {
        let mut board = MarkerBoard::new();
        board.add(marker("a"));
        assert!(!board.click_map());
        board.select("a");
        assert!(board.click_map());
        assert!(board.open_popup().is_none());
    }

    #[test]
    fn stale_ticket_markers_are_dropped() {
        let mut board = MarkerBoard::new();
        let first = board.clear_all();
        assert!(board.add_for(first, marker("first")));

        let second = board.clear_all();
        assert_ne!(first, second);
        assert!(!board.add_for(first, marker("late")));
        assert!(board.add_for(second, marker("fresh")));

        let ids: Vec<&str> = board.markers().iter().map(|m| m.place_id.as_str()).collect();
        assert_eq!(ids, ["fresh"]);
    }
}
