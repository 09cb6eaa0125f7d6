//! Popup HTML for a dog park marker.
//!
//! The markup mirrors what the map front end styles: a `popup-content` wrapper,
//! an optional photo, the bold name, the address, a `stars` row and up to
//! [`REVIEWS_SHOWN`] quoted review snippets. All text coming from the Places
//! API is escaped before it is embedded.

use dogpark_core::{average_rating, render_stars};
use quick_xml::escape::escape;

use crate::types::PlaceDetail;

pub const FALLBACK_NAME: &str = "Dog Park";
pub const NO_REVIEW_TEXT: &str = "No review text";
pub const NO_REVIEWS: &str = "No reviews available.";

/// Number of review texts rendered below the stars.
pub const REVIEWS_SHOWN: usize = 2;

/// Renders popup HTML for `detail`.
///
/// `photo_url` is the media URL of the first photo, if the place has one;
/// `photo_px` sets the rendered image size.
#[must_use]
pub fn render_popup(detail: &PlaceDetail, photo_url: Option<&str>, photo_px: u32) -> String {
    let mut html = String::from(r#"<div class="popup-content">"#);

    if let Some(url) = photo_url {
        html.push_str(&format!(
            r#"<img height="{photo_px}px" width="{photo_px}px" src="{}" alt="Dog Park Photo" class="popup-image"><br>"#,
            escape(url)
        ));
    }

    html.push_str(&format!(
        "<b>{}</b><br>{}<br>",
        escape(detail.name().unwrap_or(FALLBACK_NAME)),
        escape(detail.formatted_address.as_deref().unwrap_or_default())
    ));

    if detail.reviews.is_empty() {
        html.push_str(&format!("<p>{NO_REVIEWS}</p>"));
    } else {
        let rating = average_rating(&detail.ratings());
        html.push_str(&format!(
            r#"<div class="stars">{}</div><span>({} reviews)</span><br>"#,
            render_stars(rating),
            detail.reviews.len()
        ));
        let snippets = detail
            .reviews
            .iter()
            .take(REVIEWS_SHOWN)
            .map(|review| {
                format!(
                    r#"<p><i>"{}"</i></p>"#,
                    escape(review.body().unwrap_or(NO_REVIEW_TEXT))
                )
            })
            .collect::<String>();
        html.push_str(&snippets);
    }

    html.push_str("</div>");
    html
}
