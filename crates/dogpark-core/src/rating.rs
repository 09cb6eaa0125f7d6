//! Review averages and the five-star glyph row shown in popups.

use serde::Serialize;

/// Width of a rendered rating, in glyphs.
pub const STAR_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StarGlyph {
    Full,
    Half,
    Empty,
}

impl StarGlyph {
    /// Font Awesome markup for this glyph.
    #[must_use]
    pub fn html(self) -> &'static str {
        match self {
            StarGlyph::Full => r#"<i class="fas fa-star"></i>"#,
            StarGlyph::Half => r#"<i class="fas fa-star-half-alt"></i>"#,
            StarGlyph::Empty => r#"<i class="far fa-star"></i>"#,
        }
    }
}

/// Arithmetic mean of the given ratings; `0.0` for an empty slice.
#[must_use]
pub fn average_rating(ratings: &[f64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = ratings.len() as f64;
    ratings.iter().sum::<f64>() / count
}

/// Full stars for the integer part, one half star when the fraction is at
/// least 0.5, empty stars for the rest.
///
/// The rating is clamped to `[0, 5]` first (NaN counts as 0), so the row is
/// always exactly [`STAR_COUNT`] glyphs.
#[must_use]
pub fn star_glyphs(rating: f64) -> [StarGlyph; STAR_COUNT] {
    let rating = if rating.is_nan() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let max = STAR_COUNT as f64;
        rating.clamp(0.0, max)
    };

    let whole = rating.floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let full = whole as usize;
    let half = rating - whole >= 0.5;

    let mut glyphs = [StarGlyph::Empty; STAR_COUNT];
    for glyph in glyphs.iter_mut().take(full) {
        *glyph = StarGlyph::Full;
    }
    if half && full < STAR_COUNT {
        glyphs[full] = StarGlyph::Half;
    }
    glyphs
}

/// Concatenated markup for [`star_glyphs`].
#[must_use]
pub fn render_stars(rating: f64) -> String {
    star_glyphs(rating).iter().map(|g| g.html()).collect()
}
