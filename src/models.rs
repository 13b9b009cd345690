pub use crate::entities::movie::Model as Movie;

/// A record about to be created from a catalog entry. The store assigns the id,
/// the rating starts at 0 (unrated) and the ranking stays unset until the next listing.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i32>,
    pub description: String,
    pub img_url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RatingEdit {
    pub rating: f64,
    pub review: String,
}

impl RatingEdit {
    pub fn apply(self, movie: Movie) -> Movie {
        Movie { rating: self.rating, review: Some(self.review), ..movie }
    }
}
