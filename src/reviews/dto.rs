use serde::Deserialize;

use crate::error::AppError;
use crate::notice::Notice;
use crate::reviews::repo_types::ReviewFields;

/// Review form as submitted; rating stays text until validated.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub title: String,
    pub genre: String,
    pub rating: String,
    pub content: String,
}

impl ReviewForm {
    /// Parses the rating as a whole number. Any integer is accepted.
    pub fn into_fields(self, back_to: &str) -> Result<ReviewFields, AppError> {
        let rating = self
            .rating
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::bad_input(Notice::RatingNotInteger, back_to))?;
        Ok(ReviewFields {
            title: self.title,
            genre: self.genre,
            rating,
            content: self.content,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
