use std::sync::Arc;

use crate::{models::UserProfile, services::vectorizer::TextEmbedder};

/// Builds query vectors from user profiles
#[derive(Clone)]
pub struct ProfileProjector {
    embedder: Arc<dyn TextEmbedder>,
}

impl ProfileProjector {
    pub fn new(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self { embedder }
    }

    /// Embeds the profile descriptor (see [`descriptor`])
    pub fn project(&self, profile: &UserProfile) -> Vec<f32> {
        self.embedder.embed(&descriptor(profile))
    }
}

/// Joins location, gender label, integer age and the favorite titles with
/// single spaces, in that order. Empty fields still contribute their separator.
pub fn descriptor(profile: &UserProfile) -> String {
    let favorites = profile
        .favorite_movies
        .iter()
        .map(|movie| movie.title.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    [
        profile.location.clone(),
        profile.gender_label().to_string(),
        (profile.age.trunc() as i64).to_string(),
        favorites,
    ]
    .join(" ")
}
