use serde::{Deserialize, Serialize};

use super::Movie;

/// Gender picked during onboarding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    #[serde(rename = "Male")]
    Male,
    #[serde(rename = "Female")]
    Female,
    #[serde(rename = "Non-binary")]
    NonBinary,
    #[serde(rename = "Prefer not to say")]
    PreferNotToSay,
}

impl Gender {
    /// Human readable label, also the text used for profile projection
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::NonBinary => "Non-binary",
            Gender::PreferNotToSay => "Prefer not to say",
        }
    }
}

/// User attributes the recommender projects into a query vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub favorite_movies: Vec<Movie>,
}

impl UserProfile {
    pub fn gender_label(&self) -> &'static str {
        self.gender.map(|g| g.label()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_serialization_uses_labels() {
        let json = serde_json::to_string(&Gender::NonBinary).unwrap();
        assert_eq!(json, "\"Non-binary\"");

        let parsed: Gender = serde_json::from_str("\"Prefer not to say\"").unwrap();
        assert_eq!(parsed, Gender::PreferNotToSay);
    }

    #[test]
    fn test_profile_fields_default_when_missing() {
        let profile: UserProfile = serde_json::from_str(r#"{"location": "Pune"}"#).unwrap();
        assert_eq!(profile.location, "Pune");
        assert_eq!(profile.gender, None);
        assert_eq!(profile.gender_label(), "");
        assert!(profile.favorite_movies.is_empty());
    }
}
