use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Bucket that selects the question pool a child is tested on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "7-10")]
    SevenToTen,
    #[serde(rename = "11-14")]
    ElevenToFourteen,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 2] = [AgeGroup::SevenToTen, AgeGroup::ElevenToFourteen];

    pub fn from_age(age: u8) -> Option<Self> {
        match age {
            7..=10 => Some(Self::SevenToTen),
            11..=14 => Some(Self::ElevenToFourteen),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenToTen => "7-10",
            Self::ElevenToFourteen => "11-14",
        }
    }

    pub fn label(&self) -> String {
        format!("{} yosh", self.as_str())
    }

    pub fn other(&self) -> Self {
        match self {
            Self::SevenToTen => Self::ElevenToFourteen,
            Self::ElevenToFourteen => Self::SevenToTen,
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = ValidationError;

    // Older exports spelled the range with an en dash and a "yosh" suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .trim_end_matches("yosh")
            .trim()
            .replace('–', "-");
        match normalized.as_str() {
            "7-10" => Ok(Self::SevenToTen),
            "11-14" => Ok(Self::ElevenToFourteen),
            _ => Err(ValidationError::UnknownAgeGroup(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub child_name: String,
    pub parent_name: String,
    pub phone: String,
    pub age: u8,
    pub age_group: AgeGroup,
    pub region: String,
    pub district: String,
    pub mahalla: String,
    pub telegram_username: Option<String>,
    pub telegram_name: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn address(&self) -> String {
        format!("{}, {}, {}", self.region, self.district, self.mahalla)
    }
}

/// Anyone who pressed /start, registered or not. Broadcasts go to them too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotUser {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub age_group: AgeGroup,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn correct_text(&self) -> &str {
        self.options
            .get(self.correct_option)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

/// A question that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    text: String,
    options: Vec<String>,
    correct_option: usize,
    age_group: AgeGroup,
}

impl NewQuestion {
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_option: usize,
        age_group: AgeGroup,
    ) -> Result<Self, ValidationError> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(ValidationError::Empty("question"));
        }
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(ValidationError::OptionCount(options.len()));
        }
        if correct_option >= options.len() {
            return Err(ValidationError::CorrectOutOfRange {
                index: correct_option,
                len: options.len(),
            });
        }

        Ok(Self {
            text,
            options,
            correct_option,
            age_group,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    pub fn age_group(&self) -> AgeGroup {
        self.age_group
    }

    pub fn into_question(self, id: Uuid, created_at: DateTime<Utc>) -> Question {
        Question {
            id,
            text: self.text,
            options: self.options,
            correct_option: self.correct_option,
            age_group: self.age_group,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: Uuid,
    pub chosen: Option<usize>,
    pub correct: bool,
    pub timed_out: bool,
    pub seconds_taken: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTestResult {
    pub user_id: i64,
    pub age_group: AgeGroup,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: f64,
    pub duration_seconds: i64,
    pub answers: Vec<AnswerRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: Uuid,
    pub user_id: i64,
    pub age_group: AgeGroup,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: f64,
    pub duration_seconds: i64,
    pub answers: Vec<AnswerRecord>,
    pub completed_at: DateTime<Utc>,
}

impl TestResult {
    pub fn from_new(new: NewTestResult, id: Uuid, completed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            age_group: new.age_group,
            total_questions: new.total_questions,
            correct_answers: new.correct_answers,
            percentage: new.percentage,
            duration_seconds: new.duration_seconds,
            answers: new.answers,
            completed_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl FromStr for AdminRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(ValidationError::UnknownRole(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub user_id: i64,
    pub role: AdminRole,
    /// `None` for the entry bootstrapped from configuration.
    pub added_by: Option<i64>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub user_id: i64,
    pub text: String,
    pub phone: Option<String>,
    pub telegram_username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: i64,
    pub text: String,
    pub phone: Option<String>,
    pub telegram_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastRecord {
    pub id: Uuid,
    pub admin_id: i64,
    pub text: String,
    pub sent: u32,
    pub failed: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_group_from_age_boundaries() {
        assert_eq!(AgeGroup::from_age(6), None);
        assert_eq!(AgeGroup::from_age(7), Some(AgeGroup::SevenToTen));
        assert_eq!(AgeGroup::from_age(10), Some(AgeGroup::SevenToTen));
        assert_eq!(AgeGroup::from_age(11), Some(AgeGroup::ElevenToFourteen));
        assert_eq!(AgeGroup::from_age(14), Some(AgeGroup::ElevenToFourteen));
        assert_eq!(AgeGroup::from_age(15), None);
    }

    #[test]
    fn age_group_parses_legacy_spellings() {
        assert_eq!("7-10".parse::<AgeGroup>().unwrap(), AgeGroup::SevenToTen);
        assert_eq!("7–10 yosh".parse::<AgeGroup>().unwrap(), AgeGroup::SevenToTen);
        assert_eq!("11–14".parse::<AgeGroup>().unwrap(), AgeGroup::ElevenToFourteen);
        assert!("15-18".parse::<AgeGroup>().is_err());
    }

    #[test]
    fn age_group_serializes_as_range() {
        let json = serde_json::to_string(&AgeGroup::ElevenToFourteen).unwrap();
        assert_eq!(json, "\"11-14\"");
    }

    #[test]
    fn new_question_rejects_out_of_range_answer() {
        let options = vec!["a".to_owned(), "b".to_owned()];
        let err = NewQuestion::new("Savol matni?", options, 2, AgeGroup::SevenToTen).unwrap_err();
        assert!(matches!(err, ValidationError::CorrectOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn new_question_rejects_too_many_options() {
        let options = (0..5).map(|i| i.to_string()).collect();
        assert!(NewQuestion::new("Savol matni?", options, 0, AgeGroup::SevenToTen).is_err());
    }
}
