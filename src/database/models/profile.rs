use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{
    Availability, CommunicationStyle, CtfExperience, Interest, LearningGoal, OptionSet, PreferredRole,
    SkillLevel, TeamSize, TimeZone, UnknownOption,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub onboarding_completed: bool,
    pub skill_level: Option<SkillLevel>,
    pub ctf_experience: Option<CtfExperience>,
    pub interests: Option<BTreeSet<Interest>>,
    pub preferred_roles: Option<BTreeSet<PreferredRole>>,
    pub preferred_team_size: Option<TeamSize>,
    pub availability: Option<Availability>,
    pub communication_style: Option<CommunicationStyle>,
    pub learning_goals: Option<BTreeSet<LearningGoal>>,
    pub time_zone: Option<TimeZone>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Fresh row created on a user's first session exchange
    pub fn new(id: Uuid, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            onboarding_completed: false,
            skill_level: None,
            ctf_experience: None,
            interests: None,
            preferred_roles: None,
            preferred_team_size: None,
            availability: None,
            communication_style: None,
            learning_goals: None,
            time_zone: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update; unset fields keep their value and the
    /// onboarding flag only ever moves from false to true.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        macro_rules! merge {
            ($target:expr, $source:expr; $($field:ident),+) => {
                $(
                    if let Some(value) = &$source.$field {
                        $target.$field = Some(value.clone());
                    }
                )+
            };
        }

        merge!(
            self, update;
            skill_level,
            ctf_experience,
            interests,
            preferred_roles,
            preferred_team_size,
            availability,
            communication_style,
            learning_goals,
            time_zone
        );

        if update.onboarding_completed == Some(true) {
            self.onboarding_completed = true;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial profile write; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub skill_level: Option<SkillLevel>,
    pub ctf_experience: Option<CtfExperience>,
    pub interests: Option<BTreeSet<Interest>>,
    pub preferred_roles: Option<BTreeSet<PreferredRole>>,
    pub preferred_team_size: Option<TeamSize>,
    pub availability: Option<Availability>,
    pub communication_style: Option<CommunicationStyle>,
    pub learning_goals: Option<BTreeSet<LearningGoal>>,
    pub time_zone: Option<TimeZone>,
    pub onboarding_completed: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

/// User-editable profile fields; the onboarding flag is not among them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileEdit {
    #[serde(default)]
    pub skill_level: Option<SkillLevel>,
    #[serde(default)]
    pub ctf_experience: Option<CtfExperience>,
    #[serde(default)]
    pub interests: Option<BTreeSet<Interest>>,
    #[serde(default)]
    pub preferred_roles: Option<BTreeSet<PreferredRole>>,
    #[serde(default)]
    pub preferred_team_size: Option<TeamSize>,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub communication_style: Option<CommunicationStyle>,
    #[serde(default)]
    pub learning_goals: Option<BTreeSet<LearningGoal>>,
    #[serde(default)]
    pub time_zone: Option<TimeZone>,
}

impl From<ProfileEdit> for ProfileUpdate {
    fn from(edit: ProfileEdit) -> Self {
        ProfileUpdate {
            skill_level: edit.skill_level,
            ctf_experience: edit.ctf_experience,
            interests: edit.interests,
            preferred_roles: edit.preferred_roles,
            preferred_team_size: edit.preferred_team_size,
            availability: edit.availability,
            communication_style: edit.communication_style,
            learning_goals: edit.learning_goals,
            time_zone: edit.time_zone,
            onboarding_completed: None,
        }
    }
}

/// Raw `profiles` row; option columns are stored as text and text[]
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: Option<String>,
    pub onboarding_completed: bool,
    pub skill_level: Option<String>,
    pub ctf_experience: Option<String>,
    pub interests: Option<Vec<String>>,
    pub preferred_roles: Option<Vec<String>>,
    pub preferred_team_size: Option<String>,
    pub availability: Option<String>,
    pub communication_style: Option<String>,
    pub learning_goals: Option<Vec<String>>,
    pub time_zone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_one<T: FromStr<Err = UnknownOption>>(value: Option<String>) -> Result<Option<T>, UnknownOption> {
    value.map(|v| v.parse()).transpose()
}

fn parse_set<T: FromStr<Err = UnknownOption> + Ord>(
    values: Option<Vec<String>>,
) -> Result<Option<BTreeSet<T>>, UnknownOption> {
    values
        .map(|vs| vs.iter().map(|v| v.parse()).collect::<Result<BTreeSet<T>, _>>())
        .transpose()
}

impl TryFrom<ProfileRow> for Profile {
    type Error = UnknownOption;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: row.id,
            email: row.email,
            onboarding_completed: row.onboarding_completed,
            skill_level: parse_one(row.skill_level)?,
            ctf_experience: parse_one(row.ctf_experience)?,
            interests: parse_set(row.interests)?,
            preferred_roles: parse_set(row.preferred_roles)?,
            preferred_team_size: parse_one(row.preferred_team_size)?,
            availability: parse_one(row.availability)?,
            communication_style: parse_one(row.communication_style)?,
            learning_goals: parse_set(row.learning_goals)?,
            time_zone: parse_one(row.time_zone)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Column text for an optional single-valued option
pub fn option_text<T: OptionSet>(value: &Option<T>) -> Option<&'static str> {
    value.as_ref().map(|v| v.as_str())
}

/// Column array for an optional set-valued option
pub fn option_array<T: OptionSet>(values: &Option<BTreeSet<T>>) -> Option<Vec<String>> {
    values
        .as_ref()
        .map(|set| set.iter().map(|v| v.as_str().to_string()).collect())
}
