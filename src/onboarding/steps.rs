//! Fixed onboarding step definitions.

use serde::{Deserialize, Serialize};

use crate::types::{
    Availability, CommunicationStyle, CtfExperience, Interest, LearningGoal, OptionSet, PreferredRole,
    SkillLevel, TeamSize, TimeZone,
};

/// How a field collects its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Select,
    MultiSelect,
    Radio,
}

impl FieldKind {
    pub fn is_multi(&self) -> bool {
        matches!(self, FieldKind::MultiSelect)
    }
}

/// Every profile attribute the wizard collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    SkillLevel,
    CtfExperience,
    Interests,
    PreferredRoles,
    PreferredTeamSize,
    Availability,
    CommunicationStyle,
    LearningGoals,
    TimeZone,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::SkillLevel,
        Field::CtfExperience,
        Field::Interests,
        Field::PreferredRoles,
        Field::PreferredTeamSize,
        Field::Availability,
        Field::CommunicationStyle,
        Field::LearningGoals,
        Field::TimeZone,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::SkillLevel => "skill_level",
            Field::CtfExperience => "ctf_experience",
            Field::Interests => "interests",
            Field::PreferredRoles => "preferred_roles",
            Field::PreferredTeamSize => "preferred_team_size",
            Field::Availability => "availability",
            Field::CommunicationStyle => "communication_style",
            Field::LearningGoals => "learning_goals",
            Field::TimeZone => "time_zone",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Interests | Field::PreferredRoles | Field::LearningGoals => FieldKind::MultiSelect,
            Field::PreferredTeamSize => FieldKind::Radio,
            _ => FieldKind::Select,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::SkillLevel => "What is your current skill level in cybersecurity?",
            Field::CtfExperience => "How much experience do you have with CTFs?",
            Field::Interests => "Select your interests",
            Field::PreferredRoles => "What roles are you interested in?",
            Field::PreferredTeamSize => "What team size do you prefer?",
            Field::Availability => "What is your availability?",
            Field::CommunicationStyle => "What is your preferred communication style?",
            Field::LearningGoals => "Select your learning goals",
            Field::TimeZone => "What is your time zone?",
        }
    }

    pub fn options(&self) -> Vec<&'static str> {
        match self {
            Field::SkillLevel => SkillLevel::option_strs(),
            Field::CtfExperience => CtfExperience::option_strs(),
            Field::Interests => Interest::option_strs(),
            Field::PreferredRoles => PreferredRole::option_strs(),
            Field::PreferredTeamSize => TeamSize::option_strs(),
            Field::Availability => Availability::option_strs(),
            Field::CommunicationStyle => CommunicationStyle::option_strs(),
            Field::LearningGoals => LearningGoal::option_strs(),
            Field::TimeZone => TimeZone::option_strs(),
        }
    }

    pub fn accepts(&self, option: &str) -> bool {
        self.options().contains(&option)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub required: bool,
}

const fn required(field: Field) -> FieldSpec {
    FieldSpec { field, required: true }
}

#[derive(Debug)]
pub struct Step {
    pub id: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
}

pub static STEPS: &[Step] = &[
    Step {
        id: 1,
        title: "Let's get to know you",
        description: "Tell us about your experience and interests in cybersecurity",
        fields: &[required(Field::SkillLevel), required(Field::CtfExperience)],
    },
    Step {
        id: 2,
        title: "Your Interests",
        description: "Select the areas of cybersecurity that interest you the most",
        fields: &[required(Field::Interests), required(Field::PreferredRoles)],
    },
    Step {
        id: 3,
        title: "Team Preferences",
        description: "Help us match you with the right team",
        fields: &[
            required(Field::PreferredTeamSize),
            required(Field::Availability),
            required(Field::CommunicationStyle),
        ],
    },
    Step {
        id: 4,
        title: "Learning Goals",
        description: "What do you want to achieve?",
        fields: &[required(Field::LearningGoals), required(Field::TimeZone)],
    },
];

/// Index of the final step
pub fn last_step() -> usize {
    STEPS.len() - 1
}

/// Serializable description of a step for clients rendering the form
#[derive(Debug, Serialize)]
pub struct StepView {
    pub id: u8,
    pub index: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: &'static str,
    pub options: Vec<&'static str>,
    pub required: bool,
}

impl Step {
    pub fn view(&self, index: usize) -> StepView {
        StepView {
            id: self.id,
            index,
            title: self.title,
            description: self.description,
            fields: self
                .fields
                .iter()
                .map(|spec| FieldView {
                    name: spec.field.name(),
                    kind: spec.field.kind(),
                    label: spec.field.label(),
                    options: spec.field.options(),
                    required: spec.required,
                })
                .collect(),
        }
    }
}

pub fn step_views() -> Vec<StepView> {
    STEPS.iter().enumerate().map(|(i, step)| step.view(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_field_appears_in_exactly_one_step() {
        let mut seen = HashSet::new();
        for step in STEPS {
            for spec in step.fields {
                assert!(seen.insert(spec.field), "{} listed twice", spec.field);
            }
        }
        assert_eq!(seen.len(), Field::ALL.len());
    }

    #[test]
    fn field_names_match_serde() {
        for field in Field::ALL {
            let json = serde_json::to_value(field).unwrap();
            assert_eq!(json, serde_json::Value::String(field.name().to_string()));
        }
    }

    #[test]
    fn options_come_from_closed_sets() {
        assert_eq!(Field::SkillLevel.options(), vec!["beginner", "intermediate", "advanced", "expert"]);
        assert_eq!(Field::TimeZone.options().len(), 25);
        assert!(Field::Interests.accepts("OSINT"));
        assert!(!Field::Interests.accepts("osint"));
    }

    #[test]
    fn views_describe_kinds() {
        let views = step_views();
        assert_eq!(views.len(), 4);
        assert_eq!(views[2].fields[0].kind, FieldKind::Radio);
        assert!(views[1].fields.iter().all(|f| f.kind.is_multi()));
        assert_eq!(last_step(), 3);
    }
}
