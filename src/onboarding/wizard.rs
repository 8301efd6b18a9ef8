//! Onboarding wizard state machine.
//!
//! Steps advance linearly: `next` only leaves a step whose required fields
//! are filled, and `submit` performs the single terminal profile write from
//! the last step.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::steps::{last_step, Field, Step, STEPS};
use super::{is_completed, DASHBOARD_PATH};
use crate::auth::{current_session, IdentityProvider, Session};
use crate::database::{Profile, ProfileStore, ProfileUpdate, StoreError};
use crate::types::UnknownOption;

/// A collected answer: one option, or a set of options for multi-select fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(BTreeSet<String>),
}

impl FieldValue {
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::One(value) => !value.trim().is_empty(),
            FieldValue::Many(values) => !values.is_empty(),
        }
    }
}

/// Client-held progress through the wizard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: usize,
    #[serde(default)]
    pub values: HashMap<Field, FieldValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Editing,
    Submitting,
    Submitted,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step {0} does not exist")]
    UnknownStep(usize),

    #[error("Field '{field}' expects {expected}")]
    WrongShape { field: Field, expected: &'static str },

    #[error("'{value}' is not an option for '{field}'")]
    InvalidOption { field: Field, value: String },

    #[error("Onboarding can only be submitted from the last step")]
    NotAtLastStep,

    #[error("Step {} is missing required fields", .step + 1)]
    Incomplete { step: usize, missing: Vec<Field> },

    #[error("A submission is already in progress")]
    SubmitInFlight,

    #[error("Onboarding has already been submitted")]
    AlreadySubmitted,

    #[error("Failed to save profile: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a successful submit
#[derive(Debug, Clone)]
pub struct Submitted {
    pub profile: Profile,
    pub redirect: &'static str,
}

#[derive(Debug)]
pub struct Wizard {
    state: WizardState,
    phase: Phase,
    last_error: Option<String>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            state: WizardState::default(),
            phase: Phase::Editing,
            last_error: None,
        }
    }

    /// Rebuild a wizard from client-held state, validating every value.
    ///
    /// Every step before `state.step` must be complete, as if it had been
    /// left through `next`; the first gap is reported as `Incomplete`.
    pub fn resume(state: WizardState) -> Result<Self, WizardError> {
        if state.step >= STEPS.len() {
            return Err(WizardError::UnknownStep(state.step));
        }

        let mut wizard = Wizard {
            state: WizardState { step: state.step, values: HashMap::new() },
            phase: Phase::Editing,
            last_error: None,
        };
        for (field, value) in state.values {
            wizard.set_field(field, value)?;
        }
        if let Some(step) = (0..wizard.state.step).find(|&step| !wizard.is_step_complete(step)) {
            return Err(WizardError::Incomplete { step, missing: wizard.missing_fields(step) });
        }
        Ok(wizard)
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn into_state(self) -> WizardState {
        self.state
    }

    pub fn step(&self) -> usize {
        self.state.step
    }

    pub fn current_step(&self) -> &'static Step {
        &STEPS[self.state.step]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn value(&self, field: Field) -> Option<&FieldValue> {
        self.state.values.get(&field)
    }

    /// Record an answer; never changes the current step
    pub fn set_field(&mut self, field: Field, value: FieldValue) -> Result<(), WizardError> {
        if self.phase == Phase::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }

        match (&value, field.kind().is_multi()) {
            (FieldValue::One(option), false) => {
                if !option.is_empty() && !field.accepts(option) {
                    return Err(WizardError::InvalidOption { field, value: option.clone() });
                }
            }
            (FieldValue::Many(options), true) => {
                if let Some(bad) = options.iter().find(|o| !field.accepts(o)) {
                    return Err(WizardError::InvalidOption { field, value: bad.clone() });
                }
            }
            (_, true) => return Err(WizardError::WrongShape { field, expected: "a list of options" }),
            (_, false) => return Err(WizardError::WrongShape { field, expected: "a single option" }),
        }

        self.state.values.insert(field, value);
        Ok(())
    }

    /// Required fields of `step` that are not yet filled
    pub fn missing_fields(&self, step: usize) -> Vec<Field> {
        STEPS
            .get(step)
            .map(|s| {
                s.fields
                    .iter()
                    .filter(|spec| spec.required)
                    .filter(|spec| !self.value(spec.field).is_some_and(FieldValue::is_filled))
                    .map(|spec| spec.field)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_step_complete(&self, step: usize) -> bool {
        step < STEPS.len() && self.missing_fields(step).is_empty()
    }

    pub fn is_last_step(&self) -> bool {
        self.state.step == last_step()
    }

    /// Advance one step; returns whether the step changed
    pub fn next(&mut self) -> bool {
        if self.phase != Phase::Editing || self.is_last_step() || !self.is_step_complete(self.state.step) {
            return false;
        }
        self.state.step += 1;
        true
    }

    /// Go back one step; returns whether the step changed
    pub fn previous(&mut self) -> bool {
        if self.phase != Phase::Editing || self.state.step == 0 {
            return false;
        }
        self.state.step -= 1;
        true
    }

    /// Typed profile write for the collected answers
    pub fn profile_update(&self) -> Result<ProfileUpdate, WizardError> {
        Ok(ProfileUpdate {
            skill_level: self.one(Field::SkillLevel)?,
            ctf_experience: self.one(Field::CtfExperience)?,
            interests: self.many(Field::Interests)?,
            preferred_roles: self.many(Field::PreferredRoles)?,
            preferred_team_size: self.one(Field::PreferredTeamSize)?,
            availability: self.one(Field::Availability)?,
            communication_style: self.one(Field::CommunicationStyle)?,
            learning_goals: self.many(Field::LearningGoals)?,
            time_zone: self.one(Field::TimeZone)?,
            onboarding_completed: Some(true),
        })
    }

    fn one<T: FromStr<Err = UnknownOption>>(&self, field: Field) -> Result<Option<T>, WizardError> {
        match self.value(field) {
            Some(FieldValue::One(v)) if !v.is_empty() => v
                .parse()
                .map(Some)
                .map_err(|e: UnknownOption| WizardError::InvalidOption { field, value: e.value }),
            _ => Ok(None),
        }
    }

    fn many<T: FromStr<Err = UnknownOption> + Ord>(&self, field: Field) -> Result<Option<BTreeSet<T>>, WizardError> {
        match self.value(field) {
            Some(FieldValue::Many(vs)) if !vs.is_empty() => vs
                .iter()
                .map(|v| v.parse())
                .collect::<Result<BTreeSet<T>, _>>()
                .map(Some)
                .map_err(|e: UnknownOption| WizardError::InvalidOption { field, value: e.value }),
            _ => Ok(None),
        }
    }

    /// Perform the terminal upsert.
    ///
    /// On a store failure the wizard returns to editing with its answers
    /// intact so the caller may submit again. Dropping the future before the
    /// store answers also returns it to editing.
    pub async fn submit(&mut self, store: &dyn ProfileStore, user_id: Uuid) -> Result<Submitted, WizardError> {
        match self.phase {
            Phase::Submitted => return Err(WizardError::AlreadySubmitted),
            Phase::Submitting => return Err(WizardError::SubmitInFlight),
            Phase::Editing => {}
        }
        if !self.is_last_step() {
            return Err(WizardError::NotAtLastStep);
        }
        let missing = self.missing_fields(self.state.step);
        if !missing.is_empty() {
            return Err(WizardError::Incomplete { step: self.state.step, missing });
        }

        let update = self.profile_update()?;

        self.last_error = None;
        let in_flight = InFlight::begin(&mut self.phase);

        match store.upsert_profile(user_id, &update).await {
            Ok(profile) => {
                in_flight.settle(Phase::Submitted);
                tracing::info!("User {} completed onboarding", user_id);
                Ok(Submitted { profile, redirect: DASHBOARD_PATH })
            }
            Err(e) => {
                in_flight.settle(Phase::Editing);
                tracing::warn!("Onboarding submit for user {} failed: {}", user_id, e);
                self.last_error = Some(e.to_string());
                Err(WizardError::Store(e))
            }
        }
    }
}

/// Holds the wizard in `Submitting` while the store write is pending
struct InFlight<'a> {
    phase: &'a mut Phase,
}

impl<'a> InFlight<'a> {
    fn begin(phase: &'a mut Phase) -> Self {
        *phase = Phase::Submitting;
        Self { phase }
    }

    fn settle(mut self, outcome: Phase) {
        *self.phase = outcome;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.phase == Phase::Submitting {
            *self.phase = Phase::Editing;
        }
    }
}

/// What a client should do when opening the wizard
#[derive(Debug)]
pub enum WizardEntry {
    RedirectLogin,
    RedirectDashboard,
    Start { session: Session, wizard: Wizard },
}

/// Entry guard: only authenticated users without a completed profile may
/// see the steps.
pub async fn enter(
    identity: &dyn IdentityProvider,
    profiles: &dyn ProfileStore,
    token: Option<&str>,
) -> WizardEntry {
    let session = match current_session(identity, token).await {
        Ok(Some(session)) => session,
        Ok(None) => return WizardEntry::RedirectLogin,
        Err(e) => {
            tracing::debug!("Onboarding entry without a valid session: {}", e);
            return WizardEntry::RedirectLogin;
        }
    };

    match is_completed(profiles, session.user_id).await {
        Ok(true) => WizardEntry::RedirectDashboard,
        Ok(false) => WizardEntry::Start { session, wizard: Wizard::new() },
        Err(e) => {
            tracing::error!("Cannot determine onboarding state for {}: {}", session.user_id, e);
            WizardEntry::RedirectLogin
        }
    }
}
