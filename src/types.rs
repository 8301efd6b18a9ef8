//! Shared profile option types used across the codebase
//!
//! Every multiple-choice profile attribute is a closed set. Values cross the
//! HTTP and database boundaries as the exact option strings shown to users.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A string that is not a member of a closed option set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// Common surface of the closed option enums
pub trait OptionSet: Sized + Copy + FromStr<Err = UnknownOption> + 'static {
    /// Every member, in display order
    fn all() -> &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Option strings in display order
    fn option_strs() -> Vec<&'static str> {
        Self::all().iter().map(|option| option.as_str()).collect()
    }
}

macro_rules! option_set {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl OptionSet for $name {
            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownOption { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

option_set!(
    /// Self-assessed cybersecurity skill
    SkillLevel, "skill level" {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
        Expert => "expert",
    }
);

option_set!(
    CtfExperience, "CTF experience" {
        None => "none",
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
        Expert => "expert",
    }
);

option_set!(
    Interest, "interest" {
        WebSecurity => "Web Security",
        ReverseEngineering => "Reverse Engineering",
        BinaryExploitation => "Binary Exploitation",
        Cryptography => "Cryptography",
        Forensics => "Forensics",
        NetworkSecurity => "Network Security",
        Osint => "OSINT",
        MobileSecurity => "Mobile Security",
    }
);

option_set!(
    PreferredRole, "team role" {
        TeamLeader => "Team Leader",
        TechnicalLead => "Technical Lead",
        Researcher => "Researcher",
        Developer => "Developer",
        Analyst => "Analyst",
        Documentation => "Documentation",
    }
);

option_set!(
    TeamSize, "team size" {
        Small => "small",
        Medium => "medium",
        Large => "large",
    }
);

option_set!(
    Availability, "availability" {
        PartTime => "part_time",
        FullTime => "full_time",
        WeekendsOnly => "weekends_only",
        Flexible => "flexible",
    }
);

option_set!(
    CommunicationStyle, "communication style" {
        Async => "async",
        Sync => "sync",
        Mixed => "mixed",
    }
);

option_set!(
    LearningGoal, "learning goal" {
        ImproveTechnicalSkills => "Improve technical skills",
        LearnSecurityConcepts => "Learn new security concepts",
        BuildPortfolio => "Build a portfolio",
        Networking => "Network with others",
        Certifications => "Prepare for certifications",
        WinCompetitions => "Win competitions",
        SecurityCareer => "Start a career in security",
    }
);

/// Whole-hour UTC offset, written as `UTC+05:00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeZone(i8);

impl TimeZone {
    pub const MIN_OFFSET: i8 = -12;
    pub const MAX_OFFSET: i8 = 12;

    pub const ALL: &'static [TimeZone] = &[
        TimeZone(-12), TimeZone(-11), TimeZone(-10), TimeZone(-9), TimeZone(-8),
        TimeZone(-7), TimeZone(-6), TimeZone(-5), TimeZone(-4), TimeZone(-3),
        TimeZone(-2), TimeZone(-1), TimeZone(0), TimeZone(1), TimeZone(2),
        TimeZone(3), TimeZone(4), TimeZone(5), TimeZone(6), TimeZone(7),
        TimeZone(8), TimeZone(9), TimeZone(10), TimeZone(11), TimeZone(12),
    ];

    pub fn from_offset(hours: i8) -> Option<Self> {
        (Self::MIN_OFFSET..=Self::MAX_OFFSET)
            .contains(&hours)
            .then_some(TimeZone(hours))
    }

    pub fn offset_hours(&self) -> i8 {
        self.0
    }
}

impl OptionSet for TimeZone {
    fn all() -> &'static [Self] {
        Self::ALL
    }

    fn as_str(&self) -> &'static str {
        const LABELS: [&str; 25] = [
            "UTC-12:00", "UTC-11:00", "UTC-10:00", "UTC-09:00", "UTC-08:00",
            "UTC-07:00", "UTC-06:00", "UTC-05:00", "UTC-04:00", "UTC-03:00",
            "UTC-02:00", "UTC-01:00", "UTC+00:00", "UTC+01:00", "UTC+02:00",
            "UTC+03:00", "UTC+04:00", "UTC+05:00", "UTC+06:00", "UTC+07:00",
            "UTC+08:00", "UTC+09:00", "UTC+10:00", "UTC+11:00", "UTC+12:00",
        ];
        LABELS[(self.0 - Self::MIN_OFFSET) as usize]
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeZone {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownOption { kind: "time zone", value: s.to_string() };

        let rest = s.strip_prefix("UTC").ok_or_else(unknown)?;
        let (sign, digits) = if let Some(digits) = rest.strip_prefix('+') {
            (1i8, digits)
        } else if let Some(digits) = rest.strip_prefix('-') {
            (-1i8, digits)
        } else {
            return Err(unknown());
        };
        let hours = digits.strip_suffix(":00").ok_or_else(unknown)?;
        if hours.len() != 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unknown());
        }
        let hours: i8 = hours.parse().map_err(|_| unknown())?;

        TimeZone::from_offset(sign * hours).ok_or_else(unknown)
    }
}

impl TryFrom<String> for TimeZone {
    type Error = UnknownOption;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeZone> for String {
    fn from(value: TimeZone) -> Self {
        value.as_str().to_string()
    }
}
