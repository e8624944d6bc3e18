// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile shaping: `Shape(response, profile) -> response`. A
//! closed enum with a constant shaping-parameter table, the same data-driven-table idiom as
//! `store::notification`'s priority/threshold tables.

use std::str::FromStr;

/// Confirmation policy a profile forces on write-class handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationPolicy {
    Always,
    SideEffectsOnly,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Workout,
    Kitchen,
    Commute,
    Default,
}

impl FromStr for Profile {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "workout" => Ok(Self::Workout),
            "kitchen" => Ok(Self::Kitchen),
            "commute" => Ok(Self::Commute),
            "default" => Ok(Self::Default),
            _ => Err(()),
        }
    }
}

impl Profile {
    /// Falls back to `Default` for anything unrecognized rather than
    /// rejecting the request outright — an unknown `profile` string should
    /// degrade gracefully, not break the command pipeline.
    pub fn parse_or_default(s: &str) -> Self {
        Self::from_str(s).unwrap_or(Self::Default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workout => "workout",
            Self::Kitchen => "kitchen",
            Self::Commute => "commute",
            Self::Default => "default",
        }
    }

    /// Max spoken word count.
    pub fn max_words(&self) -> usize {
        match self {
            Self::Workout => 15,
            Self::Kitchen => 40,
            Self::Commute => 30,
            Self::Default => 25,
        }
    }

    /// Speech rate hint passed through to TTS in `response.speech_rate`.
    /// Workout and commute run faster to fit more into a shorter cap;
    /// kitchen and default speak at a normal pace.
    pub fn speech_rate(&self) -> f32 {
        match self {
            Self::Workout => 1.15,
            Self::Commute => 1.05,
            Self::Kitchen => 1.0,
            Self::Default => 1.0,
        }
    }

    /// Confirmation policy override. Commute is unspecified
    /// by the table; treated like default since it carries no stricter
    /// stated requirement.
    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        match self {
            Self::Workout | Self::Kitchen => ConfirmationPolicy::Always,
            Self::Commute | Self::Default => ConfirmationPolicy::SideEffectsOnly,
        }
    }
}

/// Truncate `text` at the word cap, preserving sentence boundaries where
/// possible: truncate at the last period within the cap, else
/// hard-cut and append an ellipsis. Cards are unaffected — callers shape
/// only the spoken text.
pub fn shape(text: &str, profile: Profile) -> String {
    let cap = profile.max_words();
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= cap {
        return text.to_owned();
    }

    let truncated = words[..cap].join(" ");
    match truncated.rfind('.') {
        Some(idx) if idx > 0 => truncated[..=idx].to_owned(),
        _ => format!("{truncated}…"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(shape("PR merged.", Profile::Workout), "PR merged.");
    }

    #[test]
    fn truncates_at_last_period_within_cap() {
        let text = "PR #412 merged. All three checks passed. Reviewed by avery and blair and casey and drew and a dozen more people than the fifteen word cap allows for.";
        let shaped = shape(text, Profile::Workout);
        assert!(shaped.ends_with('.'));
        assert!(shaped.split_whitespace().count() <= Profile::Workout.max_words());
    }

    #[test]
    fn hard_cuts_with_ellipsis_when_no_period_in_range() {
        let text = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen";
        let shaped = shape(text, Profile::Workout);
        assert!(shaped.ends_with('…'));
    }

    #[test]
    fn word_cap_property_holds_across_profiles() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi rho sigma tau upsilon phi chi psi omega";
        for profile in [Profile::Workout, Profile::Kitchen, Profile::Commute, Profile::Default] {
            let shaped = shape(text, profile);
            let word_count = shaped.trim_end_matches('…').split_whitespace().count();
            assert!(word_count <= profile.max_words());
        }
    }

    #[test]
    fn confirmation_policy_table() {
        assert_eq!(Profile::Workout.confirmation_policy(), ConfirmationPolicy::Always);
        assert_eq!(Profile::Kitchen.confirmation_policy(), ConfirmationPolicy::Always);
        assert_eq!(Profile::Default.confirmation_policy(), ConfirmationPolicy::SideEffectsOnly);
    }

    #[test]
    fn unknown_profile_string_falls_back_to_default() {
        assert_eq!(Profile::parse_or_default("space-opera"), Profile::Default);
    }
}
