//! Profile attributes and the fixed-order feature vector derived from them.
//!
//! Training, evaluation and inference all go through [`Feature::ALL`], so there is exactly one
//! definition of slot order and column naming.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Number of slots in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 11;

/// Raw attributes of a profile, as supplied by an attribute source or manual entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAttributes {
    pub username: String,
    pub full_name: String,
    pub has_profile_pic: bool,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub external_url: Option<String>,
    pub is_private: bool,
    pub media_count: u64,
    pub follower_count: u64,
    pub followee_count: u64,
}

/// How a slot's value is typed. Drives prompting and CSV formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// 0 or 1.
    Flag,
    /// Non-negative integer.
    Count,
    /// Decimal rounded to 4 places.
    Ratio,
}

/// One slot of the feature vector, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    ProfilePic,
    NumsLengthUsername,
    FullnameWords,
    NumsLengthFullname,
    NameEqualsUsername,
    DescriptionLength,
    ExternalUrl,
    Private,
    Posts,
    Followers,
    Follows,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::ProfilePic,
        Feature::NumsLengthUsername,
        Feature::FullnameWords,
        Feature::NumsLengthFullname,
        Feature::NameEqualsUsername,
        Feature::DescriptionLength,
        Feature::ExternalUrl,
        Feature::Private,
        Feature::Posts,
        Feature::Followers,
        Feature::Follows,
    ];

    /// Position of this feature in the vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header used by the labeled datasets and the prediction sink.
    pub fn column(self) -> &'static str {
        match self {
            Feature::ProfilePic => "profile pic",
            Feature::NumsLengthUsername => "nums/length username",
            Feature::FullnameWords => "fullname words",
            Feature::NumsLengthFullname => "nums/length fullname",
            Feature::NameEqualsUsername => "name==username",
            Feature::DescriptionLength => "description length",
            Feature::ExternalUrl => "external URL",
            Feature::Private => "private",
            Feature::Posts => "#posts",
            Feature::Followers => "#followers",
            Feature::Follows => "#follows",
        }
    }

    /// Identifier-style name of the slot.
    pub fn name(self) -> &'static str {
        match self {
            Feature::ProfilePic => "profile_pic",
            Feature::NumsLengthUsername => "nums_length_username",
            Feature::FullnameWords => "fullname_words",
            Feature::NumsLengthFullname => "nums_length_fullname",
            Feature::NameEqualsUsername => "name_username_similarity",
            Feature::DescriptionLength => "description_length",
            Feature::ExternalUrl => "external_url",
            Feature::Private => "private",
            Feature::Posts => "posts",
            Feature::Followers => "followers",
            Feature::Follows => "following",
        }
    }

    pub fn kind(self) -> FeatureKind {
        match self {
            Feature::ProfilePic
            | Feature::NameEqualsUsername
            | Feature::ExternalUrl
            | Feature::Private => FeatureKind::Flag,
            Feature::NumsLengthUsername | Feature::NumsLengthFullname => FeatureKind::Ratio,
            Feature::FullnameWords
            | Feature::DescriptionLength
            | Feature::Posts
            | Feature::Followers
            | Feature::Follows => FeatureKind::Count,
        }
    }
}

/// Ordered numeric encoding of a profile, as consumed by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        FeatureVector(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Renders one slot for CSV output: ratios keep a decimal point, everything else is integral.
    pub fn format_value(&self, feature: Feature) -> String {
        let value = self.get(feature);
        match feature.kind() {
            FeatureKind::Ratio => format!("{value:?}"),
            FeatureKind::Flag | FeatureKind::Count => format!("{}", value as i64),
        }
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        FeatureVector(values)
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, feature) in Feature::ALL.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.format_value(*feature))?;
        }
        write!(f, "]")
    }
}

/// Rounds to 4 decimal places the way a decimal round-trip does: the 4-place decimal nearest
/// the exact binary value (ties to even), read back as f64.
pub fn round4(value: f64) -> f64 {
    format!("{value:.4}").parse().unwrap_or(value)
}

/// Decimal digits of any script (category Nd). Fractions, Roman numerals and superscripts are not.
fn is_decimal_digit(c: char) -> bool {
    c.general_category() == GeneralCategory::DecimalNumber
}

fn digit_ratio(text: &str) -> f64 {
    let length = text.chars().count();
    if length == 0 {
        return 0.0;
    }
    let digits = text.chars().filter(|c| is_decimal_digit(*c)).count();
    round4(digits as f64 / length as f64)
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Unicode whitespace plus the ASCII file/group/record/unit separators.
fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Number of whitespace-separated words; runs of whitespace collapse.
pub fn word_count(text: &str) -> usize {
    text.split(is_word_separator)
        .filter(|word| !word.is_empty())
        .count()
}

/// Turns raw attributes into the canonical feature vector. Never fails.
pub fn extract(profile: &ProfileAttributes) -> FeatureVector {
    let same_name = profile.username.to_lowercase() == profile.full_name.to_lowercase();
    // An empty string counts as "no URL", same as a missing one.
    let has_url = profile
        .external_url
        .as_deref()
        .is_some_and(|url| !url.is_empty());

    FeatureVector([
        flag(profile.has_profile_pic),
        digit_ratio(&profile.username),
        word_count(&profile.full_name) as f64,
        digit_ratio(&profile.full_name),
        flag(same_name),
        profile.biography.chars().count() as f64,
        flag(has_url),
        flag(profile.is_private),
        profile.media_count as f64,
        profile.follower_count as f64,
        profile.followee_count as f64,
    ])
}
