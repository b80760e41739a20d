use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rule severity, ordered from lowest to highest.
///
/// On the wire a level is its integer value (`0`, `1`, `2`).
///
/// # Examples
///
/// ```
/// use vigilo_common::types::RuleLevel;
///
/// let level = RuleLevel::try_from(2).unwrap();
/// assert_eq!(level, RuleLevel::High);
/// assert_eq!(i32::from(level), 2);
/// assert!(RuleLevel::High > RuleLevel::Low);
/// assert!(RuleLevel::try_from(3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RuleLevel {
    #[default]
    Low,
    Middle,
    High,
}

impl TryFrom<i32> for RuleLevel {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RuleLevel::Low),
            1 => Ok(RuleLevel::Middle),
            2 => Ok(RuleLevel::High),
            other => Err(format!("unknown rule level: {other}")),
        }
    }
}

impl From<RuleLevel> for i32 {
    fn from(level: RuleLevel) -> Self {
        match level {
            RuleLevel::Low => 0,
            RuleLevel::Middle => 1,
            RuleLevel::High => 2,
        }
    }
}

impl std::fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleLevel::Low => write!(f, "low"),
            RuleLevel::Middle => write!(f, "middle"),
            RuleLevel::High => write!(f, "high"),
        }
    }
}

/// A project owns rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A committed alerting rule, as stored and as cached for the evaluation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: i64,
    #[serde(rename = "projectID")]
    pub project_id: i64,
    pub pattern: String,
    pub trend_up: bool,
    pub trend_down: bool,
    pub threshold_max: f64,
    pub threshold_min: f64,
    pub comment: String,
    pub level: RuleLevel,
    pub disabled: bool,
    /// Minutes the rule stays disabled, counted from `disabled_at`.
    pub disabled_for: i64,
    pub disabled_at: DateTime<Utc>,
    pub track_idle: bool,
    pub never_fill_zero: bool,
}

impl Rule {
    /// Copies every editable field from `fields`, keeping id and project.
    pub fn apply(&mut self, fields: &RuleFields, level: RuleLevel, now: DateTime<Utc>) {
        self.pattern = fields.pattern.clone();
        self.trend_up = fields.trend_up;
        self.trend_down = fields.trend_down;
        self.threshold_max = fields.threshold_max;
        self.threshold_min = fields.threshold_min;
        self.comment = fields.comment.clone();
        self.level = level;
        self.disabled = fields.disabled;
        self.disabled_for = fields.disabled_for;
        self.disabled_at = now;
        self.track_idle = fields.track_idle;
        self.never_fill_zero = fields.never_fill_zero;
    }
}

/// A rule that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRule {
    pub project_id: i64,
    pub pattern: String,
    pub trend_up: bool,
    pub trend_down: bool,
    pub threshold_max: f64,
    pub threshold_min: f64,
    pub comment: String,
    pub level: RuleLevel,
    pub disabled: bool,
    pub disabled_for: i64,
    pub disabled_at: DateTime<Utc>,
    pub track_idle: bool,
    pub never_fill_zero: bool,
}

impl NewRule {
    pub fn from_fields(
        project_id: i64,
        fields: &RuleFields,
        level: RuleLevel,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            project_id,
            pattern: fields.pattern.clone(),
            trend_up: fields.trend_up,
            trend_down: fields.trend_down,
            threshold_max: fields.threshold_max,
            threshold_min: fields.threshold_min,
            comment: fields.comment.clone(),
            level,
            disabled: fields.disabled,
            disabled_for: fields.disabled_for,
            disabled_at: now,
            track_idle: fields.track_idle,
            never_fill_zero: fields.never_fill_zero,
        }
    }
}

/// User-supplied rule fields for create and edit.
///
/// `level` stays a raw integer here so an out-of-range value reaches the
/// validator instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleFields {
    pub pattern: String,
    pub trend_up: bool,
    pub trend_down: bool,
    pub threshold_max: f64,
    pub threshold_min: f64,
    pub comment: String,
    pub level: i32,
    pub disabled: bool,
    pub disabled_for: i64,
    pub track_idle: bool,
    pub never_fill_zero: bool,
}

impl RuleFields {
    /// True when at least one alerting condition is set.
    pub fn has_condition(&self) -> bool {
        self.trend_up || self.trend_down || self.threshold_max != 0.0 || self.threshold_min != 0.0
    }
}

/// A rule annotated with the number of known metrics its pattern matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleView {
    #[serde(flatten)]
    pub rule: Rule,
    #[serde(rename = "numMetrics")]
    pub num_metrics: u64,
}
