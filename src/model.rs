use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    GainMuscle,
    Maintain,
    MuscleDefinition,
    ImproveEndurance,
    GeneralHealth,
}

impl Goal {
    /// Human-readable label used when building prompts.
    pub fn label(self) -> &'static str {
        match self {
            Goal::LoseWeight => "Weight Loss",
            Goal::GainMuscle => "Muscle Gain",
            Goal::Maintain => "Weight Maintenance",
            Goal::MuscleDefinition => "Muscle Definition",
            Goal::ImproveEndurance => "Improved Endurance",
            Goal::GeneralHealth => "General Health and Well-being",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary (little or no exercise)",
            ActivityLevel::Light => "Lightly active (light exercise 1-3 days/week)",
            ActivityLevel::Moderate => "Moderately active (moderate exercise 3-5 days/week)",
            ActivityLevel::Active => "Active (hard exercise 6-7 days/week)",
            ActivityLevel::VeryActive => "Very active (very hard exercise, physical job)",
        }
    }
}

/// The raw inputs of one assessment submission, as collected by the form.
/// Numeric values are passed through to the analysis as entered; no
/// physiological plausibility checks are applied here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementSample {
    pub name: String,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub sex: Sex,
    pub body_fat_pct: f64,
    pub muscle_mass_kg: f64,
    pub visceral_fat_level: u32,
    pub body_water_pct: f64,
    pub basal_metabolic_rate: u32,
    pub goal: Goal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_restrictions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplements: Option<String>,
    /// "YYYY-MM-DD"; a missing or malformed date means "now".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Good,
    Caution,
    NeedsImprovement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetric {
    pub metric: String,
    pub value: String,
    pub ideal_range: String,
    pub assessment: String,
    pub status: MetricStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    pub time: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub title: String,
    pub meals: Vec<Meal>,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparativeChange {
    pub metric: String,
    pub previous_value: String,
    pub current_value: String,
    pub change: String,
    pub assessment: String,
    pub status: ChangeDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparativeAnalysis {
    pub summary: String,
    pub changes: Vec<ComparativeChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
    pub title: String,
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub next_assessment_date: String,
    pub focus_areas: Vec<FocusArea>,
    pub motivational_message: String,
}

/// Structured output of the report-generation call. The shape is the contract
/// declared to the remote service; contents are stored and displayed, never
/// interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub analysis: Vec<AnalysisMetric>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendations: Vec<String>,
    pub diet_plan: DietPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparative_analysis: Option<ComparativeAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_plan: Option<ActionPlan>,
}

/// One completed check-in: the raw measurement paired with its generated
/// analysis. Immutable once created; never edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub measurement: MeasurementSample,
    pub result: AnalysisResult,
}

/// A registered student with their denormalized profile and full assessment
/// history. `assessments` is kept sorted descending by timestamp after every
/// insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    pub goal: Goal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_restrictions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplements: Option<String>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
}

impl Student {
    /// Roster key: no two students may share a normalized name.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Trim + casefold. Used uniformly for identity resolution at registration,
/// profile edit, submission lookup and login.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Client,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub role: Role,
}
