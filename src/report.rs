//! Report-generation client: turns one measurement (plus the previous one,
//! when the student has history) into a structured narrative analysis by
//! calling an external generative model with a declared response schema.

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::model::{AnalysisResult, MeasurementSample};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report service not configured: {0}")]
    NotConfigured(String),
    #[error("report request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("report service returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("report response carried no candidate text")]
    EmptyResponse,
    #[error("report response did not match the declared schema: {0}")]
    MalformedAnalysis(#[from] serde_json::Error),
}

/// External collaborator contract the pipeline relies on. When `previous` is
/// supplied the result should carry a populated `comparativeAnalysis` block;
/// when absent that block is omitted.
pub trait ReportClient {
    fn analyze(
        &self,
        measurement: &MeasurementSample,
        previous: Option<&MeasurementSample>,
    ) -> Result<AnalysisResult, ReportError>;
}

/// Render the assessment date for the prompt. Malformed or absent input
/// silently becomes "today"; it never errors.
fn prompt_date(date: Option<&str>) -> String {
    let Some(raw) = date else {
        return "today".to_string();
    };
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => d.format("%B %-d, %Y").to_string(),
        Err(_) => "today".to_string(),
    }
}

fn push_profile_lines(out: &mut String, m: &MeasurementSample) {
    let _ = writeln!(out, "- Name: {}", m.name.trim());
    let _ = writeln!(out, "- Age: {} years", m.age);
    let _ = writeln!(out, "- Sex: {:?}", m.sex);
    let _ = writeln!(out, "- Height: {} cm", m.height_cm);
    let _ = writeln!(out, "- Primary goal: {}", m.goal.label());
    if let Some(instructor) = m.instructor_name.as_deref() {
        let _ = writeln!(out, "- Assessed by: {instructor}");
    }
    if let Some(level) = m.activity_level {
        let _ = writeln!(out, "- Activity level: {}", level.label());
    }
    if let Some(v) = m.health_conditions.as_deref() {
        let _ = writeln!(out, "- Health conditions: {v}");
    }
    if let Some(v) = m.medical_restrictions.as_deref() {
        let _ = writeln!(out, "- Medical restrictions: {v}");
    }
    if let Some(v) = m.supplements.as_deref() {
        let _ = writeln!(out, "- Current supplements: {v}");
    }
}

/// Prompt for a student with no prior assessment on file.
pub fn initial_prompt(m: &MeasurementSample) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analyze the following gym member's body-composition data and provide a \
         holistic, actionable, complete assessment plus a sample diet plan with \
         multiple options. Use every profile detail below to personalize the \
         analysis and recommendations."
    );
    let _ = writeln!(out, "\nMember profile:");
    push_profile_lines(&mut out, m);
    let _ = writeln!(out, "\nBioimpedance readings:");
    let _ = writeln!(out, "- Body weight: {} kg", m.weight_kg);
    let _ = writeln!(out, "- Body fat: {}%", m.body_fat_pct);
    let _ = writeln!(out, "- Muscle mass: {} kg", m.muscle_mass_kg);
    let _ = writeln!(out, "- Visceral fat: level {}", m.visceral_fat_level);
    let _ = writeln!(out, "- Body water: {}%", m.body_water_pct);
    let _ = writeln!(out, "- Basal metabolic rate: {} kcal", m.basal_metabolic_rate);
    let _ = writeln!(
        out,
        "\nInstructions:\n\
         1. Compute BMI as weight (kg) / height (m) squared.\n\
         2. For each metric (BMI, body fat, muscle mass, visceral fat, body \
            water, BMR) give the value, an ideal range specific to this \
            member's age, height, weight and sex, a concise assessment, and a \
            status of 'good' (within the ideal range), 'caution' (slightly \
            outside) or 'needs_improvement' (significantly outside).\n\
         3. Write a motivational 2-3 sentence overall summary.\n\
         4. List 2-3 strengths, 2-3 areas for improvement with brief reasons, \
            and 3-4 practical recommendations beyond diet (training, \
            hydration, lifestyle).\n\
         5. Build the 'actionPlan' section: 'nextAssessmentDate' is exactly 60 \
            days after the current assessment date ({assessment_date}), \
            formatted as 'Month D, YYYY'; 2-3 focus areas (e.g. Nutrition, \
            Strength Training, Cardio, Consistency) each with 2-3 specific, \
            measurable goals for the next 60 days drawn from the areas for \
            improvement; and a short personalized motivational message.\n\
         6. Build a sample diet plan with three simple, distinct suggestions \
            for each main meal (breakfast, lunch, dinner, snacks) plus an \
            optional light supper with 1-2 suggestions, aligned to the \
            member's goal, each meal with a suggested time window.\n\
         7. Include a disclaimer about consulting a registered nutritionist.\n\
         8. Return strictly the specified JSON format.",
        assessment_date = prompt_date(m.assessment_date.as_deref()),
    );
    out
}

/// Prompt comparing the current submission against the previous one; asks for
/// the additional comparativeAnalysis block.
pub fn comparative_prompt(m: &MeasurementSample, prev: &MeasurementSample) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analyze this gym member's PROGRESS by comparing the current assessment \
         against the previous one. Provide a holistic, actionable, comparative \
         assessment plus a sample diet plan."
    );
    let _ = writeln!(out, "\nMember profile:");
    push_profile_lines(&mut out, m);
    let _ = writeln!(out, "\nBioimpedance readings (previous vs current):");
    let _ = writeln!(
        out,
        "- Body weight: {:.1} kg -> {:.1} kg",
        prev.weight_kg, m.weight_kg
    );
    let _ = writeln!(
        out,
        "- Body fat: {:.1}% -> {:.1}%",
        prev.body_fat_pct, m.body_fat_pct
    );
    let _ = writeln!(
        out,
        "- Muscle mass: {:.1} kg -> {:.1} kg",
        prev.muscle_mass_kg, m.muscle_mass_kg
    );
    let _ = writeln!(
        out,
        "- Visceral fat: level {} -> level {}",
        prev.visceral_fat_level, m.visceral_fat_level
    );
    let _ = writeln!(
        out,
        "- Body water: {:.1}% -> {:.1}%",
        prev.body_water_pct, m.body_water_pct
    );
    let _ = writeln!(
        out,
        "- Basal metabolic rate: {} kcal -> {} kcal",
        prev.basal_metabolic_rate, m.basal_metabolic_rate
    );
    let _ = writeln!(
        out,
        "\nInstructions:\n\
         1. Analyze the CURRENT readings: compute BMI and, for each metric, \
            give the value, ideal range, assessment and status ('good', \
            'caution', 'needs_improvement').\n\
         2. Fill the 'comparativeAnalysis' section: a motivational 2-4 \
            sentence summary of overall progress since the last assessment, \
            and one change entry per metric above with 'metric', \
            'previousValue', 'currentValue', 'change' (e.g. \"+1.2 kg\" or \
            \"-0.8%\"), a concise 'assessment' of what the change means, and a \
            'status' of 'positive', 'negative' or 'neutral' judged against the \
            member's goal.\n\
         3. Base the summary, strengths, areas for improvement and \
            recommendations on the current data, informed by the comparison.\n\
         4. Build the 'actionPlan' section: 'nextAssessmentDate' is exactly 60 \
            days after the current assessment date ({assessment_date}), \
            formatted as 'Month D, YYYY'; 2-3 focus areas each with 2-3 \
            specific, measurable 60-day goals; and a short motivational \
            message.\n\
         5. Keep the diet plan and disclaimer aligned to the member's goal and \
            current data.\n\
         6. Return strictly the specified JSON format.",
        assessment_date = prompt_date(m.assessment_date.as_deref()),
    );
    out
}

/// JSON schema declared to the model; mirrors [`AnalysisResult`] exactly so
/// the response can be deserialized strictly.
pub fn response_schema() -> Value {
    let string = || json!({ "type": "STRING" });
    let string_list = || json!({ "type": "ARRAY", "items": { "type": "STRING" } });
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": string(),
            "analysis": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "metric": string(),
                        "value": string(),
                        "idealRange": string(),
                        "assessment": string(),
                        "status": { "type": "STRING", "enum": ["good", "caution", "needs_improvement"] }
                    },
                    "required": ["metric", "value", "idealRange", "assessment", "status"]
                }
            },
            "strengths": string_list(),
            "areasForImprovement": string_list(),
            "recommendations": string_list(),
            "dietPlan": {
                "type": "OBJECT",
                "properties": {
                    "title": string(),
                    "meals": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "name": string(),
                                "time": string(),
                                "suggestions": string_list()
                            },
                            "required": ["name", "time", "suggestions"]
                        }
                    },
                    "disclaimer": string()
                },
                "required": ["title", "meals", "disclaimer"]
            },
            "comparativeAnalysis": {
                "type": "OBJECT",
                "nullable": true,
                "properties": {
                    "summary": string(),
                    "changes": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "metric": string(),
                                "previousValue": string(),
                                "currentValue": string(),
                                "change": string(),
                                "assessment": string(),
                                "status": { "type": "STRING", "enum": ["positive", "negative", "neutral"] }
                            },
                            "required": ["metric", "previousValue", "currentValue", "change", "assessment", "status"]
                        }
                    }
                },
                "required": ["summary", "changes"]
            },
            "actionPlan": {
                "type": "OBJECT",
                "properties": {
                    "nextAssessmentDate": string(),
                    "focusAreas": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "title": string(),
                                "goals": string_list()
                            },
                            "required": ["title", "goals"]
                        }
                    },
                    "motivationalMessage": string()
                },
                "required": ["nextAssessmentDate", "focusAreas", "motivationalMessage"]
            }
        },
        "required": ["summary", "analysis", "strengths", "areasForImprovement", "recommendations", "dietPlan", "actionPlan"]
    })
}

/// Blocking client for the Gemini generateContent endpoint.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, ReportError> {
        if api_key.trim().is_empty() {
            return Err(ReportError::NotConfigured(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(GENERATE_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    /// Build from the environment: `GEMINI_API_KEY` (required) and
    /// `FITBOOKD_MODEL` (optional).
    pub fn from_env() -> Result<Self, ReportError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ReportError::NotConfigured("GEMINI_API_KEY is not set".to_string()))?;
        let model =
            std::env::var("FITBOOKD_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(api_key, model)
    }

    fn extract_text(body: &Value) -> Option<&str> {
        body.get("candidates")?
            .as_array()?
            .first()?
            .get("content")?
            .get("parts")?
            .as_array()?
            .first()?
            .get("text")?
            .as_str()
    }
}

impl ReportClient for GeminiClient {
    fn analyze(
        &self,
        measurement: &MeasurementSample,
        previous: Option<&MeasurementSample>,
    ) -> Result<AnalysisResult, ReportError> {
        let prompt = match previous {
            Some(prev) => comparative_prompt(measurement, prev),
            None => initial_prompt(measurement),
        };
        debug!(
            model = %self.model,
            comparative = previous.is_some(),
            "requesting analysis"
        );

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let request = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
                "temperature": 0.5,
            }
        });

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            error!(status = status.as_u16(), "report service rejected the request");
            return Err(ReportError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp.json()?;
        let text = Self::extract_text(&body).ok_or(ReportError::EmptyResponse)?;
        let result: AnalysisResult = serde_json::from_str(text.trim())?;
        Ok(result)
    }
}

/// Stands in when no API key is available at startup; every analyze call
/// fails with the configuration error so submissions surface it cleanly.
pub struct UnconfiguredClient {
    pub reason: String,
}

impl ReportClient for UnconfiguredClient {
    fn analyze(
        &self,
        _: &MeasurementSample,
        _: Option<&MeasurementSample>,
    ) -> Result<AnalysisResult, ReportError> {
        Err(ReportError::NotConfigured(self.reason.clone()))
    }
}

/// Deterministic offline client: used by tests and by `FITBOOKD_REPORT_STUB=1`
/// so the daemon can run without credentials or network.
pub struct StubReportClient;

impl StubReportClient {
    pub fn canned_result(
        measurement: &MeasurementSample,
        previous: Option<&MeasurementSample>,
    ) -> AnalysisResult {
        use crate::model::{
            AnalysisMetric, ComparativeAnalysis, ComparativeChange, DietPlan, FocusArea, Meal,
            MetricStatus,
        };
        AnalysisResult {
            summary: format!(
                "Offline assessment for {} ({}).",
                measurement.name.trim(),
                measurement.goal.label()
            ),
            analysis: vec![AnalysisMetric {
                metric: "Body fat".to_string(),
                value: format!("{}%", measurement.body_fat_pct),
                ideal_range: "varies by profile".to_string(),
                assessment: "Generated offline; no clinical meaning.".to_string(),
                status: MetricStatus::Good,
            }],
            strengths: vec!["Consistent check-ins".to_string()],
            areas_for_improvement: vec!["Offline mode has no analysis".to_string()],
            recommendations: vec!["Configure the report service for real output".to_string()],
            diet_plan: DietPlan {
                title: "Placeholder plan".to_string(),
                meals: vec![Meal {
                    name: "Breakfast".to_string(),
                    time: "07:00 - 08:00".to_string(),
                    suggestions: vec!["Any balanced option".to_string()],
                }],
                disclaimer: "Consult a registered nutritionist.".to_string(),
            },
            comparative_analysis: previous.map(|prev| ComparativeAnalysis {
                summary: "Offline comparison.".to_string(),
                changes: vec![ComparativeChange {
                    metric: "Body weight".to_string(),
                    previous_value: format!("{:.1} kg", prev.weight_kg),
                    current_value: format!("{:.1} kg", measurement.weight_kg),
                    change: format!("{:+.1} kg", measurement.weight_kg - prev.weight_kg),
                    assessment: "Generated offline.".to_string(),
                    status: crate::model::ChangeDirection::Neutral,
                }],
            }),
            action_plan: Some(crate::model::ActionPlan {
                next_assessment_date: "in 60 days".to_string(),
                focus_areas: vec![FocusArea {
                    title: "Consistency".to_string(),
                    goals: vec!["Keep a 60-day check-in cadence".to_string()],
                }],
                motivational_message: "Keep going.".to_string(),
            }),
        }
    }
}

impl ReportClient for StubReportClient {
    fn analyze(
        &self,
        measurement: &MeasurementSample,
        previous: Option<&MeasurementSample>,
    ) -> Result<AnalysisResult, ReportError> {
        Ok(Self::canned_result(measurement, previous))
    }
}
