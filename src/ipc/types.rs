use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::model::{CurrentUser, Student};
use crate::report::ReportClient;
use crate::screen::Screen;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    /// In-memory roster, authoritative for the session; a failed save leaves
    /// it intact and is surfaced to the caller, never silently dropped.
    pub roster: Vec<Student>,
    pub user: Option<CurrentUser>,
    pub screen: Screen,
    pub report: Box<dyn ReportClient>,
}

impl AppState {
    pub fn new(report: Box<dyn ReportClient>) -> Self {
        Self {
            workspace: None,
            db: None,
            roster: Vec::new(),
            user: None,
            screen: Screen::Login,
            report,
        }
    }
}
