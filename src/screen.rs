//! View-state controller: an explicit machine over the screens the shell can
//! show, with the transient context (selected student, latest assessment)
//! carried as per-state payload instead of loose optional fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum Screen {
    Login,
    List,
    /// The form serves both new-student and new-assessment entry; a target
    /// student distinguishes them.
    #[serde(rename_all = "camelCase")]
    Form {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        student_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    History { student_id: String },
    #[serde(rename_all = "camelCase")]
    Result {
        student_id: String,
        assessment_id: String,
    },
    #[serde(rename_all = "camelCase")]
    EditProfile { student_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ScreenEvent {
    LoginOk,
    Logout,
    #[serde(rename_all = "camelCase")]
    SelectStudent { student_id: String },
    AddStudent,
    AddAssessment,
    EditProfile,
    #[serde(rename_all = "camelCase")]
    AssessmentSaved {
        student_id: String,
        assessment_id: String,
    },
    ProfileSaved,
    Cancel,
    Back,
}

#[derive(Debug, Error)]
#[error("event {event:?} is not valid on screen {screen:?}")]
pub struct TransitionError {
    pub screen: Screen,
    pub event: ScreenEvent,
}

impl Screen {
    /// Apply one event. Invalid pairs are errors, never silent no-ops;
    /// navigating away abandons in-flight form input by design of the caller.
    pub fn apply(&self, event: ScreenEvent) -> Result<Screen, TransitionError> {
        use ScreenEvent as E;

        let next = match (self, &event) {
            // Logout is allowed everywhere and drops all payload.
            (_, E::Logout) => Screen::Login,
            (Screen::Login, E::LoginOk) => Screen::List,

            (Screen::List, E::SelectStudent { student_id }) => Screen::History {
                student_id: student_id.clone(),
            },
            (Screen::List, E::AddStudent) => Screen::Form { student_id: None },

            (Screen::History { student_id }, E::AddAssessment) => Screen::Form {
                student_id: Some(student_id.clone()),
            },
            (Screen::History { student_id }, E::EditProfile) => Screen::EditProfile {
                student_id: student_id.clone(),
            },
            (Screen::History { .. }, E::Back) => Screen::List,

            (
                Screen::Form { .. },
                E::AssessmentSaved {
                    student_id,
                    assessment_id,
                },
            ) => Screen::Result {
                student_id: student_id.clone(),
                assessment_id: assessment_id.clone(),
            },
            (Screen::Form { student_id }, E::Back) => match student_id {
                Some(id) => Screen::History {
                    student_id: id.clone(),
                },
                None => Screen::List,
            },

            (Screen::Result { student_id, .. }, E::Back) => Screen::History {
                student_id: student_id.clone(),
            },

            (Screen::EditProfile { student_id }, E::ProfileSaved)
            | (Screen::EditProfile { student_id }, E::Cancel) => Screen::History {
                student_id: student_id.clone(),
            },

            _ => {
                return Err(TransitionError {
                    screen: self.clone(),
                    event,
                })
            }
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_leads_to_list_and_logout_resets_from_anywhere() {
        let s = Screen::Login.apply(ScreenEvent::LoginOk).unwrap();
        assert_eq!(s, Screen::List);
        let deep = Screen::Result {
            student_id: "s1".into(),
            assessment_id: "a1".into(),
        };
        assert_eq!(deep.apply(ScreenEvent::Logout).unwrap(), Screen::Login);
    }

    #[test]
    fn form_back_depends_on_target() {
        let untargeted = Screen::Form { student_id: None };
        assert_eq!(untargeted.apply(ScreenEvent::Back).unwrap(), Screen::List);
        let targeted = Screen::Form {
            student_id: Some("s1".into()),
        };
        assert_eq!(
            targeted.apply(ScreenEvent::Back).unwrap(),
            Screen::History {
                student_id: "s1".into()
            }
        );
    }

    #[test]
    fn save_path_walks_form_result_history() {
        let form = Screen::List.apply(ScreenEvent::AddStudent).unwrap();
        let result = form
            .apply(ScreenEvent::AssessmentSaved {
                student_id: "s1".into(),
                assessment_id: "a1".into(),
            })
            .unwrap();
        assert_eq!(
            result,
            Screen::Result {
                student_id: "s1".into(),
                assessment_id: "a1".into()
            }
        );
        assert_eq!(
            result.apply(ScreenEvent::Back).unwrap(),
            Screen::History {
                student_id: "s1".into()
            }
        );
    }

    #[test]
    fn edit_profile_save_and_cancel_both_return_to_history() {
        let edit = Screen::History {
            student_id: "s1".into(),
        }
        .apply(ScreenEvent::EditProfile)
        .unwrap();
        assert_eq!(
            edit.apply(ScreenEvent::ProfileSaved).unwrap(),
            Screen::History {
                student_id: "s1".into()
            }
        );
        assert_eq!(
            edit.apply(ScreenEvent::Cancel).unwrap(),
            Screen::History {
                student_id: "s1".into()
            }
        );
    }

    #[test]
    fn invalid_pairs_are_typed_errors() {
        let err = Screen::List.apply(ScreenEvent::AddAssessment).unwrap_err();
        assert_eq!(err.screen, Screen::List);
        assert!(Screen::Login
            .apply(ScreenEvent::SelectStudent {
                student_id: "s1".into()
            })
            .is_err());
    }

    #[test]
    fn screen_serializes_with_a_tag_and_camel_case_payload() {
        let v = serde_json::to_value(Screen::History {
            student_id: "s1".into(),
        })
        .unwrap();
        assert_eq!(v["screen"], "history");
        assert_eq!(v["studentId"], "s1");
    }
}
