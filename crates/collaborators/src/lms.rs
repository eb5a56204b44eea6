//! Learning-management-system client (Canvas-style REST API).
//!
//! Pulls the academic audit in two requests: active course enrollments with
//! current scores, and the missing-submission list. Produces both the
//! rendered report the context assembler injects and the structured records
//! the proactive monitor applies thresholds to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deskmate_core::collaborator::{AcademicAudit, CourseStanding, LmsClient, MissingItem};
use deskmate_core::error::CollaboratorError;
use serde::Deserialize;
use tracing::debug;

/// Canvas-style LMS audit client.
pub struct CanvasLmsClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl CanvasLmsClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: crate::http_client(30),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<T, CollaboratorError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollaboratorError::Unavailable(format!("LMS timed out: {e}"))
                } else {
                    CollaboratorError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(CollaboratorError::Auth(format!(
                "LMS rejected token (status {status})"
            )));
        }
        if status != 200 {
            return Err(CollaboratorError::Unavailable(format!(
                "LMS returned status {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))
    }
}

#[async_trait]
impl LmsClient for CanvasLmsClient {
    async fn academic_audit(&self) -> Result<AcademicAudit, CollaboratorError> {
        let api_courses: Vec<ApiCourse> = self
            .get_json("/api/v1/courses?enrollment_state=active&include[]=total_scores")
            .await?;

        let missing: Vec<ApiMissingSubmission> = self
            .get_json("/api/v1/users/self/missing_submissions?include[]=course")
            .await?;

        debug!(
            courses = api_courses.len(),
            missing = missing.len(),
            "LMS audit pulled"
        );

        Ok(build_audit(api_courses, missing, Utc::now()))
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct ApiCourse {
    id: u64,
    name: String,
    #[serde(default)]
    course_code: Option<String>,
    #[serde(default)]
    enrollments: Vec<ApiEnrollment>,
}

#[derive(Debug, Deserialize)]
struct ApiEnrollment {
    #[serde(default)]
    computed_current_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiMissingSubmission {
    name: String,
    #[serde(default)]
    due_at: Option<DateTime<Utc>>,
    course_id: u64,
}

/// Assemble the audit from wire records. Pure, so threshold-relevant
/// behavior is testable without a server.
fn build_audit(
    api_courses: Vec<ApiCourse>,
    missing: Vec<ApiMissingSubmission>,
    now: DateTime<Utc>,
) -> AcademicAudit {
    let wire_ids: Vec<u64> = api_courses.iter().map(|c| c.id).collect();
    let mut courses: Vec<CourseStanding> = api_courses
        .into_iter()
        .map(|c| CourseStanding {
            id: c.course_code.unwrap_or_else(|| c.id.to_string()),
            name: c.name,
            score: c.enrollments.iter().find_map(|e| e.computed_current_score),
            missing: Vec::new(),
        })
        .collect();

    // Attach missing items to their course by wire id, falling back to the
    // first course when the id doesn't resolve (Canvas omits course context
    // on some enrollment types).
    for item in missing {
        let due_offset_days = item
            .due_at
            .map(|due| (due.date_naive() - now.date_naive()).num_days())
            .unwrap_or(0);
        let entry = MissingItem {
            name: item.name,
            due_offset_days,
        };
        let idx = wire_ids
            .iter()
            .position(|id| *id == item.course_id)
            .unwrap_or(0);
        if let Some(course) = courses.get_mut(idx) {
            course.missing.push(entry);
        }
    }

    let report = render_report(&courses);
    AcademicAudit { report, courses }
}

/// Render the audit as the plain-text report injected into context blocks.
fn render_report(courses: &[CourseStanding]) -> String {
    if courses.is_empty() {
        return "No active course enrollments.".into();
    }

    let mut out = String::new();
    for course in courses {
        match course.score {
            Some(score) => out.push_str(&format!("{} ({}): {:.1}%\n", course.name, course.id, score)),
            None => out.push_str(&format!("{} ({}): no score posted\n", course.name, course.id)),
        }
        for item in &course.missing {
            let status = if item.due_offset_days < 0 {
                format!("{} days overdue", -item.due_offset_days)
            } else if item.due_offset_days == 0 {
                "due today, unsubmitted".into()
            } else {
                format!("due in {} days", item.due_offset_days)
            };
            out.push_str(&format!("  MISSING: {} ({})\n", item.name, status));
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn course(id: u64, code: &str, name: &str, score: Option<f64>) -> ApiCourse {
        ApiCourse {
            id,
            name: name.into(),
            course_code: Some(code.into()),
            enrollments: vec![ApiEnrollment {
                computed_current_score: score,
            }],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn audit_carries_scores_per_course() {
        let audit = build_audit(
            vec![
                course(1, "MATH-101", "Calculus I", Some(64.2)),
                course(2, "HIST-210", "Modern History", Some(91.0)),
            ],
            vec![],
            now(),
        );

        assert_eq!(audit.courses.len(), 2);
        assert_eq!(audit.courses[0].id, "MATH-101");
        assert_eq!(audit.courses[0].score, Some(64.2));
        assert!(audit.report.contains("Calculus I"));
        assert!(audit.report.contains("64.2%"));
    }

    #[test]
    fn missing_submission_gets_negative_offset_when_overdue() {
        let due = Utc.with_ymd_and_hms(2026, 3, 8, 23, 59, 0).unwrap();
        let audit = build_audit(
            vec![course(1, "MATH-101", "Calculus I", Some(88.0))],
            vec![ApiMissingSubmission {
                name: "Problem Set 4".into(),
                due_at: Some(due),
                course_id: 1,
            }],
            now(),
        );

        let item = &audit.courses[0].missing[0];
        assert_eq!(item.due_offset_days, -2);
        assert!(audit.report.contains("Problem Set 4"));
        assert!(audit.report.contains("2 days overdue"));
    }

    #[test]
    fn upcoming_due_date_gets_positive_offset() {
        let due = Utc.with_ymd_and_hms(2026, 3, 12, 23, 59, 0).unwrap();
        let audit = build_audit(
            vec![course(1, "MATH-101", "Calculus I", None)],
            vec![ApiMissingSubmission {
                name: "Essay draft".into(),
                due_at: Some(due),
                course_id: 1,
            }],
            now(),
        );

        assert_eq!(audit.courses[0].missing[0].due_offset_days, 2);
        assert!(audit.report.contains("no score posted"));
        assert!(audit.report.contains("due in 2 days"));
    }

    #[test]
    fn missing_due_date_counts_as_due_today() {
        let audit = build_audit(
            vec![course(1, "MATH-101", "Calculus I", Some(75.0))],
            vec![ApiMissingSubmission {
                name: "Lab report".into(),
                due_at: None,
                course_id: 1,
            }],
            now(),
        );

        assert_eq!(audit.courses[0].missing[0].due_offset_days, 0);
        assert!(audit.report.contains("due today, unsubmitted"));
    }

    #[test]
    fn empty_enrollment_renders_placeholder() {
        let audit = build_audit(vec![], vec![], now());
        assert!(audit.courses.is_empty());
        assert_eq!(audit.report, "No active course enrollments.");
    }

    #[test]
    fn wire_parse_tolerates_sparse_fields() {
        let json = r#"[{"id": 7, "name": "Chemistry"}]"#;
        let parsed: Vec<ApiCourse> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0].name, "Chemistry");
        assert!(parsed[0].course_code.is_none());
        assert!(parsed[0].enrollments.is_empty());
    }
}
