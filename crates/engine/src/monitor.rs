//! Proactive monitor — decides whether the assistant speaks first.
//!
//! State machine: `UNINITIALIZED → EVALUATED → (BRIEFED | SILENT)`.
//! Evaluation runs exactly once, at session start, before the first user
//! turn. It pulls the academic and calendar audits, applies threshold
//! guards, and on any trigger appends a single assistant-authored briefing
//! turn to the session. Both outcomes are terminal: the monitor does not
//! re-evaluate on later turns (an explicit `reset` re-arms it).
//!
//! Any collaborator error during evaluation is swallowed — the failing
//! source simply contributes no triggers, and with no triggers the monitor
//! degrades to SILENT rather than raising.

use std::sync::Arc;

use deskmate_core::collaborator::{AcademicAudit, CalendarAudit, CalendarClient, LmsClient};
use deskmate_core::session::Session;
use tracing::{debug, info, warn};

/// Threshold configuration for the briefing guards.
#[derive(Debug, Clone)]
pub struct BriefingThresholds {
    /// Brief when any course score falls below this percent.
    pub score_cutoff: f64,
    /// Brief when coursework is due within this many days.
    pub due_soon_days: i64,
    /// Brief when today holds at least this many events.
    pub density_cutoff: usize,
}

impl Default for BriefingThresholds {
    fn default() -> Self {
        Self {
            score_cutoff: 80.0,
            due_soon_days: 3,
            density_cutoff: 4,
        }
    }
}

/// One satisfied briefing condition.
#[derive(Debug, Clone, PartialEq)]
pub enum BriefingTrigger {
    LowScore {
        course: String,
        score: f64,
        cutoff: f64,
    },
    OverdueWork {
        course: String,
        item: String,
        days_overdue: i64,
    },
    DueSoon {
        course: String,
        item: String,
        due_in_days: i64,
    },
    DenseSchedule {
        events_today: usize,
    },
}

/// Where the monitor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Not yet evaluated.
    Uninitialized,
    /// Evaluated; a briefing turn was injected.
    Briefed,
    /// Evaluated; nothing crossed a threshold (or audits were unreachable).
    Silent,
}

/// The session-start briefing engine.
pub struct ProactiveMonitor {
    lms: Arc<dyn LmsClient>,
    calendar: Arc<dyn CalendarClient>,
    thresholds: BriefingThresholds,
    state: MonitorState,
}

impl ProactiveMonitor {
    pub fn new(
        lms: Arc<dyn LmsClient>,
        calendar: Arc<dyn CalendarClient>,
        thresholds: BriefingThresholds,
    ) -> Self {
        Self {
            lms,
            calendar,
            thresholds,
            state: MonitorState::Uninitialized,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Re-arm for another evaluation (the "live" policy escape hatch).
    pub fn reset(&mut self) {
        self.state = MonitorState::Uninitialized;
    }

    /// Run the audit and, when a threshold holds, inject one briefing turn.
    ///
    /// Idempotent after the first call: later calls return the settled state
    /// without pulling anything.
    pub async fn evaluate(&mut self, session: &mut Session) -> MonitorState {
        if self.state != MonitorState::Uninitialized {
            return self.state;
        }

        let academic = match self.lms.academic_audit().await {
            Ok(audit) => Some(audit),
            Err(e) => {
                warn!(error = %e, "Academic audit unavailable, skipping its triggers");
                None
            }
        };
        let calendar = match self.calendar.calendar_audit().await {
            Ok(audit) => Some(audit),
            Err(e) => {
                warn!(error = %e, "Calendar audit unavailable, skipping its triggers");
                None
            }
        };

        let triggers = collect_triggers(academic.as_ref(), calendar.as_ref(), &self.thresholds);

        self.state = if triggers.is_empty() {
            debug!("No briefing condition holds, staying silent");
            MonitorState::Silent
        } else {
            info!(triggers = triggers.len(), "Injecting proactive briefing");
            session.push_assistant(render_briefing(&triggers));
            MonitorState::Briefed
        };
        self.state
    }
}

/// Apply the threshold guards to the pulled audits.
fn collect_triggers(
    academic: Option<&AcademicAudit>,
    calendar: Option<&CalendarAudit>,
    thresholds: &BriefingThresholds,
) -> Vec<BriefingTrigger> {
    let mut triggers = Vec::new();

    if let Some(audit) = academic {
        for course in &audit.courses {
            if let Some(score) = course.score {
                if score < thresholds.score_cutoff {
                    triggers.push(BriefingTrigger::LowScore {
                        course: course.name.clone(),
                        score,
                        cutoff: thresholds.score_cutoff,
                    });
                }
            }
            for item in &course.missing {
                if item.due_offset_days <= 0 {
                    triggers.push(BriefingTrigger::OverdueWork {
                        course: course.name.clone(),
                        item: item.name.clone(),
                        days_overdue: -item.due_offset_days,
                    });
                } else if item.due_offset_days <= thresholds.due_soon_days {
                    triggers.push(BriefingTrigger::DueSoon {
                        course: course.name.clone(),
                        item: item.name.clone(),
                        due_in_days: item.due_offset_days,
                    });
                }
            }
        }
    }

    if let Some(audit) = calendar {
        if audit.events_today >= thresholds.density_cutoff {
            triggers.push(BriefingTrigger::DenseSchedule {
                events_today: audit.events_today,
            });
        }
    }

    triggers
}

/// Render the briefing turn: each condition, then a proposed action.
fn render_briefing(triggers: &[BriefingTrigger]) -> String {
    let mut lines = vec!["Before you ask — a few things I noticed:".to_string()];

    for trigger in triggers {
        let line = match trigger {
            BriefingTrigger::LowScore {
                course,
                score,
                cutoff,
            } => format!("• {course} is sitting at {score:.1}%, below your {cutoff:.0}% target."),
            BriefingTrigger::OverdueWork {
                course,
                item,
                days_overdue,
            } => {
                if *days_overdue == 0 {
                    format!("• \"{item}\" in {course} is due today and not submitted.")
                } else {
                    format!("• \"{item}\" in {course} is {days_overdue} day(s) overdue.")
                }
            }
            BriefingTrigger::DueSoon {
                course,
                item,
                due_in_days,
            } => format!("• \"{item}\" in {course} is due in {due_in_days} day(s)."),
            BriefingTrigger::DenseSchedule { events_today } => {
                format!("• Today is packed: {events_today} events on the calendar.")
            }
        };
        lines.push(line);
    }

    let has_academic = triggers.iter().any(|t| {
        !matches!(t, BriefingTrigger::DenseSchedule { .. })
    });
    lines.push(
        if has_academic {
            "Want me to pull up what's due and block out time to catch up?"
        } else {
            "Want a quick run-through of today's schedule?"
        }
        .to_string(),
    );

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use deskmate_core::collaborator::{CourseStanding, MissingItem};
    use deskmate_core::error::CollaboratorError;
    use deskmate_core::session::Role;
    use std::sync::Mutex;

    // --- Stub collaborators ---

    struct StubLms {
        calls: Mutex<usize>,
        response: Result<AcademicAudit, CollaboratorError>,
    }

    impl StubLms {
        fn with_courses(courses: Vec<CourseStanding>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(0),
                response: Ok(AcademicAudit {
                    report: "report".into(),
                    courses,
                }),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(0),
                response: Err(CollaboratorError::Network("down".into())),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LmsClient for StubLms {
        async fn academic_audit(&self) -> Result<AcademicAudit, CollaboratorError> {
            *self.calls.lock().unwrap() += 1;
            self.response.clone()
        }
    }

    struct StubCalendar {
        response: Result<CalendarAudit, CollaboratorError>,
    }

    impl StubCalendar {
        fn with_events(events_today: usize) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(CalendarAudit {
                    summary: "summary".into(),
                    events_today,
                }),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: Err(CollaboratorError::Unavailable("503".into())),
            })
        }
    }

    #[async_trait]
    impl CalendarClient for StubCalendar {
        async fn calendar_audit(&self) -> Result<CalendarAudit, CollaboratorError> {
            self.response.clone()
        }

        async fn add_event(
            &self,
            _title: &str,
            _start: DateTime<Utc>,
        ) -> Result<String, CollaboratorError> {
            Ok("added".into())
        }
    }

    fn course(name: &str, score: Option<f64>, missing: Vec<MissingItem>) -> CourseStanding {
        CourseStanding {
            id: name.into(),
            name: name.into(),
            score,
            missing,
        }
    }

    // --- Tests ---

    #[tokio::test]
    async fn low_score_briefs_with_exactly_one_turn_before_any_user_turn() {
        let lms = StubLms::with_courses(vec![course("Calculus I", Some(65.0), vec![])]);
        let calendar = StubCalendar::with_events(0);
        let mut monitor =
            ProactiveMonitor::new(lms, calendar, BriefingThresholds::default());
        let mut session = Session::new();

        let state = monitor.evaluate(&mut session).await;

        assert_eq!(state, MonitorState::Briefed);
        assert_eq!(session.len(), 1);
        assert!(!session.has_user_turn());
        let turn = &session.turns()[0];
        assert_eq!(turn.role, Role::Assistant);
        assert!(turn.text.contains("Calculus I"));
        assert!(turn.text.contains("65.0%"));
    }

    #[tokio::test]
    async fn nothing_triggering_stays_silent_with_zero_turns() {
        let lms = StubLms::with_courses(vec![course("Calculus I", Some(92.0), vec![])]);
        let calendar = StubCalendar::with_events(1);
        let mut monitor =
            ProactiveMonitor::new(lms, calendar, BriefingThresholds::default());
        let mut session = Session::new();

        let state = monitor.evaluate(&mut session).await;

        assert_eq!(state, MonitorState::Silent);
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn overdue_work_briefs() {
        let lms = StubLms::with_courses(vec![course(
            "Calculus I",
            Some(95.0),
            vec![MissingItem {
                name: "Problem Set 4".into(),
                due_offset_days: -2,
            }],
        )]);
        let calendar = StubCalendar::with_events(0);
        let mut monitor =
            ProactiveMonitor::new(lms, calendar, BriefingThresholds::default());
        let mut session = Session::new();

        assert_eq!(monitor.evaluate(&mut session).await, MonitorState::Briefed);
        assert!(session.turns()[0].text.contains("Problem Set 4"));
        assert!(session.turns()[0].text.contains("2 day(s) overdue"));
    }

    #[tokio::test]
    async fn due_soon_within_window_briefs() {
        let lms = StubLms::with_courses(vec![course(
            "Modern History",
            None,
            vec![MissingItem {
                name: "Essay draft".into(),
                due_offset_days: 2,
            }],
        )]);
        let calendar = StubCalendar::with_events(0);
        let mut monitor =
            ProactiveMonitor::new(lms, calendar, BriefingThresholds::default());
        let mut session = Session::new();

        assert_eq!(monitor.evaluate(&mut session).await, MonitorState::Briefed);
        assert!(session.turns()[0].text.contains("due in 2 day(s)"));
    }

    #[tokio::test]
    async fn due_beyond_window_does_not_brief() {
        let lms = StubLms::with_courses(vec![course(
            "Modern History",
            None,
            vec![MissingItem {
                name: "Term paper".into(),
                due_offset_days: 14,
            }],
        )]);
        let calendar = StubCalendar::with_events(0);
        let mut monitor =
            ProactiveMonitor::new(lms, calendar, BriefingThresholds::default());
        let mut session = Session::new();

        assert_eq!(monitor.evaluate(&mut session).await, MonitorState::Silent);
    }

    #[tokio::test]
    async fn dense_schedule_briefs_with_schedule_action() {
        let lms = StubLms::with_courses(vec![]);
        let calendar = StubCalendar::with_events(5);
        let mut monitor =
            ProactiveMonitor::new(lms, calendar, BriefingThresholds::default());
        let mut session = Session::new();

        assert_eq!(monitor.evaluate(&mut session).await, MonitorState::Briefed);
        let text = &session.turns()[0].text;
        assert!(text.contains("5 events"));
        assert!(text.contains("run-through of today's schedule"));
    }

    #[tokio::test]
    async fn collaborator_failures_degrade_to_silent() {
        let mut monitor = ProactiveMonitor::new(
            StubLms::failing(),
            StubCalendar::failing(),
            BriefingThresholds::default(),
        );
        let mut session = Session::new();

        assert_eq!(monitor.evaluate(&mut session).await, MonitorState::Silent);
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn one_failed_audit_does_not_mask_the_other() {
        let mut monitor = ProactiveMonitor::new(
            StubLms::failing(),
            StubCalendar::with_events(6),
            BriefingThresholds::default(),
        );
        let mut session = Session::new();

        assert_eq!(monitor.evaluate(&mut session).await, MonitorState::Briefed);
        assert!(session.turns()[0].text.contains("6 events"));
    }

    #[tokio::test]
    async fn evaluation_runs_at_most_once() {
        let lms = StubLms::with_courses(vec![course("Calculus I", Some(65.0), vec![])]);
        let calendar = StubCalendar::with_events(0);
        let mut monitor =
            ProactiveMonitor::new(lms.clone(), calendar, BriefingThresholds::default());
        let mut session = Session::new();

        monitor.evaluate(&mut session).await;
        let state = monitor.evaluate(&mut session).await;

        assert_eq!(state, MonitorState::Briefed);
        assert_eq!(lms.calls(), 1, "second evaluate must not pull again");
        assert_eq!(session.len(), 1, "no second briefing turn");
    }

    #[tokio::test]
    async fn reset_rearms_evaluation() {
        let lms = StubLms::with_courses(vec![course("Calculus I", Some(65.0), vec![])]);
        let calendar = StubCalendar::with_events(0);
        let mut monitor =
            ProactiveMonitor::new(lms.clone(), calendar, BriefingThresholds::default());
        let mut session = Session::new();

        monitor.evaluate(&mut session).await;
        monitor.reset();
        assert_eq!(monitor.state(), MonitorState::Uninitialized);
        monitor.evaluate(&mut session).await;

        assert_eq!(lms.calls(), 2);
    }

    #[test]
    fn multiple_triggers_all_listed() {
        let triggers = vec![
            BriefingTrigger::LowScore {
                course: "Calculus I".into(),
                score: 64.2,
                cutoff: 80.0,
            },
            BriefingTrigger::DenseSchedule { events_today: 5 },
        ];
        let text = render_briefing(&triggers);
        assert!(text.contains("64.2%"));
        assert!(text.contains("5 events"));
        // Academic trouble drives the proposed action.
        assert!(text.contains("block out time"));
    }

    #[test]
    fn score_exactly_at_cutoff_does_not_trigger() {
        let audit = AcademicAudit {
            report: String::new(),
            courses: vec![course("Calculus I", Some(80.0), vec![])],
        };
        let triggers = collect_triggers(Some(&audit), None, &BriefingThresholds::default());
        assert!(triggers.is_empty());
    }
}
