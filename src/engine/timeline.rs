// ==========================================
// 灾后修复项目管理系统 - 项目时间线
// ==========================================
// 事件来源: 立项、首次勘察、每条读数、项目完成
// 按日期稳定排序;读数日期无法解析时排在最后
// ==========================================

use crate::domain::project::Project;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineEventKind {
    ProjectCreated,
    InitialInspection,
    MoistureReading,
    ProjectCompleted,
}

impl TimelineEventKind {
    pub fn title(&self) -> &'static str {
        match self {
            TimelineEventKind::ProjectCreated => "Project Created",
            TimelineEventKind::InitialInspection => "Initial Inspection",
            TimelineEventKind::MoistureReading => "Moisture Reading",
            TimelineEventKind::ProjectCompleted => "Project Completed",
        }
    }
}

// ==========================================
// TimelineEvent - 时间线事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub kind: TimelineEventKind,
    pub title: String,
    pub date: Option<NaiveDate>, // None = 读数日期无法解析
    pub reference_id: Option<String>, // 读数事件对应的 reading_id
}

impl TimelineEvent {
    fn new(kind: TimelineEventKind, date: Option<NaiveDate>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            date,
            reference_id: None,
        }
    }
}

pub struct ProjectTimeline;

impl ProjectTimeline {
    pub fn build(project: &Project) -> Vec<TimelineEvent> {
        let mut events = vec![TimelineEvent::new(
            TimelineEventKind::ProjectCreated,
            Some(project.created_at.date_naive()),
        )];

        if let Some(date) = project.initial_inspection_date {
            events.push(TimelineEvent::new(TimelineEventKind::InitialInspection, Some(date)));
        }

        for reading in &project.moisture_readings {
            let date = NaiveDate::parse_from_str(reading.date.trim(), "%Y-%m-%d").ok();
            let mut event = TimelineEvent::new(TimelineEventKind::MoistureReading, date);
            event.reference_id = Some(reading.reading_id.clone());
            events.push(event);
        }

        if let Some(completed_at) = project.completed_at {
            events.push(TimelineEvent::new(
                TimelineEventKind::ProjectCompleted,
                Some(completed_at.date_naive()),
            ));
        }

        events.sort_by_key(|e| (e.date.is_none(), e.date));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::ProjectIntake;
    use crate::domain::reading::MoistureReading;
    use crate::domain::types::ProjectStatus;
    use chrono::{TimeZone, Utc};

    fn project() -> Project {
        let created = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let intake = ProjectIntake {
            initial_inspection_date: NaiveDate::from_ymd_opt(2024, 5, 3),
            ..Default::default()
        };
        Project::from_intake("org-1", intake, created)
    }

    #[test]
    fn test_events_sorted_by_date() {
        let mut p = project();
        p.moisture_readings.push(MoistureReading::new("2024-05-06"));
        p.moisture_readings.push(MoistureReading::new("2024-05-04"));

        let kinds: Vec<TimelineEventKind> = ProjectTimeline::build(&p).iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TimelineEventKind::ProjectCreated,
                TimelineEventKind::InitialInspection,
                TimelineEventKind::MoistureReading,
                TimelineEventKind::MoistureReading,
            ]
        );
        let events = ProjectTimeline::build(&p);
        assert_eq!(events[2].date, NaiveDate::from_ymd_opt(2024, 5, 4));
        assert_eq!(events[2].reference_id.as_deref(), Some(p.moisture_readings[1].reading_id.as_str()));
    }

    #[test]
    fn test_completed_event_and_unparsable_reading() {
        let mut p = project();
        p.moisture_readings.push(MoistureReading::new("next tuesday"));
        p.status = ProjectStatus::Completed;
        p.sync_completion(Utc.with_ymd_and_hms(2024, 5, 20, 17, 0, 0).unwrap());

        let events = ProjectTimeline::build(&p);
        assert_eq!(events.len(), 4);
        assert_eq!(events[2].kind, TimelineEventKind::ProjectCompleted);
        assert_eq!(events[2].date, NaiveDate::from_ymd_opt(2024, 5, 20));
        assert_eq!(events[3].kind, TimelineEventKind::MoistureReading);
        assert!(events[3].date.is_none());
    }

    #[test]
    fn test_reopened_project_drops_completion() {
        let mut p = project();
        p.status = ProjectStatus::Completed;
        p.sync_completion(Utc::now());
        p.status = ProjectStatus::InProgress;
        p.sync_completion(Utc::now());
        assert!(p.completed_at.is_none());
        assert!(ProjectTimeline::build(&p)
            .iter()
            .all(|e| e.kind != TimelineEventKind::ProjectCompleted));
    }
}
