// ==========================================
// 灾后修复项目管理系统 - 统计分析
// ==========================================
// 项目状态统计、设备使用统计、运行时长汇总
// 全部为只读派生,不修改输入
// ==========================================

use crate::domain::chamber::EquipmentUnit;
use crate::domain::project::Project;
use crate::domain::types::{EquipmentStatus, ProjectStatus};
use crate::engine::runtime::EquipmentRuntimeTracker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ProjectStats - 项目状态统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

// ==========================================
// EquipmentUsage - 按设备类型统计部署次数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentUsage {
    pub equipment_type: String,
    pub count: usize,
}

// ==========================================
// ProjectRuntime - 项目设备累计运行时长
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRuntime {
    pub project_id: String,
    pub name: String,
    pub runtime_hours: i64,
    pub active_equipment: usize,
}

// ==========================================
// DashboardCounts - 首页计数
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub active_projects: usize,
    pub equipment_in_use: usize,
    pub equipment_available: usize,
    pub equipment_maintenance: usize,
}

// ==========================================
// AnalyticsReport - 汇总报表数据（不含格式化输出）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub project_stats: ProjectStats,
    pub equipment_usage: Vec<EquipmentUsage>,
    pub runtime_by_project: Vec<ProjectRuntime>,
    pub counts: DashboardCounts,
}

pub struct Analytics;

impl Analytics {
    pub fn project_stats(projects: &[Project]) -> ProjectStats {
        ProjectStats {
            total: projects.len(),
            completed: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed)
                .count(),
            in_progress: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::InProgress)
                .count(),
        }
    }

    /// 按设备类型统计部署次数（含已撤出记录,按类型名排序）
    pub fn equipment_usage(projects: &[Project]) -> Vec<EquipmentUsage> {
        let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
        for assignment in projects
            .iter()
            .flat_map(|p| p.drying_chambers.iter())
            .flat_map(|c| c.equipment.iter())
        {
            *by_type.entry(assignment.equipment_type.as_str()).or_insert(0) += 1;
        }
        by_type
            .into_iter()
            .map(|(equipment_type, count)| EquipmentUsage {
                equipment_type: equipment_type.to_string(),
                count,
            })
            .collect()
    }

    pub fn runtime_by_project(projects: &[Project]) -> Vec<ProjectRuntime> {
        projects
            .iter()
            .map(|p| ProjectRuntime {
                project_id: p.project_id.clone(),
                name: p.name.clone(),
                runtime_hours: EquipmentRuntimeTracker::total_runtime_hours(p),
                active_equipment: p
                    .drying_chambers
                    .iter()
                    .map(|c| c.active_equipment().count())
                    .sum(),
            })
            .collect()
    }

    pub fn dashboard_counts(projects: &[Project], inventory: &[EquipmentUnit]) -> DashboardCounts {
        let count_status = |status: EquipmentStatus| {
            inventory.iter().filter(|u| u.status == status).count()
        };
        DashboardCounts {
            active_projects: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::InProgress)
                .count(),
            equipment_in_use: count_status(EquipmentStatus::InUse),
            equipment_available: count_status(EquipmentStatus::Available),
            equipment_maintenance: count_status(EquipmentStatus::Maintenance),
        }
    }

    pub fn report(projects: &[Project], inventory: &[EquipmentUnit]) -> AnalyticsReport {
        AnalyticsReport {
            project_stats: Self::project_stats(projects),
            equipment_usage: Self::equipment_usage(projects),
            runtime_by_project: Self::runtime_by_project(projects),
            counts: Self::dashboard_counts(projects, inventory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chamber::DryingChamber;
    use crate::domain::project::ProjectIntake;
    use chrono::{Duration, Utc};

    fn project(status: ProjectStatus) -> Project {
        let mut p = Project::from_intake("org-1", ProjectIntake::default(), Utc::now());
        p.status = status;
        p
    }

    #[test]
    fn test_project_stats_counts_by_status() {
        let projects = vec![
            project(ProjectStatus::InProgress),
            project(ProjectStatus::InProgress),
            project(ProjectStatus::Completed),
            project(ProjectStatus::OnHold),
        ];
        let stats = Analytics::project_stats(&projects);
        assert_eq!(stats, ProjectStats { total: 4, completed: 1, in_progress: 2 });
    }

    #[test]
    fn test_equipment_usage_sorted_by_type() {
        let t0 = Utc::now();
        let mut p = project(ProjectStatus::InProgress);
        let chamber = DryingChamber::new("Main", vec![]);
        let chamber_id = chamber.chamber_id.clone();
        p.drying_chambers.push(chamber);

        for (ty, serial) in [("Dehumidifier", "D1"), ("Air Mover", "A1"), ("Air Mover", "A2")] {
            let unit = EquipmentUnit::new("org-1", ty, "M", serial);
            EquipmentRuntimeTracker::assign(&mut p, &chamber_id, &unit, None, t0).unwrap();
        }
        EquipmentRuntimeTracker::refresh_project(&mut p, t0 + Duration::hours(2));

        let usage = Analytics::equipment_usage(std::slice::from_ref(&p));
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].equipment_type, "Air Mover");
        assert_eq!(usage[0].count, 2);
        assert_eq!(usage[1].equipment_type, "Dehumidifier");

        let runtime = Analytics::runtime_by_project(&[p]);
        assert_eq!(runtime[0].runtime_hours, 6);
        assert_eq!(runtime[0].active_equipment, 3);
    }

    #[test]
    fn test_dashboard_counts_inventory() {
        let mut in_use = EquipmentUnit::new("org-1", "Air Mover", "AM-500", "1");
        in_use.status = EquipmentStatus::InUse;
        let available = EquipmentUnit::new("org-1", "Air Mover", "AM-500", "2");
        let counts = Analytics::dashboard_counts(&[project(ProjectStatus::Completed)], &[in_use, available]);
        assert_eq!(counts.active_projects, 0);
        assert_eq!(counts.equipment_in_use, 1);
        assert_eq!(counts.equipment_available, 1);
        assert_eq!(counts.equipment_maintenance, 0);
    }
}
