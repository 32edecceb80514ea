// ==========================================
// 灾后修复项目管理系统 - 干燥进度估算
// ==========================================
// 规则:
// - initial = 日志第一条的材料含水率, latest = 日志最后一条的材料含水率
// - total = initial − goal, current = initial − latest
// - progress = current / total × 100, 截断到 [0, 100], 两位小数
// - 任一输入缺失 → 不可用
// - total == 0 → 不可用（GoalEqualsInitial）,不做除零
// ==========================================

use crate::domain::project::Project;
use crate::domain::reading::MoistureReading;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// 读数选取方式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionMode {
    /// 按日志位置（第一条/最后一条）
    #[default]
    ByPosition,
    /// 按解析后的日期稳定排序后再取首尾（无法解析的日期排在最后）
    ByDate,
}

// ==========================================
// 不可用原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnavailableReason {
    MissingInitialReading,
    MissingLatestReading,
    MissingGoal,
    GoalEqualsInitial,
}

// ==========================================
// DryingProgress - 估算结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DryingProgress {
    /// 百分比（已截断到 [0, 100]）
    Available(f64),
    Unavailable(UnavailableReason),
}

impl DryingProgress {
    pub fn percent(&self) -> Option<f64> {
        match self {
            DryingProgress::Available(p) => Some(*p),
            DryingProgress::Unavailable(_) => None,
        }
    }

    /// 两位小数展示值
    pub fn formatted(&self) -> Option<String> {
        self.percent().map(|p| format!("{:.2}", p))
    }
}

// ==========================================
// DryingProgressEstimator
// ==========================================
pub struct DryingProgressEstimator;

impl DryingProgressEstimator {
    /// 纯计算: 由 initial/latest/goal 得到进度
    pub fn calculate(
        initial: Option<f64>,
        latest: Option<f64>,
        goal: Option<f64>,
    ) -> DryingProgress {
        let Some(initial) = initial else {
            return DryingProgress::Unavailable(UnavailableReason::MissingInitialReading);
        };
        let Some(latest) = latest else {
            return DryingProgress::Unavailable(UnavailableReason::MissingLatestReading);
        };
        let Some(goal) = goal else {
            return DryingProgress::Unavailable(UnavailableReason::MissingGoal);
        };

        let total_drying = initial - goal;
        if total_drying == 0.0 {
            return DryingProgress::Unavailable(UnavailableReason::GoalEqualsInitial);
        }

        let current_drying = initial - latest;
        let progress = current_drying / total_drying * 100.0;
        DryingProgress::Available(progress.clamp(0.0, 100.0))
    }

    /// 从项目读数日志估算材料干燥进度
    ///
    /// # 参数
    /// - project: 项目
    /// - chamber_id: 干燥区ID
    /// - material_id: 材料ID
    /// - goal: 目标含水率（%）
    /// - mode: 首尾读数选取方式
    pub fn estimate(
        project: &Project,
        chamber_id: &str,
        material_id: &str,
        goal: Option<f64>,
        mode: SelectionMode,
    ) -> DryingProgress {
        let (first, last) = match mode {
            SelectionMode::ByPosition => (
                project.moisture_readings.first(),
                project.moisture_readings.last(),
            ),
            SelectionMode::ByDate => {
                let mut ordered: Vec<&MoistureReading> = project.moisture_readings.iter().collect();
                // None 排在 Some 之后
                ordered.sort_by_key(|r| {
                    let parsed = NaiveDate::parse_from_str(r.date.trim(), "%Y-%m-%d").ok();
                    (parsed.is_none(), parsed)
                });
                (ordered.first().copied(), ordered.last().copied())
            }
        };

        let initial = first.and_then(|r| r.material_moisture(chamber_id, material_id));
        let latest = last.and_then(|r| r.material_moisture(chamber_id, material_id));

        Self::calculate(initial, latest, goal)
    }
}
