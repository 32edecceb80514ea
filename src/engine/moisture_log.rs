// ==========================================
// 灾后修复项目管理系统 - 含水率读数日志
// ==========================================
// 规则:
// - 只追加,不修改/删除历史记录
// - 新读数模板按项目"当前"结构预填（干燥区 → 房间 → 材料）
// - 追加前按模板校验: 干燥区/材料集合一致,必填值齐全
// - 历史记录的材料键集合不保证一致,按 id 查找缺失时返回 None
// - 曲线数据按日志插入顺序,不按日期排序
// ==========================================

use crate::domain::project::Project;
use crate::domain::reading::{ChamberReading, MaterialReading, MoistureReading};
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// TrendSeries - 环境趋势曲线数据
// ==========================================
// 仅数据派生,不含渲染
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub labels: Vec<String>,                  // 日期标签（日志顺序）
    pub chamber_temperature: Vec<Option<f64>>, // 干燥区温度（°F）
    pub chamber_humidity: Vec<Option<f64>>,    // 干燥区相对湿度（%）
    pub material_moisture: Vec<Option<f64>>,   // 材料含水率（%）
}

// ==========================================
// MoistureLog
// ==========================================
pub struct MoistureLog;

impl MoistureLog {
    /// 按项目当前结构预填读数模板
    pub fn seed_template(project: &Project, date: &str) -> MoistureReading {
        let mut reading = MoistureReading::new(date);
        reading.chamber_readings = project
            .drying_chambers
            .iter()
            .map(|chamber| ChamberReading {
                chamber_id: chamber.chamber_id.clone(),
                temperature: None,
                humidity: None,
                gpp: None,
                material_readings: project
                    .chamber_materials(chamber)
                    .into_iter()
                    .map(|m| MaterialReading {
                        material_id: m.material_id.clone(),
                        moisture: None,
                    })
                    .collect(),
            })
            .collect();
        reading
    }

    /// 按项目当前结构校验待追加的读数
    ///
    /// 必填: 日期、室外温湿度、各干燥区温度/湿度/GPP、各材料含水率
    /// 干燥区集合与每个干燥区的材料集合必须与当前模板一致
    pub fn validate(project: &Project, reading: &MoistureReading) -> EngineResult<()> {
        if reading.date.trim().is_empty() {
            return Err(EngineError::InvalidInput("读数日期不能为空".to_string()));
        }
        let outside = &reading.outside_conditions;
        if outside.temperature.is_none() || outside.humidity.is_none() {
            return Err(EngineError::InvalidInput("室外温度/湿度不能为空".to_string()));
        }

        let template = Self::seed_template(project, &reading.date);
        let expected: BTreeSet<&str> = template
            .chamber_readings
            .iter()
            .map(|c| c.chamber_id.as_str())
            .collect();
        let actual: BTreeSet<&str> = reading
            .chamber_readings
            .iter()
            .map(|c| c.chamber_id.as_str())
            .collect();
        if expected != actual || actual.len() != reading.chamber_readings.len() {
            return Err(EngineError::InvalidInput(format!(
                "干燥区与项目当前结构不一致: expected={:?} actual={:?}",
                expected, actual
            )));
        }

        for expected_chamber in &template.chamber_readings {
            let chamber = reading
                .chamber(&expected_chamber.chamber_id)
                .ok_or_else(|| EngineError::not_found("ChamberReading", &expected_chamber.chamber_id))?;
            if chamber.temperature.is_none() || chamber.humidity.is_none() || chamber.gpp.is_none() {
                return Err(EngineError::InvalidInput(format!(
                    "干燥区 {} 的温度/湿度/GPP不能为空",
                    chamber.chamber_id
                )));
            }

            let expected_materials: BTreeSet<&str> = expected_chamber
                .material_readings
                .iter()
                .map(|m| m.material_id.as_str())
                .collect();
            let materials: BTreeSet<&str> = chamber
                .material_readings
                .iter()
                .map(|m| m.material_id.as_str())
                .collect();
            if expected_materials != materials || materials.len() != chamber.material_readings.len() {
                return Err(EngineError::InvalidInput(format!(
                    "干燥区 {} 的材料与项目当前结构不一致",
                    chamber.chamber_id
                )));
            }
            if let Some(missing) = chamber.material_readings.iter().find(|m| m.moisture.is_none()) {
                return Err(EngineError::InvalidInput(format!(
                    "材料 {} 的含水率不能为空",
                    missing.material_id
                )));
            }
        }
        Ok(())
    }

    /// 追加读数
    ///
    /// # 返回
    /// - usize: 追加后的日志长度
    pub fn append(project: &mut Project, reading: MoistureReading) -> usize {
        project.moisture_readings.push(reading);
        tracing::debug!(
            project_id = %project.project_id,
            len = project.moisture_readings.len(),
            "读数已追加"
        );
        project.moisture_readings.len()
    }

    /// 生成干燥区/材料的趋势曲线
    ///
    /// # 参数
    /// - chamber_id: 干燥区ID
    /// - material_id: 材料ID（None 时材料曲线全为 None）
    pub fn trend_series(
        project: &Project,
        chamber_id: &str,
        material_id: Option<&str>,
    ) -> Option<TrendSeries> {
        // 干燥区必须仍存在于项目中
        project.find_chamber(chamber_id)?;

        let readings = &project.moisture_readings;
        let mut series = TrendSeries {
            labels: Vec::with_capacity(readings.len()),
            chamber_temperature: Vec::with_capacity(readings.len()),
            chamber_humidity: Vec::with_capacity(readings.len()),
            material_moisture: Vec::with_capacity(readings.len()),
        };

        for reading in readings {
            let chamber = reading.chamber(chamber_id);
            series.labels.push(reading.date.clone());
            series.chamber_temperature.push(chamber.and_then(|c| c.temperature));
            series.chamber_humidity.push(chamber.and_then(|c| c.humidity));
            series.material_moisture.push(
                material_id.and_then(|id| chamber.and_then(|c| c.material_moisture(id))),
            );
        }

        Some(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chamber::DryingChamber;
    use crate::domain::project::ProjectIntake;
    use crate::domain::room::{AffectedRoom, Material, RoomDimensions};
    use chrono::Utc;

    fn sample_project() -> (Project, String, String) {
        let mut project = Project::from_intake("org-1", ProjectIntake::default(), Utc::now());
        let mut room = AffectedRoom::new("Kitchen", "1", RoomDimensions::new("10", "10", "8", ""));
        let material = Material::new("Drywall", "Wall", Some(200.0), Some(40.0));
        let material_id = material.material_id.clone();
        room.materials.push(material);
        let chamber = DryingChamber::new("Main", vec![room.room_id.clone()]);
        let chamber_id = chamber.chamber_id.clone();
        project.affected_rooms.push(room);
        project.drying_chambers.push(chamber);
        (project, chamber_id, material_id)
    }

    #[test]
    fn test_seed_template_follows_current_structure() {
        let (project, chamber_id, material_id) = sample_project();
        let tpl = MoistureLog::seed_template(&project, "2024-05-01");

        assert_eq!(tpl.chamber_readings.len(), 1);
        assert_eq!(tpl.chamber_readings[0].chamber_id, chamber_id);
        assert_eq!(tpl.chamber_readings[0].material_readings[0].material_id, material_id);
        assert_eq!(tpl.chamber_readings[0].material_readings[0].moisture, None);
    }

    fn filled(project: &Project, date: &str) -> MoistureReading {
        let mut reading = MoistureLog::seed_template(project, date);
        reading.outside_conditions.temperature = Some(58.0);
        reading.outside_conditions.humidity = Some(70.0);
        for chamber in reading.chamber_readings.iter_mut() {
            chamber.temperature = Some(75.0);
            chamber.humidity = Some(55.0);
            chamber.gpp = Some(71.0);
            for material in chamber.material_readings.iter_mut() {
                material.moisture = Some(30.0);
            }
        }
        reading
    }

    #[test]
    fn test_validate_accepts_filled_template() {
        let (project, _, _) = sample_project();
        assert_eq!(MoistureLog::validate(&project, &filled(&project, "2024-05-01")), Ok(()));
    }

    #[test]
    fn test_validate_rejects_missing_values() {
        let (project, chamber_id, _) = sample_project();

        let mut blank_date = filled(&project, "2024-05-01");
        blank_date.date = "  ".to_string();
        assert!(matches!(
            MoistureLog::validate(&project, &blank_date),
            Err(EngineError::InvalidInput(_))
        ));

        let mut no_outside = filled(&project, "2024-05-01");
        no_outside.outside_conditions.humidity = None;
        assert!(MoistureLog::validate(&project, &no_outside).is_err());

        let mut no_gpp = filled(&project, "2024-05-01");
        no_gpp.chamber_mut(&chamber_id).unwrap().gpp = None;
        assert!(MoistureLog::validate(&project, &no_gpp).is_err());

        let mut no_moisture = filled(&project, "2024-05-01");
        no_moisture.chamber_mut(&chamber_id).unwrap().material_readings[0].moisture = None;
        assert!(matches!(
            MoistureLog::validate(&project, &no_moisture),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_structure_mismatch() {
        let (project, chamber_id, _) = sample_project();

        // 缺少干燥区
        let mut empty = filled(&project, "2024-05-01");
        empty.chamber_readings.clear();
        assert!(MoistureLog::validate(&project, &empty).is_err());

        // 未知干燥区
        let mut foreign = filled(&project, "2024-05-01");
        foreign.chamber_readings[0].chamber_id = "other".to_string();
        assert!(MoistureLog::validate(&project, &foreign).is_err());

        // 多出的材料
        let mut extra = filled(&project, "2024-05-01");
        extra.chamber_mut(&chamber_id).unwrap().material_readings.push(MaterialReading {
            material_id: "stray".to_string(),
            moisture: Some(20.0),
        });
        assert!(matches!(
            MoistureLog::validate(&project, &extra),
            Err(EngineError::InvalidInput(_))
        ));

        // 重复的干燥区
        let mut duplicated = filled(&project, "2024-05-01");
        let copy = duplicated.chamber_readings[0].clone();
        duplicated.chamber_readings.push(copy);
        assert!(MoistureLog::validate(&project, &duplicated).is_err());
    }

    #[test]
    fn test_append_keeps_history_intact() {
        let (mut project, chamber_id, material_id) = sample_project();

        let mut first = MoistureLog::seed_template(&project, "2024-05-01");
        first.chamber_mut(&chamber_id).unwrap().material_readings[0].moisture = Some(40.0);
        let snapshot = first.clone();

        assert_eq!(MoistureLog::append(&mut project, first), 1);
        // 重复日期允许
        let second = MoistureLog::seed_template(&project, "2024-05-01");
        assert_eq!(MoistureLog::append(&mut project, second), 2);

        assert_eq!(project.moisture_readings[0], snapshot);
        assert_eq!(
            project.moisture_readings[0].material_moisture(&chamber_id, &material_id),
            Some(40.0)
        );
    }

    #[test]
    fn test_trend_series_gaps_are_none() {
        let (mut project, chamber_id, material_id) = sample_project();

        let mut r1 = MoistureLog::seed_template(&project, "2024-05-01");
        {
            let c = r1.chamber_mut(&chamber_id).unwrap();
            c.temperature = Some(72.0);
            c.humidity = Some(45.0);
            c.material_readings[0].moisture = Some(38.0);
        }
        MoistureLog::append(&mut project, r1);

        // 结构变化后录入的读数不含该干燥区
        let r2 = MoistureReading::new("2024-05-02");
        MoistureLog::append(&mut project, r2);

        let series = MoistureLog::trend_series(&project, &chamber_id, Some(&material_id)).unwrap();
        assert_eq!(series.labels, vec!["2024-05-01", "2024-05-02"]);
        assert_eq!(series.chamber_temperature, vec![Some(72.0), None]);
        assert_eq!(series.chamber_humidity, vec![Some(45.0), None]);
        assert_eq!(series.material_moisture, vec![Some(38.0), None]);

        assert!(MoistureLog::trend_series(&project, "unknown", None).is_none());
    }
}
