// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use restoration_pm::domain::{
    ChamberReading, MaterialReading, MoistureReading, ProjectIntake,
};

// ==========================================
// ProjectIntake 构建器（默认填满必填字段）
// ==========================================

pub struct IntakeBuilder {
    intake: ProjectIntake,
}

impl IntakeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            intake: ProjectIntake {
                name: name.to_string(),
                date_of_loss: NaiveDate::from_ymd_opt(2024, 5, 1),
                street_address: "12 Elm St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip_code: "62701".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn project_type(mut self, project_type: &str) -> Self {
        self.intake.project_type = project_type.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.intake.category = Some(category.to_string());
        self
    }

    pub fn claim_number(mut self, claim: &str) -> Self {
        self.intake.claim_number = Some(claim.to_string());
        self
    }

    pub fn without_address(mut self) -> Self {
        self.intake.street_address.clear();
        self.intake.city.clear();
        self
    }

    pub fn without_date_of_loss(mut self) -> Self {
        self.intake.date_of_loss = None;
        self
    }

    pub fn build(self) -> ProjectIntake {
        self.intake
    }
}

// ==========================================
// MoistureReading 构建器
// ==========================================

pub struct ReadingBuilder {
    reading: MoistureReading,
}

impl ReadingBuilder {
    /// 室外条件默认填好
    pub fn new(date: &str) -> Self {
        let mut reading = MoistureReading::new(date);
        reading.outside_conditions.temperature = Some(58.0);
        reading.outside_conditions.humidity = Some(70.0);
        Self { reading }
    }

    pub fn without_outside_conditions(mut self) -> Self {
        self.reading.outside_conditions = Default::default();
        self
    }

    /// 干燥区环境读数（GPP 固定 60）
    pub fn chamber(mut self, chamber_id: &str, temperature: f64, humidity: f64) -> Self {
        self.reading.chamber_readings.push(ChamberReading {
            chamber_id: chamber_id.to_string(),
            temperature: Some(temperature),
            humidity: Some(humidity),
            gpp: Some(60.0),
            material_readings: Vec::new(),
        });
        self
    }

    /// 材料含水率（加到最近一个干燥区读数上）
    pub fn material(mut self, material_id: &str, moisture: f64) -> Self {
        if let Some(chamber) = self.reading.chamber_readings.last_mut() {
            chamber.material_readings.push(MaterialReading {
                material_id: material_id.to_string(),
                moisture: Some(moisture),
            });
        }
        self
    }

    pub fn build(self) -> MoistureReading {
        self.reading
    }
}
