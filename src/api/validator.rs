// ==========================================
// 灾后修复项目管理系统 - 操作校验器
// ==========================================
// 职责: 立项表单必填校验、权限门禁
// 约定: 表单缺失字段一次性全部报告
// ==========================================

use crate::api::error::{ApiError, ApiResult, FieldViolation};
use crate::domain::project::ProjectIntake;
use crate::domain::session::Session;
use crate::domain::types::Permission;

// ==========================================
// IntakeValidator - 立项表单校验
// ==========================================
pub struct IntakeValidator;

impl IntakeValidator {
    /// 收集全部必填字段缺失
    pub fn violations(intake: &ProjectIntake) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        let text_fields = [
            ("name", &intake.name),
            ("street_address", &intake.street_address),
            ("city", &intake.city),
            ("state", &intake.state),
            ("zip_code", &intake.zip_code),
        ];
        for (field, value) in text_fields {
            if value.trim().is_empty() {
                violations.push(FieldViolation::required(field));
            }
        }
        if intake.date_of_loss.is_none() {
            violations.push(FieldViolation::required("date_of_loss"));
        }

        // 字段顺序与表单一致
        violations.sort_by_key(|v| field_order(&v.field));
        violations
    }

    /// 校验立项表单
    ///
    /// # 返回
    /// - Ok(()): 通过
    /// - Err(ValidationFailed): 带全部违规字段
    pub fn validate(intake: &ProjectIntake) -> ApiResult<()> {
        let violations = Self::violations(intake);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationFailed { violations })
        }
    }
}

fn field_order(field: &str) -> usize {
    const ORDER: [&str; 6] = ["name", "date_of_loss", "street_address", "city", "state", "zip_code"];
    ORDER.iter().position(|f| *f == field).unwrap_or(ORDER.len())
}

// ==========================================
// 权限门禁
// ==========================================

/// 检查会话权限;拒绝时不执行操作
pub fn require_permission(session: &Session, permission: Permission) -> ApiResult<()> {
    if session.has_permission(permission) {
        return Ok(());
    }
    tracing::debug!(
        user_id = %session.user_id,
        role = %session.role,
        permission = %permission,
        "权限不足,操作未执行"
    );
    Err(ApiError::PermissionDenied { permission })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_intake_reports_all_required_fields() {
        let violations = IntakeValidator::violations(&ProjectIntake::default());
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["name", "date_of_loss", "street_address", "city", "state", "zip_code"]
        );
    }

    #[test]
    fn test_complete_intake_passes() {
        let intake = ProjectIntake {
            name: "Smith Residence".to_string(),
            date_of_loss: NaiveDate::from_ymd_opt(2024, 5, 1),
            street_address: "12 Elm St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            ..Default::default()
        };
        assert!(IntakeValidator::validate(&intake).is_ok());
    }

    #[test]
    fn test_admin_cannot_update_compliance() {
        let session = Session::admin("u1", "org-1");
        assert!(require_permission(&session, Permission::EditProject).is_ok());
        assert!(matches!(
            require_permission(&session, Permission::UpdateCompliance),
            Err(ApiError::PermissionDenied { permission: Permission::UpdateCompliance })
        ));
    }
}
