//! 前端视图映射
//!
//! 将后端记录转换为ORCC前端使用的camelCase结构。两个函数都是纯函数，
//! 输入中缺失的字段在输出中同样缺失。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{is_truthy, Patient, Procedure};

/// 前端患者视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrccPatient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrn: Option<Value>,
    /// "姓, 名" 格式的显示名
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    pub procedures: Value,
}

/// 前端手术视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrccProcedure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrn: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_side: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_location: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surgeon: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    pub barriers: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardiology_clearance: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_test_status: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vqi_case_id: Option<Value>,
}

/// 假值（缺失、null、空数组以外的假值）替换为空数组
fn list_or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(v) if is_truthy(v) => v.clone(),
        _ => Value::Array(Vec::new()),
    }
}

/// 后端患者 → 前端患者
pub fn map_patient_to_orcc(patient: &Patient) -> OrccPatient {
    let field = |key: &str| patient.get(key).cloned();

    OrccPatient {
        id: field("id"),
        mrn: field("mrn"),
        name: format!(
            "{}, {}",
            patient.last_name().unwrap_or_default(),
            patient.first_name().unwrap_or_default()
        ),
        first_name: field("first_name"),
        last_name: field("last_name"),
        dob: field("date_of_birth"),
        gender: field("gender"),
        phone: field("phone_primary"),
        email: field("email"),
        procedures: list_or_empty(patient.get("procedures")),
    }
}

/// 后端手术 → 前端手术
///
/// `procedureName` 取自 `procedure_type`，`status` 取自 `surgical_status`。
/// 字段值原样透传，后端返回 `null` 的字段输出仍为 `null`。
pub fn map_procedure_to_orcc(procedure: &Procedure) -> OrccProcedure {
    let field = |key: &str| procedure.get(key).cloned();

    OrccProcedure {
        id: field("id"),
        patient_id: field("patient_id"),
        mrn: field("mrn"),
        patient_name: field("patient_name"),
        procedure_name: field("procedure_type"),
        procedure_side: field("procedure_side"),
        scheduled_date: field("procedure_date"),
        scheduled_location: field("scheduled_location"),
        surgeon: field("surgeon"),
        status: field("surgical_status"),
        barriers: list_or_empty(procedure.get("barriers")),
        cardiology_clearance: field("cardiology_clearance"),
        stress_test_status: field("stress_test_status"),
        vqi_case_id: field("vqi_case_id"),
    }
}
