//! 后端数据模型定义
//!
//! 字段名与PlaudAI后端的JSON保持一致（snake_case）。后端返回的记录
//! 保留原始JSON对象；客户端构造的请求体使用强类型结构。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::OrccError;

/// 手术流程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurgicalStatus {
    Ready,     // 可手术
    NearReady, // 差一步就绪
    Workup,    // 术前检查中
    Hold,      // 暂缓
    Scheduled, // 已排期
    Completed, // 已完成
}

impl SurgicalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::NearReady => "near_ready",
            Self::Workup => "workup",
            Self::Hold => "hold",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SurgicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SurgicalStatus {
    type Error = OrccError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "ready" => Ok(Self::Ready),
            "near_ready" => Ok(Self::NearReady),
            "workup" => Ok(Self::Workup),
            "hold" => Ok(Self::Hold),
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            _ => Err(OrccError::InvalidValue(format!(
                "unknown surgical status: {}",
                value
            ))),
        }
    }
}

/// 负荷试验状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressTestStatus {
    Pending,
    Completed,
    Abnormal,
    NotNeeded,
}

impl StressTestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Abnormal => "abnormal",
            Self::NotNeeded => "not_needed",
        }
    }
}

impl fmt::Display for StressTestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for StressTestStatus {
    type Error = OrccError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "abnormal" => Ok(Self::Abnormal),
            "not_needed" => Ok(Self::NotNeeded),
            _ => Err(OrccError::InvalidValue(format!(
                "unknown stress test status: {}",
                value
            ))),
        }
    }
}

/// JSON真值判断：null、false、0、空字符串为假
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 后端记录的公共访问方法
///
/// 记录原样保存后端返回的JSON对象，序列化时逐字段写回（包括显式的 `null`）。
/// 访问方法只做宽松读取：类型不符的字段视为缺失，不会导致整条记录解析失败。
macro_rules! backend_record {
    ($name:ident) => {
        impl $name {
            pub fn from_fields(fields: Map<String, Value>) -> Self {
                Self { fields }
            }

            pub fn fields(&self) -> &Map<String, Value> {
                &self.fields
            }

            pub fn into_fields(self) -> Map<String, Value> {
                self.fields
            }

            /// 原始字段值，显式的 `null` 也会返回
            pub fn get(&self, key: &str) -> Option<&Value> {
                self.fields.get(key)
            }

            fn text(&self, key: &str) -> Option<&str> {
                self.fields.get(key).and_then(Value::as_str)
            }

            fn integer(&self, key: &str) -> Option<i64> {
                match self.fields.get(key)? {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                }
            }
        }

        impl TryFrom<Value> for $name {
            type Error = OrccError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::Object(fields) => Ok(Self { fields }),
                    other => Err(OrccError::InvalidValue(format!(
                        "expected a JSON object for {}, got {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

/// 患者信息（以MRN唯一标识）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patient {
    fields: Map<String, Value>,
}

backend_record!(Patient);

impl Patient {
    pub fn id(&self) -> Option<i64> {
        self.integer("id")
    }

    pub fn mrn(&self) -> Option<&str> {
        self.text("mrn")
    }

    pub fn first_name(&self) -> Option<&str> {
        self.text("first_name")
    }

    pub fn last_name(&self) -> Option<&str> {
        self.text("last_name")
    }

    /// 按MRN查询时后端附带的手术列表，非对象元素被跳过
    pub fn procedures(&self) -> Vec<Procedure> {
        match self.fields.get("procedures") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| Procedure::try_from(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// 手术信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Procedure {
    fields: Map<String, Value>,
}

backend_record!(Procedure);

impl Procedure {
    pub fn id(&self) -> Option<i64> {
        self.integer("id")
    }

    pub fn patient_id(&self) -> Option<i64> {
        self.integer("patient_id")
    }

    pub fn mrn(&self) -> Option<&str> {
        self.text("mrn")
    }

    /// 后端预先关联好的患者姓名
    pub fn patient_name(&self) -> Option<&str> {
        self.text("patient_name")
    }

    pub fn procedure_type(&self) -> Option<&str> {
        self.text("procedure_type")
    }

    pub fn scheduled_location(&self) -> Option<&str> {
        self.text("scheduled_location")
    }

    /// 无法识别的状态值返回 `None`，原始值仍可通过 `get` 读取
    pub fn surgical_status(&self) -> Option<SurgicalStatus> {
        self.text("surgical_status")
            .and_then(|s| SurgicalStatus::try_from(s).ok())
    }

    /// 术前障碍项，只取字符串元素
    pub fn barriers(&self) -> Vec<String> {
        match self.fields.get("barriers") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn cardiology_clearance(&self) -> Option<bool> {
        self.fields.get("cardiology_clearance").and_then(Value::as_bool)
    }
}

/// 规划数据包：患者最新手术及血管/介入/编码数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanningBundle {
    fields: Map<String, Value>,
}

backend_record!(PlanningBundle);

impl PlanningBundle {
    pub fn patient(&self) -> Option<&Value> {
        self.fields.get("patient").filter(|v| !v.is_null())
    }

    /// 最新手术（`procedure` 为对象时）
    pub fn procedure(&self) -> Option<Procedure> {
        self.fields
            .get("procedure")
            .and_then(|v| Procedure::try_from(v.clone()).ok())
    }

    /// 已有手术的id；缺失、为0或非整数时返回 `None`，其余字段不参与判断
    pub fn procedure_id(&self) -> Option<i64> {
        let id = self.fields.get("procedure")?.get("id")?;
        if !is_truthy(id) {
            return None;
        }
        match id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|id| *id != 0)
    }
}

/// 创建患者请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 创建手术请求（完整规划数据，以MRN为键）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProcedure {
    pub mrn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surgeon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surgical_status: Option<SurgicalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outflow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interventions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpt_codes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barriers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardiology_clearance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_test_status: Option<StressTestStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 手术部分更新请求，未设置的字段不会被序列化
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surgeon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surgical_status: Option<SurgicalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outflow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interventions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpt_codes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barriers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardiology_clearance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_test_status: Option<StressTestStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vqi_case_id: Option<String>,
}

impl ProcedureUpdate {
    /// 从完整手术数据中取出覆盖已有手术时允许写入的字段。
    ///
    /// 白名单：类型、名称、侧别、日期、地点、两种状态、临床字段
    /// （indication/access/inflow/outflow）、血管数据、介入方案和CPT编码。
    /// 其他字段（如 barriers、surgeon）保持后端现值。
    pub fn from_save_payload(data: &NewProcedure) -> Self {
        Self {
            procedure_type: data.procedure_type.clone(),
            procedure_name: data.procedure_name.clone(),
            procedure_side: data.procedure_side.clone(),
            procedure_date: data.procedure_date,
            scheduled_location: data.scheduled_location.clone(),
            status: data.status.clone(),
            surgical_status: data.surgical_status,
            indication: data.indication.clone(),
            access: data.access.clone(),
            inflow: data.inflow.clone(),
            outflow: data.outflow.clone(),
            vessel_data: data.vessel_data.clone(),
            interventions: data.interventions.clone(),
            cpt_codes: data.cpt_codes.clone(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_surgical_status_wire_format() {
        assert_eq!(
            serde_json::to_value(SurgicalStatus::NearReady).unwrap(),
            json!("near_ready")
        );
        assert_eq!(
            SurgicalStatus::try_from("scheduled").unwrap(),
            SurgicalStatus::Scheduled
        );
        assert!(SurgicalStatus::try_from("cancelled").is_err());
    }

    #[test]
    fn test_stress_test_status_parse() {
        assert_eq!(
            StressTestStatus::try_from("not_needed").unwrap(),
            StressTestStatus::NotNeeded
        );
        assert_eq!(StressTestStatus::Abnormal.to_string(), "abnormal");
    }

    #[test]
    fn test_procedure_keeps_unmodelled_fields() {
        let body = json!({
            "id": 7,
            "mrn": "MRN001",
            "surgical_status": "hold",
            "created_by": "scheduler",
            "notes": {"free": "text"}
        });

        let procedure: Procedure = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(procedure.id(), Some(7));
        assert_eq!(procedure.surgical_status(), Some(SurgicalStatus::Hold));
        assert_eq!(procedure.get("created_by"), Some(&json!("scheduler")));

        assert_eq!(serde_json::to_value(&procedure).unwrap(), body);
    }

    #[test]
    fn test_patient_null_fields_round_trip() {
        let body = json!([{
            "email": null,
            "first_name": "Jane",
            "gender": null,
            "id": 1,
            "last_name": "Doe",
            "mrn": "M"
        }]);

        let patients: Vec<Patient> = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(patients[0].get("email"), Some(&Value::Null));
        assert_eq!(serde_json::to_value(&patients).unwrap(), body);
    }

    #[test]
    fn test_procedure_tolerates_backend_formats() {
        let body = json!({
            "id": 42,
            "procedure_date": "2026-11-02T08:00:00",
            "stress_test_status": "scheduled",
            "vqi_case_id": 9913,
            "barriers": [{"item": "renal"}, "cardiology"],
            "surgical_status": "unknown_state"
        });

        let procedure: Procedure = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(procedure.id(), Some(42));
        assert_eq!(procedure.surgical_status(), None);
        assert_eq!(procedure.barriers(), vec!["cardiology".to_string()]);
        assert_eq!(serde_json::to_value(&procedure).unwrap(), body);
    }

    #[test]
    fn test_record_requires_object() {
        assert!(serde_json::from_value::<Procedure>(json!([1, 2])).is_err());
        assert!(Procedure::try_from(json!("x")).is_err());
    }

    #[test]
    fn test_planning_bundle_without_procedure() {
        let bundle: PlanningBundle =
            serde_json::from_value(json!({"patient": {"mrn": "X"}, "procedure": null})).unwrap();
        assert!(bundle.procedure().is_none());
        assert_eq!(bundle.procedure_id(), None);
        assert!(bundle.patient().is_some());
    }

    #[test]
    fn test_planning_procedure_id_uses_id_only() {
        let bundle: PlanningBundle = serde_json::from_value(json!({
            "procedure": {"id": 42, "stress_test_status": "scheduled", "procedure_date": "2026-11-02T08:00:00"}
        }))
        .unwrap();
        assert_eq!(bundle.procedure_id(), Some(42));

        let zero: PlanningBundle = serde_json::from_value(json!({"procedure": {"id": 0}})).unwrap();
        assert_eq!(zero.procedure_id(), None);

        let missing: PlanningBundle = serde_json::from_value(json!({"procedure": {"mrn": "X"}})).unwrap();
        assert_eq!(missing.procedure_id(), None);

        let text: PlanningBundle = serde_json::from_value(json!({"procedure": {"id": "17"}})).unwrap();
        assert_eq!(text.procedure_id(), Some(17));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn test_update_whitelist_from_save_payload() {
        let data = NewProcedure {
            mrn: "MRN001".to_string(),
            procedure_type: Some("fem-pop bypass".to_string()),
            surgeon: Some("Dr. Smith".to_string()),
            barriers: Some(vec!["cardiology".to_string()]),
            cpt_codes: Some(json!(["35656"])),
            surgical_status: Some(SurgicalStatus::Workup),
            ..Default::default()
        };

        let update = ProcedureUpdate::from_save_payload(&data);
        let body = serde_json::to_value(&update).unwrap();

        assert_eq!(
            body,
            json!({
                "procedure_type": "fem-pop bypass",
                "surgical_status": "workup",
                "cpt_codes": ["35656"]
            })
        );
    }

    #[test]
    fn test_empty_update_serializes_to_empty_object() {
        let update = ProcedureUpdate::default();
        assert!(update.is_empty());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({}));
    }
}
