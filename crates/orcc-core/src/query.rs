//! 列表查询参数
//!
//! 只有存在且为"真值"的参数才会写入查询串，顺序与字段声明一致。
//! 空字符串和数值0视为假值被丢弃，因此 `skip: Some(0)` 与未设置等价。

use crate::models::SurgicalStatus;

/// 查询串键值对
pub type QueryPairs = Vec<(&'static str, String)>;

/// 患者列表查询
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientQuery {
    pub search: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl PatientQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn to_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push_text(&mut pairs, "search", self.search.as_deref());
        push_number(&mut pairs, "skip", self.skip.map(i64::from));
        push_number(&mut pairs, "limit", self.limit.map(i64::from));
        pairs
    }
}

/// 手术列表查询
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcedureQuery {
    pub surgical_status: Option<SurgicalStatus>,
    pub patient_id: Option<i64>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl ProcedureQuery {
    pub fn with_status(status: SurgicalStatus) -> Self {
        Self {
            surgical_status: Some(status),
            ..Self::default()
        }
    }

    pub fn to_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push_text(
            &mut pairs,
            "surgical_status",
            self.surgical_status.as_ref().map(SurgicalStatus::as_str),
        );
        push_number(&mut pairs, "patient_id", self.patient_id);
        push_number(&mut pairs, "skip", self.skip.map(i64::from));
        push_number(&mut pairs, "limit", self.limit.map(i64::from));
        pairs
    }
}

fn push_text(pairs: &mut QueryPairs, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        pairs.push((key, value.to_string()));
    }
}

fn push_number(pairs: &mut QueryPairs, key: &'static str, value: Option<i64>) {
    if let Some(value) = value.filter(|v| *v != 0) {
        pairs.push((key, value.to_string()));
    }
}
