//! ORCC工作流便捷方法
//!
//! 固定状态过滤的列表查询，以及只写入一两个字段的定向更新。

use chrono::NaiveDate;

use orcc_core::{Procedure, ProcedureQuery, ProcedureUpdate, Result, StressTestStatus, SurgicalStatus};

use crate::client::OrccClient;

impl OrccClient {
    /// 可手术的患者
    pub async fn get_ready_patients(&self) -> Result<Vec<Procedure>> {
        self.get_procedures(&ProcedureQuery::with_status(SurgicalStatus::Ready))
            .await
    }

    /// 需要术前检查的患者
    pub async fn get_workup_patients(&self) -> Result<Vec<Procedure>> {
        self.get_procedures(&ProcedureQuery::with_status(SurgicalStatus::Workup))
            .await
    }

    pub async fn get_hold_patients(&self) -> Result<Vec<Procedure>> {
        self.get_procedures(&ProcedureQuery::with_status(SurgicalStatus::Hold))
            .await
    }

    /// 差一步就绪的患者
    pub async fn get_near_ready_patients(&self) -> Result<Vec<Procedure>> {
        self.get_procedures(&ProcedureQuery::with_status(SurgicalStatus::NearReady))
            .await
    }

    pub async fn update_surgical_status(&self, procedure_id: i64, status: SurgicalStatus) -> Result<Procedure> {
        let update = ProcedureUpdate {
            surgical_status: Some(status),
            ..Default::default()
        };
        self.update_procedure(procedure_id, &update).await
    }

    /// 替换术前障碍项列表
    pub async fn update_barriers(&self, procedure_id: i64, barriers: Vec<String>) -> Result<Procedure> {
        let update = ProcedureUpdate {
            barriers: Some(barriers),
            ..Default::default()
        };
        self.update_procedure(procedure_id, &update).await
    }

    pub async fn set_cardiology_clearance(&self, procedure_id: i64, cleared: bool) -> Result<Procedure> {
        let update = ProcedureUpdate {
            cardiology_clearance: Some(cleared),
            ..Default::default()
        };
        self.update_procedure(procedure_id, &update).await
    }

    pub async fn update_stress_test_status(
        &self,
        procedure_id: i64,
        status: StressTestStatus,
    ) -> Result<Procedure> {
        let update = ProcedureUpdate {
            stress_test_status: Some(status),
            ..Default::default()
        };
        self.update_procedure(procedure_id, &update).await
    }

    /// 排期：写入日期和地点，并将状态置为 `scheduled`
    pub async fn schedule_procedure(
        &self,
        procedure_id: i64,
        date: NaiveDate,
        location: &str,
    ) -> Result<Procedure> {
        let update = ProcedureUpdate {
            procedure_date: Some(date),
            scheduled_location: Some(location.to_string()),
            surgical_status: Some(SurgicalStatus::Scheduled),
            ..Default::default()
        };
        self.update_procedure(procedure_id, &update).await
    }
}
