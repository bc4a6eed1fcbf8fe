//! 手术保存流程
//!
//! 先按MRN查询规划数据判断是否已有手术，有则按白名单字段更新，没有则创建。
//!
//! 该流程是"先读后写"，同一MRN的并发调用可能都判定为"不存在"并各自创建，
//! 产生重复手术。客户端不做加锁，需要原子性的调用方须自行串行化。

use tracing::{info, warn};

use orcc_core::{NewProcedure, OrccError, PlanningBundle, Procedure, ProcedureUpdate, Result};

use crate::client::OrccClient;

/// 按MRN查询最新手术的结果
#[derive(Debug)]
pub enum ProcedureLookup {
    /// 规划数据中的手术带有有效id（非0整数）
    Found { id: i64, procedure: Procedure },
    /// 规划数据中没有手术，或手术id缺失/为0
    NotFound,
    /// 查询本身失败（网络错误、404、响应无法解析等）
    LookupFailed(OrccError),
}

impl ProcedureLookup {
    /// 只依据 `procedure.id` 判断，手术的其他字段不影响结果
    pub fn from_planning(bundle: &PlanningBundle) -> Self {
        match (bundle.procedure_id(), bundle.procedure()) {
            (Some(id), Some(procedure)) => Self::Found { id, procedure },
            _ => Self::NotFound,
        }
    }

    pub fn into_procedure(self) -> Option<Procedure> {
        match self {
            Self::Found { procedure, .. } => Some(procedure),
            Self::NotFound | Self::LookupFailed(_) => None,
        }
    }
}

impl OrccClient {
    /// 查询MRN对应的最新手术，不向上传播错误
    pub async fn lookup_latest_procedure(&self, mrn: &str) -> ProcedureLookup {
        match self.get_planning_data(mrn).await {
            Ok(bundle) => ProcedureLookup::from_planning(&bundle),
            Err(e) => ProcedureLookup::LookupFailed(e),
        }
    }

    /// 获取MRN对应的最新手术，不存在或查询失败时返回 `None`
    pub async fn get_latest_procedure_by_mrn(&self, mrn: &str) -> Option<Procedure> {
        let lookup = self.lookup_latest_procedure(mrn).await;
        if let ProcedureLookup::LookupFailed(e) = &lookup {
            info!("No existing procedure found for MRN {}: {}", mrn, e);
        }
        lookup.into_procedure()
    }

    /// 创建或更新MRN对应的手术
    pub async fn save_or_update_procedure(&self, data: &NewProcedure) -> Result<Procedure> {
        let mrn = data.mrn.as_str();

        match self.lookup_latest_procedure(mrn).await {
            ProcedureLookup::Found { id, .. } => {
                info!("Updating existing procedure {} for MRN {}", id, mrn);
                let update = ProcedureUpdate::from_save_payload(data);
                self.update_procedure(id, &update).await
            }
            ProcedureLookup::NotFound => {
                info!("Creating new procedure for MRN {}", mrn);
                self.create_procedure(data).await
            }
            ProcedureLookup::LookupFailed(e) => {
                warn!("Procedure lookup for MRN {} failed, creating new procedure: {}", mrn, e);
                self.create_procedure(data).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{body_of, client_with};
    use crate::transport::mock::MockTransport;
    use orcc_core::SurgicalStatus;
    use reqwest::Method;
    use serde_json::json;

    fn payload() -> NewProcedure {
        NewProcedure {
            mrn: "X".to_string(),
            patient_id: Some(3),
            procedure_type: Some("EVAR".to_string()),
            procedure_side: Some("bilateral".to_string()),
            surgical_status: Some(SurgicalStatus::Workup),
            surgeon: Some("Dr. Lee".to_string()),
            vessel_data: Some(json!({"aorta": {"diameter_mm": 55}})),
            barriers: Some(vec!["renal function".to_string()]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_updates_existing_procedure_with_whitelist() {
        let (client, mock) = client_with(
            MockTransport::new()
                .respond_json(200, json!({"procedure": {"id": 42}}))
                .respond_json(200, json!({"id": 42, "procedure_type": "EVAR"})),
        );

        let saved = client.save_or_update_procedure(&payload()).await.unwrap();
        assert_eq!(saved.id(), Some(42));

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.path(), "/api/planning/X");
        assert_eq!(requests[1].method, Method::PATCH);
        assert_eq!(requests[1].url.path(), "/api/procedures/42");
        assert_eq!(
            body_of(&requests[1]),
            json!({
                "procedure_type": "EVAR",
                "procedure_side": "bilateral",
                "surgical_status": "workup",
                "vessel_data": {"aorta": {"diameter_mm": 55}}
            })
        );
    }

    #[tokio::test]
    async fn test_creates_when_planning_has_no_procedure() {
        let (client, mock) = client_with(
            MockTransport::new()
                .respond_json(200, json!({"patient": {"mrn": "X"}, "procedure": null}))
                .respond_json(201, json!({"id": 100, "mrn": "X"})),
        );

        let saved = client.save_or_update_procedure(&payload()).await.unwrap();
        assert_eq!(saved.id(), Some(100));

        let requests = mock.requests();
        assert_eq!(requests[1].method, Method::POST);
        assert_eq!(requests[1].url.path(), "/api/procedures");
        assert_eq!(body_of(&requests[1]), serde_json::to_value(payload()).unwrap());
    }

    #[tokio::test]
    async fn test_creates_when_lookup_fails() {
        let (client, mock) = client_with(
            MockTransport::new()
                .respond_json(404, json!({"detail": "No planning data"}))
                .respond_json(201, json!({"id": 101})),
        );

        let saved = client.save_or_update_procedure(&payload()).await.unwrap();
        assert_eq!(saved.id(), Some(101));
        assert_eq!(mock.requests()[1].method, Method::POST);
    }

    #[tokio::test]
    async fn test_creates_when_lookup_has_network_error() {
        let (client, mock) = client_with(
            MockTransport::new()
                .fail("connection reset")
                .respond_json(201, json!({"id": 102})),
        );

        let saved = client.save_or_update_procedure(&payload()).await.unwrap();
        assert_eq!(saved.id(), Some(102));
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_create_failure_propagates() {
        let (client, _) = client_with(
            MockTransport::new()
                .respond_json(200, json!({}))
                .respond_json(400, json!({"detail": "Patient does not exist"})),
        );

        let err = client.save_or_update_procedure(&payload()).await.unwrap_err();
        assert_eq!(err.to_string(), "Patient does not exist");
    }

    #[tokio::test]
    async fn test_lookup_variants() {
        let (client, _) = client_with(
            MockTransport::new()
                .respond_json(200, json!({"procedure": {"id": 5, "surgical_status": "ready"}}))
                .respond_json(200, json!({"procedure": null}))
                .respond(500, "oops"),
        );

        match client.lookup_latest_procedure("A").await {
            ProcedureLookup::Found { id, procedure } => {
                assert_eq!(id, 5);
                assert_eq!(procedure.surgical_status(), Some(SurgicalStatus::Ready));
            }
            other => panic!("expected Found, got {:?}", other),
        }
        assert!(matches!(
            client.lookup_latest_procedure("B").await,
            ProcedureLookup::NotFound
        ));
        match client.lookup_latest_procedure("C").await {
            ProcedureLookup::LookupFailed(e) => assert_eq!(e.to_string(), "Internal Server Error"),
            other => panic!("expected LookupFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_latest_procedure_is_none_on_failure() {
        let (client, _) = client_with(MockTransport::new().fail("timeout"));
        assert!(client.get_latest_procedure_by_mrn("X").await.is_none());
    }

    #[tokio::test]
    async fn test_updates_when_procedure_has_unexpected_fields() {
        let (client, mock) = client_with(
            MockTransport::new()
                .respond_json(
                    200,
                    json!({"procedure": {
                        "id": 42,
                        "stress_test_status": "scheduled",
                        "procedure_date": "2026-11-02T08:30:00",
                        "surgical_status": "archived",
                        "barriers": null
                    }}),
                )
                .respond_json(200, json!({"id": 42})),
        );

        let saved = client.save_or_update_procedure(&payload()).await.unwrap();
        assert_eq!(saved.id(), Some(42));

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, Method::PATCH);
        assert_eq!(requests[1].url.path(), "/api/procedures/42");
    }

    #[tokio::test]
    async fn test_zero_id_counts_as_no_procedure() {
        let (client, mock) = client_with(
            MockTransport::new()
                .respond_json(200, json!({"procedure": {"id": 0}}))
                .respond_json(201, json!({"id": 103})),
        );

        let saved = client.save_or_update_procedure(&payload()).await.unwrap();
        assert_eq!(saved.id(), Some(103));

        let requests = mock.requests();
        assert_eq!(requests[1].method, Method::POST);
        assert_eq!(requests[1].url.path(), "/api/procedures");
    }

    #[test]
    fn test_from_planning_uses_procedure_id_only() {
        let bundle = |value| PlanningBundle::try_from(value).unwrap();

        assert!(matches!(
            ProcedureLookup::from_planning(&bundle(json!({"procedure": {"id": 0}}))),
            ProcedureLookup::NotFound
        ));
        assert!(matches!(
            ProcedureLookup::from_planning(&bundle(json!({"procedure": {"mrn": "X"}}))),
            ProcedureLookup::NotFound
        ));
        assert!(matches!(
            ProcedureLookup::from_planning(&bundle(json!({"procedure": {"id": "17", "vessel_data": 3}}))),
            ProcedureLookup::Found { id: 17, .. }
        ));
    }
}
