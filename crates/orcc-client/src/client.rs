//! ORCC API客户端
//!
//! 每个端点方法都是对 [`OrccClient::request`] 的一对一封装：构造路径和请求体，
//! 发出请求，返回解析后的JSON。

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use orcc_core::{
    NewPatient, NewProcedure, OrccError, Patient, PatientQuery, PlanningBundle, Procedure,
    ProcedureQuery, ProcedureUpdate, Result,
};

use crate::config::ClientConfig;
use crate::request::{default_headers, error_message, merge_headers, Endpoint, RequestOptions};
use crate::transport::{ReqwestTransport, Transport, TransportRequest};

const PATIENTS: &str = "/api/patients";
const PROCEDURES: &str = "/api/procedures";
const PLANNING: &str = "/api/planning";
const HEALTH: &str = "/api/orcc/status";

/// PlaudAI后端客户端
///
/// 克隆开销很小，克隆体共享同一个传输层。客户端本身不保存任何可变状态。
#[derive(Clone)]
pub struct OrccClient {
    base_url: Url,
    default_headers: HeaderMap,
    transport: Arc<dyn Transport>,
}

impl OrccClient {
    /// 使用reqwest传输层创建客户端
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.user_agent.as_deref())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// 使用自定义传输层创建客户端
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = config.parsed_base_url()?;
        let default_headers = config.header_map()?;

        Ok(Self {
            base_url,
            default_headers,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 通用请求执行器
    ///
    /// 失败时先记录日志（端点 + 消息）再返回错误，不做重试。
    pub async fn request<T: DeserializeOwned>(&self, endpoint: &Endpoint, options: RequestOptions) -> Result<T> {
        let result = self.execute(endpoint, options).await;
        if let Err(e) = &result {
            error!("ORCC API Error [{}]: {}", endpoint, e);
        }
        result
    }

    async fn execute<T: DeserializeOwned>(&self, endpoint: &Endpoint, options: RequestOptions) -> Result<T> {
        let url = endpoint.to_url(&self.base_url)?;
        let method = options.method();

        let mut headers = default_headers();
        merge_headers(&mut headers, &self.default_headers);
        merge_headers(&mut headers, &options.headers);

        let body = options
            .body
            .as_ref()
            .map(|body| serde_json::to_vec(body))
            .transpose()?;

        debug!("ORCC API request: {} {}", method, url);

        let response = self
            .transport
            .send(TransportRequest {
                method,
                url,
                headers,
                body,
            })
            .await
            .map_err(|e| OrccError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        if !response.status.is_success() {
            return Err(OrccError::Request {
                endpoint: endpoint.to_string(),
                status: response.status.as_u16(),
                message: error_message(response.status, &response.body),
            });
        }

        serde_json::from_slice(&response.body).map_err(|source| OrccError::Parse {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    // ============ 患者 ============

    /// 按条件搜索患者
    pub async fn get_patients(&self, query: &PatientQuery) -> Result<Vec<Patient>> {
        let endpoint = Endpoint::new(PATIENTS).query(query.to_pairs());
        self.request(&endpoint, RequestOptions::get()).await
    }

    /// 按MRN获取患者（含其手术列表）
    pub async fn get_patient_by_mrn(&self, mrn: &str) -> Result<Patient> {
        let endpoint = Endpoint::new(PATIENTS).segment(mrn);
        self.request(&endpoint, RequestOptions::get()).await
    }

    pub async fn create_patient(&self, patient: &NewPatient) -> Result<Patient> {
        let endpoint = Endpoint::new(PATIENTS);
        self.request(&endpoint, RequestOptions::json(Method::POST, patient)?)
            .await
    }

    // ============ 手术 ============

    /// 按条件获取手术列表
    pub async fn get_procedures(&self, query: &ProcedureQuery) -> Result<Vec<Procedure>> {
        let endpoint = Endpoint::new(PROCEDURES).query(query.to_pairs());
        self.request(&endpoint, RequestOptions::get()).await
    }

    pub async fn get_procedure(&self, id: i64) -> Result<Procedure> {
        let endpoint = Endpoint::new(PROCEDURES).segment(id);
        self.request(&endpoint, RequestOptions::get()).await
    }

    /// 创建手术（含完整规划数据）
    pub async fn create_procedure(&self, procedure: &NewProcedure) -> Result<Procedure> {
        let endpoint = Endpoint::new(PROCEDURES);
        self.request(&endpoint, RequestOptions::json(Method::POST, procedure)?)
            .await
    }

    /// 部分更新手术
    pub async fn update_procedure(&self, id: i64, updates: &ProcedureUpdate) -> Result<Procedure> {
        let endpoint = Endpoint::new(PROCEDURES).segment(id);
        self.request(&endpoint, RequestOptions::json(Method::PATCH, updates)?)
            .await
    }

    // ============ 规划 ============

    /// 按MRN获取规划数据（最新手术、血管数据、介入方案、CPT编码）
    pub async fn get_planning_data(&self, mrn: &str) -> Result<PlanningBundle> {
        let endpoint = Endpoint::new(PLANNING).segment(mrn);
        self.request(&endpoint, RequestOptions::get()).await
    }

    /// 健康检查，原样返回后端状态JSON
    pub async fn check_health(&self) -> Result<Value> {
        let endpoint = Endpoint::new(HEALTH);
        self.request(&endpoint, RequestOptions::get()).await
    }
}
