//! # ORCC API客户端
//!
//! 将PlaudAI后端的REST端点（患者、手术、规划数据、健康检查）映射为
//! OR Command Center前端使用的便捷方法：
//! - 通用请求执行器，统一错误消息提取和日志
//! - 患者/手术/规划端点封装
//! - 按手术状态过滤的列表查询和定向更新
//! - 按MRN"创建或更新"手术的保存流程

pub mod client;
pub mod config;
pub mod planning;
pub mod request;
pub mod transport;
pub mod workflow;

pub use client::OrccClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use planning::ProcedureLookup;
pub use request::{Endpoint, RequestOptions};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse};
