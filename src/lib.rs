//! # ORCC
//!
//! OR Command Center 前端访问 PlaudAI 后端的客户端库。
//!
//! - [`orcc_core`]：数据模型、查询参数、错误类型和前端视图映射
//! - [`orcc_client`]：HTTP客户端、配置和保存流程

pub use orcc_client;
pub use orcc_core;

pub use orcc_client::{ClientConfig, OrccClient, ProcedureLookup};
pub use orcc_core::{map_patient_to_orcc, map_procedure_to_orcc, OrccError, Result};
