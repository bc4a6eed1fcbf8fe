//! # ORCC Core
//!
//! ORCC客户端的核心模块，提供后端数据模型、查询参数、错误定义和前端视图映射。

pub mod error;
pub mod mapping;
pub mod models;
pub mod query;

pub use error::{OrccError, Result};
pub use mapping::{map_patient_to_orcc, map_procedure_to_orcc, OrccPatient, OrccProcedure};
pub use models::*;
pub use query::{PatientQuery, ProcedureQuery, QueryPairs};
