//! 请求构造
//!
//! 端点路径、请求选项、请求头合并和错误消息提取。

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;

use orcc_core::{is_truthy, OrccError, QueryPairs, Result};

/// API端点：路径段加查询参数
///
/// 路径段在拼接到基础地址时逐段做百分号编码，因此MRN等动态值可以直接传入。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
    query: QueryPairs,
}

impl Endpoint {
    /// 由静态路径创建，如 `/api/patients`
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            query: QueryPairs::new(),
        }
    }

    /// 追加一个路径段（原始值，不需要预先编码）
    pub fn segment(mut self, segment: impl ToString) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    pub fn query(mut self, pairs: QueryPairs) -> Self {
        self.query = pairs;
        self
    }

    /// 拼接到基础地址，保留基础地址已有的路径前缀
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| OrccError::InvalidUrl(format!("{} cannot be used as a base address", base)))?;
            segments.pop_if_empty().extend(&self.segments);
        }

        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

/// 单次请求的选项
///
/// 请求头合并顺序：内置 `Content-Type: application/json` → 配置的默认请求头 →
/// 此处的 `headers`。同名请求头以后者为准。
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// 缺省为 GET
    pub method: Option<Method>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// 带JSON请求体的请求
    pub fn json<T: Serialize + ?Sized>(method: Method, body: &T) -> Result<Self> {
        Ok(Self {
            method: Some(method),
            headers: HeaderMap::new(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    pub fn header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub(crate) fn method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }
}

/// 内置默认请求头
pub(crate) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// 用 `overrides` 覆盖 `target` 中的同名请求头（整组替换，保留多值）
pub(crate) fn merge_headers(target: &mut HeaderMap, overrides: &HeaderMap) {
    for name in overrides.keys() {
        target.remove(name);
        for value in overrides.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}

/// 从非2xx响应中提取错误消息
///
/// 响应体是JSON且带 `detail` 时使用它；JSON但没有 `detail` 时为 `HTTP <code>`；
/// 非JSON时为状态码的标准原因短语。
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    let fallback = || format!("HTTP {}", status.as_u16());

    match serde_json::from_slice::<Value>(body) {
        // detail 为假值（空串、null、false、0）时退回状态码
        Ok(value) => match value.get("detail").filter(|detail| is_truthy(detail)) {
            Some(Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => fallback(),
        },
        Err(_) => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(fallback),
    }
}
