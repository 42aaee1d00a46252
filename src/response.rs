use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub count: Option<u64>,
}

impl Meta {
    pub fn page(skip: u64, limit: u64, count: usize) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
            count: Some(count as u64),
        }
    }

    pub fn empty() -> Self {
        Self {
            skip: None,
            limit: None,
            count: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}
