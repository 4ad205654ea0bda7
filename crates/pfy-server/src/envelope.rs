//! Success envelope: `{ success, message, meta?, data }`.

use axum::Json;
use pfy_core::responses::{Page, PageMeta};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    pub data: T,
}

pub fn ok<T: Serialize>(message: &str, data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: message.to_string(),
        meta: None,
        data,
    })
}

pub fn paged<T: Serialize>(message: &str, page: Page<T>) -> Json<Envelope<Vec<T>>> {
    Json(Envelope {
        success: true,
        message: message.to_string(),
        meta: Some(page.meta),
        data: page.data,
    })
}
