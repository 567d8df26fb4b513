//! Wrappers around axum's extractors whose rejections use the same JSON
//! error envelope as every other failure (`web::Error`).

pub(crate) mod json_body;
pub(crate) mod path_param;
pub(crate) mod query_params;
