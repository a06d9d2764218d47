//! Request extractors that report rejections in the response envelope.

mod json;
pub use json::ApiJson;
