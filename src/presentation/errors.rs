// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::repositories::RepositoryError;
use crate::domain::use_cases::manage_integration::ManageError;

/// 应用错误类型
///
/// 封装管理接口的所有错误，统一映射为 `{"error": ...}` 响应
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<ValidationErrors>().is_some() {
            return StatusCode::BAD_REQUEST;
        }

        if let Some(err) = self.0.downcast_ref::<ManageError>() {
            return match err {
                ManageError::NotFound => StatusCode::NOT_FOUND,
                ManageError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
                ManageError::Delivery(_) => StatusCode::BAD_GATEWAY,
                ManageError::Credential(_) | ManageError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
        }

        match self.0.downcast_ref::<RepositoryError>() {
            Some(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
            // 内部错误不向调用方暴露细节
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
