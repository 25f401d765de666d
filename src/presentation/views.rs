use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::error::{ErrorReport, HttpError};

const RENDER_SOURCE: &str = "presentation::views::render_template";

#[derive(Debug, Error)]
#[error("template `{template}` failed to render")]
pub struct TemplateRenderError {
    template: &'static str,
    #[source]
    error: askama::Error,
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        HttpError::with_report(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Page could not be rendered",
            ErrorReport::from_error(RENDER_SOURCE, &err),
        )
    }
}

pub fn render_template<T: Template>(template: &T) -> Result<Html<String>, TemplateRenderError> {
    template
        .render()
        .map(Html)
        .map_err(|error| TemplateRenderError {
            template: std::any::type_name::<T>(),
            error,
        })
}

/// Render a page with `status`; a template failure becomes a plain 500.
pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(&template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}
