use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::contact::{ContactError, NewSubmission};
use crate::error::AppResult;
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "components/contact_result.html")]
pub struct ContactResultTemplate {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub comment: String,
}

/// POST /contact
pub async fn submit(State(state): State<AppState>, Form(form): Form<ContactForm>) -> AppResult<Response> {
    let submission = match NewSubmission::validate(&form.name, &form.phone, &form.comment) {
        Ok(submission) => submission,
        Err(e) => {
            let page = ContactResultTemplate {
                success: false,
                message: e.to_string(),
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };

    match state.contacts.submit(submission).await {
        Ok(_) => Ok(Html(ContactResultTemplate {
            success: true,
            message: "Thank you! We will call you back shortly.".to_string(),
        })
        .into_response()),
        Err(e @ (ContactError::Database(_) | ContactError::Pool(_))) => Err(e.into()),
        Err(e) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(ContactResultTemplate {
                success: false,
                message: e.to_string(),
            }),
        )
            .into_response()),
    }
}
