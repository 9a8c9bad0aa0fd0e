use askama::Template;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, MethodRouter};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::handlers::{login, logout, LoginTemplate};
use crate::auth::AdminSession;
use crate::collection::{
    Direction, DragThresholds, DropIntent, ItemId, OrderedItem, Payload, SharedCollection,
};
use crate::contact::ContactStatus;
use crate::db::models::{ContactSubmission, InstagramReview, PortfolioImage};
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeAdmin;
use crate::routes::home::Html;
use crate::state::AppState;
use crate::upload::{CandidateFile, UploadReport};

const UPLOAD_FIELD: &str = "files";

/// A collection the admin panel can reorder over the JSON API.
pub trait AdminCollection: Payload + Serialize {
    const SLUG: &'static str;

    fn shared(state: &AppState) -> &SharedCollection<Self>;
}

impl AdminCollection for PortfolioImage {
    const SLUG: &'static str = "portfolio";

    fn shared(state: &AppState) -> &SharedCollection<Self> {
        &state.portfolio
    }
}

impl AdminCollection for InstagramReview {
    const SLUG: &'static str = "reviews";

    fn shared(state: &AppState) -> &SharedCollection<Self> {
        &state.reviews
    }
}

pub fn router(upload_limit: usize) -> Router<AppState> {
    let router = Router::new()
        .route("/admin", get(page))
        .route("/admin/login", post(login))
        .route("/admin/logout", post(logout))
        .route(
            "/admin/api/portfolio/upload",
            post(upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/admin/api/contacts", get(list_contacts))
        .route("/admin/api/contacts/{id}/status", post(set_contact_status));

    let router = collection_routes::<PortfolioImage>(router, get(list::<PortfolioImage>));
    collection_routes::<InstagramReview>(
        router,
        get(list::<InstagramReview>).post(create_review),
    )
}

fn collection_routes<P: AdminCollection>(
    router: Router<AppState>,
    base: MethodRouter<AppState>,
) -> Router<AppState> {
    let prefix = format!("/admin/api/{}", P::SLUG);
    router
        .route(&prefix, base)
        .route(&format!("{}/reorder", prefix), post(reorder::<P>))
        .route(&format!("{}/drop", prefix), post(drop_onto::<P>))
        .route(&format!("{}/{{id}}", prefix), delete(remove::<P>))
        .route(&format!("{}/{{id}}/move", prefix), post(move_item::<P>))
}

// -- Templates --

#[derive(Template)]
#[template(path = "pages/admin.html")]
pub struct AdminTemplate {
    pub email: String,
    pub portfolio: Vec<OrderedItem<PortfolioImage>>,
    pub reviews: Vec<OrderedItem<InstagramReview>>,
    pub contacts: Vec<ContactSubmission>,
    pub thresholds: DragThresholds,
    pub max_upload_mb: usize,
}

// -- Request and response types --

#[derive(Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<ItemId>,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

#[derive(Deserialize)]
pub struct NewReviewRequest {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: ContactStatus,
}

/// The collection after a change, so the panel can redraw from it.
#[derive(Serialize)]
pub struct CollectionResponse<P> {
    pub changed: bool,
    pub items: Vec<OrderedItem<P>>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub report: UploadReport,
    pub items: Vec<OrderedItem<PortfolioImage>>,
}

// -- Page --

/// GET /admin: login form, or the dashboard with freshly loaded lists.
pub async fn page(State(state): State<AppState>, MaybeAdmin(admin): MaybeAdmin) -> AppResult<Response> {
    let Some(admin) = admin else {
        return Ok(Html(LoginTemplate::default()).into_response());
    };

    let portfolio = reload(&state.portfolio).await;
    let reviews = reload(&state.reviews).await;
    let contacts = state.contacts.list().await?;

    Ok(Html(AdminTemplate {
        email: admin.email,
        portfolio,
        reviews,
        contacts,
        thresholds: state.config.gestures.thresholds(),
        max_upload_mb: state.config.uploads.max_bytes / (1024 * 1024),
    })
    .into_response())
}

/// Reload from the table; on failure the last loaded items are shown.
async fn reload<P: Payload>(shared: &SharedCollection<P>) -> Vec<OrderedItem<P>> {
    let mut manager = shared.lock().await;
    if manager.load().await.is_err() {
        tracing::warn!(collection = manager.name(), "Showing last loaded items");
    }
    manager.items().to_vec()
}

// -- Collection API --

/// GET /admin/api/{collection}
pub async fn list<P: AdminCollection>(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<OrderedItem<P>>>> {
    let mut manager = P::shared(&state).lock().await;
    manager.load().await?;
    Ok(Json(manager.items().to_vec()))
}

/// POST /admin/api/{collection}/reorder
pub async fn reorder<P: AdminCollection>(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<Json<CollectionResponse<P>>> {
    let mut manager = P::shared(&state).lock().await;
    let writes = manager.reorder(&req.ids).await?;
    Ok(Json(CollectionResponse {
        changed: writes > 0,
        items: manager.items().to_vec(),
    }))
}

/// POST /admin/api/{collection}/{id}/move
pub async fn move_item<P: AdminCollection>(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(req): Json<MoveRequest>,
) -> AppResult<Json<CollectionResponse<P>>> {
    let mut manager = P::shared(&state).lock().await;
    let changed = manager.move_item(&id, req.direction.into()).await?;
    Ok(Json(CollectionResponse {
        changed,
        items: manager.items().to_vec(),
    }))
}

/// POST /admin/api/{collection}/drop
pub async fn drop_onto<P: AdminCollection>(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(intent): Json<DropIntent>,
) -> AppResult<Json<CollectionResponse<P>>> {
    let mut manager = P::shared(&state).lock().await;
    let changed = manager.apply_drop(&intent).await?;
    Ok(Json(CollectionResponse {
        changed,
        items: manager.items().to_vec(),
    }))
}

/// DELETE /admin/api/{collection}/{id}
pub async fn remove<P: AdminCollection>(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<CollectionResponse<P>>> {
    let mut manager = P::shared(&state).lock().await;
    manager.remove(&id).await?;
    Ok(Json(CollectionResponse {
        changed: true,
        items: manager.items().to_vec(),
    }))
}

/// POST /admin/api/portfolio/upload (multipart, repeated `files` field)
pub async fn upload(
    _admin: AdminSession,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        files.push(CandidateFile::new(name, content_type, data));
    }
    if files.is_empty() {
        return Err(AppError::BadRequest("No files in upload".into()));
    }

    let mut portfolio = state.portfolio.lock().await;
    let report = state.uploads.run(&mut portfolio, files).await?;
    Ok(Json(UploadResponse {
        report,
        items: portfolio.items().to_vec(),
    }))
}

/// POST /admin/api/reviews
pub async fn create_review(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(req): Json<NewReviewRequest>,
) -> AppResult<(StatusCode, Json<OrderedItem<InstagramReview>>)> {
    let review = InstagramReview::parse(&req.name, &req.url).map_err(AppError::BadRequest)?;
    let item = state.reviews.lock().await.insert(review).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// -- Contacts --

/// GET /admin/api/contacts
pub async fn list_contacts(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ContactSubmission>>> {
    Ok(Json(state.contacts.list().await?))
}

/// POST /admin/api/contacts/{id}/status
pub async fn set_contact_status(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> AppResult<Json<ContactSubmission>> {
    Ok(Json(state.contacts.set_status(&id, req.status).await?))
}
