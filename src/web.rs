use std::sync::{Mutex, MutexGuard};

use actix_web::http::{header, StatusCode};
use actix_web::{middleware, web, App, HttpResponse, HttpServer, ResponseError, Result};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::config::ServerConfig;
use crate::editor::actions::ImportOutcome;
use crate::editor::{DayPatch, ItemPatch};
use crate::error::Error;
use crate::host::{FieldComposer, NotificationLog};
use crate::schedule::ScheduleDocument;
use crate::transfer::{download_filename, Acquired};

// In-memory field state; the CMS host owns real persistence
pub struct AppState {
    pub composer: Mutex<FieldComposer>,
}

impl AppState {
    pub fn new(composer: FieldComposer) -> Self {
        AppState { composer: Mutex::new(composer) }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidEnvelope(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::ReadOnly => StatusCode::FORBIDDEN,
            Error::UnknownDay(_) | Error::UnknownItem(_) | Error::UnknownBlock(_) => StatusCode::NOT_FOUND,
            Error::Io(_) | Error::Host(_) | Error::Clipboard(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({"success": false, "error": self.to_string()}))
    }
}

fn lock(state: &AppState) -> Result<MutexGuard<'_, FieldComposer>> {
    state
        .composer
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("field state is unavailable"))
}

// Saves after a mutation and reports the new field value, if any
fn saved(composer: &mut FieldComposer, mut body: Value) -> Result<HttpResponse> {
    let field_value = composer.save()?;
    body["success"] = json!(true);
    body["fieldValue"] = json!(field_value);
    Ok(HttpResponse::Ok().json(body))
}

// Current field value endpoint
async fn get_field(state: web::Data<AppState>) -> Result<HttpResponse> {
    let composer = lock(&state)?;
    Ok(HttpResponse::Ok().json(composer.output()))
}

// External field-value change from the host
async fn put_field(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    let value = String::from_utf8_lossy(&body);
    let mut composer = lock(&state)?;
    let change = composer.on_field_value_changed(&value);
    Ok(HttpResponse::Ok().json(json!({"success": true, "change": change, "blocks": composer.len()})))
}

async fn add_block(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut composer = lock(&state)?;
    let index = composer.add_schedule_block(&ScheduleDocument::default())?;
    saved(&mut composer, json!({"index": index}))
}

async fn get_block(path: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let composer = lock(&state)?;
    let editor = composer.editor(path.into_inner())?;
    Ok(HttpResponse::Ok().json(editor.serialize()))
}

async fn get_block_view(path: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let composer = lock(&state)?;
    let editor = composer.editor(path.into_inner())?;
    Ok(HttpResponse::Ok().json(editor.render()))
}

async fn validate_block(path: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let composer = lock(&state)?;
    let editor = composer.editor(path.into_inner())?;
    Ok(HttpResponse::Ok().json(json!({"valid": editor.validate()})))
}

async fn add_day(path: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut composer = lock(&state)?;
    let index = composer.editor_mut(path.into_inner())?.add_day()?;
    saved(&mut composer, json!({"index": index}))
}

async fn remove_day(path: web::Path<(usize, usize)>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let (block, day) = path.into_inner();
    let mut composer = lock(&state)?;
    composer.editor_mut(block)?.remove_day(day)?;
    saved(&mut composer, json!({}))
}

async fn patch_day(
    path: web::Path<(usize, usize)>,
    patch: web::Json<DayPatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (block, day) = path.into_inner();
    let mut composer = lock(&state)?;
    composer.editor_mut(block)?.apply_day_patch(day, &patch)?;
    saved(&mut composer, json!({}))
}

async fn add_item(path: web::Path<(usize, usize)>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let (block, day) = path.into_inner();
    let mut composer = lock(&state)?;
    let id = composer.editor_mut(block)?.add_item(day)?;
    saved(&mut composer, json!({"id": id}))
}

async fn remove_item(path: web::Path<(usize, String)>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let (block, id) = path.into_inner();
    let mut composer = lock(&state)?;
    composer.editor_mut(block)?.remove_item(&id)?;
    saved(&mut composer, json!({}))
}

async fn patch_item(
    path: web::Path<(usize, String)>,
    patch: web::Json<ItemPatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (block, id) = path.into_inner();
    let mut composer = lock(&state)?;
    composer.editor_mut(block)?.apply_item_patch(&id, &patch)?;
    saved(&mut composer, json!({}))
}

// Export download endpoint
async fn export_block(path: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let composer = lock(&state)?;
    let editor = composer.editor(path.into_inner())?;
    let notifications = NotificationLog::new();

    match editor.export(&notifications) {
        Some(dialog) => {
            let filename = download_filename(Utc::now());
            Ok(HttpResponse::Ok()
                .content_type("application/json")
                .insert_header((header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)))
                .body(dialog.text().to_string()))
        }
        None => Ok(HttpResponse::InternalServerError()
            .json(json!({"success": false, "notifications": notifications.take()}))),
    }
}

// Import upload endpoint
async fn import_block(path: web::Path<usize>, body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    let block = path.into_inner();
    let acquired = serde_json::from_slice::<Value>(&body)
        .map(Acquired::File)
        .map_err(Error::from);

    let mut composer = lock(&state)?;
    let notifications = NotificationLog::new();
    let outcome = composer.editor_mut(block)?.finish_import(acquired, &notifications);

    match outcome {
        ImportOutcome::Imported => saved(&mut composer, json!({"notifications": notifications.take()})),
        ImportOutcome::Cancelled | ImportOutcome::Failed => Ok(HttpResponse::BadRequest()
            .json(json!({"success": false, "notifications": notifications.take()}))),
    }
}

async fn duplicate_block(path: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut composer = lock(&state)?;
    let notifications = NotificationLog::new();
    let index = composer.duplicate_block(path.into_inner(), &notifications)?;
    saved(&mut composer, json!({"index": index, "notifications": notifications.take()}))
}

/// Registers the field and block routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/field", web::get().to(get_field))
        .route("/api/field", web::put().to(put_field))
        .route("/api/blocks", web::post().to(add_block))
        .route("/api/blocks/{block}", web::get().to(get_block))
        .route("/api/blocks/{block}/view", web::get().to(get_block_view))
        .route("/api/blocks/{block}/validate", web::get().to(validate_block))
        .route("/api/blocks/{block}/days", web::post().to(add_day))
        .route("/api/blocks/{block}/days/{day}", web::delete().to(remove_day))
        .route("/api/blocks/{block}/days/{day}", web::patch().to(patch_day))
        .route("/api/blocks/{block}/days/{day}/items", web::post().to(add_item))
        .route("/api/blocks/{block}/items/{id}", web::delete().to(remove_item))
        .route("/api/blocks/{block}/items/{id}", web::patch().to(patch_item))
        .route("/api/blocks/{block}/export", web::get().to(export_block))
        .route("/api/blocks/{block}/import", web::post().to(import_block))
        .route("/api/blocks/{block}/duplicate", web::post().to(duplicate_block));
}

pub async fn start_server(config: ServerConfig, initial_value: Option<String>) -> std::io::Result<()> {
    let mut composer = FieldComposer::new(config.block.clone());
    if let Some(value) = initial_value {
        let change = composer.load(&value);
        info!(?change, blocks = composer.len(), "loaded initial field value");
    }
    let app_state = web::Data::new(AppState::new(composer));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
