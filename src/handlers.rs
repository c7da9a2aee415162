use actix_web::{delete, get, http::header::ContentType, post, web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::auth::AuthorizationLevel;
use crate::balance::compute_balance_from_event;
use crate::error::ApiError;
use crate::events::{self, NewEvent, NewExpense};
use crate::schemas::Event;
use crate::settlement::compute_settlements;
use crate::store::EventStore;
use crate::summary::{share_text, summarize_event};

type Store = web::Data<dyn EventStore>;

async fn load_event(store: &Store, id: &str) -> Result<Event, ApiError> {
    store.get(id).await?.ok_or(ApiError::EventNotFound)
}

async fn save_event(store: &Store, event: &Event) -> Result<(), ApiError> {
    if store.replace(event).await? {
        Ok(())
    } else {
        Err(ApiError::EventNotFound)
    }
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[get("/events")]
#[instrument(skip_all)]
async fn list_events(store: Store) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(store.list().await?))
}

#[post("/events")]
#[instrument(skip_all)]
async fn add_event(
    store: Store,
    caller: AuthorizationLevel,
    json: web::Json<NewEvent>,
) -> Result<HttpResponse, ApiError> {
    let event = events::create_event(json.into_inner(), caller.host_name())?;
    store.insert(&event).await?;
    info!(event = %event.id, participants = event.participants.len(), "event created");
    Ok(HttpResponse::Created().json(event))
}

#[get("/events/{id}")]
#[instrument(skip(store))]
async fn get_event(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(load_event(&store, &id).await?))
}

#[delete("/events/{id}")]
#[instrument(skip(store, _caller))]
async fn delete_event(
    store: Store,
    _caller: AuthorizationLevel,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    if !store.delete(&id).await? {
        return Err(ApiError::EventNotFound);
    }
    info!("event deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[post("/events/{id}/expenses")]
#[instrument(skip(store, _caller, expense))]
async fn add_expense(
    store: Store,
    _caller: AuthorizationLevel,
    id: web::Path<String>,
    expense: web::Json<NewExpense>,
) -> Result<HttpResponse, ApiError> {
    let mut event = load_event(&store, &id).await?;
    let expense = events::add_expense(&mut event, expense.into_inner())?.clone();
    save_event(&store, &event).await?;
    info!(expense = %expense.id, amount = %expense.amount, "expense added");
    Ok(HttpResponse::Created().json(expense))
}

#[delete("/events/{id}/expenses/{expense_id}")]
#[instrument(skip(store, _caller))]
async fn remove_expense(
    store: Store,
    _caller: AuthorizationLevel,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (id, expense_id) = path.into_inner();
    let mut event = load_event(&store, &id).await?;
    events::remove_expense(&mut event, &expense_id)?;
    save_event(&store, &event).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/events/{id}/balance")]
#[instrument(skip(store))]
async fn get_balance(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let event = load_event(&store, &id).await?;
    Ok(HttpResponse::Ok().json(compute_balance_from_event(&event)))
}

#[get("/events/{id}/settlements")]
#[instrument(skip(store))]
async fn get_settlements(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let event = load_event(&store, &id).await?;
    let balances = compute_balance_from_event(&event);
    Ok(HttpResponse::Ok().json(compute_settlements(&balances)))
}

#[get("/events/{id}/summary")]
#[instrument(skip(store))]
async fn get_summary(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let event = load_event(&store, &id).await?;
    Ok(HttpResponse::Ok().json(summarize_event(&event)?))
}

#[get("/events/{id}/share")]
#[instrument(skip(store))]
async fn get_share_text(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let event = load_event(&store, &id).await?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(share_text(&summarize_event(&event)?)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(list_events)
        .service(add_event)
        .service(get_event)
        .service(delete_event)
        .service(add_expense)
        .service(remove_expense)
        .service(get_balance)
        .service(get_settlements)
        .service(get_summary)
        .service(get_share_text);
}
