use actix_web::{get, HttpResponse};
use serde_json::json;

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}
