use actix_web::{get, HttpResponse};
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    title: &'a str,
}

#[get("/")]
async fn default() -> HttpResponse {
    match (IndexTemplate {
        title: "Coupon Finder",
    })
    .render()
    {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(e) => {
            log::error!("Failed to render index page: {:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
