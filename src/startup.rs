use std::net::TcpListener;

use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, ServiceConfig},
    App, HttpServer,
};

use crate::{
    configuration::ApplicationSettings,
    routes::{default_route, health_route, scrape_route},
    services::CouponFinder,
};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(scrape_route::json_error_handler))
        .service(default_route::default)
        .service(health_route::health)
        .service(scrape_route::scrape);
}

pub fn run(
    listener: TcpListener,
    coupon_finder: CouponFinder,
    settings: ApplicationSettings,
) -> Result<Server, std::io::Error> {
    let coupon_finder = web::Data::new(coupon_finder);
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure)
            .app_data(coupon_finder.clone())
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use super::configure;

    #[actix_web::test]
    async fn health_is_always_ok() {
        let app = test::init_service(App::new().configure(configure)).await;

        let request = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body, json!({ "ok": true }));
    }

    #[actix_web::test]
    async fn index_page_has_the_form() {
        let app = test::init_service(App::new().configure(configure)).await;

        let request = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, request).await;
        let html = String::from_utf8(body.to_vec()).unwrap();

        assert!(html.contains("<title>Coupon Finder</title>"));
        assert!(html.contains("fetch(\"/scrape\""));
    }
}
