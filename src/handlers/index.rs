use actix_web::{HttpResponse, Responder};

/// GET / — plain-text liveness string.
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body("docuscan OCR document service is running")
}

pub async fn healthz() -> impl Responder {
    "OK"
}
