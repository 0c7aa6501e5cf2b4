use actix_web::http::header::ContentType;
use actix_web::{get, HttpResponse, Responder};

pub mod admin;
pub mod newsletter;

#[get("/")]
pub async fn root() -> impl Responder {
	HttpResponse::Ok()
		.content_type(ContentType::html())
		.body(include_str!("../../pages/index.html"))
}

#[get("/health")]
pub async fn health() -> impl Responder {
	"OK"
}

#[get("/robots.txt")]
pub async fn robots() -> impl Responder {
	"User-agent: *\nAllow: /\n"
}
