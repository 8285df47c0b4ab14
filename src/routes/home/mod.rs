use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use actix_web_flash_messages::IncomingFlashMessages;
use actix_web_flash_messages::Level;
use tera::Context;
use tera::Tera;

use crate::utils::error_500;

/// Render the landing page in one of its three states: plain form, success
/// banner (form gone, email cleared by construction), or form with error text
/// and the rejected email retained in the input.
// template path relative to this file (checked at compile time!)
pub(crate) fn render_landing(
    success: Option<&str>,
    error: Option<&str>,
    email: &str,
) -> Result<String, tera::Error> {
    let mut ctx = Context::new();
    ctx.insert("success", &success);
    ctx.insert("error", &error);
    ctx.insert("email", email);
    // autoescape on; `email` is user input and lands inside a value attribute.
    // `success`/`error` are server constants and marked `safe` in the template.
    Tera::one_off(include_str!("./home.html"), &ctx, true)
}

/// `GET /`
pub async fn home(flash_messages: IncomingFlashMessages) -> Result<HttpResponse, actix_web::Error> {
    // an info flash is only ever set by the success path of `POST /waitlist`
    let success = flash_messages
        .iter()
        .find(|m| m.level() == Level::Info)
        .map(|m| m.content().to_owned());

    let body = render_landing(success.as_deref(), None, "").map_err(error_500)?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}
