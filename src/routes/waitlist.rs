use actix_web::http::header::ContentType;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web_flash_messages::FlashMessage;
use serde::Deserialize;

use crate::domain::WaitlistEmail;
use crate::routes::home::render_landing;
use crate::store::InsertError;
use crate::store::WaitlistStore;
use crate::utils::error_500;
use crate::utils::redirect;

/// Shown in the banner that replaces the form after a successful submission
const SUCCESS_MSG: &str = "You're on the list! We'll be in touch.";

/// Shown below the form when the store reports a uniqueness conflict
const DUPLICATE_MSG: &str = "This email is already on the waitlist!";

/// Shown below the form for every other store failure; the underlying error
/// only ever goes to the logs
const FAILURE_MSG: &str = "Failed to join the waitlist. Please try again.";

#[derive(Deserialize)]
pub struct FormData {
    email: String,
}

/// `POST /waitlist`
///
/// The whole submission workflow: validate presence, insert into the waitlist
/// store, map the outcome onto the page.
///
/// - empty email: no store call, no message; just reload the page
/// - malformed email: 400 (the browser's `type="email"` check refuses these
///   before they are ever sent, so only a hand-crafted request gets here)
/// - inserted: flash the success banner and redirect to `/`, which reloads
///   with the input cleared
/// - rejected: respond 200 with the page re-rendered in place, static error
///   text below the form, and the submitted email retained in the input
///
/// Every failure is terminal for that attempt; the user resubmits by hand.
///
/// # Request example
///
/// ```sh
///     curl -v --include --data 'email=john@foo.com' http://127.0.0.1:8000/waitlist
/// ```
#[tracing::instrument(
    name = "Adding email to waitlist",
    // don't log passed args
    skip(form, store),
    fields(waitlist_email = %form.email)
)]
pub async fn join_waitlist(
    form: web::Form<FormData>,
    // inherited via App.app_data
    store: web::Data<WaitlistStore>,
) -> Result<HttpResponse, actix_web::Error> {
    if form.email.trim().is_empty() {
        return Ok(redirect("/"));
    }

    let email = match WaitlistEmail::parse(form.0.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::warn!("rejecting malformed email: {e}");
            return Ok(HttpResponse::BadRequest().finish());
        }
    };

    match store.insert_email(&email).await {
        Ok(()) => {
            // redirect-after-post: the banner travels in a signed flash cookie, and
            // reloading `/` cannot resubmit the form
            FlashMessage::info(SUCCESS_MSG).send();
            Ok(redirect("/"))
        }
        Err(e) => {
            let msg = match e {
                InsertError::Duplicate => DUPLICATE_MSG,
                InsertError::Other(_) => FAILURE_MSG,
            };
            let body = render_landing(None, Some(msg), email.as_ref()).map_err(error_500)?;
            Ok(HttpResponse::Ok()
                .content_type(ContentType::html())
                .body(body))
        }
    }
}
