use actix_web::{web, HttpResponse, Responder};

use crate::routes::AppState;

/// Configure contact routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/contact", web::get().to(get_contact));
}

/// Public business contact details
///
/// GET /api/v1/contact
async fn get_contact(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.contact.as_ref())
}
