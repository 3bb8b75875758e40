//! Colonist profile page with the origin-city map link.

use actix_web::{HttpResponse, get, web};
use tera::Tera;

use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

use super::render_page;

/// External map search for an origin city. The template URL-encodes the
/// city name before interpolation.
const MAP_SEARCH_URL: &str = "https://www.openstreetmap.org/search?query=";

#[get("/users_show/{id}")]
pub async fn users_show(
    state: web::Data<HttpState>,
    tera: web::Data<Tera>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user = state.users.get(path.into_inner()).await?;

    let mut context = tera::Context::new();
    context.insert("full_name", &user.full_name());
    context.insert("position", &user.position);
    context.insert("speciality", &user.speciality);
    context.insert("address", &user.address);
    context.insert("city_from", &user.city_from);
    context.insert("map_search_url", MAP_SEARCH_URL);
    render_page(&tera, &session, "users_show.html", &mut context)
}
