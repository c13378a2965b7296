use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on},
    Router,
};
use model::{station::Station, WithId};
use utility::let_also::LetAlso;

use crate::{
    common::{
        route_not_found, schema, HateoasResult, RouteErrorResponse, VecResponse,
        METHOD_FILTER_ALL,
    },
    middleware::current_user::CurrentUser,
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<Station>))
        .route("/", get(get_stations))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// Lists the stations that ever held a minimum price for one of the
/// requesting user's locations.
async fn get_stations(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { price_client, .. }): State<WebState>,
    user: CurrentUser,
) -> HateoasResult<VecResponse<WithId<Station>>> {
    price_client
        .get_stations(user.0)
        .await
        .map(|stations| {
            stations
                .let_owned(|data| VecResponse::non_paginated(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}
