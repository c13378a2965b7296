use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use model::{location::Location, WithId};
use utility::{id::Id, let_also::LetAlso};

use crate::{
    common::{
        route_not_found, schema, HateoasResult, RouteErrorResponse, RouteResult,
        VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::{
        base_url::{base_url_middleware, BaseUrl},
        current_user::CurrentUser,
    },
    WebState,
};

use super::prices;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/locations{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<Location>))
        .route("/:id", get(get_location).delete(delete_location))
        .route("/", get(get_locations).post(create_location))
        .nest("/:id/prices", prices::routes())
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_locations(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { price_client, .. }): State<WebState>,
    user: CurrentUser,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Location>>>> {
    price_client
        .get_locations(user.0)
        .await
        .map(|locations| {
            locations
                .into_iter()
                .map(|location| location_hateoas(location, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::non_paginated(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_location(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { price_client, .. }): State<WebState>,
    user: CurrentUser,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Location>> {
    price_client
        .get_location(user.0, Id::new(id))
        .await
        .map(|location| location_hateoas(location, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn create_location(
    OriginalUri(original_uri): OriginalUri,
    State(WebState {
        price_client,
        scheduler,
    }): State<WebState>,
    user: CurrentUser,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(mut location): Json<Location>,
) -> HateoasResult<WithId<Location>> {
    location.user = user.0;
    let created =
        price_client.create_location(location).await.map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })?;

    // The recurring ingestion job is bound 1:1 to the location, so it is
    // started right here instead of behind an implicit event hook.
    scheduler.schedule(created.id).await;

    Ok(location_hateoas(created, base_url).json())
}

async fn delete_location(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState {
        price_client,
        scheduler,
    }): State<WebState>,
    user: CurrentUser,
) -> RouteResult<StatusCode> {
    let id = Id::new(id);
    price_client.delete_location(user.0, id).await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::DELETE)
            .with_uri(original_uri.path())
    })?;

    // Counterpart of the job started on creation.
    scheduler.cancel(id).await;

    Ok(StatusCode::NO_CONTENT)
}

fn location_hateoas(
    location: WithId<Location>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<Location>> {
    let id = location.id;
    hateoas::Response::builder(location, base_url)
        .link("self", resource!("/{}", id))
        .link("prices", resource!("/{}/prices", id))
        .link("pricesHour", resource!("/{}/prices/hour", id))
        .link("pricesDayOfWeek", resource!("/{}/prices/day-of-week", id))
        .link("pricesDayOfMonth", resource!("/{}/prices/day-of-month", id))
        .link(
            "pricesStationFrequency",
            resource!("/{}/prices/station-frequency", id),
        )
        .build()
}
