use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::Method,
    routing::get,
    Router,
};
use model::price::{DateRange, HistoryPoint};
use serde::Deserialize;
use utility::id::Id;

use crate::{
    common::{
        schema_no_example, HateoasResult, RouteErrorResponse, VecResponse,
    },
    middleware::current_user::CurrentUser,
    WebState,
};

/// Routes are nested below `/locations/:id/prices`; `:id` is the location.
/// The state is provided by the nesting locations router.
pub(crate) fn routes() -> Router<WebState> {
    Router::new()
        .route("/schema", get(schema_no_example::<HistoryPoint>))
        .route("/", get(history))
        .route("/hour", get(by_hour))
        .route("/day-of-week", get(by_day_of_week))
        .route("/day-of-month", get(by_day_of_month))
        .route("/station-frequency", get(station_frequency))
}

#[derive(Deserialize)]
struct PricesQuery {
    date_range: Option<String>,
}

impl PricesQuery {
    /// An absent or unrecognized value means the whole history.
    fn range(&self) -> Option<DateRange> {
        self.date_range.as_deref().and_then(DateRange::parse)
    }
}

macro_rules! aggregation_route {
    ($name:ident, $method:ident, $dto:ty) => {
        async fn $name(
            OriginalUri(original_uri): OriginalUri,
            Path(location): Path<i64>,
            State(WebState { price_client, .. }): State<WebState>,
            user: CurrentUser,
            Query(params): Query<PricesQuery>,
        ) -> HateoasResult<VecResponse<$dto>> {
            price_client
                .$method(user.0, Id::new(location), params.range())
                .await
                .map(|data| VecResponse::non_paginated(data).hateoas().json())
                .map_err(|why| {
                    RouteErrorResponse::from(why)
                        .with_method(&Method::GET)
                        .with_uri(original_uri.path())
                })
        }
    };
}

aggregation_route!(history, price_history, model::price::HistoryPoint);
aggregation_route!(by_hour, price_by_hour, model::price::HourlyAverage);
aggregation_route!(
    by_day_of_week,
    price_by_day_of_week,
    model::price::WeekdayAverage
);
aggregation_route!(
    by_day_of_month,
    price_by_day_of_month,
    model::price::MonthDayAverage
);
aggregation_route!(
    station_frequency,
    price_station_frequency,
    model::price::StationFrequency
);
