use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    RequestPartsExt,
};
use axum_extra::TypedHeader;
use headers::{Header, HeaderName, HeaderValue};
use model::location::User;
use utility::id::Id;

use crate::common::RouteErrorResponse;

static X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");

/// Identity header the session layer in front of this service sets after
/// authenticating the request.
pub struct XUserId(pub i64);

impl Header for XUserId {
    fn name() -> &'static HeaderName {
        &X_USER_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .map(XUserId)
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0.to_string()) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Extractor for the user a request acts on behalf of. Requests without a
/// (valid) identity header are rejected before the handler runs.
pub struct CurrentUser(pub Id<User>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = RouteErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(XUserId(user)) = parts
            .extract::<TypedHeader<XUserId>>()
            .await
            .map_err(|_| {
                RouteErrorResponse::new(StatusCode::UNAUTHORIZED)
                    .with_message("Authentication required.")
            })?;
        Ok(CurrentUser(Id::new(user)))
    }
}
