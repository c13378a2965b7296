use std::sync::Arc;

use axum::{
    extract::Request, http::HeaderMap, middleware::Next, response::IntoResponse,
};

/// The externally visible base of the service, reconstructed from the
/// forwarding headers a reverse proxy sets, so generated links stay valid
/// behind one.
#[derive(Debug, Clone)]
pub struct BaseUrl {
    proto: String,
    host: String,
    prefix: String,
}

impl BaseUrl {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers.get(name).and_then(|value| value.to_str().ok())
        };

        BaseUrl {
            proto: header("x-forwarded-proto").unwrap_or("http").to_string(),
            host: header("x-forwarded-host")
                .or_else(|| header("host"))
                .unwrap_or("localhost")
                .to_string(),
            prefix: header("x-forwarded-prefix").unwrap_or("").to_string(),
        }
    }

    pub fn full_url<S: Into<String>>(&self, path: S) -> String {
        format!(
            "{}://{}{}{}",
            self.proto,
            self.host,
            self.prefix,
            path.into()
        )
    }
}

pub async fn base_url_middleware(
    mut req: Request,
    next: Next,
) -> impl IntoResponse {
    let base_url = BaseUrl::from_headers(req.headers());
    req.extensions_mut().insert(Arc::new(base_url));
    next.run(req).await
}
