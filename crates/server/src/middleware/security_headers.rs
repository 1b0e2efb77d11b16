//! Security headers for every response.

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Content security policy for the dashboard that talks to this API.
///
/// The page may call back to this origin and to the BigCommerce API; inline
/// scripts and styles are allowed because the dashboard ships them.
pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'self'; \
     connect-src 'self' https://api.bigcommerce.com; \
     img-src 'self' data:; \
     script-src 'self' 'unsafe-inline'; \
     style-src 'self' 'unsafe-inline'";

/// Add security headers to all responses.
///
/// - `Content-Security-Policy` - see [`CONTENT_SECURITY_POLICY_VALUE`]
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: no-referrer`
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    response
}
