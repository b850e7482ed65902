use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;

use crate::{app_state::AppState, auth::session::resolve_session};

/// Resolves the bearer token on every request and stores the resulting
/// [`Identity`](crate::auth::Identity) in the request extensions.
///
/// Requests without a valid token pass through untouched; whether an identity
/// is required is decided by each operation.
pub struct SessionMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match req.app_data::<web::Data<AppState>>() {
                Some(state) => {
                    let header = req
                        .headers()
                        .get(AUTHORIZATION)
                        .and_then(|h| h.to_str().ok());

                    if let Ok(identity) = resolve_session(&state.jwt_service, header) {
                        req.extensions_mut().insert(identity);
                    }
                }
                None => log::warn!("Session middleware running without application state"),
            }

            service.call(req).await
        })
    }
}
