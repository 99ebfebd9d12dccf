use actix_web::dev::{Service, ServiceRequest, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpMessage;
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::context::UserInfo;
use crate::core::models::user::Claim;
use crate::core::ports::tokener::{Payload, Tokener};
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;

pub(crate) struct JWTMiddleware {
    secret: Vec<u8>,
    required: bool,
}

impl JWTMiddleware {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret, required: true }
    }

    /// Attaches the user when a valid token is present but lets anonymous
    /// requests through.
    pub fn optional(secret: Vec<u8>) -> Self {
        Self { secret, required: false }
    }
}

impl<S> Transform<S, ServiceRequest> for JWTMiddleware
where
    S: Service<ServiceRequest> + 'static,
    S::Future: 'static,
    S::Error: Into<actix_web::Error>,
{
    type Error = actix_web::Error;
    type Response = S::Response;
    type Transform = JWTService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JWTService {
            tokener: JWT::new(self.secret.clone()),
            required: self.required,
            next_service: service,
        }))
    }
}

pub struct JWTService<S> {
    tokener: JWT,
    required: bool,
    next_service: S,
}

impl<S> JWTService<S> {
    fn authenticate(&self, req: &ServiceRequest) -> Result<UserInfo, Error> {
        let header = req.headers().get(AUTHORIZATION).ok_or(Error::Unauthorized)?;
        let header = header.to_str().map_err(|_| Error::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        let claim: Claim = self.tokener.verify_token(token)?;
        let id = claim.user().parse::<i32>().map_err(|_| Error::Unauthorized)?;
        Ok(UserInfo { id })
    }
}

impl<S> Service<ServiceRequest> for JWTService<S>
where
    S: Service<ServiceRequest>,
    S::Future: 'static,
    S::Error: Into<actix_web::Error>,
{
    type Response = S::Response;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    fn poll_ready(&self, ctx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx).map_err(|e| e.into())
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.authenticate(&req) {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if self.required => return Box::pin(async move { Err(e.into()) }),
            Err(_) => {}
        }
        let res_fut = self.next_service.call(req);
        Box::pin(async move { res_fut.await.map_err(|e| e.into()) })
    }
}
