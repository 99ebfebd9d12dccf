use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::HttpMessage;
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::task::Poll;

use crate::context::UserInfo;
use crate::core::ports::roles::Roles;
use crate::error::Error;

/// Lets the request through only when the authenticated user is currently an
/// admin. Must be mounted inside the jwt middleware.
pub struct Admin<R> {
    roles: R,
}

impl<R> Admin<R> {
    pub fn new(roles: R) -> Self {
        Self { roles }
    }
}

impl<S, B, R> Transform<S, ServiceRequest> for Admin<R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: Roles + Clone + 'static,
{
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type Response = S::Response;
    type Error = S::Error;
    type InitError = ();
    type Transform = AdminMiddleware<S, R>;
    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminMiddleware {
            roles: self.roles.clone(),
            service: Rc::new(service),
        }))
    }
}

pub struct AdminMiddleware<S, R> {
    roles: R,
    service: Rc<S>,
}

impl<S, B, R> Service<ServiceRequest> for AdminMiddleware<S, R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: Roles + Clone + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    fn poll_ready(&self, ctx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }
    fn call(&self, req: ServiceRequest) -> Self::Future {
        let roles = self.roles.clone();
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let uid = req.extensions().get::<UserInfo>().map(|u| u.id).ok_or(Error::Unauthorized)?;
            if !roles.is_admin(uid).await? {
                log::warn!("user {} denied admin access to {}", uid, req.path());
                return Err(Error::Forbidden.into());
            }
            service.call(req).await
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body, init_service, TestRequest};
    use actix_web::{web, App};

    #[derive(Clone)]
    struct Admins(Vec<i32>);

    impl Roles for Admins {
        async fn is_admin(&self, user_id: i32) -> Result<bool, Error> {
            Ok(self.0.contains(&user_id))
        }
    }

    #[derive(Clone)]
    struct Broken;

    impl Roles for Broken {
        async fn is_admin(&self, _: i32) -> Result<bool, Error> {
            Err(Error::DatabaseError(sqlx::Error::PoolTimedOut))
        }
    }

    fn as_user(id: i32) -> TestRequest {
        TestRequest::get().uri("/users").insert_header(("x-user", id.to_string()))
    }

    macro_rules! admin_app {
        ($roles:expr) => {
            init_service(
                App::new()
                    .wrap(Admin::new($roles))
                    .wrap_fn(|req, srv| {
                        let user = req.headers().get("x-user").and_then(|h| h.to_str().ok()).and_then(|v| v.parse::<i32>().ok());
                        if let Some(id) = user {
                            req.extensions_mut().insert(UserInfo { id });
                        }
                        srv.call(req)
                    })
                    .route("/users", web::get().to(|| async { "users" })),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_admin_passes_through() {
        let app = admin_app!(Admins(vec![1]));
        assert_eq!(call_and_read_body(&app, as_user(1).to_request()).await, web::Bytes::from_static(b"users"));
    }

    #[actix_web::test]
    async fn test_missing_user_is_unauthorized() {
        let app = admin_app!(Admins(vec![1]));
        let err = app.call(TestRequest::get().uri("/users").to_request()).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_non_admin_is_forbidden() {
        let app = admin_app!(Admins(vec![1]));
        let err = app.call(as_user(2).to_request()).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
        let err = app.call(as_user(404).to_request()).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_lookup_failure_is_server_error() {
        let app = admin_app!(Broken);
        let err = app.call(as_user(1).to_request()).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
