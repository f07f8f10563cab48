// src/shim/server.rs

//! `POST /login` over actix-web.

use actix_web::{App, HttpResponse, HttpServer, web};
use serde::{Deserialize, Serialize};

use super::directory::UserDirectory;
use super::token::TokenIssuer;
use crate::error::Result;
use crate::models::{Role, ShimConfig};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// Shared handler state
pub struct ShimState {
    pub directory: UserDirectory,
    pub issuer: TokenIssuer,
}

impl ShimState {
    pub fn from_config(config: &ShimConfig) -> Result<Self> {
        Ok(Self {
            directory: UserDirectory::load(&config.users_file)?,
            issuer: TokenIssuer::new(&config.secret(), config.token_ttl_hours),
        })
    }
}

/// Check credentials and sign a token. Blocks on bcrypt.
fn issue_token(state: &ShimState, email: &str, password: &str) -> Result<Option<(String, Role)>> {
    match state.directory.authenticate(email, password)? {
        Some(user) => Ok(Some((state.issuer.issue(user)?, user.role.clone()))),
        None => Ok(None),
    }
}

pub async fn login(state: web::Data<ShimState>, request: web::Json<LoginRequest>) -> HttpResponse {
    let LoginRequest { email, password } = request.into_inner();
    log::info!("POST /login - email: {}", email);

    let worker_email = email.clone();
    let issued = web::block(move || issue_token(&state, &worker_email, &password)).await;

    match issued {
        Ok(Ok(Some((token, role)))) => {
            log::info!("Login successful: {}", email);
            HttpResponse::Ok().json(LoginResponse { token, role })
        }
        Ok(Ok(None)) => {
            log::warn!("Login failed: {}", email);
            HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Invalid credentials" }))
        }
        Ok(Err(e)) => {
            log::error!("Login error for {}: {}", email, e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Internal server error" }))
        }
        Err(e) => {
            log::error!("Login worker failed for {}: {}", email, e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Internal server error" }))
        }
    }
}

/// Register the shim's routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login));
}

/// Serve until shut down.
pub async fn run(config: &ShimConfig) -> Result<()> {
    let state = web::Data::new(ShimState::from_config(config)?);

    log::info!("Login shim listening on {}", config.bind);
    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(&config.bind)?
        .run()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shim::directory::tests::user;
    use actix_web::test;

    fn state() -> web::Data<ShimState> {
        let mut corrupt = user("u3", "bad@b.com", "pw", true);
        corrupt.password_hash = "not-a-hash".into();
        web::Data::new(ShimState {
            directory: UserDirectory::from_users([
                user("u1", "a@b.com", "secret", true),
                user("u2", "off@b.com", "secret", false),
                corrupt,
            ]),
            issuer: TokenIssuer::new("test-secret", 1),
        })
    }

    async fn post_login(email: &str, password: &str) -> (u16, serde_json::Value) {
        let data = state();
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        (status, test::read_body_json(resp).await)
    }

    #[actix_web::test]
    async fn test_login_issues_token() {
        let (status, body) = post_login("a@b.com", "secret").await;
        assert_eq!(status, 200);
        assert_eq!(body["role"], "student");

        let token = body["token"].as_str().unwrap();
        let claims = TokenIssuer::new("test-secret", 1).verify(token).unwrap();
        assert_eq!(claims.sub, "u1");
    }

    #[actix_web::test]
    async fn test_bad_credentials() {
        let (status, body) = post_login("a@b.com", "nope").await;
        assert_eq!(status, 401);
        assert_eq!(body["error"], "Invalid credentials");

        let (status, _) = post_login("off@b.com", "secret").await;
        assert_eq!(status, 401);
    }

    #[test]
    fn test_issue_token_outside_runtime() {
        let state = state();
        let (token, role) = issue_token(&state, "a@b.com", "secret").unwrap().unwrap();
        assert_eq!(role, Role::Student);
        assert_eq!(state.issuer.verify(&token).unwrap().sub, "u1");
        assert!(issue_token(&state, "off@b.com", "secret").unwrap().is_none());
        assert!(issue_token(&state, "bad@b.com", "pw").is_err());
    }

    #[actix_web::test]
    async fn test_internal_error() {
        let (status, body) = post_login("bad@b.com", "pw").await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "Internal server error");
    }
}
