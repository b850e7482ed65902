use crate::{
    auth::{claims::Identity, jwt::JwtService},
    errors::{AppError, AppResult},
};

const BEARER_PREFIX: &str = "Bearer ";

/// Turns a raw `Authorization` header value into an identity.
///
/// Every failure (missing header, wrong scheme, bad signature, expired or
/// unparseable token) collapses to `NotAuthenticated`; the reason only goes
/// to the debug log.
pub fn resolve_session(jwt_service: &JwtService, header: Option<&str>) -> AppResult<Identity> {
    let Some(header) = header else {
        log::debug!("Session rejected: missing authorization header");
        return Err(AppError::NotAuthenticated);
    };

    let Some(token) = header.strip_prefix(BEARER_PREFIX) else {
        log::debug!("Session rejected: authorization header is not a bearer token");
        return Err(AppError::NotAuthenticated);
    };

    jwt_service
        .verify(token.trim())
        .map(|claims| claims.identity())
        .map_err(|reason| {
            log::debug!("Session rejected: {}", reason);
            AppError::NotAuthenticated
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::Duration;

    fn jwt_service() -> JwtService {
        JwtService::new(&Config::test_config().jwt_secret, Duration::hours(1))
    }

    fn assert_not_authenticated(result: AppResult<Identity>) {
        assert!(matches!(result, Err(AppError::NotAuthenticated)));
    }

    #[test]
    fn test_valid_bearer_token() {
        let jwt = jwt_service();
        let token = jwt.issue(&Identity::new("u1", "alice")).unwrap();

        let identity = resolve_session(&jwt, Some(&format!("Bearer {}", token))).unwrap();
        assert_eq!(identity, Identity::new("u1", "alice"));
    }

    #[test]
    fn test_missing_header() {
        assert_not_authenticated(resolve_session(&jwt_service(), None));
    }

    #[test]
    fn test_missing_bearer_prefix() {
        let jwt = jwt_service();
        let token = jwt.issue(&Identity::new("u1", "alice")).unwrap();

        assert_not_authenticated(resolve_session(&jwt, Some(&token)));
        assert_not_authenticated(resolve_session(&jwt, Some(&format!("Basic {}", token))));
    }

    #[test]
    fn test_expired_and_garbage_tokens_look_the_same() {
        let expired = JwtService::new(&Config::test_config().jwt_secret, Duration::seconds(-30))
            .issue(&Identity::new("u1", "alice"))
            .unwrap();

        assert_not_authenticated(resolve_session(
            &jwt_service(),
            Some(&format!("Bearer {}", expired)),
        ));
        assert_not_authenticated(resolve_session(&jwt_service(), Some("Bearer garbage")));
    }
}
