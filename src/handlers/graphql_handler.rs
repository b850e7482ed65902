use actix_web::{get, post, web, HttpMessage, HttpRequest, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::{auth::Identity, graphql::Schema};

#[post("/graphql")]
pub async fn graphql(
    schema: web::Data<Schema>,
    http_request: HttpRequest,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();

    // Set by the session middleware when the bearer token checks out.
    if let Some(identity) = http_request.extensions().get::<Identity>().cloned() {
        request = request.data(identity);
    }

    schema.execute(request).await.into()
}

#[get("/graphiql")]
pub async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::SessionMiddleware, graphql::create_schema, test_utils::fixtures::test_app_state};
    use actix_web::{http::header, test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_graphiql_serves_html() {
        let app = test::init_service(App::new().service(graphiql)).await;

        let req = test::TestRequest::get().uri("/graphiql").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }

    #[actix_web::test]
    async fn test_current_user_without_token_is_not_authenticated() {
        let state = test_app_state();
        let schema = create_schema(state.clone());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(schema))
                .wrap(SessionMiddleware)
                .service(graphql),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/graphql")
            .set_json(json!({ "query": "{ currentUser { id } }" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body["errors"][0]["extensions"]["code"],
            json!("NOT_AUTHENTICATED")
        );
    }
}
