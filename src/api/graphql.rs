//! GraphQL HTTP and WebSocket handlers

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode, header::ACCEPT};
use axum::response::{Html, IntoResponse};
use axum::Json;

use crate::AppState;
use crate::graphql::Credentials;

/// GraphQL query/mutation handler; the authorization header travels with the request
pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner().data(Credentials::from_headers(&headers));
    state.schema.execute(request).await.into()
}

/// GraphiQL interactive playground (only for browsers)
pub async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"));

    if accepts_html {
        Html(
            GraphiQLSource::build()
                .endpoint("/graphql")
                .subscription_endpoint("/graphql/ws")
                .finish(),
        )
        .into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

/// GraphQL WebSocket handler for subscriptions
///
/// Credentials come from the `connection_init` payload, falling back to the
/// upgrade request's authorization header. They are verified by each
/// subscription, not here.
pub async fn graphql_ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let header_credentials = Credentials::from_headers(&headers);

    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |socket| {
            GraphQLWebSocket::new(socket, state.schema.clone(), protocol)
                .on_connection_init(move |params| async move {
                    let from_init = Credentials::from_connection_params(&params);
                    let credentials = if from_init.is_present() {
                        from_init
                    } else {
                        header_credentials
                    };

                    tracing::debug!(
                        authenticated = credentials.is_present(),
                        "WebSocket connection initialised"
                    );

                    let mut data = async_graphql::Data::default();
                    data.insert(credentials);
                    Ok(data)
                })
                .serve()
        })
}
