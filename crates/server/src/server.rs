use axum::{
    Router,
    extract::{Request, State},
    http::Uri,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{ServerError, oil_stocks, orders, payments};
use engine::{Engine, EngineError};

static USER_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` carrying the acting user.
///
/// Every request must contain an "x-user-id" entry naming an existing user.
#[derive(Debug)]
struct UserHeader(String);

impl Header for UserHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(UserHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

async fn resolve_actor(
    user_header: Option<TypedHeader<UserHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(UserHeader(username))) = user_header else {
        return Err(ServerError::Unauthorized("missing x-user-id".to_string()));
    };

    let actor = match state.engine.actor(&username).await {
        Ok(actor) => actor,
        Err(EngineError::KeyNotFound(_)) => {
            return Err(ServerError::Unauthorized(format!("unknown user {username}")));
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

async fn no_route(uri: Uri) -> ServerError {
    ServerError::NotFound(format!("no route for {}", uri.path()))
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/payments", post(payments::create).get(payments::list))
        .route("/payments/by-date-range", post(payments::by_date_range))
        .route(
            "/payments/{id}",
            get(payments::get)
                .put(payments::update)
                .delete(payments::delete),
        )
        .route("/oil-stocks", post(oil_stocks::create))
        .route("/oil-stocks/getAll", post(oil_stocks::list))
        .route("/oil-stocks/remainingOil", post(oil_stocks::remaining))
        .route("/oil-stocks/{oil_type}/reconcile", get(oil_stocks::reconcile))
        .route("/orders", post(orders::create))
        .route("/orders/getAll", post(orders::list))
        .route("/orders/pendingOrders", get(orders::pending_orders))
        .route("/orders/pending-payments", post(orders::pending_payments))
        .route(
            "/orders/{id}",
            get(orders::get).put(orders::update).delete(orders::delete),
        )
        .route("/orders/{id}/reconcile", get(orders::reconcile))
        .route("/orders/{id}/payments", get(payments::for_order))
        .route_layer(middleware::from_fn_with_state(state.clone(), resolve_actor))
        .fallback(no_route)
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
