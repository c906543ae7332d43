//! Request dispatcher
//!
//! The dispatcher is the single entry point of the list API:
//!
//! 1. Authorization, before anything else
//! 2. Routing of the path to a list and an optional argument
//! 3. Method dispatch:
//!
//! | Method        | Mutable list   | Read-only list  |
//! |---------------|----------------|-----------------|
//! | `GET`         | reader         | reader          |
//! | `POST`/`PUT`  | writer         | `bad_request`   |
//! | `DELETE`      | remover        | `bad_request`   |
//! | anything else | no route       | `bad_request`   |

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::request::{ApiRequest, ApiResponse, Method};
use crate::router::{self, Resolved, RouteError};
use crate::table::{TableReader, TableRemover, TableWriter};
use crate::traits::{ClientAuth, ListStore, WriteMode};

/// Routes requests to the table operations
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn ListStore>,
    auth: Arc<dyn ClientAuth>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn ListStore>, auth: Arc<dyn ClientAuth>) -> Self {
        Self { store, auth }
    }

    /// Handle a request, rendering every error into a response
    ///
    /// [`ApiError::NoRoute`] becomes `404 not_found`.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let response = self
            .dispatch(request)
            .unwrap_or_else(|e| e.to_response());

        info!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            "Request handled"
        );
        response
    }

    /// Handle a request
    ///
    /// # Returns
    ///
    /// - `Ok(ApiResponse)`: Successful read, write, or delete
    /// - `Err(ApiError::NoRoute)`: No route; the caller decides how to answer
    /// - `Err(ApiError)`: Any other failure
    pub fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        if !self.auth.authorize(request) {
            debug!(method = %request.method, path = %request.path, "Unauthorized request");
            return Err(ApiError::Unauthorized);
        }

        let route = router::resolve(&request.path).map_err(|e| match e {
            RouteError::NoMatch => no_route(request),
            RouteError::BadArgument => ApiError::bad_request(e.to_string()),
        })?;

        debug!(
            method = %request.method,
            variant = %route.variant,
            argument = ?route.argument,
            mutable = route.mutable,
            "Request routed"
        );

        let store = self.store.as_ref();
        match (request.method, route.mutable) {
            (Method::Get, _) => {
                TableReader::new(store).respond(route.variant, route.argument.as_deref(), 200)
            }
            (Method::Post | Method::Put, true) => {
                let mode = WriteMode::from_method(request.method).ok_or_else(|| no_route(request))?;
                let argument = require_argument(&route)?;
                TableWriter::new(store).write(route.variant, argument, mode, request.body.as_deref())
            }
            (Method::Delete, true) => {
                let argument = require_argument(&route)?;
                TableRemover::new(store).remove(route.variant, argument)
            }
            (_, false) => Err(ApiError::bad_request(
                "Invalid request: Specify list to modify",
            )),
            _ => Err(no_route(request)),
        }
    }
}

fn require_argument(route: &Resolved) -> Result<&str, ApiError> {
    route
        .argument
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Invalid request: Specify item to modify"))
}

fn no_route(request: &ApiRequest) -> ApiError {
    ApiError::NoRoute {
        method: request.method,
        path: request.path.clone(),
    }
}
