//! Stage ordering and failure mapping of `TypedHandler`, driven through
//! `Routes` with derived parameter types.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use serde::{Deserialize, Serialize};
use tessera_core::{HandlerError, ProblemDetail, APPLICATION_PROBLEM_JSON};
use tessera_extract::Empty;
use tessera_macros::Params;
use tessera_pipeline::{
    guard_fn, GuardOutcome, HttpHandler, HydratedRequest, Outcome, Reply, Request, Response, Routes,
    TypedHandler,
};
use validator::Validate;

#[derive(Debug, Default, Params, Validate)]
struct OrderPath {
    #[param("path=orderId")]
    order_id: u64,

    #[param("query=verbose,default=false")]
    verbose: bool,
}

#[derive(Debug, Deserialize, Validate)]
struct LineItem {
    #[validate(length(min = 1))]
    sku: String,
    #[validate(range(min = 1, max = 99))]
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct Order {
    id: u64,
    verbose: bool,
    items: usize,
}

fn request(method: Method, uri: &str, body: &'static str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap()
}

async fn json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn routes(calls: Arc<AtomicUsize>) -> Routes {
    let get = TypedHandler::new(|req: HydratedRequest<Empty, OrderPath>| async move {
        Ok::<_, HandlerError>(Reply::ok(Order {
            id: req.params.order_id,
            verbose: req.params.verbose,
            items: 0,
        }))
    })
    .named("getOrder");

    let add = TypedHandler::new(move |req: HydratedRequest<LineItem, OrderPath>| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            Ok::<_, HandlerError>(Reply::created(Order {
                id: req.params.order_id,
                verbose: false,
                items: req.data.quantity as usize,
            }))
        }
    })
    .named("addLineItem");

    Routes::new()
        .get("/orders/{orderId}", get)
        .unwrap()
        .post("/orders/{orderId}/items", add)
        .unwrap()
}

#[tokio::test]
async fn test_path_and_default_params() {
    let routes = routes(Arc::default());

    let response = routes.call(request(Method::GET, "/orders/12", "")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json(response).await,
        serde_json::json!({"id": 12, "verbose": false, "items": 0})
    );

    let response = routes
        .call(request(Method::GET, "/orders/12?verbose=true", ""))
        .await;
    assert_eq!(json(response).await["verbose"], true);
}

#[tokio::test]
async fn test_bad_path_param_is_400() {
    let routes = routes(Arc::default());

    let response = routes.call(request(Method::GET, "/orders/abc", "")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["content-type"], APPLICATION_PROBLEM_JSON);

    let body = json(response).await;
    assert_eq!(body["code"], "BAD_PARAMETERS");
    assert_eq!(
        body["violations"],
        serde_json::json!([{
            "parameter": "orderId",
            "detail": "must be a valid uint",
            "type": "path",
        }])
    );
}

#[tokio::test]
async fn test_params_fail_before_body_is_read() {
    let calls = Arc::new(AtomicUsize::new(0));
    let routes = routes(Arc::clone(&calls));

    let response = routes
        .call(request(Method::POST, "/orders/x/items", "not json"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["code"], "BAD_PARAMETERS");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_body_stage_failures() {
    let calls = Arc::new(AtomicUsize::new(0));
    let routes = routes(Arc::clone(&calls));

    let response = routes.call(request(Method::POST, "/orders/1/items", "")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(response).await;
    assert_eq!(body["detail"], "empty request body");
    assert!(body.get("violations").is_none());

    let response = routes
        .call(request(Method::POST, "/orders/1/items", "{not json"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["code"], "BAD_REQUEST");

    let response = routes
        .call(request(
            Method::POST,
            "/orders/1/items",
            r#"{"sku":"","quantity":500}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json(response).await;
    assert_eq!(body["code"], "CONSTRAINT_VIOLATION");
    let pointers: Vec<_> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["pointer"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(pointers, vec!["/quantity", "/sku"]);

    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let response = routes
        .call(request(
            Method::POST,
            "/orders/1/items",
            r#"{"sku":"A-1","quantity":3}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json(response).await["items"], 3);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_guard_runs_before_params() {
    let handler = TypedHandler::new(|_: HydratedRequest<Empty, OrderPath>| async {
        Ok::<_, HandlerError>(Reply::<()>::no_content())
    })
    .guard(guard_fn("deny", |_| {
        Err(ProblemDetail::unauthorized("token expired").into())
    }));
    let routes = Routes::new().get("/orders/{orderId}", handler).unwrap();

    let response = routes.call(request(Method::GET, "/orders/abc", "")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(response).await["detail"], "token expired");
}

#[tokio::test]
async fn test_guard_replacement_feeds_hydration() {
    let handler = TypedHandler::new(|req: HydratedRequest<Empty, OrderPath>| async move {
        Ok::<_, HandlerError>(Reply::ok(req.params.verbose))
    })
    .guard(guard_fn("force_verbose", |req| {
        let mut next = http::Request::builder()
            .method(req.method().clone())
            .uri(format!("{}?verbose=1", req.uri().path()))
            .body(Full::new(Bytes::new()))
            .map_err(HandlerError::internal)?;
        *next.extensions_mut() = req.extensions().clone();
        Ok(GuardOutcome::Replace(next))
    }));
    let routes = Routes::new().get("/orders/{orderId}", handler).unwrap();

    let response = routes.call(request(Method::GET, "/orders/5", "")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await, serde_json::json!(true));
}

#[tokio::test]
async fn test_problem_instance_follows_rewritten_uri() {
    let handler = TypedHandler::new(|req: HydratedRequest<Empty, OrderPath>| async move {
        Ok::<_, HandlerError>(Reply::ok(req.params.order_id))
    })
    .guard(guard_fn("rewrite", |req| {
        let mut next = http::Request::builder()
            .method(req.method().clone())
            .uri(format!("/internal{}", req.uri().path()))
            .body(Full::new(Bytes::new()))
            .map_err(HandlerError::internal)?;
        *next.extensions_mut() = req.extensions().clone();
        Ok(GuardOutcome::Replace(next))
    }));
    let routes = Routes::new().get("/orders/{orderId}", handler).unwrap();

    let response = routes.call(request(Method::GET, "/orders/abc", "")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(response).await;
    assert_eq!(body["code"], "BAD_PARAMETERS");
    assert_eq!(body["instance"], "/internal/orders/abc");
}

#[tokio::test]
async fn test_hooks_transform_and_fail() {
    let handler = TypedHandler::new(|req: HydratedRequest<Empty, OrderPath>| async move {
        Ok::<_, HandlerError>(Reply::ok(Order {
            id: req.params.order_id,
            verbose: req.params.verbose,
            items: 1,
        }))
    })
    .on_params(|params, _| {
        params.verbose = true;
        Ok(())
    })
    .on_response(|order, _| {
        order.items *= 10;
        Ok(())
    });
    let routes = Routes::new().get("/orders/{orderId}", handler).unwrap();

    let body = json(routes.call(request(Method::GET, "/orders/3", "")).await).await;
    assert_eq!(body, serde_json::json!({"id": 3, "verbose": true, "items": 10}));

    let failing = TypedHandler::new(|_: HydratedRequest<Empty, Empty>| async {
        Ok::<_, HandlerError>(Reply::ok(1_u8))
    })
    .on_response(|_, _| Err(anyhow::anyhow!("secret-cache-key missing")));

    let response = failing.handle(request(Method::GET, "/", "")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(response).await;
    assert_eq!(body["code"], "SERVER_ERROR");
    assert!(!body.to_string().contains("secret-cache-key"));
}

#[tokio::test]
async fn test_error_and_reply_renders_only_error() {
    let handler = TypedHandler::new(|_: HydratedRequest<Empty, Empty>| async {
        Outcome::new(
            Some(Reply::ok("should not be sent")),
            Some(ProblemDetail::business_rule_violation("order already shipped").into()),
        )
    });

    let response = handler.handle(request(Method::DELETE, "/orders/1", "")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json(response).await;
    assert_eq!(body["code"], "BUSINESS_RULE_VIOLATION");
    assert!(!body.to_string().contains("should not be sent"));
}
