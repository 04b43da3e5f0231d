use http::{Request, StatusCode};
use switchback::{handler, BufferedResponse, HttpError, ResponseWriter, Router};

fn request(method: &str, path: &str) -> Request<Vec<u8>> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Vec::new())
        .unwrap()
}

fn write_handler(body: &'static str) -> switchback::Handler {
    handler(move |c| {
        c.write(body)?;
        Ok(())
    })
}

#[test]
fn test_pipeline_next_abort_flow() {
    let mut router = Router::new();
    router.get(
        "/flow",
        vec![
            handler(|c| {
                c.write("<a>")?;
                c.next()?;
                c.write("</a>")?;
                Ok(())
            }),
            handler(|c| {
                c.write("<b/>")?;
                c.abort();
                Ok(())
            }),
            handler(|c| {
                c.write("<c/>")?;
                Ok(())
            }),
        ],
    );

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/flow"), &mut res);
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"<a><b/></a>");
}

#[test]
fn test_method_not_allowed_fallback() {
    let mut router = Router::new();
    router.get("/users", vec![write_handler("list")]);
    router.post("/users", vec![write_handler("create")]);

    // A method without a route gets 405 and the sorted Allow set.
    let mut res = BufferedResponse::new();
    router.handle(request("PUT", "/users"), &mut res);
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers().get("Allow").unwrap(), "GET, OPTIONS, POST");
    assert!(res.body().is_empty());

    // OPTIONS keeps its 200 and produces no body from the fallback chain.
    let mut res = BufferedResponse::new();
    router.handle(request("OPTIONS", "/users"), &mut res);
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("Allow").unwrap(), "GET, OPTIONS, POST");
    assert!(res.body().is_empty());

    // A path no method serves falls through to 404.
    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/other"), &mut res);
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_http_error_translation() {
    let mut router = Router::new();
    router.get(
        "/teapot",
        vec![handler(|_| {
            Err(HttpError::with_message(StatusCode::IM_A_TEAPOT, "short and stout").into())
        })],
    );

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/teapot"), &mut res);
    assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(res.body(), b"short and stout");
}

#[test]
fn test_recovery_converts_panics() {
    let mut router = Router::new();
    router.use_handlers(vec![switchback::fault::recovery()]);
    router.get(
        "/panic",
        vec![handler(|_| {
            panic!("wild pointer");
        })],
    );
    router.get(
        "/panic-http",
        vec![handler(|_| {
            std::panic::panic_any(HttpError::new(StatusCode::UNAUTHORIZED));
        })],
    );

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/panic"), &mut res);
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body(), b"wild pointer");

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/panic-http"), &mut res);
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_custom_not_found_chain() {
    let mut router = Router::new();
    router.not_found(vec![handler(|c| {
        c.response.write_status(StatusCode::GONE);
        c.write("nothing here")?;
        c.abort();
        Ok(())
    })]);

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/whatever"), &mut res);
    assert_eq!(res.status(), StatusCode::GONE);
    assert_eq!(res.body(), b"nothing here");
}

#[test]
fn test_use_handlers_also_wrap_not_found() {
    let mut router = Router::new();
    router.use_handlers(vec![handler(|c| {
        c.write("[")?;
        let outcome = c.next();
        c.write("]")?;
        outcome
    })]);
    router.get("/hit", vec![write_handler("hit")]);

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/hit"), &mut res);
    assert_eq!(res.body(), b"[hit]");

    // On a miss the same use handler runs first in the not-found chain.
    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/miss"), &mut res);
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = String::from_utf8_lossy(res.body()).to_string();
    assert!(body.starts_with("[]"), "body was {body:?}");
}

#[test]
fn test_trailing_slash_flag() {
    let mut router = Router::new();
    router.ignore_trailing_slash = true;
    router.get("/x", vec![write_handler("x")]);

    for path in ["/x", "/x/", "/x//"] {
        let mut res = BufferedResponse::new();
        router.handle(request("GET", path), &mut res);
        assert_eq!(res.body(), b"x", "path {path:?}");
    }

    let mut strict = Router::new();
    strict.get("/x", vec![write_handler("x")]);
    let mut res = BufferedResponse::new();
    strict.handle(request("GET", "/x/"), &mut res);
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_param_capture_positions() {
    let mut router = Router::new();
    router.get(
        r"/users/<id>/<accnt:\d+>/address",
        vec![handler(|c| {
            let pairs: Vec<String> = c.params().map(|(n, v)| format!("{n}={v}")).collect();
            c.write(pairs.join("&"))?;
            Ok(())
        })],
    );

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/users/abc/123/address"), &mut res);
    assert_eq!(res.body(), b"id=abc&accnt=123");
}

#[test]
fn test_concurrent_dispatch_shares_router() {
    use std::sync::Arc;

    let mut router = Router::new();
    router.get(
        "/echo/<v>",
        vec![handler(|c| {
            let v = c.param("v").to_string();
            c.write(v)?;
            Ok(())
        })],
    );
    let router = Arc::new(router);

    let mut workers = Vec::new();
    for i in 0..8 {
        let router = Arc::clone(&router);
        workers.push(std::thread::spawn(move || {
            for j in 0..50 {
                let value = format!("{i}-{j}");
                let mut res = BufferedResponse::new();
                router.handle(request("GET", &format!("/echo/{value}")), &mut res);
                assert_eq!(res.body(), value.as_bytes());
            }
        }));
    }
    for worker in workers {
        worker.join().unwrap();
    }
}
