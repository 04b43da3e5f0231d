use http::{Request, StatusCode};

use super::route::build_url_template;
use crate::context::handler;
use crate::response::{BufferedResponse, ResponseWriter};
use crate::router::Router;
use crate::Handler;

fn request(method: &str, path: &str) -> Request<Vec<u8>> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Vec::new())
        .unwrap()
}

fn tag_handler(tag: &'static str) -> Handler {
    handler(move |c| {
        c.write(tag)?;
        Ok(())
    })
}

fn wrap_handler(open: &'static str, close: &'static str) -> Handler {
    handler(move |c| {
        c.write(open)?;
        c.next()?;
        c.write(close)?;
        Ok(())
    })
}

#[test]
fn test_template_strips_constraints() {
    assert_eq!(build_url_template(r"/users/<id:\d+>"), "/users/<id>");
    assert_eq!(
        build_url_template(r"/users/<id:\d+>/posts/<slug>"),
        "/users/<id>/posts/<slug>"
    );
    assert_eq!(build_url_template("/plain/path"), "/plain/path");
    // The wildcard shorthand is stored unrewritten and has no name to keep.
    assert_eq!(build_url_template("/tail/*"), "/tail/");
    // An explicitly written wildcard marker keeps its (empty) token.
    assert_eq!(build_url_template("/tail/<:.*>"), "/tail/<>");
}

#[test]
fn test_named_wildcard_route_renders_without_asterisk() {
    let mut router = Router::new();
    router
        .get("/files/*", vec![tag_handler("static")])
        .name("static");

    let route = router.route("static").unwrap();
    assert_eq!(route.path(), "/files/*");
    assert_eq!(route.url(&[]), "/files/");
    assert_eq!(router.url("static", &[]), Some("/files/".to_string()));
}

#[test]
fn test_url_substitution_and_encoding() {
    let mut router = Router::new();
    router
        .get(r"/users/<id:\d+>/files/<name>", vec![tag_handler("f")])
        .name("user-file");

    let route = router.route("user-file").unwrap();
    assert_eq!(
        route.url(&[("id", "7"), ("name", "a&b c")]),
        "/users/7/files/a%26b+c"
    );
    // Missing tokens stay in place; pairs without a token are ignored.
    assert_eq!(route.url(&[("id", "7"), ("other", "x")]), "/users/7/files/<name>");
}

#[test]
fn test_group_prefix_concatenation() {
    let mut router = Router::new();
    {
        let mut api = router.group("/api");
        assert_eq!(api.prefix(), "/api");
        let mut v1 = api.group("/v1");
        assert_eq!(v1.prefix(), "/api/v1");
        v1.get("/users", vec![tag_handler("users")]);
    }

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/api/v1/users"), &mut res);
    assert_eq!(res.body(), b"users");

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/users"), &mut res);
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_group_handlers_compose_in_order() {
    let mut router = Router::new();
    {
        let mut api = router.group_with("/api", vec![wrap_handler("[", "]")]);
        let mut admin = api.group_with("/admin", vec![wrap_handler("(", ")")]);
        admin.get("/panel", vec![tag_handler("panel")]);
        // The sibling group inherits only the parent's handlers.
        let mut public = api.group("/public");
        public.get("/page", vec![tag_handler("page")]);
    }

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/api/admin/panel"), &mut res);
    assert_eq!(res.body(), b"[(panel)]");

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/api/public/page"), &mut res);
    assert_eq!(res.body(), b"[page]");
}

#[test]
fn test_group_use_handlers_apply_to_later_routes_only() {
    let mut router = Router::new();
    {
        let mut api = router.group("/api");
        api.get("/before", vec![tag_handler("before")]);
        api.use_handlers(vec![wrap_handler("<", ">")]);
        api.get("/after", vec![tag_handler("after")]);
    }

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/api/before"), &mut res);
    assert_eq!(res.body(), b"before");

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/api/after"), &mut res);
    assert_eq!(res.body(), b"<after>");
}

#[test]
fn test_group_wildcard_tail() {
    let mut router = Router::new();
    {
        let mut files = router.group("/files");
        files.get(
            "/*",
            vec![handler(|c| {
                let tail = c.param("").to_string();
                c.write(tail)?;
                Ok(())
            })],
        );
    }

    let mut res = BufferedResponse::new();
    router.handle(request("GET", "/files/a/b.txt"), &mut res);
    assert_eq!(res.body(), b"a/b.txt");
}

#[test]
fn test_named_route_replacement_last_wins() {
    let mut router = Router::new();
    router.get("/old", vec![tag_handler("old")]).name("home");
    router.get("/new", vec![tag_handler("new")]).name("home");

    let route = router.route("home").unwrap();
    assert_eq!(route.path(), "/new");
}

#[test]
fn test_any_registers_every_method() {
    let mut router = Router::new();
    {
        let mut api = router.group("/api");
        api.any("/echo", vec![tag_handler("echo")]);
    }

    for method in ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"] {
        let mut res = BufferedResponse::new();
        router.handle(request(method, "/api/echo"), &mut res);
        assert_eq!(res.body(), b"echo", "method {method}");
    }
}
