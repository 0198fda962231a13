mod helper;

use std::sync::{Arc, Mutex};

use burrow_http::{
    handler_fn, middleware, Capability, DispatchError, Extension, Flow, HttpError, Logger, Next,
    RenderMeans, Rendering, RequestContext, Step,
};
use serde_json::json;

use helper::{get, json_body, quiet_options, run, CollectingSink};

struct MeansA(&'static str);
struct MeansB(&'static str);
struct MeansC(&'static str);

/// Provides one means value and records when its wrap encloses downstream
/// execution.
struct Recorder<T: Send + Sync + 'static> {
    name: &'static str,
    means: fn() -> T,
    log: Arc<Mutex<Vec<String>>>,
}

impl<T: Send + Sync + 'static> Capability for Recorder<T> {
    fn modification(&self, _context: &RequestContext) -> Result<Extension, DispatchError> {
        Ok(Extension::new().with_means((self.means)()))
    }

    fn wrap(&self, context: &RequestContext, next: Next<'_>) -> Result<Step, DispatchError> {
        self.log.lock().unwrap().push(format!("{}:enter", self.name));
        let outcome = next.proceed(context.clone());
        self.log.lock().unwrap().push(format!("{}:exit", self.name));
        outcome
    }
}

fn recorder<T: Send + Sync + 'static>(
    name: &'static str,
    means: fn() -> T,
    log: &Arc<Mutex<Vec<String>>>,
) -> Recorder<T> {
    Recorder {
        name,
        means,
        log: log.clone(),
    }
}

#[test]
fn terminal_handler_sees_the_union_of_extensions() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let listener = burrow_http::http_listener(
        recorder("a", || MeansA("from a"), &log)
            .and(recorder("b", || MeansB("from b"), &log))
            .and(recorder("c", || MeansC("from c"), &log))
            .for_handler(handler_fn(|context| {
                assert_eq!(context.require_means::<MeansA>()?.0, "from a");
                assert_eq!(context.require_means::<MeansB>()?.0, "from b");
                assert_eq!(context.require_means::<MeansC>()?.0, "from c");
                context.response().end("ok");
                Flow::done()
            })),
    );

    let response = run(&listener, get("/test"));
    assert_eq!(response.body_string(), "ok");
}

#[test]
fn later_capabilities_can_shadow_earlier_means() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let listener = burrow_http::http_listener(
        recorder("a", || MeansA("original"), &log)
            .and(recorder("c", || MeansA("shadowed"), &log))
            .for_handler(handler_fn(|context| {
                assert_eq!(context.require_means::<MeansA>()?.0, "shadowed");
                context.response().end("ok");
                Flow::done()
            })),
    );

    assert_eq!(run(&listener, get("/test")).body_string(), "ok");
}

#[test]
fn earlier_wraps_enclose_later_ones() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let listener = burrow_http::http_listener(
        recorder("a", || MeansA("a"), &log)
            .and(recorder("b", || MeansB("b"), &log))
            .and(recorder("c", || MeansC("c"), &log))
            .for_handler(handler_fn(|context| {
                context.response().end("ok");
                Flow::done()
            })),
    );

    run(&listener, get("/test"));

    assert_eq!(
        *log.lock().unwrap(),
        vec!["a:enter", "b:enter", "c:enter", "c:exit", "b:exit", "a:exit"]
    );
}

#[test]
fn composition_is_associative() {
    let left_log = Arc::new(Mutex::new(Vec::new()));
    let right_log = Arc::new(Mutex::new(Vec::new()));

    let terminal = || {
        handler_fn(|context| {
            context.response().end("ok");
            Flow::done()
        })
    };

    let left = burrow_http::http_listener(
        recorder("a", || MeansA("a"), &left_log)
            .and(recorder("b", || MeansB("b"), &left_log))
            .and(recorder("c", || MeansC("c"), &left_log))
            .for_handler(terminal()),
    );
    let right = burrow_http::http_listener(
        recorder("a", || MeansA("a"), &right_log)
            .and(
                recorder("b", || MeansB("b"), &right_log)
                    .and(recorder("c", || MeansC("c"), &right_log)),
            )
            .for_handler(terminal()),
    );

    run(&left, get("/test"));
    run(&right, get("/test"));

    assert_eq!(*left_log.lock().unwrap(), *right_log.lock().unwrap());
}

#[test]
fn later_modifications_see_earlier_means() {
    struct Dependent;

    impl Capability for Dependent {
        fn modification(&self, context: &RequestContext) -> Result<Extension, DispatchError> {
            let upstream = context.require_means::<MeansA>()?;
            Ok(Extension::new().with_means(MeansB(upstream.0)))
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let listener = burrow_http::http_listener(
        recorder("a", || MeansA("carried"), &log)
            .and(Dependent)
            .for_handler(handler_fn(|context| {
                assert_eq!(context.require_means::<MeansB>()?.0, "carried");
                context.response().end("ok");
                Flow::done()
            })),
    );

    assert_eq!(run(&listener, get("/test")).body_string(), "ok");
}

#[test]
fn logging_capability_replaces_the_context_logger() {
    let sink = CollectingSink::new();
    let listener = burrow_http::HttpListener::with_options(
        quiet_options(),
        burrow_http::Logging::log_by(Logger::from_sink(sink.clone())).for_handler(handler_fn(
            |context| {
                context.log().info("handled");
                context.response().end("ok");
                Flow::done()
            },
        )),
    );

    run(&listener, get("/test"));

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].1, "handled");
}

#[test]
fn applies_middleware_after_capabilities() {
    let calls = Arc::new(Mutex::new(0u32));
    let counted = calls.clone();
    let listener = burrow_http::HttpListener::with_options(
        quiet_options(),
        Rendering
            .and(middleware(move |_request, _response| {
                *counted.lock().unwrap() += 1;
                Ok(())
            }))
            .for_handler(handler_fn(|context| {
                let render = context.require_means::<RenderMeans>()?;
                render.render_json(&json!({ "response": "ok" }))?;
                Flow::done()
            })),
    );

    let response = run(&listener, get("/test"));

    assert_eq!(json_body(&response), json!({ "response": "ok" }));
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn applies_capabilities_after_middleware() {
    let calls = Arc::new(Mutex::new(0u32));
    let counted = calls.clone();
    let listener = burrow_http::HttpListener::with_options(
        quiet_options(),
        middleware(move |_request, _response| {
            *counted.lock().unwrap() += 1;
            Ok(())
        })
        .and(Rendering)
        .for_handler(handler_fn(|context| {
            let render = context.require_means::<RenderMeans>()?;
            render.render_json(&json!({ "response": "ok" }))?;
            Flow::done()
        })),
    );

    let response = run(&listener, get("/test"));

    assert_eq!(json_body(&response), json!({ "response": "ok" }));
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn allows_middleware_to_error() {
    let listener = burrow_http::HttpListener::with_options(
        quiet_options(),
        middleware(|_request, _response| {
            Err(HttpError::with_message(503, "Custom Error").into())
        })
        .for_handler(handler_fn(|_context| Flow::next())),
    );

    let response = run(&listener, get("/test"));

    assert_eq!(response.status_code(), 503);
    assert_eq!(response.status_message(), Some("Custom Error".to_string()));
}

#[test]
fn allows_middleware_to_respond() {
    let listener = burrow_http::HttpListener::with_options(
        quiet_options(),
        middleware(|_request, response: &burrow_http::ServerResponse| {
            response.end("TEST");
            Ok(())
        })
        .for_handler(handler_fn(|_context| Flow::next())),
    );

    let response = run(&listener, get("/test"));

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body_string(), "TEST");
}
