use interpose::{
    DeclaredPolicy, InterceptError, Interception, InterceptingProxy, Invocation, MethodResult,
    Next, Policy, PolicySet,
    handlers::{LoggingHandler, handler_fn},
    rules::{Always, MemberNameRule, PropertyAccess, PropertyRule},
    testing::{CountingHandler, TestError},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

mod common;
use common::{
    RewriteArgumentHandler, Settings, SettingsContract, SettingsImpl, SharedCountHandler,
    StoreError, Wrappable, WrappableContract, WrappableImpl,
};

fn intercept(policies: PolicySet) -> Box<dyn Wrappable> {
    Interception::builder()
        .policies(policies)
        .build()
        .unwrap()
        .wrap::<WrappableContract, _>(WrappableImpl::new())
        .unwrap()
}

#[test]
fn test_two_counters_on_matched_and_excluded_methods() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let policy = Policy::builder("CountAll")
        .rule(MemberNameRule::new("method2").unwrap())
        .handler(SharedCountHandler {
            counter: first.clone(),
            order: 0,
        })
        .handler(SharedCountHandler {
            counter: second.clone(),
            order: 10,
        })
        .build()
        .unwrap();
    let proxy = intercept(PolicySet::builder().policy(policy).build());

    // Matched method
    assert_eq!(proxy.method2(21), 42);
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);

    // Excluded method
    first.store(0, Ordering::SeqCst);
    second.store(0, Ordering::SeqCst);
    assert_eq!(proxy.method1(), 1);
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[test]
fn test_two_policies_both_contribute() {
    let counter_a = CountingHandler::new();
    let counter_b = CountingHandler::new();
    let set = PolicySet::builder()
        .policy(
            Policy::builder("A")
                .rule(MemberNameRule::new("method2").unwrap())
                .handler(counter_a.clone())
                .build()
                .unwrap(),
        )
        .policy(
            Policy::builder("B")
                .rule(MemberNameRule::new("method?").unwrap())
                .handler(counter_b.clone())
                .build()
                .unwrap(),
        )
        .build();
    let proxy = intercept(set);

    proxy.method2(1);
    assert_eq!(counter_a.count(), 1);
    assert_eq!(counter_b.count(), 1);
}

#[test]
fn test_handler_rewrites_arguments() {
    let set = PolicySet::builder()
        .policy(
            Policy::builder("Rewrite")
                .rule(MemberNameRule::new("method2").unwrap())
                .handler(RewriteArgumentHandler { value: 100 })
                .build()
                .unwrap(),
        )
        .build();
    let proxy = intercept(set);
    assert_eq!(proxy.method2(1), 200);
}

#[test]
fn test_handler_short_circuits_target() {
    let target = WrappableImpl::new();
    let set = PolicySet::builder()
        .policy(
            Policy::builder("Stub")
                .rule(Always)
                .handler(handler_fn(0, |inv: &mut Invocation, next: Next<'_>| {
                    if inv.method().name() == "method1" {
                        inv.return_value(-1_i32)
                    } else {
                        next.proceed(inv)
                    }
                }))
                .build()
                .unwrap(),
        )
        .build();
    let proxy = Interception::builder()
        .policies(set)
        .build()
        .unwrap()
        .wrap::<WrappableContract, _>(target.clone())
        .unwrap();

    assert_eq!(proxy.method1(), -1);
    assert_eq!(target.calls(), 0);
    assert_eq!(proxy.method2(2), 4);
    assert_eq!(target.calls(), 1);
}

#[test]
fn test_target_error_reaches_caller_unchanged() {
    let counter = CountingHandler::new();
    let set = PolicySet::builder()
        .policy(
            Policy::builder("Count")
                .rule(Always)
                .handler(counter.clone())
                .build()
                .unwrap(),
        )
        .build();
    let proxy = intercept(set);

    assert_eq!(proxy.method3("known".into()).unwrap(), "value");
    match proxy.method3("other".into()) {
        Err(StoreError::Missing(key)) => assert_eq!(key, "other"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(counter.count(), 2);
}

#[test]
fn test_handler_error_surfaces_through_call_error() {
    let set = PolicySet::builder()
        .policy(
            Policy::builder("Deny")
                .rule(MemberNameRule::new("method3").unwrap())
                .handler(handler_fn(0, |inv: &mut Invocation, _next: Next<'_>| {
                    inv.raise(TestError("denied".into()))
                }))
                .build()
                .unwrap(),
        )
        .build();
    let proxy = intercept(set);

    match proxy.method3("known".into()) {
        Err(StoreError::Intercepted(err)) => {
            assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError("denied".into())));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
#[should_panic(expected = "infallible method")]
fn test_error_on_infallible_method_panics() {
    let set = PolicySet::builder()
        .policy(
            Policy::builder("Deny")
                .rule(MemberNameRule::new("method1").unwrap())
                .handler(handler_fn(0, |inv: &mut Invocation, _next: Next<'_>| {
                    inv.raise(TestError("denied".into()))
                }))
                .build()
                .unwrap(),
        )
        .build();
    intercept(set).method1();
}

#[test]
fn test_declared_policy_applies_by_tag() {
    let audit = CountingHandler::new();
    let set = PolicySet::builder()
        .declared(DeclaredPolicy::builder().on_tag("audit", audit.clone()).build())
        .build();
    let proxy = intercept(set);

    proxy.method1();
    proxy.method3("known".into()).unwrap();
    assert_eq!(audit.count(), 1);
}

#[test]
fn test_declared_policy_applies_by_parameter_tag() {
    let validated = CountingHandler::new();
    let set = PolicySet::builder()
        .declared(
            DeclaredPolicy::builder()
                .on_parameter_tag("validated", validated.clone())
                .build(),
        )
        .build();
    let settings = Interception::builder()
        .policies(set)
        .build()
        .unwrap()
        .wrap::<SettingsContract, _>(SettingsImpl::default())
        .unwrap();

    settings.set_level(3);
    assert_eq!(settings.get_level(), 3);
    assert_eq!(validated.count(), 1);
}

#[test]
fn test_property_rule_selects_accessors() {
    let getters = CountingHandler::new();
    let set = PolicySet::builder()
        .policy(
            Policy::builder("Getters")
                .rule(PropertyRule::new("level", PropertyAccess::Get).unwrap())
                .handler(getters.clone())
                .build()
                .unwrap(),
        )
        .build();
    let settings = Interception::builder()
        .policies(set)
        .build()
        .unwrap()
        .wrap::<SettingsContract, _>(SettingsImpl::default())
        .unwrap();

    settings.set_level(1);
    settings.get_level();
    assert_eq!(getters.count(), 1);
}

#[test]
fn test_no_policies_method_bypasses_handlers() {
    let counter = CountingHandler::new();
    let target = WrappableImpl::new();
    let set = PolicySet::builder()
        .policy(
            Policy::builder("All")
                .rule(Always)
                .handler(counter.clone())
                .build()
                .unwrap(),
        )
        .build();
    let proxy = Interception::builder()
        .policies(set)
        .build()
        .unwrap()
        .wrap::<WrappableContract, _>(target.clone())
        .unwrap();

    proxy.method4();
    assert_eq!(target.calls(), 1);
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_logging_handler_is_transparent() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("interpose=trace")
        .with_test_writer()
        .try_init();

    let set = PolicySet::builder()
        .policy(
            Policy::builder("Logging")
                .rule(Always)
                .handler(LoggingHandler::default())
                .build()
                .unwrap(),
        )
        .build();
    let proxy = intercept(set);

    assert_eq!(proxy.method2(5), 10);
    assert!(proxy.method3("missing".into()).is_err());
}

#[test]
fn test_no_policies_means_plain_forwarding() {
    let target = WrappableImpl::new();
    let interception = Interception::builder().build().unwrap();
    let proxy = interception
        .intercept::<WrappableContract, _>(target.clone())
        .unwrap()
        .proxy()
        .unwrap();

    assert_eq!(proxy.method2(4), 8);
    assert_eq!(target.calls(), 1);
    assert_eq!(proxy.interception().behavior_count(), 0);
}

#[test]
fn test_wrong_return_type_panics_on_infallible_method() {
    let set = PolicySet::builder()
        .policy(
            Policy::builder("Wrong")
                .rule(MemberNameRule::new("method2").unwrap())
                .handler(handler_fn(0, |inv: &mut Invocation, _next: Next<'_>| -> MethodResult {
                    inv.return_value("not an i32")
                }))
                .build()
                .unwrap(),
        )
        .build();
    let proxy = intercept(set);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| proxy.method2(1)));
    assert!(result.is_err());
}

#[test]
fn test_wrong_return_type_reaches_fallible_caller() {
    let set = PolicySet::builder()
        .policy(
            Policy::builder("Wrong")
                .rule(MemberNameRule::new("method3").unwrap())
                .handler(handler_fn(0, |inv: &mut Invocation, _next: Next<'_>| -> MethodResult {
                    inv.return_value(42_i32)
                }))
                .build()
                .unwrap(),
        )
        .build();
    let proxy = intercept(set);

    match proxy.method3("known".into()) {
        Err(StoreError::Intercepted(err)) => match err.downcast_ref::<InterceptError>() {
            Some(InterceptError::ReturnType { method, expected }) => {
                assert!(method.starts_with("Wrappable::method3(String)"));
                assert_eq!(*expected, std::any::type_name::<String>());
            }
            other => panic!("unexpected error: {other:?}"),
        },
        other => panic!("unexpected result: {other:?}"),
    }
}
