use lifestyle_di::{Dispose, Resolver, ResolverCore, ServiceCollection};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

struct Tracked {
    name: &'static str,
    log: Log,
}

impl Dispose for Tracked {
    fn dispose(&self) {
        self.log.lock().unwrap().push(format!("dispose {}", self.name));
    }
}

fn tracked(ctx: &lifestyle_di::InjectionContext, name: &'static str, log: &Log) -> Arc<Tracked> {
    let value = Arc::new(Tracked { name, log: log.clone() });
    ctx.register_disposer(value.clone());
    value
}

struct First;
struct Second;
struct Root;

#[test]
fn test_scope_hooks_run_lifo_on_close() {
    let log: Log = Arc::default();
    let (l1, l2) = (log.clone(), log.clone());

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<First, _>(move |ctx| {
        tracked(ctx, "first", &l1);
        Ok(First)
    });
    sc.add_scoped_factory::<Second, _>(move |ctx| {
        tracked(ctx, "second", &l2);
        Ok(Second)
    });
    let injector = sc.build();
    let ctx = injector.create_context();

    {
        let scope = ctx.create_scope();
        scope.get_required::<First>();
        scope.get_required::<Second>();
        // Cached: no second hook.
        scope.get_required::<First>();
        assert!(log.lock().unwrap().is_empty());
    }

    assert_eq!(*log.lock().unwrap(), vec!["dispose second", "dispose first"]);
}

#[test]
fn test_nested_scope_hooks_stay_in_their_scope() {
    let log: Log = Arc::default();
    let l = log.clone();

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<First, _>(move |ctx| {
        tracked(ctx, if ctx.scope_depth() == 1 { "outer" } else { "inner" }, &l);
        Ok(First)
    });
    let injector = sc.build();
    let ctx = injector.create_context();

    let outer = ctx.create_scope();
    outer.get_required::<First>();
    {
        let inner = outer.create_scope();
        inner.get_required::<First>();
    }
    assert_eq!(*log.lock().unwrap(), vec!["dispose inner"]);
    drop(outer);
    assert_eq!(*log.lock().unwrap(), vec!["dispose inner", "dispose outer"]);
}

#[test]
fn test_singleton_hooks_wait_for_dispose_all() {
    let log: Log = Arc::default();
    let l = log.clone();

    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<Root, _>(move |ctx| {
        tracked(ctx, "root", &l);
        Ok(Root)
    });
    let injector = sc.build();
    let ctx = injector.create_context();

    // Built inside a scope, but owned by the injector.
    ctx.with_scope(|s| {
        s.get_required::<Root>();
    });
    assert!(log.lock().unwrap().is_empty());

    injector.dispose_all();
    assert_eq!(*log.lock().unwrap(), vec!["dispose root"]);

    injector.dispose_all();
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn test_per_request_outside_scope_goes_to_root() {
    let log: Log = Arc::default();
    let l = log.clone();

    let mut sc = ServiceCollection::new();
    sc.add_per_request_factory::<Second, _>(move |ctx| {
        tracked(ctx, "loose", &l);
        Ok(Second)
    });
    let injector = sc.build();

    injector.get_required::<Second>();
    injector.get_required::<Second>();
    assert!(log.lock().unwrap().is_empty());

    injector.dispose_all();
    assert_eq!(*log.lock().unwrap(), vec!["dispose loose", "dispose loose"]);
}

#[test]
fn test_hooks_can_resolve_during_close() {
    let log: Log = Arc::default();

    let mut sc = ServiceCollection::new();
    sc.add_singleton("shared".to_string());
    let injector = sc.build();
    let ctx = injector.create_context();

    {
        let scope = ctx.create_scope();
        let inj = injector.clone();
        let l = log.clone();
        scope.push_disposer(Box::new(move || {
            l.lock().unwrap().push(format!("closing with {}", inj.get_required::<String>()));
        }));
    }

    assert_eq!(*log.lock().unwrap(), vec!["closing with shared"]);
}
