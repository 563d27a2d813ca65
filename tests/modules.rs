use lifestyle_di::{
    DiError, DiResult, Lifetime, MetricsObserver, Params, Resolver, ServiceCollection, ServiceCollectionExt,
    ServiceModule,
};
use std::sync::Arc;

trait Logger: Send + Sync {
    fn target(&self) -> String;
}

struct ConsoleLogger;
impl Logger for ConsoleLogger {
    fn target(&self) -> String {
        "console".to_string()
    }
}

struct FileLogger {
    path: String,
}
impl Logger for FileLogger {
    fn target(&self) -> String {
        format!("file:{}", self.path)
    }
}

struct DebugModule;

impl ServiceModule for DebugModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.add_singleton_trait_factory::<dyn Logger, _>(|_| Ok(Arc::new(ConsoleLogger)));
        Ok(())
    }
}

struct ReleaseModule {
    log_path: &'static str,
}

impl ServiceModule for ReleaseModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.add_trait_constructor::<dyn Logger, _>(
            Lifetime::Singleton,
            Params::new().with("path", self.log_path),
            |p| Ok(Arc::new(FileLogger { path: p.require("path")? })),
        );
        Ok(())
    }
}

struct FailingModule;

impl ServiceModule for FailingModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.add_named_singleton("", 1u8)?;
        Ok(())
    }
}

#[test]
fn test_debug_and_release_modules() {
    let mut debug = ServiceCollection::new();
    debug.add_module(DebugModule).unwrap();
    assert_eq!(debug.build().get_required_trait::<dyn Logger>().target(), "console");

    let release = ServiceCollection::new()
        .with_module(DebugModule)
        .unwrap()
        .with_module(ReleaseModule { log_path: "app.log" })
        .unwrap()
        .build();
    assert_eq!(release.get_required_trait::<dyn Logger>().target(), "file:app.log");
}

#[test]
fn test_closure_module() {
    let mut sc = ServiceCollection::new();
    sc.add_module(|s: &mut ServiceCollection| -> DiResult<()> {
        s.add_singleton(3u16);
        Ok(())
    })
    .unwrap();
    assert_eq!(*sc.build().get_required::<u16>(), 3);
}

#[test]
fn test_module_errors_propagate() {
    let mut sc = ServiceCollection::new();
    assert!(matches!(sc.add_module(FailingModule), Err(DiError::InvalidKey(_))));
}

#[test]
fn test_observers_see_nested_resolutions() {
    struct Inner;
    struct Outer {
        _inner: Arc<Inner>,
    }

    let metrics = Arc::new(MetricsObserver::new());
    let mut sc = ServiceCollection::new();
    sc.add_observer(metrics.clone());
    sc.add_per_request_factory::<Inner, _>(|_| Ok(Inner));
    sc.add_per_request_factory::<Outer, _>(|ctx| Ok(Outer { _inner: ctx.get::<Inner>()? }));
    sc.add_scoped_factory::<u8, _>(|_| Ok(1));
    let injector = sc.build();

    injector.get_required::<Outer>();
    assert_eq!(metrics.resolution_count(), 2);

    assert!(injector.get::<u8>().is_err());
    assert_eq!(metrics.failure_count(), 1);

    // Unregistered keys fail before any observer hook.
    assert!(injector.get::<u64>().is_err());
    assert_eq!(metrics.failure_count(), 1);
}

#[test]
fn test_descriptors_follow_registration_order() {
    let mut sc = ServiceCollection::new();
    sc.add_module(DebugModule).unwrap();
    sc.add_named_constructor::<String, _>("motd", Lifetime::PerRequest, Params::new().with("text", "hi"), |p| {
        p.require("text")
    })
    .unwrap();
    sc.add_scoped_factory::<u8, _>(|_| Ok(1));

    let from_collection: Vec<_> = sc
        .get_service_descriptors()
        .into_iter()
        .map(|d| (d.type_name(), d.lifetime, d.has_params))
        .collect();
    let injector = sc.build();
    let from_injector: Vec<_> = injector
        .descriptors()
        .into_iter()
        .map(|d| (d.type_name(), d.lifetime, d.has_params))
        .collect();

    assert_eq!(from_collection, from_injector);
    assert_eq!(from_collection.len(), 3);
    assert!(from_collection[0].0.contains("Logger"));
    assert_eq!(from_collection[1], ("motd", Lifetime::PerRequest, true));
    assert_eq!(from_collection[2], ("u8", Lifetime::Scoped, false));
}
