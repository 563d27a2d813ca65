use lifestyle_di::{DiError, Key, Lifetime, Params, Provider, Resolver, ServiceCollection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_concrete_singleton() {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(42usize);
    sc.add_singleton("hello".to_string());

    let injector = sc.build();

    let num1 = injector.get_required::<usize>();
    let num2 = injector.get_required::<usize>();
    let str1 = injector.get_required::<String>();
    let str2 = injector.get_required::<String>();

    assert_eq!(*num1, 42);
    assert_eq!(*str1, "hello");
    assert!(Arc::ptr_eq(&num1, &num2));
    assert!(Arc::ptr_eq(&str1, &str2));
}

#[test]
fn test_factory_with_dependencies() {
    struct Config {
        port: u16,
    }

    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let mut sc = ServiceCollection::new();
    sc.add_singleton(Config { port: 8080 });
    sc.add_singleton_factory::<Server, _>(|ctx| {
        Ok(Server {
            config: ctx.get::<Config>()?,
            name: "MyServer".to_string(),
        })
    });

    let server = sc.build().get_required::<Server>();
    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
}

#[test]
fn test_per_request_creates_new_instances() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let mut sc = ServiceCollection::new();
    sc.add_per_request_factory::<String, _>(move |_| {
        let mut c = counter_clone.lock().unwrap();
        *c += 1;
        Ok(format!("instance-{}", *c))
    });

    let injector = sc.build();
    let instances: Vec<_> = (0..5).map(|_| injector.get_required::<String>()).collect();

    for (i, a) in instances.iter().enumerate() {
        for b in &instances[i + 1..] {
            assert!(!Arc::ptr_eq(a, b));
        }
    }
    assert_eq!(*instances[4], "instance-5");
    assert_eq!(*counter.lock().unwrap(), 5);
}

#[test]
fn test_singleton_shared_across_contexts_and_scopes() {
    struct Clock;

    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<Clock, _>(|_| Ok(Clock));
    let injector = sc.build();

    let root = injector.get_required::<Clock>();
    let ctx_a = injector.create_context();
    let ctx_b = injector.create_context();
    let scope_a = ctx_a.create_scope();
    let scope_b = ctx_b.create_scope();

    assert!(Arc::ptr_eq(&root, &scope_a.get_required::<Clock>()));
    assert!(Arc::ptr_eq(&root, &scope_b.get_required::<Clock>()));
}

#[test]
fn test_unregistered_key_is_not_found() {
    let built = Arc::new(AtomicUsize::new(0));
    let b = built.clone();

    struct Registered;
    struct Missing;

    let mut sc = ServiceCollection::new();
    sc.add_per_request_factory::<Registered, _>(move |_| {
        b.fetch_add(1, Ordering::SeqCst);
        Ok(Registered)
    });
    let injector = sc.build();

    match injector.get::<Missing>() {
        Err(DiError::NotFound(name)) => assert!(name.ends_with("Missing")),
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
    assert!(matches!(
        injector.get_named::<u32>("nothing"),
        Err(DiError::NotFound("nothing"))
    ));
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn test_reregistration_overwrites() {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(1u32);
    sc.add_per_request_factory::<u32, _>(|_| Ok(2));

    assert_eq!(sc.len(), 1);
    let reg = sc.lookup(&lifestyle_di::key_of_type::<u32>()).unwrap();
    assert_eq!(reg.lifetime(), Lifetime::PerRequest);

    let injector = sc.build();
    assert_eq!(*injector.get_required::<u32>(), 2);
}

#[test]
fn test_symbol_keys_distinguish_same_type() {
    let mut sc = ServiceCollection::new();
    sc.add_named_singleton("primary_url", "postgres://primary".to_string())
        .unwrap()
        .add_named_singleton("replica_url", "postgres://replica".to_string())
        .unwrap();

    let injector = sc.build();
    assert_eq!(*injector.get_named_required::<String>("primary_url"), "postgres://primary");
    assert_eq!(*injector.get_named_required::<String>("replica_url"), "postgres://replica");
    assert!(injector.get::<String>().is_err());
}

#[test]
fn test_type_mismatch_on_wrong_downcast() {
    let mut sc = ServiceCollection::new();
    sc.add_named_singleton("port", 8080u16).unwrap();
    let injector = sc.build();

    assert!(matches!(
        injector.get_named::<u32>("port"),
        Err(DiError::TypeMismatch(_))
    ));
}

#[test]
fn test_register_with_explicit_provider() {
    struct Greeter {
        greeting: String,
    }

    let mut sc = ServiceCollection::new();
    sc.register(
        Key::symbol("greeter"),
        Provider::constructor(|p: &Params| Ok(Greeter { greeting: p.require("greeting")? })),
        Lifetime::Singleton,
        Some(Params::new().with("greeting", "hello")),
    )
    .unwrap();

    let injector = sc.build();
    let a = injector.get_named_required::<Greeter>("greeter");
    let b = injector.get_named_required::<Greeter>("greeter");
    assert_eq!(a.greeting, "hello");
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_trait_registration() {
    trait Shape: Send + Sync {
        fn area(&self) -> f64;
    }

    struct Square(f64);
    impl Shape for Square {
        fn area(&self) -> f64 {
            self.0 * self.0
        }
    }

    let mut sc = ServiceCollection::new();
    sc.add_per_request_trait_factory::<dyn Shape, _>(|_| Ok(Arc::new(Square(3.0))));
    let injector = sc.build();

    let a = injector.get_required_trait::<dyn Shape>();
    let b = injector.get_required_trait::<dyn Shape>();
    assert_eq!(a.area(), 9.0);
    assert!(!Arc::ptr_eq(&a, &b));
}
