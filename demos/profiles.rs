//! Debug and release wiring of the same services.
//!
//! Run with `cargo run --example profiles -- --profile release` and set
//! `RUST_LOG=lifestyle_di=debug` to see resolutions and scope changes.
//!
//! A profile document (`--profile-file`, JSON) or environment variables such
//! as `APP__Logger__path=other.log` override the built-in wiring.

use clap::{Parser, ValueEnum};
use lifestyle_di::{
    DiResult, Dispose, InjectionContext, Lifetime, Params, Profile, Resolver, ServiceCollection,
    ServiceCollectionExt, ServiceModule, TracingObserver,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Wiring {
    Debug,
    Release,
}

#[derive(Parser, Debug)]
#[command(name = "profiles")]
#[command(about = "Shows per-request, scoped and singleton lifetimes under two wirings")]
struct Args {
    /// Built-in wiring to start from
    #[arg(long, value_enum, default_value_t = Wiring::Debug)]
    profile: Wiring,

    /// JSON profile applied on top of the wiring
    #[arg(long)]
    profile_file: Option<std::path::PathBuf>,

    /// Prefix of environment overrides (PREFIX__SERVICE__PARAM=value)
    #[arg(long, default_value = "APP")]
    env_prefix: String,

    /// Number of scopes (requests) to simulate
    #[arg(long, default_value_t = 2)]
    requests: usize,
}

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
    fn describe(&self) -> String;
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[console] {}", msg);
    }

    fn describe(&self) -> String {
        "console".to_string()
    }
}

struct FileLogger {
    path: String,
}

impl Logger for FileLogger {
    fn log(&self, msg: &str) {
        println!("[file {}] {}", self.path, msg);
    }

    fn describe(&self) -> String {
        format!("file {}", self.path)
    }
}

trait Fetcher: Send + Sync {
    fn fetch(&self) -> String;
    fn id(&self) -> usize;
}

struct MemoryFetcher {
    id: usize,
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self) -> String {
        format!("payload from fetcher #{}", self.id)
    }

    fn id(&self) -> usize {
        self.id
    }
}

impl Dispose for MemoryFetcher {
    fn dispose(&self) {
        println!("  fetcher #{} released", self.id);
    }
}

struct Service {
    logger: Arc<dyn Logger>,
    fetcher: Arc<dyn Fetcher>,
}

impl Service {
    fn run(&self) {
        self.logger.log(&self.fetcher.fetch());
    }
}

/// Fetcher and service wiring shared by both profiles.
struct CoreModule;

impl ServiceModule for CoreModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        let counter = Arc::new(AtomicUsize::new(1));
        services.add_scoped_trait_factory::<dyn Fetcher, _>(move |ctx: &InjectionContext| {
            let fetcher = Arc::new(MemoryFetcher {
                id: counter.fetch_add(1, Ordering::SeqCst),
            });
            ctx.register_disposer(fetcher.clone());
            Ok(fetcher as Arc<dyn Fetcher>)
        });
        services.add_per_request_factory::<Service, _>(|ctx| {
            Ok(Service {
                logger: ctx.get_trait::<dyn Logger>()?,
                fetcher: ctx.get_trait::<dyn Fetcher>()?,
            })
        });
        Ok(())
    }
}

struct DebugModule;

impl ServiceModule for DebugModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.add_singleton_trait_factory::<dyn Logger, _>(|_| Ok(Arc::new(ConsoleLogger)));
        Ok(())
    }
}

struct ReleaseModule;

impl ServiceModule for ReleaseModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.add_trait_constructor::<dyn Logger, _>(
            Lifetime::Singleton,
            Params::new().with("path", "app.log"),
            |p| Ok(Arc::new(FileLogger { path: p.require("path")? })),
        );
        Ok(())
    }
}

fn wire(args: &Args) -> Result<ServiceCollection, Box<dyn std::error::Error>> {
    let mut services = ServiceCollection::new().with_module(CoreModule)?;
    match args.profile {
        Wiring::Debug => services.add_module(DebugModule)?,
        Wiring::Release => services.add_module(ReleaseModule)?,
    };

    if let Some(path) = &args.profile_file {
        let profile = Profile::from_json_str(&std::fs::read_to_string(path)?)?;
        services.apply_profile(&profile)?;
    }

    let from_env = Profile::from_env(&args.env_prefix)?;
    if !from_env.is_empty() {
        services.apply_profile(&from_env)?;
    }

    services.add_observer(Arc::new(TracingObserver::with_label(format!("{:?}", args.profile))));
    Ok(services)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let services = wire(&args)?;

    println!("registered services:");
    for descriptor in services.get_service_descriptors() {
        println!("  {:<40} {}", descriptor.type_name(), descriptor.lifetime);
    }

    let injector = services.build();
    let ctx = injector.create_context();

    if let Err(err) = ctx.get::<Service>() {
        println!("outside a scope: {}", err);
    }

    let mut first_logger: Option<Arc<dyn Logger>> = None;
    for request in 1..=args.requests {
        println!("request {}:", request);
        let scope = ctx.create_scope();
        let a = scope.get::<Service>()?;
        let b = scope.get::<Service>()?;
        a.run();
        b.run();

        println!("  services distinct:      {}", !Arc::ptr_eq(&a, &b));
        println!("  fetcher shared in scope: {}", a.fetcher.id() == b.fetcher.id());
        let logger = first_logger.get_or_insert_with(|| a.logger.clone());
        println!(
            "  logger ({}) shared across requests: {}",
            a.logger.describe(),
            Arc::ptr_eq(logger, &a.logger)
        );
    }

    injector.dispose_all();
    Ok(())
}
