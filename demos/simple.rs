use std::{sync::Arc, time::SystemTime};

use hanami_context::*;

// Define regular traits and implementor structs

trait Logger: Send + Sync {
    fn log(&self, content: &str);
}

trait DateLogger: Send + Sync {
    fn log_date(&self);
}

struct LoggerImpl;

impl Logger for LoggerImpl {
    fn log(&self, content: &str) {
        println!("{}", content);
    }
}

struct DateLoggerImpl {
    logger: Arc<dyn Logger>,
}

impl DateLogger for DateLoggerImpl {
    fn log_date(&self) {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        self.logger.log(&format!("{}s since epoch", now.as_secs()));
    }
}

// Property-injected variant, selected when auto-injection is enabled
#[derive(Default)]
struct LazyDateLogger {
    logger: Option<Arc<dyn Logger>>,
}

impl InjectProperties for LazyDateLogger {
    fn inject_properties(&mut self, container: &Container) -> Result<(), WiringError> {
        self.logger = Some(container.resolve()?);
        Ok(())
    }
}

impl DateLogger for LazyDateLogger {
    fn log_date(&self) {
        if let Some(logger) = &self.logger {
            logger.log("date logger activated through its properties");
        }
    }
}

// Each part of the application declares its own module

#[derive(Default)]
struct LogModule;

impl Module for LogModule {
    fn load(&self, binder: &mut Binder<'_>) -> Result<(), WiringError> {
        let logger: Arc<dyn Logger> = Arc::new(LoggerImpl);
        binder.add_binding(Binding::bind::<dyn Logger>().to_constant(logger).build());
        Ok(())
    }
}

#[derive(Default)]
struct DateModule;

impl Module for DateModule {
    fn load(&self, binder: &mut Binder<'_>) -> Result<(), WiringError> {
        binder.add_binding(
            Binding::bind::<dyn DateLogger>()
                .to_constructor(|c| {
                    let date_logger: Arc<dyn DateLogger> = Arc::new(DateLoggerImpl {
                        logger: c.resolve()?,
                    });
                    Ok(date_logger)
                })
                .to_properties(|l: LazyDateLogger| -> Arc<dyn DateLogger> { Arc::new(l) })
                .in_singleton_scope()
                .build(),
        );
        Ok(())
    }
}

fn register_logging() {
    BootstrapCoordinator::global().add_module::<LogModule>();
}

fn register_dates() {
    BootstrapCoordinator::global()
        .add_module::<LogModule>()
        .add_module::<DateModule>()
        .use_action(|container| {
            if let Ok(date_logger) = container.resolve::<dyn DateLogger>() {
                date_logger.log_date();
            }
        });
}

fn main() -> Result<(), BootstrapError> {
    register_logging();
    register_dates();

    let context = BootstrapCoordinator::global();
    if std::env::args().any(|arg| arg == "--auto-inject") {
        context.with_auto_injection();
    }

    // Every entry point can ensure the container exists
    context.initialize()?;
    context.initialize()?;

    for service in context.inject_types() {
        println!("bound: {}", service);
    }
    Ok(())
}
