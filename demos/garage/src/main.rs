use fabrik::{component, import, Import, Injector};
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

mod parts {
    use super::*;

    // Settings that are known before injection, registered as an instance
    pub struct Settings {
        pub wheels: usize,
    }

    pub struct Engine {
        pub horsepower: u16,
    }

    #[component]
    impl Engine {
        // Built before everything with a greater priority
        #[factory(priority = 1)]
        fn new() -> Self {
            Self { horsepower: 150 }
        }
    }

    pub struct Wheel {
        pub inches: u8,
    }

    pub struct Seat;

    #[allow(dead_code)]
    struct Interior;

    // Each factory provides its own dependency
    #[component(configuration)]
    impl Interior {
        #[factory(priority = 5)]
        fn wheel() -> Wheel {
            Wheel { inches: 17 }
        }

        #[factory]
        fn seat() -> anyhow::Result<Seat> {
            Ok(Seat)
        }
    }

    pub struct Paint(pub &'static str);

    // Built with its only constructor
    #[component(factory, priority = 20)]
    impl Paint {
        fn new() -> Self {
            Self("red")
        }
    }
}

mod car {
    use super::*;
    use parts::{Engine, Paint, Seat, Settings, Wheel};

    #[import]
    pub static SETTINGS: Import<Settings> = Import::new();
    #[import]
    pub static ENGINE: Import<Engine> = Import::new();
    #[import]
    pub static WHEEL: Import<Wheel> = Import::new();
    #[import]
    pub static SEAT: Import<Seat> = Import::new();
    #[import]
    pub static PAINT: Import<Paint> = Import::new();

    pub fn describe() -> Option<String> {
        let settings = SETTINGS.get()?;
        let engine = ENGINE.get()?;
        let wheel = WHEEL.get()?;
        let paint = PAINT.get()?;
        SEAT.get()?;

        Some(format!(
            "{} car with {} hp and {} wheels of {} inches",
            paint.0, engine.horsepower, settings.wheels, wheel.inches
        ))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut injector = Injector::new();
    injector.set_diagnostics_enabled(true).register_prepared(parts::Settings { wheels: 4 });

    let report = injector.inject("garage")?;
    tracing::info!(built = report.built.len(), assigned = report.assigned, "Garage is ready");

    if let Some(description) = car::describe() {
        tracing::info!("{description}");
    }

    // Second pass builds everything again and overwrites the imports
    let report = injector.inject("garage")?;
    tracing::info!(built = report.built.len(), "Rebuilt");

    Ok(())
}
