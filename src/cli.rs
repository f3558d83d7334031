use colored::Colorize;
use envbind::{DefaultSource, EnvRecord, Loader, MapEnv, ParseError, ParserMap, docs};

#[derive(Debug, Default, Clone, PartialEq, EnvRecord)]
struct SimpleConfig {
    app_max_workers: i32,
    app_logging_type: Option<String>,
}

#[derive(Debug, Default, DefaultSource)]
struct SimpleDefaults {
    app_max_workers: i32,
    app_logging_type: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug, Default, EnvRecord)]
struct CenterConfig {
    app_center: Point,
}

#[derive(Debug, Default, EnvRecord)]
struct BrokenConfig {
    app_center: Point,
    app_max_workers: i32,
    app_db_url: String,
}

fn main() {
    match std::env::args().nth(1) {
        Some(arg) => match arg.as_str() {
            "simple" => simple_parsing(),
            "defaults" => using_defaults(),
            "custom" => custom_parsers(),
            "error" => error_report(),
            "docs" => generate_docs(),
            _ => println!(
                "unknown arg: {}. Available: simple, defaults, custom, error, docs",
                arg
            ),
        },
        None => {
            println!("Usage: envbind-demo [command]");
            println!("Commands:");
            println!("  simple   - Bind a record with an unset optional field");
            println!("  defaults - Fill unset fields from a default record");
            println!("  custom   - Bind a field with a custom parser");
            println!("  error    - Show every error from a broken environment");
            println!("  docs     - Generate CONFIG.md documentation");
        }
    };
}

fn point_parsers() -> ParserMap {
    ParserMap::new().with("Point", |raw: &str| {
        let (x, y) = raw.split_once(';').ok_or("expected 'x;y'")?;
        Ok::<_, ParseError>(Point {
            x: x.trim().parse()?,
            y: y.trim().parse()?,
        })
    })
}

fn simple_parsing() {
    let env = MapEnv::new().with_var("APP_MAX_WORKERS", "10");

    match Loader::<SimpleConfig>::new().bind_with(&env, None).into_result() {
        Ok(config) => {
            println!("Config loaded successfully!");
            println!("  app_max_workers: {}", config.app_max_workers);
            println!("  app_logging_type: {:?}", config.app_logging_type);
        }
        Err(errors) => eprintln!("{}", errors.report()),
    }
}

fn using_defaults() {
    let defaults = SimpleDefaults {
        app_max_workers: 8,
        app_logging_type: None,
    };

    match Loader::<SimpleConfig>::new()
        .bind_with(&MapEnv::new(), Some(&defaults))
        .into_result()
    {
        Ok(config) => {
            println!("Config loaded from defaults!");
            println!("  app_max_workers: {}", config.app_max_workers);
            println!("  app_logging_type: {:?}", config.app_logging_type);
        }
        Err(errors) => eprintln!("{}", errors.report()),
    }
}

fn custom_parsers() {
    let env = MapEnv::new().with_var("APP_CENTER", "12;5");

    match Loader::<CenterConfig>::with_parsers([point_parsers()])
        .bind_with(&env, None)
        .into_result()
    {
        Ok(config) => println!(
            "  app_center: x={} y={}",
            config.app_center.x, config.app_center.y
        ),
        Err(errors) => eprintln!("{}", errors.report()),
    }
}

fn error_report() {
    // No Point parser registered, a bad integer, and a missing string
    let env = MapEnv::new()
        .with_var("APP_CENTER", "12;6")
        .with_var("APP_MAX_WORKERS", "more than ever");

    let (partial, errors) = Loader::<BrokenConfig>::new()
        .bind_with(&env, None)
        .into_parts();
    match errors {
        Some(errors) => {
            println!("{}", errors);
            println!();
            println!("{}", errors.report());
            println!();
            println!(
                "Partial record: app_center={:?} app_max_workers={} app_db_url={:?}",
                partial.app_center, partial.app_max_workers, partial.app_db_url
            );
        }
        None => println!("you should not see this"),
    }
}

fn generate_docs() {
    println!("Generating documentation for SimpleConfig...");
    match docs::write_docs::<SimpleConfig>("CONFIG.md") {
        Ok(_) => println!("{} Documentation written to CONFIG.md", "✓".green()),
        Err(e) => eprintln!("{} Failed to write documentation: {}", "✗".red(), e),
    }
}
