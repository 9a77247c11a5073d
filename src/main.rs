mod args;

use args::{Args, Command, LocateArgs};
use marker_locator::coordinates::save_overview;
use marker_locator::locator::{ImageFileCapture, resolve_region};
use marker_locator::{
    CoordinateLog, LocateRequest, Locator, LocatorConfig, LocatorResult, MatchMode, RegionStore,
};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = match Args::parse() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(_) => return ExitCode::from(2),
    };

    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match &args.config_path {
        Some(path) => match LocatorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ {e}");
                return ExitCode::FAILURE;
            }
        },
        None => LocatorConfig::default(),
    };

    let result = match args.command {
        Command::Locate(locate) => run_locate(config, &locate),
        Command::Optimize { visualize } => run_optimize(&config, visualize.as_deref()),
        Command::Limit { max } => run_limit(&config, max),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::from(2)
        }
    }
}

fn run_locate(config: LocatorConfig, args: &LocateArgs) -> LocatorResult<bool> {
    let history = CoordinateLog::new(&config.coordinate_log_path);

    let restriction = if args.use_optimized {
        let stored = RegionStore::new(&config.region_path).load()?;
        if stored.is_none() {
            println!("⚠️ No optimized region stored yet, searching the full screenshot");
        }
        stored
    } else {
        match &args.restrict {
            Some(text) => match resolve_region(text, config.screen_width, config.screen_height) {
                Some(region) => Some(region),
                None => {
                    eprintln!("❌ Unknown region '{text}'");
                    return Ok(false);
                }
            },
            None => None,
        }
    };

    let mut request = LocateRequest::new(
        &args.template,
        MatchMode::from_flags(args.all_matches, args.multiscale),
    )
    .restricted_to(restriction);
    if let Some(threshold) = args.threshold {
        request = request.with_threshold(threshold);
    }

    let locator = Locator::new(&history, config);
    let mut source = ImageFileCapture::new(&args.screenshot);
    let Some(outcome) = locator.capture_and_locate(&mut source, None, &request) else {
        println!("❌ Template not found");
        return Ok(false);
    };

    for found in &outcome.matches {
        println!("✅ {found}");
    }
    if let Some(target) = outcome.target() {
        println!("🎯 Target {target}");
    }
    println!(
        "📝 Logged {} to {}",
        outcome.logged,
        locator.history_path().display()
    );
    Ok(true)
}

fn run_optimize(config: &LocatorConfig, visualize: Option<&Path>) -> LocatorResult<bool> {
    let history = CoordinateLog::new(&config.coordinate_log_path);
    let entries = history.read_all()?;
    let Some(optimized) = config.optimizer().optimize(&entries) else {
        println!("⚠️ {} has no entries", history.path().display());
        return Ok(false);
    };

    let axes = [
        ("x1", optimized.axes.x1),
        ("y1", optimized.axes.y1),
        ("x2", optimized.axes.x2),
        ("y2", optimized.axes.y2),
    ];
    for (name, stats) in axes {
        println!(
            "📊 {name}: mean {:.2}, variance {:.2}, kept {}/{}",
            stats.mean, stats.variance, stats.retained, stats.total
        );
    }
    println!("📐 Optimized region {}", optimized.region);

    RegionStore::new(&config.region_path).save(&optimized)?;

    if let Some(path) = visualize {
        save_overview(
            path,
            &entries,
            Some(&optimized),
            config.screen_width,
            config.screen_height,
        )?;
        println!("🖼️ Overview saved to {}", path.display());
    }
    Ok(true)
}

fn run_limit(config: &LocatorConfig, max: usize) -> LocatorResult<bool> {
    let history = CoordinateLog::new(&config.coordinate_log_path);
    let dropped = history.limit(max)?;
    println!(
        "✂️ Dropped {dropped} entries from {}, keeping at most {max}",
        history.path().display()
    );
    Ok(true)
}
