use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct LocateArgs {
    pub screenshot: PathBuf,
    pub template: PathBuf,
    pub all_matches: bool,
    pub multiscale: bool,
    pub threshold: Option<f32>,
    /// Named region or `x,y,w,h`
    pub restrict: Option<String>,
    pub use_optimized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Locate(LocateArgs),
    Optimize { visualize: Option<PathBuf> },
    Limit { max: usize },
}

#[derive(Debug, PartialEq)]
pub struct Args {
    pub command: Command,
    pub config_path: Option<PathBuf>,
    pub debug_mode: bool,
}

impl Args {
    /// `Ok(None)` after help or version output, `Err` on invalid arguments
    pub fn parse() -> Result<Option<Self>, String> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_args(&args).inspect_err(|message| {
            eprintln!("❌ {message}");
            print_help();
        })
    }

    /// `Ok(None)` when help or version was printed instead
    fn from_args(args: &[String]) -> Result<Option<Self>, String> {
        let mut command: Option<&str> = None;
        let mut config_path: Option<PathBuf> = None;
        let mut debug_mode = false;

        let mut screenshot: Option<PathBuf> = None;
        let mut template: Option<PathBuf> = None;
        let mut all_matches = false;
        let mut multiscale = false;
        let mut threshold: Option<f32> = None;
        let mut restrict: Option<String> = None;
        let mut use_optimized = false;
        let mut visualize: Option<PathBuf> = None;
        let mut max: Option<usize> = None;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return Ok(None);
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "Marker Locator v{} (built {})",
                    env!("LOCATOR_VERSION_DISPLAY"),
                    env!("LOCATOR_BUILD_YEAR")
                );
                return Ok(None);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--all" {
                all_matches = true;
            } else if arg == "--multiscale" {
                multiscale = true;
            } else if arg == "--use-optimized" {
                use_optimized = true;
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--screenshot=") {
                screenshot = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--template=") {
                template = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--restrict=") {
                restrict = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--visualize=") {
                visualize = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--threshold=") {
                match val.parse::<f32>() {
                    Ok(t) if (0.0..=1.0).contains(&t) => threshold = Some(t),
                    _ => return Err(format!("Invalid threshold value: {val}")),
                }
            } else if let Some(val) = arg.strip_prefix("--max=") {
                match val.parse::<usize>() {
                    Ok(n) => max = Some(n),
                    Err(_) => return Err(format!("Invalid max value: {val}")),
                }
            } else if command.is_none() && !arg.starts_with('-') {
                command = Some(arg.as_str());
            } else {
                return Err(format!("Unknown argument: {arg}"));
            }
        }

        let command = match command {
            Some("locate") => Command::Locate(LocateArgs {
                screenshot: screenshot.ok_or("locate needs --screenshot=<png>")?,
                template: template.ok_or("locate needs --template=<png>")?,
                all_matches,
                multiscale,
                threshold,
                restrict,
                use_optimized,
            }),
            Some("optimize") => Command::Optimize { visualize },
            Some("limit") => Command::Limit {
                max: max.ok_or("limit needs --max=N")?,
            },
            Some(other) => return Err(format!("Unknown command: {other}")),
            None => return Err("No command given".to_string()),
        };

        Ok(Some(Args {
            command,
            config_path,
            debug_mode,
        }))
    }
}

fn print_help() {
    println!("🎯 Marker Locator");
    println!();
    println!("USAGE:");
    println!("    marker-locator <COMMAND> [FLAGS]");
    println!();
    println!("COMMANDS:");
    println!("    locate              Find a template in a screenshot and log its coordinates");
    println!("    optimize            Derive a search region from the coordinate log");
    println!("    limit               Trim the coordinate log to its most recent entries");
    println!();
    println!("LOCATE FLAGS:");
    println!("    --screenshot=PNG    Screenshot to search");
    println!("    --template=PNG      Template image to find");
    println!("    --all               Find every instance (color), log the box covering them");
    println!("    --multiscale        Search a range of template scales");
    println!("    --threshold=N       Confidence threshold (0.0 to 1.0)");
    println!("    --restrict=REGION   Named region or x,y,w,h to search in");
    println!("    --use-optimized     Restrict to the stored optimized region");
    println!();
    println!("OTHER FLAGS:");
    println!("    --visualize=PNG     (optimize) Draw logged boxes and the region");
    println!("    --max=N             (limit) Entries to keep");
    println!("    --config=JSON       Load settings from a config file");
    println!("    --debug             Enable debug output");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    marker-locator locate --screenshot=screen.png --template=EasyApply.png");
    println!("    marker-locator locate --screenshot=screen.png --template=Row.png --all --restrict=right_half");
    println!("    marker-locator optimize --visualize=logs/overview.png");
    println!("    marker-locator limit --max=20");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, String> {
        let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Args::from_args(&owned)
    }

    #[test]
    fn test_locate_flags() {
        let args = parse(&[
            "locate",
            "--screenshot=s.png",
            "--template=t.png",
            "--all",
            "--threshold=0.8",
            "--restrict=right_half",
            "--debug",
        ])
        .unwrap()
        .unwrap();

        assert!(args.debug_mode);
        let Command::Locate(locate) = args.command else {
            panic!("expected locate");
        };
        assert_eq!(locate.screenshot, PathBuf::from("s.png"));
        assert!(locate.all_matches && !locate.multiscale);
        assert_eq!(locate.threshold, Some(0.8));
        assert_eq!(locate.restrict.as_deref(), Some("right_half"));
    }

    #[test]
    fn test_other_commands() {
        let args = parse(&["limit", "--max=5", "--config=c.json"]).unwrap().unwrap();
        assert_eq!(args.command, Command::Limit { max: 5 });
        assert_eq!(args.config_path, Some(PathBuf::from("c.json")));

        let args = parse(&["optimize"]).unwrap().unwrap();
        assert_eq!(args.command, Command::Optimize { visualize: None });
    }

    #[test]
    fn test_help_is_not_an_error() {
        assert_eq!(parse(&["--help"]), Ok(None));
        assert_eq!(parse(&["locate", "-h"]), Ok(None));
        assert!(parse(&["--bogus"]).is_err());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["locate", "--template=t.png"]).is_err());
        assert!(parse(&["limit"]).is_err());
        assert!(parse(&["optimize", "--threshold=1.5"]).is_err());
        assert!(parse(&["scan"]).is_err());
        assert!(parse(&["optimize", "extra"]).is_err());
    }
}
