use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Arg, ArgMatches, Command};
use log::{error, info};

mod actions;
mod app;
mod background;
mod boot;
mod config;
mod icons;
mod links;
mod page;
mod profile;
mod render;
mod seo;
mod settings;
mod store;
mod svg_sanitizer;
mod theme;
mod variant;


use actions::{Platform, ShareData};
use app::{Action, App};
use settings::Settings;
use store::{FileStore, PreferenceStore};
use theme::ColorScheme;
use variant::{IconSource, IconStrategy};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        eprintln!("linkpage: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let matches = build_cli().get_matches();
    let settings = settings_from(&matches)?;
    let variant = settings.variant()?;

    let config = config::load(&settings.source(variant), variant.schema);
    let icon_source = settings.icon_source(config.site.icon_source);

    boot::run(&settings, variant, icon_source)?;

    let fetcher = if variant.icons == IconStrategy::RemoteSvg {
        Some(icons::fetcher_for(icon_source, &settings.icon_dir())?)
    } else {
        None
    };

    let store: Arc<dyn PreferenceStore> = Arc::new(FileStore::open(&settings.prefs()));
    let mut app = App::boot(
        variant,
        config,
        store,
        fetcher.as_deref(),
        settings.page_url(),
        settings.color_scheme(),
    );

    if let Some(action) = action_from(&matches) {
        app.dispatch(action, &mut CliPlatform)?;
        for (_, message) in app.settle_feedback() {
            eprintln!("{}", message);
        }
    }

    let out = settings.output();
    fs::write(&out, app.render()).map_err(|e| format!("{}: {}", out.display(), e))?;
    info!("Wrote {}", out.display());
    println!("✓ {} ({} preset, theme {})", out.display(), variant.name, app.theme);
    Ok(())
}

fn build_cli() -> Command {
    Command::new("linkpage")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render a link-in-bio page from a JSON profile")
        .arg(global("settings", "FILE", "Pipeline settings file (defaults to linkpage.toml)"))
        .arg(global("variant", "NAME", "Page preset: classic, tiles or panel"))
        .arg(global("config", "URL|FILE", "Profile document location (defaults to the preset's path)"))
        .arg(global("page-url", "URL", "Public URL of the page"))
        .arg(global("prefs", "FILE", "Visitor preference file"))
        .arg(global("out", "FILE", "Where to write the rendered HTML"))
        .arg(global("color-scheme", "light|dark", "OS color-scheme preference to emulate"))
        .arg(global("icon-source", "cdn|local", "Where remote SVG icons come from"))
        .arg(global("icon-dir", "DIR", "Directory holding <name>.svg icons"))
        .subcommand(Command::new("render").about("Render the page without any action (default)"))
        .subcommand(
            Command::new("theme")
                .about("Cycle to the next theme, or pick one by name")
                .arg(Arg::new("name").value_name("NAME").help("Theme to apply")),
        )
        .subcommand(
            Command::new("background")
                .about("Change the page background")
                .subcommand_required(true)
                .subcommand(
                    Command::new("url")
                        .about("Use an image URL (prompts when omitted)")
                        .arg(Arg::new("url").value_name("URL")),
                )
                .subcommand(
                    Command::new("upload")
                        .about("Use a local image file")
                        .arg(Arg::new("file").value_name("FILE").required(true)),
                )
                .subcommand(Command::new("reset").about("Remove the custom background")),
        )
        .subcommand(Command::new("share").about("Share the page link"))
        .subcommand(Command::new("copy").about("Copy the page link"))
        .subcommand(
            Command::new("settings")
                .about("Open or close the settings panel")
                .arg(
                    Arg::new("close")
                        .long("close")
                        .action(clap::ArgAction::SetTrue)
                        .help("Close instead of toggling"),
                ),
        )
}

fn global(name: &'static str, value: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name(value)
        .help(help)
        .global(true)
}

fn settings_from(matches: &ArgMatches) -> Result<Settings, String> {
    let path = matches
        .get_one::<String>("settings")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(settings::DEFAULT_PATH));
    let mut s = settings::load(&path)?;

    let flag = |name: &str| matches.get_one::<String>(name).cloned();

    if let Some(v) = flag("variant") {
        s.variant = Some(v);
    }
    if let Some(v) = flag("config") {
        s.config = Some(v);
    }
    if let Some(v) = flag("page-url") {
        s.page_url = Some(v);
    }
    if let Some(v) = flag("prefs") {
        s.prefs = Some(PathBuf::from(v));
    }
    if let Some(v) = flag("out") {
        s.output = Some(PathBuf::from(v));
    }
    if let Some(v) = flag("icon-dir") {
        s.icon_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = flag("color-scheme") {
        s.color_scheme =
            Some(ColorScheme::parse(&v).ok_or_else(|| format!("invalid color scheme {:?}", v))?);
    }
    if let Some(v) = flag("icon-source") {
        s.icon_source =
            Some(IconSource::parse(&v).ok_or_else(|| format!("invalid icon source {:?}", v))?);
    }
    Ok(s)
}

fn action_from(matches: &ArgMatches) -> Option<Action> {
    match matches.subcommand() {
        Some(("theme", m)) => Some(match m.get_one::<String>("name") {
            Some(name) => Action::PickTheme(name.clone()),
            None => Action::CycleTheme,
        }),
        Some(("background", m)) => match m.subcommand() {
            Some(("url", m)) => Some(Action::BackgroundLink(m.get_one::<String>("url").cloned())),
            Some(("upload", m)) => m
                .get_one::<String>("file")
                .map(|f| Action::UploadBackground(PathBuf::from(f))),
            Some(("reset", _)) => Some(Action::ResetBackground),
            _ => None,
        },
        Some(("share", _)) => Some(Action::Share),
        Some(("copy", _)) => Some(Action::Copy),
        Some(("settings", m)) => Some(if m.get_flag("close") {
            Action::CloseSettings
        } else {
            Action::ToggleSettings
        }),
        _ => None,
    }
}

/// Terminal stand-in for the browser: no share sheet, the "clipboard" is
/// stdout, dialogs go through stderr/stdin.
struct CliPlatform;

impl Platform for CliPlatform {
    fn can_share(&self) -> bool {
        false
    }

    fn share(&mut self, _data: &ShareData) -> Result<(), String> {
        Err("sharing is not available in a terminal".to_string())
    }

    fn clipboard_write(&mut self, text: &str) -> Result<(), String> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", text).map_err(|e| e.to_string())
    }

    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        eprint!("{} ", message);
        if !default.is_empty() {
            eprint!("[{}] ", default);
        }
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}
