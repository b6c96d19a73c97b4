use std::io::Write;

use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::{error, info, warn, LevelFilter};
use serde::Serialize;

use m3u_curator::m3u_curator_error::M3uCuratorError;
use m3u_curator::model::{Channel, Config};
use m3u_curator::processing::session::CurationSession;
use m3u_curator::repository::m3u_repository::{FilePlaylistSink, SaveIntent};
use m3u_curator::repository::source_repository::FileTextSource;
use m3u_curator::utils::{config_reader, file_utils, sanitize_sensitive_info, set_sanitize_sensitive_info};

macro_rules! exit {
    ($($arg:tt)*) => {{
        error!($($arg)*);
        std::process::exit(1);
    }};
}

const LOG_ENV: &str = "M3U_CURATOR_LOG";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser)]
#[command(name = "m3u-curator")]
#[command(version)]
#[command(about = "Curate a filtered IPTV playlist from an unfiltered one", long_about = None)]
struct Args {
    /// The config file
    #[arg(short = 'c', long = "config", global = true)]
    config_file: Option<String>,

    /// log level, overrides env and config (error, warn, info, debug, trace or env_logger directives)
    #[arg(short = 'l', long = "log-level", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List channels, all groups when no group is given
    List {
        #[arg(short = 'g', long = "group")]
        groups: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// List the distinct group titles
    Groups,
    /// Show the programmes attached to a channel
    Guide {
        name: String,
    },
    /// Add channels to the selection and save
    Select {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Remove channels from the selection and save
    Deselect {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Flip the selection of channels and save
    Toggle {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Select all channels of the groups, or deselect them when all are selected, and save
    ToggleGroups {
        #[arg(short = 'g', long = "group")]
        groups: Vec<String>,
    },
    /// Save the current selection again
    Save {
        #[arg(long)]
        advanced: bool,
    },
}

#[derive(Serialize)]
struct ChannelRow<'a> {
    name: &'a str,
    group: &'a str,
    url: &'a str,
    selected: bool,
    stable_id: bool,
    programs: usize,
}

fn main() {
    let args = Args::parse();
    let config_file: String = args.config_file.clone().unwrap_or_else(file_utils::get_default_config_file_path);
    let cfg = match config_reader::read_config(&config_file) {
        Ok(cfg) => cfg,
        Err(err) => {
            init_logger(args.log_level.as_deref(), None);
            exit!("{}", err);
        }
    };
    init_logger(args.log_level.as_deref(), cfg.log.log_level.as_deref());
    set_sanitize_sensitive_info(cfg.log.sanitize_sensitive_info);

    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    if let Some(bts) = option_env!("VERGEN_BUILD_TIMESTAMP") {
        info!("Build time: {bts}");
    }
    info!("Config file: {config_file}");
    info!("Working dir: {}", cfg.working_dir);

    if let Err(err) = run(&cfg, args.command) {
        if err.is_fatal() {
            exit!("Cant build the channel catalog: {}", err);
        }
        exit!("{}", err);
    }
}

fn init_logger(cli_level: Option<&str>, config_level: Option<&str>) {
    let env_level = std::env::var(LOG_ENV).ok();
    let level = cli_level
        .or(env_level.as_deref())
        .or(config_level)
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let mut log_builder = Builder::new();
    log_builder.format(|buf, record| {
        writeln!(buf, "{} {} [{}] {}",
                 chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                 record.level(),
                 record.module_path().unwrap_or("unknown"),
                 record.args())
    });
    // default for foreign crates, the directives below can override it
    log_builder.filter_level(LevelFilter::Warn);
    if level.contains('=') {
        log_builder.parse_filters(level);
    } else {
        let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
        log_builder.filter_module("m3u_curator", filter);
    }
    log_builder.init();
    info!("Log Level {level}");
}

fn save(session: &CurationSession, cfg: &Config, intent: SaveIntent) -> Result<(), M3uCuratorError> {
    let mut sink = FilePlaylistSink::new(cfg);
    let summary = session.save(&mut sink, intent)?;
    if summary.dropped_selection > 0 {
        warn!("{} selected channels are no longer available and were dropped", summary.dropped_selection);
    }
    println!("Saved {} channels", summary.saved_channels);
    Ok(())
}

fn print_channels(session: &CurationSession, channels: &[&Channel], json: bool) -> Result<(), M3uCuratorError> {
    let rows: Vec<ChannelRow> = channels.iter().map(|channel| ChannelRow {
        name: &channel.name,
        group: &channel.group,
        url: &channel.url,
        selected: session.selection().contains(&channel.url),
        stable_id: session.catalog().has_stable_identifier(&channel.url),
        programs: channel.programs.len(),
    }).collect();

    if json {
        let content = serde_json::to_string_pretty(&rows).map_err(|err| m3u_curator::m3u_curator_error::info_err!("{}", err))?;
        println!("{content}");
    } else {
        for row in &rows {
            println!("[{}] {} | {} | {} | id:{} epg:{}",
                     if row.selected { "x" } else { " " },
                     row.name, row.group, sanitize_sensitive_info(row.url),
                     if row.stable_id { "yes" } else { "no" }, row.programs);
        }
    }
    Ok(())
}

fn run(cfg: &Config, command: Command) -> Result<(), M3uCuratorError> {
    let source = FileTextSource::new(cfg);
    let mut session = CurationSession::load_with_config(&source, cfg)?;
    for warning in &session.report().warnings {
        println!("Warning: {warning}");
    }

    match command {
        Command::List { groups, json } => {
            let channels = session.catalog().channels_in_groups(&groups);
            print_channels(&session, &channels, json)?;
        }
        Command::Groups => {
            for group in session.catalog().groups() {
                println!("{group}");
            }
        }
        Command::Guide { name } => {
            let channels = session.catalog().find_by_name(&name);
            if channels.is_empty() {
                println!("No channel named {name}");
            }
            for channel in channels {
                println!("{} ({})", channel.name, sanitize_sensitive_info(&channel.url));
                if !channel.has_programs() {
                    println!("  no programmes");
                }
                for entry in channel.programs.iter() {
                    println!("  {} - {} {}", entry.start, entry.stop, entry.title);
                }
            }
        }
        Command::Select { urls } => {
            session.selection_mut().add_all(urls.iter().map(String::as_str));
            save(&session, cfg, SaveIntent::Plain)?;
        }
        Command::Deselect { urls } => {
            session.selection_mut().remove_all(urls.iter().map(String::as_str));
            save(&session, cfg, SaveIntent::Plain)?;
        }
        Command::Toggle { urls } => {
            for url in &urls {
                let selected = session.selection_mut().toggle(url);
                println!("{} {}", if selected { "selected" } else { "deselected" }, sanitize_sensitive_info(url));
            }
            save(&session, cfg, SaveIntent::Plain)?;
        }
        Command::ToggleGroups { groups } => {
            let urls: Vec<String> = session.catalog().channels_in_groups(&groups)
                .iter().map(|channel| channel.url.clone()).collect();
            let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
            let selected = session.selection_mut().toggle_all(&url_refs);
            println!("{} {} channels", if selected { "Selected" } else { "Deselected" }, url_refs.len());
            save(&session, cfg, SaveIntent::Plain)?;
        }
        Command::Save { advanced } => {
            let intent = if advanced { SaveIntent::Advanced } else { SaveIntent::Plain };
            save(&session, cfg, intent)?;
        }
    }
    Ok(())
}
