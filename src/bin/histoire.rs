//! Command-line interface for histoire
//! Renders update logs as annotated HTML and inspects the configured rule set.
//!
//! Usage:
//!   histoire render `<logs>` [--user `<user>`]... [--channel `<room>`] [--start `<t>`] [--end `<t>`]
//!   histoire tokens `<text>` [--format debug|json|yaml]
//!   histoire rules
//!
//! `<logs>` is a checkout of the log repository. Every subcommand layers `histoire.toml` from
//! the working directory (when present) and then `--config <file>` over the built-in rules.

use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Arg, ArgAction, ArgMatches, Command};
use histoire::annotate::Rewriter;
use histoire::feed::{
    display_names, feed_window, sort_newest_first, FeedSubject, FeedUrls, LogStore,
    RenderContext,
};
use histoire::settings::{HistoireConfig, Loader};

const LOCAL_CONFIG: &str = "histoire.toml";
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .help("TOML file layered over the built-in configuration")
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = Command::new("histoire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render status update feeds with bug and repository links")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("render")
                .about("Render updates as HTML list items, newest first")
                .arg(
                    Arg::new("logs")
                        .help("Checkout of the log repository (holding users/<user>/...)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("user")
                        .long("user")
                        .short('u')
                        .help("User to include; repeat or separate with commas (default: all)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("channel")
                        .long("channel")
                        .help("Only show updates posted in this room"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .help("Earliest timestamp to include (default: the lookback window)")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .help("Latest timestamp to include (default: end of the current era)")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the annotated token stream for a message")
                .arg(
                    Arg::new("text")
                        .help("Message text")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: debug, json or yaml")
                        .value_parser(["debug", "json", "yaml"])
                        .default_value("debug"),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("rules")
                .about("List annotation rules in the order they run")
                .arg(config_arg()),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("render", render_matches)) => handle_render_command(render_matches),
        Some(("tokens", tokens_matches)) => handle_tokens_command(tokens_matches),
        Some(("rules", rules_matches)) => handle_rules_command(rules_matches),
        _ => unreachable!(),
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

fn load_config(matches: &ArgMatches) -> Result<(HistoireConfig, Rewriter), String> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    let config = loader.build().map_err(|e| e.to_string())?;
    let rewriter = config.rewriter().map_err(|e| e.to_string())?;
    tracing::info!(rules = rewriter.registry().len(), "configuration loaded");
    Ok((config, rewriter))
}

/// Handle the render command
fn handle_render_command(matches: &ArgMatches) -> Result<(), String> {
    let (config, rewriter) = load_config(matches)?;
    let store = LogStore::new(matches.get_one::<String>("logs").expect("required"));
    let channel = matches.get_one::<String>("channel");

    let known = store.list_users().map_err(|e| e.to_string())?;
    let requested: Vec<String> = matches
        .get_many::<String>("user")
        .into_iter()
        .flatten()
        .flat_map(|users| users.split(','))
        .filter(|user| !user.is_empty())
        .map(str::to_string)
        .collect();
    let all_users = requested.is_empty();
    let users = if all_users { known.clone() } else { requested };

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default();
    let (start, end) = feed_window(
        matches.get_one::<i64>("start").copied(),
        matches.get_one::<i64>("end").copied(),
        now,
        &config.feed,
    );

    let mut records = store
        .collect_updates(&users, start, end, config.feed.era_seconds)
        .map_err(|e| e.to_string())?;
    if let Some(channel) = channel {
        records.retain(|record| &record.channel == channel);
    }
    sort_newest_first(&mut records);

    let context = RenderContext::new(rewriter, FeedUrls::new(config.feed.base_repo))
        .with_display_names(display_names(&known))
        .with_user_links(users.len() > 1 || channel.is_some())
        .with_window(start, end);

    let subject = match channel {
        Some(channel) => FeedSubject::Channel(channel),
        None if all_users => FeedSubject::AllUsers,
        None => FeedSubject::Users(&users),
    };
    println!("{}", context.render_title(subject));

    if records.is_empty() {
        println!("<p>No updates found!</p>");
        return Ok(());
    }
    println!("<ul class=\"update\">");
    for record in &records {
        println!("{}", context.render_update(record));
    }
    println!("</ul>");
    Ok(())
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) -> Result<(), String> {
    let (config, rewriter) = load_config(matches)?;
    let text = matches.get_one::<String>("text").expect("required");
    let format = matches.get_one::<String>("format").expect("defaulted");

    let context = RenderContext::new(rewriter, FeedUrls::new(config.feed.base_repo));
    let stream = context.annotate(text);
    let output = match format.as_str() {
        "json" => serde_json::to_string_pretty(&stream).map_err(|e| e.to_string())?,
        "yaml" => serde_yaml::to_string(&stream).map_err(|e| e.to_string())?,
        _ => stream
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    };
    println!("{}", output);
    Ok(())
}

/// Handle the rules command
fn handle_rules_command(matches: &ArgMatches) -> Result<(), String> {
    let (config, _) = load_config(matches)?;
    println!("Annotation rules, in order:\n");
    for rule in &config.rules {
        println!("  {}", rule.name);
        println!("    pattern: {}", rule.pattern);
        println!("    link:    {}", rule.link);
    }
    Ok(())
}
