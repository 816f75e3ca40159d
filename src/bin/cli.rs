use clap::{Arg, ArgAction, ArgMatches, Command, crate_name, crate_version, value_parser};
use mimetable::Resolver;
use mimetable::config::load_config;
use mimetable::observability::init_logs;
use serde_json::{Value, json};
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

fn build_cli() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Path to a mimetable.config.json. Otherwise MIMETABLE_CONFIG or defaults")
                .value_parser(value_parser!(String)),
        )
        .subcommand(
            Command::new("path")
                .about("look up file paths by extension")
                .arg(
                    Arg::new("paths")
                        .required(true)
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("type")
                .about("look up MIME type strings")
                .arg(
                    Arg::new("types")
                        .required(true)
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(String)),
                ),
        )
        .subcommand(Command::new("info").about("show the loaded configuration and database size"))
        .subcommand_required(true)
        .arg_required_else_help(true)
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let matches = build_cli().get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let config = load_config(config_path)?;
    // Held until main returns so the file appender flushes on every exit path.
    let _log_guard = init_logs(&config.log_config())?;
    let resolver = Resolver::from_config(&config)?;

    let mut out = io::stdout().lock();
    match matches.subcommand() {
        Some(("path", sub)) => {
            if !lookup_paths(&resolver, values(sub, "paths"), &mut out)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(("type", sub)) => lookup_types(&resolver, values(sub, "types"), &mut out)?,
        Some(("info", _)) => {
            writeln!(out, "{}", config)?;
            let db = resolver
                .database()
                .read()
                .map_err(|e| format!("database lock poisoned: {}", e))?;
            writeln!(out, "types: {}", db.len())?;
            writeln!(out, "extensions: {}", db.extensions().count())?;
            writeln!(out, "longest extension: {}", db.max_ext_length())?;
        }
        _ => unreachable!("subcommand required"),
    }
    Ok(ExitCode::SUCCESS)
}

fn values<'a>(sub: &'a ArgMatches, id: &str) -> impl Iterator<Item = &'a str> {
    sub.get_many::<String>(id)
        .into_iter()
        .flatten()
        .map(String::as_str)
}

/// Prints one record per path. Returns false when any path had no known
/// extension.
fn lookup_paths<'a>(
    resolver: &Resolver,
    paths: impl Iterator<Item = &'a str>,
    out: &mut impl Write,
) -> Result<bool, Box<dyn Error>> {
    let mut all_found = true;
    for path in paths {
        let record = match resolver.path(path) {
            Some(entry) => serde_json::to_value(entry.as_ref())?,
            None => {
                all_found = false;
                json!({})
            }
        };
        print_record(out, path, record)?;
    }
    Ok(all_found)
}

fn lookup_types<'a>(
    resolver: &Resolver,
    types: impl Iterator<Item = &'a str>,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    for mime_type in types {
        let entry = resolver.mime_type(mime_type);
        print_record(out, mime_type, serde_json::to_value(entry.as_ref())?)?;
    }
    Ok(())
}

fn print_record(out: &mut impl Write, query: &str, record: Value) -> Result<(), Box<dyn Error>> {
    let line = json!({ "query": query, "record": record });
    writeln!(out, "{}", serde_json::to_string(&line)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(buf: Vec<u8>) -> Vec<Value> {
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        let cmd = build_cli();
        cmd.clone().debug_assert();
        for sub in cmd.get_subcommands() {
            let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
            assert_eq!(about, about.trim_start(), "about for {}", sub.get_name());
        }
    }

    #[test]
    fn test_unknown_path_reports_failure_without_exiting() {
        let resolver = Resolver::default();
        let mut out = Vec::new();
        let found = lookup_paths(&resolver, ["index.html", "noext"].into_iter(), &mut out).unwrap();
        assert!(!found);

        let records = lines(out);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["record"]["type"], "text/html");
        assert_eq!(records[1]["query"], "noext");
        assert_eq!(records[1]["record"], json!({}));
    }

    #[test]
    fn test_known_paths_report_success() {
        let resolver = Resolver::default();
        let mut out = Vec::new();
        assert!(lookup_paths(&resolver, ["a.json", "b.CSS"].into_iter(), &mut out).unwrap());
    }

    #[test]
    fn test_type_lookup_prints_record() {
        let resolver = Resolver::default();
        let mut out = Vec::new();
        lookup_types(&resolver, ["text/html; charset=utf-8"].into_iter(), &mut out).unwrap();
        let records = lines(out);
        assert_eq!(records[0]["record"]["type"], "text/html");
        assert_eq!(records[0]["record"]["compressible"], true);
    }
}
