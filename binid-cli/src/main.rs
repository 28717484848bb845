use anyhow::{Context, Result};
use binid_core::{
    identify_file_with_limit, identify_url_with_limit, is_url, Architecture, BinaryType,
    OperatingSystem, DEFAULT_READ_LIMIT,
};
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use std::process::ExitCode;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Identify the target OS, architecture and byte order of executables
#[derive(Parser)]
#[command(
    name = "binid",
    about = "Identify the target OS, architecture and byte order of ELF, Mach-O and PE binaries",
    version,
    author
)]
struct Cli {
    /// Binaries to inspect: local paths or http(s):// URLs
    #[arg(required = true, value_name = "PATH|URL")]
    paths: Vec<String>,

    /// Print a JSON array instead of a table
    #[arg(long)]
    json: bool,

    /// Number of leading bytes to read or download from each binary
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_READ_LIMIT)]
    read_limit: u64,

    /// Fail unless every binary targets this platform, e.g. `linux/x86_64`
    #[arg(long, value_name = "OS/ARCH")]
    expect: Option<Target>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Target {
    os: OperatingSystem,
    arch: Architecture,
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (os, arch) = s
            .split_once('/')
            .ok_or_else(|| format!("expected OS/ARCH, got `{s}`"))?;
        Ok(Target {
            os: os.parse()?,
            arch: arch.parse()?,
        })
    }
}

impl Target {
    fn matches(&self, binary: &BinaryType) -> bool {
        self.os == binary.operating_system && self.arch == binary.architecture
    }
}

#[derive(Serialize)]
struct Record {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    os: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arch: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endianness: Option<&'static str>,
    /// Only present when `--expect` was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct Row<'a> {
    path: &'a str,
    format: &'static str,
    os: &'static str,
    arch: &'static str,
    endianness: &'static str,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let mut records = Vec::with_capacity(cli.paths.len());
    let mut ok = true;

    for location in &cli.paths {
        let shown = location.clone();
        let outcome = if is_url(location) {
            identify_url_with_limit(location, cli.read_limit)
        } else {
            identify_file_with_limit(location, cli.read_limit)
        }
        .with_context(|| format!("failed to identify {shown}"));

        match outcome {
            Ok(binary) => {
                let matches = cli.expect.map(|t| t.matches(&binary));
                if matches == Some(false) {
                    log::warn!("{shown} is {binary}, outside the expected target");
                    ok = false;
                }
                records.push(Record {
                    path: shown,
                    format: Some(binary.format.as_str()),
                    os: Some(binary.operating_system.as_str()),
                    arch: Some(binary.architecture.as_str()),
                    endianness: Some(binary.endianness.as_str()),
                    matches,
                    error: None,
                });
            }
            Err(err) => {
                ok = false;
                records.push(Record {
                    path: shown,
                    format: None,
                    os: None,
                    arch: None,
                    endianness: None,
                    matches: None,
                    error: Some(format!("{err:#}")),
                });
            }
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_table(&records, cli.expect);
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_table(records: &[Record], expect: Option<Target>) {
    let rows: Vec<Row> = records
        .iter()
        .filter_map(|r| {
            Some(Row {
                path: &r.path,
                format: r.format?,
                os: r.os?,
                arch: r.arch?,
                endianness: r.endianness?,
            })
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(&rows).with(Style::rounded()));
    }

    for record in records {
        if let Some(err) = &record.error {
            eprintln!("{} {}", "error:".red().bold(), err);
        } else if let (Some(false), Some(target)) = (record.matches, expect) {
            eprintln!(
                "{} {} targets {}/{}, expected {}/{}",
                "mismatch:".yellow().bold(),
                record.path,
                record.os.unwrap_or("?"),
                record.arch.unwrap_or("?"),
                target.os,
                target.arch
            );
        }
    }
}
