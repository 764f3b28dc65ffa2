// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! protodyn - inspect, encode and decode protobuf messages from `.proto`
//! sources without generated code.
//!
//! Usage:
//!   protodyn types schemas/
//!   protodyn encode person.proto Person --set age=30 --set name=Ada
//!   protodyn decode person.proto Person 081e1203416461

mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use protodyn::{RegistryConfig, SchemaRegistry};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "protodyn")]
#[command(about = "Runtime protobuf schemas and dynamic messages")]
#[command(version)]
struct Cli {
    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load every schema under a directory and list the message types
    Types {
        /// Schema directory (walked recursively)
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Schema file extension
        #[arg(long, default_value = "proto")]
        extension: String,
    },

    /// Build a message from field assignments and print it as hex
    Encode {
        /// Schema file
        #[arg(value_name = "FILE")]
        schema: PathBuf,

        /// Top-level message type
        #[arg(value_name = "TYPE")]
        message_type: String,

        /// Field assignment (repeatable)
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        assignments: Vec<String>,

        /// Extra include path (repeatable)
        #[arg(short = 'I', long = "include", value_name = "DIR")]
        includes: Vec<PathBuf>,
    },

    /// Decode hex wire bytes and print every field
    Decode {
        /// Schema file
        #[arg(value_name = "FILE")]
        schema: PathBuf,

        /// Top-level message type
        #[arg(value_name = "TYPE")]
        message_type: String,

        /// Wire bytes as hex
        #[arg(value_name = "HEX")]
        payload: String,

        /// Extra include path (repeatable)
        #[arg(short = 'I', long = "include", value_name = "DIR")]
        includes: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Types { dir, extension } => cmd_types(&dir, &extension),
        Commands::Encode {
            schema,
            message_type,
            assignments,
            includes,
        } => cmd_encode(&schema, &message_type, &assignments, includes),
        Commands::Decode {
            schema,
            message_type,
            payload,
            includes,
        } => cmd_decode(&schema, &message_type, &payload, includes),
    }
}

fn registry_with(includes: Vec<PathBuf>) -> SchemaRegistry {
    SchemaRegistry::with_config(RegistryConfig::from_env().include_paths(includes))
}

fn cmd_types(dir: &Path, extension: &str) -> anyhow::Result<()> {
    let mut registry =
        SchemaRegistry::with_config(RegistryConfig::new().schema_extension(extension));
    let added = registry
        .load_directory(dir)
        .with_context(|| format!("loading schemas from {}", dir.display()))?;
    info!("{} message type(s) under {}", added, dir.display());

    for name in registry.type_names() {
        let handle = registry.get(&name)?;
        println!("{}", handle.full_name());
        for line in render::describe_fields(handle.descriptor()) {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn cmd_encode(
    schema: &Path,
    message_type: &str,
    assignments: &[String],
    includes: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let mut registry = registry_with(includes);
    let handle = registry
        .compile_and_load(schema, message_type)
        .with_context(|| format!("loading {} from {}", message_type, schema.display()))?;

    for assignment in assignments {
        let (field, input) = render::parse_assignment(handle.descriptor(), assignment)?;
        debug!("set {} = {:?}", field, input);
        handle
            .set_field(&field, input)
            .with_context(|| format!("setting '{}'", assignment))?;
    }

    let bytes = handle.encode()?;
    info!("{} encoded to {} byte(s)", handle.full_name(), bytes.len());
    println!("{}", hex::encode(bytes));
    Ok(())
}

fn cmd_decode(
    schema: &Path,
    message_type: &str,
    payload: &str,
    includes: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let bytes = hex::decode(payload.trim()).context("payload is not valid hex")?;

    let mut registry = registry_with(includes);
    let handle = registry
        .compile_and_load(schema, message_type)
        .with_context(|| format!("loading {} from {}", message_type, schema.display()))?;
    handle.decode(&bytes)?;

    for name in handle.field_names() {
        let value = handle.get_field(&name)?;
        println!("{}: {}", name, render::format_value(&value));
    }
    Ok(())
}
