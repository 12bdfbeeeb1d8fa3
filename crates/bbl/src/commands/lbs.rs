//! Load balancer verbs: `create-lbs`, `delete-lbs`, `lbs`

use crate::app::App;
use crate::commands::load_state;
use crate::config::{self, GlobalArgs};
use anyhow::{Context, bail};
use bbl_core::{Iaas, Lb};
use bbl_terraform::{Outputs, OutputsProvider};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, Default)]
pub struct CreateLbsArgs {
    /// Load balancer(s) type: "concourse" or "cf"
    #[arg(long = "type")]
    pub lb_type: String,

    /// Path to SSL certificate (required for cf on aws and gcp)
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Path to SSL certificate key (required for cf on aws and gcp)
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// Path to SSL certificate chain (optional, aws only)
    #[arg(long)]
    pub chain: Option<PathBuf>,

    /// Creates a DNS zone and records for the given domain (cf only)
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DeleteLbsArgs {
    /// Exit successfully when no load balancers exist
    #[arg(long)]
    pub skip_if_missing: bool,
}

pub async fn create(global: &GlobalArgs, args: CreateLbsArgs) -> anyhow::Result<()> {
    config::ensure_state_file(&global.state_dir)?;

    let mut state = load_state(global).await?;
    let iaas = config::validate_iaas(&state)?;
    validate_create(iaas, &args)?;

    let app = App::new(iaas, &state, global);
    app.terraform.validate_version().await?;

    state.lb = Lb {
        lb_type: args.lb_type.clone(),
        cert: read_optional(args.cert.as_deref()).await?,
        key: read_optional(args.key.as_deref()).await?,
        chain: read_optional(args.chain.as_deref()).await?,
        domain: args.domain.clone().unwrap_or_default(),
    };

    let state = app.prepare_zones(state).await?;
    let state = app.apply_terraform(state).await?;
    app.save(&state).await?;

    if state.has_director() {
        app.cloud_config.update(&state).await?;
    }

    println!();
    println!(
        "{}",
        format!("✓ {} load balancers created", args.lb_type).green().bold()
    );
    Ok(())
}

pub async fn delete(global: &GlobalArgs, args: DeleteLbsArgs) -> anyhow::Result<()> {
    config::ensure_state_file(&global.state_dir)?;

    let mut state = load_state(global).await?;
    let iaas = config::validate_iaas(&state)?;

    if state.lb == Lb::default() {
        if args.skip_if_missing {
            println!("no lbs found, and --skip-if-missing flag provided, exiting");
            return Ok(());
        }
        bail!("no lbs found");
    }

    let app = App::new(iaas, &state, global);
    app.terraform.validate_version().await?;

    state.lb = Lb::default();

    let state = app.prepare_zones(state).await?;
    if state.has_director() {
        app.cloud_config.update(&state).await?;
    }

    let state = app.apply_terraform(state).await?;
    app.save(&state).await?;

    println!();
    println!("{}", "✓ Load balancers deleted".green().bold());
    Ok(())
}

pub async fn show(global: &GlobalArgs) -> anyhow::Result<()> {
    config::ensure_state_file(&global.state_dir)?;

    let state = load_state(global).await?;
    let iaas = config::require_iaas(&state)?;
    let app = App::new(iaas, &state, global);

    let outputs = app.terraform.get_outputs(&state).await?;
    for line in lb_lines(iaas, &state.lb, &outputs)? {
        println!("{}", line);
    }
    Ok(())
}

fn validate_create(iaas: Iaas, args: &CreateLbsArgs) -> anyhow::Result<()> {
    match args.lb_type.as_str() {
        "concourse" => Ok(()),
        "cf" => {
            let needs_certificate = matches!(iaas, Iaas::Aws | Iaas::Gcp);
            if needs_certificate && (args.cert.is_none() || args.key.is_none()) {
                bail!("--cert and --key are required with --type=cf");
            }
            Ok(())
        }
        other => bail!(
            "\"{}\" is not a valid lb type, valid lb types are: concourse, cf",
            other
        ),
    }
}

async fn read_optional(path: Option<&Path>) -> anyhow::Result<String> {
    let Some(path) = path else {
        return Ok(String::new());
    };
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading {}", path.display()))
}

/// Human-readable summary of the load balancers in `outputs`
pub fn lb_lines(iaas: Iaas, lb: &Lb, outputs: &Outputs) -> anyhow::Result<Vec<String>> {
    let named = |label: &str, name: &str, url: &str| {
        format!(
            "{}: {} [{}]",
            label,
            outputs.get_string(name),
            outputs.get_string(url)
        )
    };
    let single = |label: &str, key: &str| format!("{}: {}", label, outputs.get_string(key));
    let dns = |key: &str| {
        format!(
            "CF System Domain DNS servers: {}",
            outputs.get_string_list(key).join(" ")
        )
    };

    let mut lines = Vec::new();
    match (iaas, lb.lb_type.as_str()) {
        (_, "") => bail!("no lbs found"),
        (Iaas::Aws, "cf") => {
            lines.push(named("CF Router LB", "cf_router_lb_name", "cf_router_lb_url"));
            lines.push(named("CF SSH Proxy LB", "cf_ssh_lb_name", "cf_ssh_lb_url"));
            lines.push(named("CF TCP Router LB", "cf_tcp_lb_name", "cf_tcp_lb_url"));
            lines.push(single("CF Credhub LB", "credhub_lb_url"));
            if !lb.domain.is_empty() {
                lines.push(dns("env_dns_zone_name_servers"));
            }
        }
        (Iaas::Aws, _) => {
            lines.push(named("Concourse LB", "concourse_lb_name", "concourse_lb_url"));
        }
        (Iaas::Gcp, "cf") => {
            lines.push(single("CF Router LB", "router_lb_ip"));
            lines.push(single("CF SSH Proxy LB", "ssh_proxy_lb_ip"));
            lines.push(single("CF TCP Router LB", "tcp_router_lb_ip"));
            lines.push(single("CF WebSocket LB", "ws_lb_ip"));
            lines.push(single("CF Credhub LB", "credhub_lb_ip"));
            if !lb.domain.is_empty() {
                lines.push(dns("system_domain_dns_servers"));
            }
        }
        (Iaas::Gcp, _) => lines.push(single("Concourse LB", "concourse_lb_ip")),
        (Iaas::Azure, "cf") => {
            lines.push(single("CF Router LB", "cf_router_lb_ip"));
            lines.push(single("CF SSH Proxy LB", "cf_ssh_lb_ip"));
            lines.push(single("CF TCP Router LB", "cf_tcp_lb_ip"));
            lines.push(single("CF Credhub LB", "credhub_lb_ip"));
            if !lb.domain.is_empty() {
                lines.push(dns("system_domain_dns_servers"));
            }
        }
        (Iaas::Azure, _) => lines.push(single("Concourse LB", "concourse_lb_ip")),
    }
    Ok(lines)
}
