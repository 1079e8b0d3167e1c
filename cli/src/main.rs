//! `codeguard-verify`: terminal host for the OTP verification screen

mod commands;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use cg_core::errors::VerificationError;
use cg_core::services::{
    ControllerPorts, ControllerView, OtpController, OtpControllerConfig, ResendOutcome,
    SubmitOutcome,
};
use cg_infra::config::InfrastructureConfig;
use cg_infra::RecordingNavigator;
use cg_shared::{init_tracing, AppConfig};

use commands::{Command, HELP};

#[derive(Debug, Parser)]
#[command(name = "codeguard-verify", version, about = "Enter the one-time code sent to your email")]
struct Args {
    /// Email address the code was sent to
    #[arg(short, long, env = "CODEGUARD_EMAIL")]
    email: String,

    /// Directory holding config.<environment>.toml
    #[arg(long, env = "CODEGUARD_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Print the view as JSON instead of text
    #[arg(long)]
    json: bool,
}

enum Flow {
    Continue,
    Exit,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::load_from(args.config_dir.as_deref()).context("loading configuration")?;
    init_tracing(&config.logging);
    info!(environment = %config.environment, event = "cli_start", "Starting verification host");

    let infra = cg_infra::initialize(&InfrastructureConfig::from(&config))?;
    let navigator = Arc::new(RecordingNavigator::new());

    let mut ports = ControllerPorts::new(
        infra.auth_client.clone(),
        infra.auth_client.clone(),
        navigator.clone(),
    );
    if let Some(storage) = infra.storage.clone() {
        ports = ports.with_storage(storage);
    }

    let controller = Arc::new(OtpController::new(
        &args.email,
        ports,
        OtpControllerConfig::from(&config.verification),
    )?);

    print_view(&controller.hydrate(), args.json)?;
    controller.spawn_ticker();
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let flow = handle(&controller, Command::parse(&line), args.json).await?;
        if matches!(flow, Flow::Exit) {
            break;
        }
    }

    controller.unmount();
    if let Some(url) = navigator.last_url() {
        println!("Continue at: {}", url);
    }
    Ok(())
}

async fn handle<V, I>(controller: &OtpController<V, I>, command: Command, json: bool) -> Result<Flow>
where
    V: cg_core::services::VerificationServiceTrait,
    I: cg_core::services::IssuanceServiceTrait,
{
    match command {
        Command::Input(raw) => {
            // Each line is the whole field, so clear it before "typing"
            controller.on_input_change("").await;
            match controller.on_input_change(&raw).await {
                Some(Ok(SubmitOutcome::Verified { .. })) => return Ok(Flow::Exit),
                Some(Ok(SubmitOutcome::Discarded)) => return Ok(Flow::Exit),
                Some(Ok(SubmitOutcome::InFlight)) | Some(Err(_)) => {}
                None => report_unsubmitted(controller, &raw),
            }
        }
        Command::Resend => match controller.request_resend().await {
            Ok(ResendOutcome::Sent { .. }) => println!("A new code is on its way."),
            Ok(ResendOutcome::CoolingDown { remaining_seconds }) => {
                println!("Please wait {}s before requesting another code.", remaining_seconds)
            }
            Ok(ResendOutcome::InFlight) | Err(_) => {}
            Ok(ResendOutcome::Discarded) => return Ok(Flow::Exit),
        },
        Command::Back => {
            controller.abandon();
            println!("Back to login.");
            return Ok(Flow::Exit);
        }
        Command::Status => {}
        Command::Quit => return Ok(Flow::Exit),
    }

    print_view(&controller.view(), json)?;
    Ok(Flow::Continue)
}

/// Input that did not trigger a submission: point out an incomplete code
fn report_unsubmitted<V, I>(controller: &OtpController<V, I>, raw: &str)
where
    V: cg_core::services::VerificationServiceTrait,
    I: cg_core::services::IssuanceServiceTrait,
{
    let view = controller.view();
    if view.otp_input.len() < cg_core::domain::CODE_LENGTH && !raw.trim().is_empty() {
        let shown = VerificationError::InvalidFormat.user_message();
        println!("{} ({} digit(s) so far)", shown, view.otp_input.len());
    }
}

fn print_view(view: &ControllerView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(view)?);
    } else {
        println!("{}", render::render(view));
    }
    Ok(())
}
