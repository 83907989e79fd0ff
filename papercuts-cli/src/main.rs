mod cli;
mod shell;
mod view;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use papercuts_core::config::ClientConfig;
use papercuts_core::dashboard::{CreateSessionRequest, CreateUserRequest};
use papercuts_core::pdf::PdfFile;
use papercuts_core::types::{ArtifactKind, SessionId};
use papercuts_engine::controller::WorkflowController;
use papercuts_engine::session::WorkflowStatus;
use papercuts_engine::traits::{DashboardApi, WorkflowObserver};
use papercuts_providers::Transport;
use papercuts_runtime::bridge::ExtensionBridge;
use papercuts_runtime::{ApiClients, ConfigStore, build_clients_from_config, resolve_config};

use crate::cli::{Args, Command, DashboardCommand, OptimizeArgs};
use crate::view::Links;

/// Logs loading transitions so long steps are visible with `-v`.
struct ProgressLog;

impl WorkflowObserver for ProgressLog {
    fn on_status(&self, status: &WorkflowStatus) {
        if status.is_loading {
            log::info!("{}: working...", status.step.label());
        }
    }
}

fn effective_config(args: &Args) -> Result<ClientConfig> {
    let store = args.config.as_ref().map(ConfigStore::at_path);
    let mut cfg = resolve_config(store.as_ref())?;
    if let Some(url) = args.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        cfg.api_base = url.trim().to_string();
    }
    if args.mock {
        cfg.use_mock = true;
    }
    Ok(cfg)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}

async fn optimize(clients: &ApiClients, opt: OptimizeArgs) -> Result<()> {
    let bytes = tokio::fs::read(&opt.file)
        .await
        .with_context(|| format!("read {}", opt.file.display()))?;
    let name = opt
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| opt.file.display().to_string());

    let mut controller =
        WorkflowController::new(clients.pdf.clone()).with_observer(Arc::new(ProgressLog));
    if let Some(user_id) = opt.user_id {
        controller = controller.with_user_id(user_id);
    }

    if !controller.check_connection().await {
        log::warn!("backend health check failed; trying anyway");
    }

    controller
        .upload(PdfFile::from_name_and_bytes(name, bytes))
        .await?;
    println!("{}", view::render_status(&controller.status().await, None));

    controller.update_settings(opt.settings.to_settings()).await;
    let session = controller.optimize().await?;

    let links = Links::for_session(clients.pdf.as_ref(), &session);
    println!(
        "{}",
        view::render_status(&controller.status().await, Some(&links))
    );

    if let Some(out) = opt.report_out {
        let html = clients.pdf.get_report_html(&session.id).await?;
        write_file(&out, html.as_bytes())?;
        println!("report saved to {}", out.display());
    }
    Ok(())
}

async fn dashboard(api: &dyn DashboardApi, cmd: DashboardCommand) -> Result<()> {
    match cmd {
        DashboardCommand::Sessions { user_id } => {
            let resp = api.list_sessions(user_id.as_deref()).await?;
            print!("{}", view::render_sessions(&resp));
        }
        DashboardCommand::CreateSession {
            user_id,
            pages,
            ink_use,
            score,
        } => {
            let created = api
                .create_session(&CreateSessionRequest {
                    user_id,
                    pages,
                    ink_use,
                    optimizing_score: score,
                })
                .await?;
            println!("created session {}", created.id);
        }
        DashboardCommand::Users => {
            let resp = api.list_users().await?;
            print!("{}", view::render_users(&resp));
        }
        DashboardCommand::CreateUser {
            user_id,
            name,
            admin,
            num_user,
        } => {
            let created = api
                .create_user(&CreateUserRequest {
                    user_id,
                    name,
                    is_admin: admin.then_some(true),
                    num_user,
                })
                .await?;
            println!("created user {} ({})", created.user_id, created.id);
        }
        DashboardCommand::Totals { user_id } => {
            let pages = api.user_page_total(&user_id).await?;
            let ink = api.user_ink_total(&user_id).await?;
            let score = api.user_avg_score(&user_id).await?;
            println!("user {user_id}\n  pages: {pages}\n  ink:   {ink:.2}\n  score: {score:.1}");
        }
        DashboardCommand::Metrics => {
            let m = api.org_metrics().await?;
            print!("{}", view::render_org_metrics(&m));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout belongs to command output and the bridge protocol.
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .parse_default_env()
        .init();

    let cfg = effective_config(&args)?;

    if let Command::Config { save } = &args.command {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        if *save {
            let path = args
                .config
                .as_ref()
                .context("--save needs --config <path>")?;
            ConfigStore::at_path(path).save(&cfg)?;
            println!("saved to {}", path.display());
        }
        return Ok(());
    }

    if let Command::Bridge = &args.command {
        if cfg.use_mock {
            log::warn!("the bridge always proxies to {}; mock mode is ignored", cfg.api_base);
        }
        let bridge = ExtensionBridge::new(Transport::new(cfg.api_base.clone())?);
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        return bridge.serve(stdin, tokio::io::stdout()).await;
    }

    let clients = build_clients_from_config(cfg)?;
    log::debug!("{clients:?}");
    let pdf = clients.pdf.as_ref();

    match args.command {
        Command::Health => {
            let ok = pdf.check_health().await;
            println!("{}", if ok { "connected" } else { "offline" });
            if !ok {
                std::process::exit(1);
            }
        }
        Command::Optimize(opt) => optimize(&clients, opt).await?,
        Command::Status { id } => {
            let session = pdf.get_session(&SessionId::new(id)).await?;
            print!("{}", view::render_session(&session));
        }
        Command::Report { id, out } => {
            let html = pdf.get_report_html(&SessionId::new(id)).await?;
            match out {
                Some(path) => write_file(&path, html.as_bytes())?,
                None => println!("{html}"),
            }
        }
        Command::Download { id, kind, out } => {
            let kind = ArtifactKind::from(kind);
            let bytes = pdf.fetch_artifact(&SessionId::new(id), kind).await?;
            write_file(&out, &bytes)?;
            println!("{} bytes written to {}", bytes.len(), out.display());
        }
        Command::Urls { id } => {
            let id = SessionId::new(id);
            println!("original:  {}", pdf.original_url(&id));
            println!("optimized: {}", pdf.optimized_url(&id));
            println!("report:    {}", pdf.report_download_url(&id));
        }
        Command::Delete { id } => {
            let id = SessionId::new(id);
            pdf.delete_session(&id).await?;
            println!("deleted {id}");
        }
        Command::Shell { user_id } => {
            let mut controller = WorkflowController::new(clients.pdf.clone());
            if let Some(user_id) = user_id {
                controller = controller.with_user_id(user_id);
            }
            shell::run(controller).await?;
        }
        Command::Dashboard(cmd) => dashboard(clients.dashboard.as_ref(), cmd).await?,
        Command::Config { .. } | Command::Bridge => {}
    }
    Ok(())
}
