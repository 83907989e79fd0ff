use std::path::PathBuf;

use anyhow::Context;
use papercuts_core::pdf::PdfFile;
use papercuts_core::settings::OptimizeSettings;
use papercuts_engine::controller::WorkflowController;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::view::{Links, render_status};

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Upload(PathBuf),
    Ink(u8),
    Pages(u8),
    Quality(bool),
    Images(bool),
    Optimize,
    Regenerate,
    Reset,
    Retry,
    Status,
    Health,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  upload <path>      analyze a PDF
  ink <0-100>        ink saver level
  pages <0-100>      page saver level
  quality on|off     preserve quality
  images on|off      exclude images
  optimize           apply settings and preview
  regenerate         re-run optimize with current settings
  reset              start over
  retry              dismiss the last error
  status | health | help | quit";

fn parse_level(arg: Option<&str>) -> Result<u8, String> {
    let raw = arg.ok_or("expected a level between 0 and 100")?;
    match raw.parse::<u8>() {
        Ok(n) if n <= 100 => Ok(n),
        _ => Err(format!("invalid level: {raw} (expected 0-100)")),
    }
}

fn parse_switch(arg: Option<&str>) -> Result<bool, String> {
    match arg.map(str::to_ascii_lowercase).as_deref() {
        Some("on" | "yes" | "true" | "1") => Ok(true),
        Some("off" | "no" | "false" | "0") => Ok(false),
        _ => Err("expected on or off".into()),
    }
}

pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, Some(r.trim()).filter(|r| !r.is_empty())),
        None => (line, None),
    };
    match cmd.to_ascii_lowercase().as_str() {
        "upload" | "open" => rest
            .map(|p| ShellCommand::Upload(PathBuf::from(p)))
            .ok_or_else(|| "usage: upload <path>".to_string()),
        "ink" => parse_level(rest).map(ShellCommand::Ink),
        "pages" => parse_level(rest).map(ShellCommand::Pages),
        "quality" => parse_switch(rest).map(ShellCommand::Quality),
        "images" => parse_switch(rest).map(ShellCommand::Images),
        "optimize" => Ok(ShellCommand::Optimize),
        "regenerate" => Ok(ShellCommand::Regenerate),
        "reset" => Ok(ShellCommand::Reset),
        "retry" => Ok(ShellCommand::Retry),
        "status" | "" => Ok(ShellCommand::Status),
        "health" => Ok(ShellCommand::Health),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command: {other} (try 'help')")),
    }
}

async fn print_status(controller: &WorkflowController) {
    let status = controller.status().await;
    let links = status
        .session
        .as_ref()
        .map(|s| Links::for_session(controller.api().as_ref(), s));
    println!("{}", render_status(&status, links.as_ref()));
}

async fn change_settings(
    controller: &WorkflowController,
    f: impl FnOnce(OptimizeSettings) -> OptimizeSettings,
) {
    let current = controller.status().await.settings;
    controller.update_settings(f(current)).await;
}

/// Runs the interactive widget until `quit` or end of input.
pub async fn run(controller: WorkflowController) -> anyhow::Result<()> {
    let mode = controller.api().config().mode_label();
    println!("papercuts ({mode} mode). Type 'help' for commands.");
    controller.check_connection().await;
    print_status(&controller).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        let cmd = match parse_line(&line) {
            Ok(cmd) => cmd,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        // Failures, the no-session guard included, are recorded in the controller and
        // shown by the status view.
        match cmd {
            ShellCommand::Upload(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    let _ = controller
                        .upload(PdfFile::from_name_and_bytes(name, bytes))
                        .await;
                }
                Err(e) => {
                    println!("cannot read {}: {e}", path.display());
                    continue;
                }
            },
            ShellCommand::Ink(n) => change_settings(&controller, |s| s.with_ink_saver_level(n)).await,
            ShellCommand::Pages(n) => {
                change_settings(&controller, |s| s.with_page_saver_level(n)).await
            }
            ShellCommand::Quality(on) => {
                change_settings(&controller, |s| s.with_preserve_quality(on)).await
            }
            ShellCommand::Images(on) => {
                change_settings(&controller, |s| s.with_exclude_images(on)).await
            }
            ShellCommand::Optimize => {
                let _ = controller.optimize().await;
            }
            ShellCommand::Regenerate => {
                let _ = controller.regenerate().await;
            }
            ShellCommand::Reset => controller.reset().await,
            ShellCommand::Retry => controller.retry().await,
            ShellCommand::Health => {
                controller.check_connection().await;
            }
            ShellCommand::Status => {}
            ShellCommand::Help => {
                println!("{HELP}");
                continue;
            }
            ShellCommand::Quit => break,
        }
        print_status(&controller).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_line("upload  ./My Files/a.pdf "),
            Ok(ShellCommand::Upload(PathBuf::from("./My Files/a.pdf")))
        );
        assert_eq!(parse_line("INK 70"), Ok(ShellCommand::Ink(70)));
        assert_eq!(parse_line("quality off"), Ok(ShellCommand::Quality(false)));
        assert_eq!(parse_line(""), Ok(ShellCommand::Status));
        assert_eq!(parse_line("exit"), Ok(ShellCommand::Quit));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_line("ink 101").is_err());
        assert!(parse_line("pages lots").is_err());
        assert!(parse_line("images maybe").is_err());
        assert!(parse_line("upload").is_err());
        assert!(parse_line("frobnicate").is_err());
    }
}
