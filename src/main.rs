use clap::Parser;
use dialoguer::{Confirm, Password};
use gemini_batch_image::batch::{
    AttemptOutcome, BatchRunner, BatchSession, BatchState, BatchStatus, Pacing, ProgressEvent,
};
use gemini_batch_image::{archive, cli, config, error, generator, scanner, summary};
use cli::{Cli, Commands};
use config::Config;
use error::{BatchImageError, Result};
use imagegen_common::{prompt_preview, Resolution, PREVIEW_CHARS};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "info" } else { "warn" }),
    )
    .target(env_logger::Target::Stderr)
    .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Generate { prompts, style, resolution, output, images_dir, api_key, delay } => {
            println!("🎨 gemini-batch - 画像一括生成\n");

            let api_key = resolve_api_key(api_key.as_deref())?;
            let prompts_raw = read_prompts(&prompts)?;
            let resolution = resolution.unwrap_or(config.default_resolution);
            println!("解像度: {}", describe_resolution(resolution));
            if !style.trim().is_empty() {
                println!("スタイル: {}", style.trim());
            }

            let mut pacing = Pacing::from_config(&config);
            if let Some(secs) = delay {
                pacing.delay = Duration::from_secs(secs);
            }

            let client = generator::GeminiClient::new(&config)?;
            let runner = BatchRunner::new(Arc::new(client), pacing);
            let progress = Reporter::new(runner.pacing());
            let session = Arc::new(match images_dir {
                Some(dir) => BatchSession::with_storage_dir(runner, dir),
                None => BatchSession::new(runner)?,
            });
            log::info!("画像保存先: {}", session.storage_root().display());

            let handle = session.start(&api_key, &prompts_raw, &style, resolution)?;

            // 実行中の Ctrl-C は中断要求、それ以降の Ctrl-C は即時終了
            let interrupt_session = session.clone();
            tokio::spawn(async move {
                interrupt_session.cancel_on(ctrl_c()).await;
                ctrl_c().await;
                std::process::exit(130);
            });

            let mut events = handle.events;
            while let Some(event) = events.recv().await {
                progress.handle(&event);
            }
            let state = handle
                .task
                .await
                .map_err(|e| BatchImageError::TaskFailed(e.to_string()))?;

            print_report(&state);

            if let BatchStatus::Failed(reason) = &state.status {
                return Err(BatchImageError::BatchFailed(reason.clone()));
            }

            if state.results.is_empty() {
                println!("\n保存できた画像がないため、ZIPは作成しません");
                return Ok(());
            }

            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            let images = state.images();
            let zip_path = archive::archive_path(&images, &output_dir)?;
            if !confirm_overwrite(&zip_path)? {
                println!("ZIPの保存をスキップしました");
                return Ok(());
            }
            let zip_path = session.save_archive(&zip_path)?;
            println!("\n💾 ZIP保存完了: {}", zip_path.display());

            let summary_path = zip_path.with_file_name(summary::SUMMARY_FILE_NAME);
            summary::RunSummary::from_state(&state).save(&summary_path)?;
            println!("✔ サマリー: {}", summary_path.display());
        }

        Commands::Archive { folder, output } => {
            println!("📦 gemini-batch - ZIP作成\n");

            let images = scanner::scan_generated_folder(&folder)?;
            println!("✔ {}枚の画像を検出", images.len());

            let dest = output.unwrap_or_else(|| folder.clone());
            let zip_path = archive::save_archive(&images, &dest)?;
            println!("💾 ZIP保存完了: {}", zip_path.display());
        }

        Commands::Config { show, set_model, set_delay, set_resolution } => {
            let mut config = config;
            let changed = set_model.is_some() || set_delay.is_some() || set_resolution.is_some();

            if let Some(model) = set_model {
                config.model = model;
            }
            if let Some(delay) = set_delay {
                config.delay_seconds = delay;
            }
            if let Some(resolution) = set_resolution {
                config.default_resolution = resolution;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  APIベース: {}", config.api_base);
                println!("  待機: {}秒", config.delay_seconds);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  解像度: {}", config.default_resolution);
                println!(
                    "  APIキー: {}",
                    if Config::resolve_api_key(None).is_ok() { "環境変数で設定済み" } else { "未設定" }
                );
            }
        }
    }

    Ok(())
}

fn resolve_api_key(explicit: Option<&str>) -> Result<String> {
    match Config::resolve_api_key(explicit) {
        Err(BatchImageError::MissingApiKey) if std::io::stdin().is_terminal() => {
            let key = Password::new()
                .with_prompt("Gemini APIキー")
                .interact()
                .map_err(|e| BatchImageError::Config(e.to_string()))?;
            Ok(key)
        }
        other => other,
    }
}

/// Ctrl-C を待つ（監視できない環境では完了しない）
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Ctrl-Cを監視できません: {}", e);
        std::future::pending::<()>().await;
    }
}

fn read_prompts(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    if !path.exists() || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(format!("{} は既に存在します。上書きしますか？", path.display()))
        .default(false)
        .interact()
        .map_err(|e| BatchImageError::Config(e.to_string()))
}

/// 進捗イベントをプログレスバーに反映
struct Reporter {
    bar: ProgressBar,
    pacing: Pacing,
}

impl Reporter {
    fn new(pacing: Pacing) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar, pacing }
    }

    fn handle(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => {
                self.bar.set_length(*total as u64);
                let minutes = (*total as u64 * self.pacing.delay.as_secs()).div_ceil(60);
                self.bar.println(format!("📝 {}枚の画像を生成します（予想時間: 約{}分）", total, minutes));
                self.bar.set_message("生成中...");
            }
            ProgressEvent::Attempted { index, total, preview, outcome } => {
                self.bar.println(format!("🎨 [{}/{}] {}", index, total, preview));
                match outcome {
                    AttemptOutcome::Saved { file_name } => {
                        self.bar.println(format!("  ✅ 保存完了: {}", file_name));
                    }
                    AttemptOutcome::Failed { reason } => {
                        self.bar.println(format!("  ❌ 失敗: {}", reason));
                    }
                }
                self.bar.inc(1);
            }
            ProgressEvent::Waiting { next_index, remaining } => {
                self.bar.set_message(format!(
                    "⏳ 待機中 {}秒 (次: {}/{})",
                    remaining.as_secs().max(1),
                    next_index,
                    self.bar.length().unwrap_or(0)
                ));
            }
            ProgressEvent::Finished { status } => {
                let message = match status {
                    BatchStatus::Completed => "完了!",
                    BatchStatus::Cancelled => "中断しました",
                    _ => "終了",
                };
                self.bar.finish_with_message(message);
            }
        }
    }
}

fn print_report(state: &BatchState) {
    println!("\n{}", "=".repeat(50));
    println!(
        "🎉 生成終了 ({}): {}/{}枚成功",
        state.status.label(),
        state.results.len(),
        state.total()
    );

    if !state.failures.is_empty() {
        println!("\n⚠️ {}件失敗:", state.failures.len());
        for failure in &state.failures {
            println!(
                "  {}. {} - {}",
                failure.index,
                prompt_preview(&failure.prompt_text, PREVIEW_CHARS),
                failure.reason
            );
        }
    }

    let skipped = state.total() - state.completed();
    if skipped > 0 {
        println!("\n⏭️ 未処理: {}件", skipped);
    }
}

fn describe_resolution(resolution: Resolution) -> String {
    format!("{} (約{}px)", resolution, resolution.approx_pixels())
}
