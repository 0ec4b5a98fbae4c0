//! Display utilities for the pomoloop CLI.
//!
//! This module provides formatted output for:
//! - Success messages
//! - Error messages
//! - Status display, including the single-line watch view

use std::io::Write;

use crate::types::{IpcResponse, ResponseData};

/// Width of the progress bar in characters.
const PROGRESS_BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a success message for start.
    pub fn show_start_success(response: &IpcResponse) {
        println!("> タイマーを開始しました");
        if let Some(data) = &response.data {
            println!("  {} 残り時間: {}", Self::mode_label(data), data.remaining);
        }
    }

    /// Shows a success message for pause.
    pub fn show_pause_success(response: &IpcResponse) {
        println!("|| タイマーを一時停止しました");
        if let Some(data) = &response.data {
            println!("  {} 残り時間: {}", Self::mode_label(data), data.remaining);
        }
    }

    /// Shows a success message for config.
    pub fn show_config_success(response: &IpcResponse) {
        println!("* {}", response.message);
        if let Some(data) = &response.data {
            println!("  残り時間: {}", data.remaining);
        }
    }

    /// Shows a success message for reset.
    pub fn show_reset_success(response: &IpcResponse) {
        println!("* {}", response.message);
    }

    /// Shows a success message for quit.
    pub fn show_quit_success(_response: &IpcResponse) {
        println!("[] デーモンを終了しました");
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        match &response.data {
            Some(data) => {
                for line in Self::status_lines(data) {
                    println!("{}", line);
                }
            }
            None => println!("タイマーは起動していません"),
        }
    }

    /// Redraws the single-line watch view in place.
    pub fn show_watch_line(data: &ResponseData) {
        let mut stdout = std::io::stdout().lock();
        // Carriage return, then clear to end of line
        let _ = write!(stdout, "\r{}\x1b[K", Self::status_line(data));
        let _ = stdout.flush();
    }

    /// Ends the watch view.
    pub fn finish_watch() {
        println!();
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Multi-line status view.
    pub fn status_lines(data: &ResponseData) -> Vec<String> {
        vec![
            "ポモドーロタイマー ステータス".to_string(),
            "─────────────────────────────".to_string(),
            format!("モード: {}", Self::mode_label(data)),
            format!("状態: {}", Self::running_label(data.running)),
            format!("残り時間: {}", data.remaining),
            format!(
                "進捗: {} {}%",
                Self::progress_bar(data.progress_percent, PROGRESS_BAR_WIDTH),
                data.progress_percent
            ),
            format!("セッション: {}", data.sessions_completed),
            format!(
                "設定: 作業 {}分 / 休憩 {}分",
                data.work_minutes, data.break_minutes
            ),
        ]
    }

    /// One-line status used by the watch view.
    pub fn status_line(data: &ResponseData) -> String {
        format!(
            "{} {} {} {:>3}% | セッション {} | {}",
            Self::mode_label(data),
            data.remaining,
            Self::progress_bar(data.progress_percent, PROGRESS_BAR_WIDTH),
            data.progress_percent,
            data.sessions_completed,
            Self::running_label(data.running)
        )
    }

    /// Renders `percent` as a bar of `width` cells.
    pub fn progress_bar(percent: u8, width: usize) -> String {
        let filled = usize::from(percent.min(100)) * width / 100;
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }

    fn mode_label(data: &ResponseData) -> &str {
        match data.timer_mode() {
            Some(mode) => mode.label(),
            None => &data.mode,
        }
    }

    fn running_label(running: bool) -> &'static str {
        if running {
            "実行中"
        } else {
            "一時停止中"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
