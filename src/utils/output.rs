//! # 美化输出工具
//!
//! 提供统一的终端输出样式，并把库中的 `log` 记录渲染成同样的样式。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 被 `main.rs` 用于安装日志器
//! - 使用 `colored` 和 `log` crate

use colored::Colorize;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印调试消息
pub fn print_debug(msg: &str) {
    eprintln!("{} {}", "[DBG]".dimmed(), msg.dimmed());
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

// ─────────────────────────────────────────────────────────────
// 日志
// ─────────────────────────────────────────────────────────────

static LOGGER: TermLogger = TermLogger;

struct TermLogger;

/// 安装终端日志器：0 = info，1 = debug，>= 2 = trace
pub fn init_logger(verbose: u8) -> Result<(), SetLoggerError> {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

impl log::Log for TermLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = record.args().to_string();
        match record.level() {
            Level::Error => print_error(&msg),
            Level::Warn => print_warning(&msg),
            Level::Info => print_info(&msg),
            Level::Debug | Level::Trace => print_debug(&msg),
        }
    }

    fn flush(&self) {}
}
