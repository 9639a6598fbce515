//! # 美化输出工具
//!
//! 提供统一的终端输出样式，以及随一次解析调用传递的
//! 诊断上下文（取代进程级可变 debug 开关）。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 与 `data/` 模块使用
//! - 使用 `colored` crate

use colored::Colorize;

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
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 诊断上下文
///
/// 作用域限定在一次 resolve/score 调用，按值传递或借用，
/// 不存在跨调用共享的可变状态。
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    pub verbose: bool,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Diagnostics { verbose }
    }

    /// verbose 时输出 DEBUG 行，否则静默
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            println!("{} {}", "DEBUG".yellow().bold(), msg.italic().dimmed());
        }
    }
}
