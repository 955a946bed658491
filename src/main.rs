use api::{ApiConfig, HttpClient, RemoteService};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tui_app::components::{ExperimentListState, Origin, TranscriptEntry};
use tui_app::ChatClient;

mod logging;

use logging::{LogLevel, LoggingConfig};

/// 控制台模式下的退出命令
const QUIT_COMMAND: &str = "/quit";

/// CLI 参数配置
#[derive(Parser, Debug)]
#[command(name = "datapilot", version, about = "DataPilot 实验助手终端客户端")]
struct CliArgs {
    /// 后端服务地址
    #[arg(long, env = "DATAPILOT_URL", default_value = api::DEFAULT_BASE_URL)]
    base_url: String,

    /// 单次请求超时（秒），0 表示不限时
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// 控制台模式（逐行输入，不启动图形界面）
    #[arg(short, long)]
    console: bool,

    /// 日志级别
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// 日志目录
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

impl CliArgs {
    fn api_config(&self) -> ApiConfig {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        ApiConfig::new()
            .with_base_url(self.base_url.clone())
            .with_request_timeout(timeout)
    }
}

fn print_entry(out: &mut impl Write, entry: &TranscriptEntry) -> std::io::Result<()> {
    let prefix = match entry.origin {
        Origin::User => "you>",
        Origin::System => "bot>",
    };
    writeln!(out, "{} {}", prefix, entry.display_text())
}

/// 运行控制台模式
///
/// 逐行读取 `input`，读到 EOF 或退出命令为止；所有输出写入 `out`。
async fn run_console_mode<R, W>(
    service: &dyn RemoteService,
    base_url: &str,
    input: R,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "DataPilot 控制台模式")?;
    writeln!(out, "========================================")?;
    writeln!(out, "后端地址: {}", base_url)?;
    writeln!(out)?;

    // 启动时加载一次实验列表
    let mut experiments = ExperimentListState::new();
    experiments.apply(service.experiments().await);
    writeln!(out, "实验列表:")?;
    for item in &experiments.items {
        writeln!(out, "  - {}", item)?;
    }
    writeln!(out)?;
    writeln!(out, "输入消息后回车发送，{} 退出", QUIT_COMMAND)?;

    let mut chat = ChatClient::new();
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == QUIT_COMMAND {
            break;
        }

        let before = chat.panel().transcript().len();
        chat.panel_mut().input_mut().set_value(line);
        chat.send_message(service).await;

        for entry in &chat.panel().transcript()[before..] {
            print_entry(out, entry)?;
        }
    }

    tracing::info!("控制台模式退出");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 需要在解析参数前加载，DATAPILOT_URL 才能生效
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    // TUI 模式只输出到文件，避免干扰界面
    let _guard = LoggingConfig::new()
        .with_log_dir(args.log_dir.clone())
        .with_level(args.log_level)
        .with_console_output(args.console)
        .with_ansi(args.console)
        .init()?;

    let config = args.api_config();
    let service: Arc<dyn RemoteService> = Arc::new(HttpClient::new(&config)?);
    tracing::info!("后端地址: {}，请求超时: {:?}", config.base_url, config.request_timeout);

    if args.console {
        let stdin = BufReader::new(tokio::io::stdin());
        run_console_mode(service.as_ref(), &config.base_url, stdin, &mut std::io::stdout()).await?;
    } else {
        tui_app::run_tui(service, config.base_url.clone()).await?;
    }

    Ok(())
}
