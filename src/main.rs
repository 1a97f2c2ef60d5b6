// 命令行入口

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use driver_guard::effectors::Effectors;
use driver_guard::llm::{ChatProvider, OfflineChatProvider};
use driver_guard::logger::{self, LogBroadcaster};
use driver_guard::models::{ConfigUpdate, PersistedConfig};
use driver_guard::sampler::{Scenario, ScriptedSampler};
use driver_guard::settings::{default_config_path, SettingsManager};
use driver_guard::{AppEvent, EventBus, GuardApp};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// 驾驶员注意力守护：紧急倒计时协议与智能语音回复
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// 配置文件路径
    #[clap(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// 日志目录
    #[clap(long, global = true)]
    log_dir: Option<PathBuf>,

    /// 输出调试日志
    #[clap(short = 'v', long, global = true)]
    verbose: bool,

    /// 关闭控制台日志，改由日志订阅实时打印（与事件输出交错）
    #[clap(long, global = true)]
    follow_logs: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 用脚本化采样运行完整流程
    Simulate {
        /// 内置场景名（unresponsive / recovered）或场景 JSON 文件
        #[clap(short = 's', long, default_value = "unresponsive")]
        scenario: String,

        /// 覆盖倒计时时长（秒）
        #[clap(long)]
        countdown: Option<u32>,

        /// 覆盖采样间隔（毫秒）
        #[clap(long)]
        interval_ms: Option<u64>,

        /// 快速演示：6秒倒计时、每2秒升级提醒、采样间隔500ms
        #[clap(long)]
        speed_up: bool,

        /// 使用配置中的 HTTP 执行器和对话服务（默认只记录日志）
        #[clap(long)]
        live: bool,
    },

    /// 查看或修改配置
    Config {
        #[clap(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// 打印当前配置
    Show,
    /// 打印配置文件路径
    Path,
    /// 修改倒计时参数
    Set {
        #[clap(long)]
        countdown: Option<u32>,
        #[clap(long)]
        escalation_interval: Option<u32>,
        #[clap(long)]
        cooldown_ms: Option<u64>,
        #[clap(long)]
        sample_interval_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let broadcaster = Arc::new(LogBroadcaster::new(256));
    broadcaster.set_enabled(cli.follow_logs);
    let log_follower = cli.follow_logs.then(|| follow_logs(&broadcaster));
    logger::init_with_broadcaster(
        broadcaster,
        cli.log_dir.clone().unwrap_or_else(logger::default_log_dir),
        level,
        !cli.follow_logs,
    )?;

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let event_bus = Arc::new(EventBus::new(64));
    let settings = SettingsManager::new(config_path)
        .await?
        .with_event_bus(event_bus.clone());

    match cli.command {
        Command::Simulate {
            scenario,
            countdown,
            interval_ms,
            speed_up,
            live,
        } => {
            let mut config = settings.get().await;
            if speed_up {
                config.emergency.countdown_duration = 6;
                config.emergency.escalation_interval = 2;
                config.sample_interval_ms = 500;
            }
            if let Some(countdown) = countdown {
                config.emergency.countdown_duration = countdown;
            }
            if let Some(interval) = interval_ms {
                config.sample_interval_ms = interval;
            }
            simulate(config, &scenario, live).await?;
        }
        Command::Config { action } => {
            let mut events = event_bus.subscribe();
            config_command(&settings, action).await?;
            while let Ok(event) = events.try_recv() {
                print_event(&event);
            }
        }
    }

    if let Some(follower) = log_follower {
        follower.abort();
    }
    Ok(())
}

/// 订阅日志推送并打印到标准输出
fn follow_logs(broadcaster: &LogBroadcaster) -> JoinHandle<()> {
    let mut logs = broadcaster.subscribe();
    tokio::spawn(async move {
        loop {
            match logs.recv().await {
                Ok(log) => println!("{}", log),
                Err(RecvError::Lagged(n)) => println!("(日志输出落后，丢弃 {} 条)", n),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn simulate(config: PersistedConfig, scenario: &str, live: bool) -> Result<()> {
    config.validate()?;

    let scenario = match Scenario::builtin(scenario) {
        Some(builtin) => builtin,
        None => Scenario::load(&PathBuf::from(scenario)).await?,
    };

    let app = if live {
        GuardApp::start(&config)?
    } else {
        let provider: Arc<dyn ChatProvider> = Arc::new(OfflineChatProvider);
        GuardApp::start_with(&config, Effectors::logging(), provider)
    };

    let mut events = app.event_bus.subscribe();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let printer = tokio::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => print_event(&event),
                    Err(RecvError::Lagged(n)) => tracing::warn!("事件输出落后，丢弃 {} 条", n),
                    Err(RecvError::Closed) => break,
                },
                _ = &mut stop_rx => {
                    // 打印停止前已发布的剩余事件
                    while let Ok(event) = events.try_recv() {
                        print_event(&event);
                    }
                    break;
                }
            }
        }
    });

    let sampler = ScriptedSampler::new(scenario, config.sample_interval_ms);
    sampler.run(app.sample_sender()).await?;

    let emergency = app.emergency.clone();
    let responder = app.responder.clone();
    app.shutdown().await?;

    // 监测结束后所有采样都已处理，对应事件已发布
    let state = emergency.state().await?;
    let history = responder.history().await?;
    let _ = stop_tx.send(());
    printer
        .await
        .map_err(|e| anyhow!("事件输出任务异常退出: {}", e))?;

    println!(
        "结束状态: phase={:?} countdown={} notified={}",
        state.phase, state.countdown_seconds, state.notification_sent
    );
    println!("智能回复: {} 条", history.responses.len());
    Ok(())
}

fn print_event(event: &AppEvent) {
    match event {
        AppEvent::SampleReceived {
            emotion,
            attention_score,
            ..
        } => println!("[采样] {} ({})", emotion, attention_score),
        AppEvent::CountdownStarted {
            countdown_seconds, ..
        } => println!("[紧急] 倒计时开始: {}秒", countdown_seconds),
        AppEvent::CountdownTick { remaining, .. } => println!("[紧急] 剩余 {}秒", remaining),
        AppEvent::EscalationAlert { message, .. } => println!("[紧急] {}", message),
        AppEvent::EmergencyNotified {
            location,
            contact_count,
            ..
        } => println!(
            "[紧急] 已通知 {} 个联系人, 位置: {}",
            contact_count,
            location
                .map(|l| format!("{:.5}, {:.5}", l.latitude, l.longitude))
                .unwrap_or_else(|| "未知".to_string())
        ),
        AppEvent::EmergencyCancelled { remaining, .. } => {
            println!("[紧急] 驾驶员已响应 (剩余 {}秒)", remaining)
        }
        AppEvent::EmergencyReset => println!("[紧急] 已重置"),
        AppEvent::ResponseGenerated {
            response_type,
            message,
            from_fallback,
            ..
        } => println!(
            "[回复:{}{}] {}",
            response_type,
            if *from_fallback { "/兜底" } else { "" },
            message
        ),
        AppEvent::ConfigUpdated { config_type } => println!("[配置] {} 已更新", config_type),
    }
}

async fn config_command(settings: &SettingsManager, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = settings.get().await;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", settings.path().display());
        }
        ConfigAction::Set {
            countdown,
            escalation_interval,
            cooldown_ms,
            sample_interval_ms,
        } => {
            if countdown.is_none()
                && escalation_interval.is_none()
                && cooldown_ms.is_none()
                && sample_interval_ms.is_none()
            {
                return Err(anyhow!("没有需要修改的配置项"));
            }
            let updated = settings
                .update(ConfigUpdate {
                    sample_interval_ms,
                    countdown_duration: countdown,
                    retrigger_cooldown_ms: cooldown_ms,
                    escalation_interval,
                    ..Default::default()
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
    }
    Ok(())
}
