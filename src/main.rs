use clap::Parser;
use udcpr_intake::adapters::submit::DryRunSubmitter;
use udcpr_intake::config::SourceKind;
use udcpr_intake::domain::ports::{ReferenceSource, Submitter};
use udcpr_intake::utils::error::ErrorSeverity;
use udcpr_intake::utils::{logger, validation::Validate};
use udcpr_intake::{
    build_submitter, CliConfig, FormEvent, FormSchema, FormSession, HttpReferenceSource,
    IntakeConfig, IntakeEngine, IntakeError, LocalReferenceSource, ReferenceDataLoader,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 載入配置（命令列覆蓋檔案設定）
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            fail(&e);
        }
    };

    // 初始化日誌
    if cli.json_logs || config.json_logs() {
        logger::init_json_logger(if cli.verbose { "debug" } else { config.log_level() });
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting {}", config.form.name);
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let events = match read_events(&cli).await {
        Ok(events) => events,
        Err(e) => fail(&e),
    };

    let submitter: Box<dyn Submitter> = if cli.dry_run {
        tracing::info!("🧪 Dry run: payload will be printed, not posted");
        Box::new(DryRunSubmitter)
    } else {
        match build_submitter(
            config.submission.strategy,
            &config.submission.endpoint,
            config.timeout(),
        ) {
            Ok(submitter) => submitter,
            Err(e) => fail(&e),
        }
    };

    let result = match config.data.source {
        SourceKind::Http => match HttpReferenceSource::new(&config.data.location) {
            Ok(source) => run(source, submitter, &config, &events).await,
            Err(e) => Err(e),
        },
        SourceKind::Local => {
            let source = LocalReferenceSource::new(&config.data.location);
            run(source, submitter, &config, &events).await
        }
    };

    match result {
        Ok(()) if cli.dry_run => {
            tracing::info!("🧪 Dry run completed; nothing was posted");
            println!("🧪 Dry run: payload printed above, nothing was submitted");
        }
        Ok(()) => {
            tracing::info!("✅ Intake completed successfully!");
            println!("✅ Form submitted successfully!");
        }
        Err(e) => fail(&e),
    }
}

async fn run<S: ReferenceSource>(
    source: S,
    submitter: Box<dyn Submitter>,
    config: &IntakeConfig,
    events: &[FormEvent],
) -> udcpr_intake::Result<()> {
    let engine = IntakeEngine::new(ReferenceDataLoader::new(source, config.data.layout), submitter);
    let mut session = FormSession::new(FormSchema::udcpr(), config.session_options());

    let outcome = engine.run(&mut session, events).await;

    for notice in session.notices() {
        tracing::info!("📣 {:?}: {}", notice.level, notice.message);
    }
    for field in session.feedback().invalid_fields() {
        if let Some(feedback) = session.feedback().get(field) {
            eprintln!("  ✗ {}: {}", field, feedback.message);
        }
    }

    outcome.map(|_| ())
}

async fn read_events(cli: &CliConfig) -> udcpr_intake::Result<Vec<FormEvent>> {
    let Some(path) = &cli.events else {
        tracing::warn!("No events file given; submitting an empty form");
        return Ok(Vec::new());
    };
    tracing::info!("📁 Loading events from: {}", path.display());
    let content = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&content)?)
}

fn fail(e: &IntakeError) -> ! {
    tracing::error!(
        "❌ Intake failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
