use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use rmmv_localizer::{
    FsLanguageStore, GameDatabase, GenerationPolicy, InjectionReport, LanguageConfig, LanguageSession,
    LanguageStore, DATA_DIR,
};

/// 未指定 --config 时在项目根目录查找的配置文件
const CONFIG_FILE: &str = "languages.json";

#[derive(Parser)]
#[command(name = "rmmv_localizer")]
#[command(about = "提取 RPG Maker MV 项目中的可翻译文本，并将翻译写回游戏数据")]
#[command(version = "0.1.0")]
struct Cli {
    /// 项目根目录（包含 data/ 目录）
    #[arg(short, long)]
    project: PathBuf,

    /// 本地化配置文件（默认为项目根目录下的 languages.json）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 语言文档目录（覆盖配置，相对于项目根目录）
    #[arg(long)]
    languages_dir: Option<PathBuf>,

    /// 应用翻译模式：将指定语言写入游戏数据
    #[arg(long)]
    apply: Option<String>,

    /// 应用翻译的输出目录（默认为 data_<语言>）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 忽略生成策略，强制重新提取默认语言文档
    #[arg(long)]
    force: bool,

    /// 显示各语言文档的统计信息
    #[arg(long)]
    stats: bool,

    /// 静默模式(仅输出错误)
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        tracing_subscriber::fmt::init();
    }

    validate_project(&cli.project)?;
    let config = load_config(&cli)?;
    let store = FsLanguageStore::new(cli.project.join(&config.languages_dir));

    if cli.stats {
        return handle_stats(&cli, config, &store);
    }

    if let Some(language) = &cli.apply {
        return handle_apply(&cli, config, &store, language);
    }

    // 默认模式：生成语言文档
    handle_generate(&cli, config, &store)
}

/// 验证项目目录
fn validate_project(project: &Path) -> anyhow::Result<()> {
    let data_dir = project.join(DATA_DIR);
    if !data_dir.is_dir() {
        bail!("项目目录中没有 data 目录: {:?}", data_dir);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<LanguageConfig> {
    let mut config = match &cli.config {
        Some(path) => LanguageConfig::from_json_file(path)
            .with_context(|| format!("无法读取配置文件 {:?}", path))?,
        None => {
            let path = cli.project.join(CONFIG_FILE);
            if path.exists() {
                LanguageConfig::from_json_file(&path)
                    .with_context(|| format!("无法读取配置文件 {:?}", path))?
            } else {
                LanguageConfig::default()
            }
        }
    };

    if let Some(dir) = &cli.languages_dir {
        config.languages_dir = dir.clone();
    }
    if cli.force {
        config.generation_policy = GenerationPolicy::Always;
    }

    Ok(config)
}

/// 处理文档生成
fn handle_generate(cli: &Cli, config: LanguageConfig, store: &FsLanguageStore) -> anyhow::Result<()> {
    let data_dir = cli.project.join(DATA_DIR);
    let database = GameDatabase::load(&data_dir)
        .with_context(|| format!("无法加载游戏数据 {:?}", data_dir))?;

    let mut session = LanguageSession::new(config);
    let generation = session
        .generate_documents(&database, store)
        .context("生成语言文档失败")?;

    if !cli.quiet {
        if generation.extracted {
            let default_language = &session.config().default_language;
            println!("已提取默认语言文档: {:?}", store.document_path(default_language));
            if let Some(document) = session.document(default_language) {
                println!("  {}", document.stats());
            }
        } else {
            println!("默认语言文档未重新生成（策略: {:?}）", session.config().generation_policy);
        }
        for language in &generation.seeded {
            println!("已创建语言文档: {:?}", store.document_path(language));
        }
    }

    Ok(())
}

/// 处理翻译应用
fn handle_apply(cli: &Cli, config: LanguageConfig, store: &FsLanguageStore, language: &str) -> anyhow::Result<()> {
    let Some(index) = config.position(language) else {
        bail!("配置中没有语言 '{}'", language);
    };

    let data_dir = cli.project.join(DATA_DIR);
    let mut database = GameDatabase::load(&data_dir)
        .with_context(|| format!("无法加载游戏数据 {:?}", data_dir))?;

    let mut session = LanguageSession::new(config);
    session.load_languages(store);
    session.select(index);

    let report = session.apply(&mut database);
    if session.applied_language() != Some(language) {
        bail!("语言 '{}' 没有可用的文档: {:?}", language, store.document_path(language));
    }

    let output_dir = get_apply_output_path(cli, language);
    database
        .save(&output_dir)
        .with_context(|| format!("无法写入游戏数据 {:?}", output_dir))?;

    if !cli.quiet {
        print_apply_summary(language, &report, &output_dir);
    }

    Ok(())
}

/// 处理统计信息显示
fn handle_stats(cli: &Cli, config: LanguageConfig, store: &FsLanguageStore) -> anyhow::Result<()> {
    let mut session = LanguageSession::new(config);
    session.load_languages(store);

    for entry in session.languages() {
        match session.document(&entry.language) {
            Some(document) => println!("{} ({}): {}", entry.language, entry.label, document.stats()),
            None => println!("{} ({}): 没有文档", entry.language, entry.label),
        }
    }

    if !cli.quiet {
        println!("语言文档目录: {:?}", store.root());
    }

    Ok(())
}

fn print_apply_summary(language: &str, report: &InjectionReport, output_dir: &Path) {
    println!("已应用语言 '{}'", language);
    println!("  写入字段: {}", report.fields_written);
    println!("  写入指令: {}", report.commands_written);

    if !report.is_clean() {
        println!("  跳过的条目: {}", report.anomalies.len());
        for anomaly in report.anomalies.iter().take(10) {
            println!("    - {}", anomaly);
        }
        if report.anomalies.len() > 10 {
            println!("    ... 另有 {} 条", report.anomalies.len() - 10);
        }
    }

    println!("结果已写入: {:?}", output_dir);
}

/// 获取翻译输出目录
fn get_apply_output_path(cli: &Cli, language: &str) -> PathBuf {
    cli.output
        .clone()
        .unwrap_or_else(|| cli.project.join(format!("{}_{}", DATA_DIR, language)))
}
