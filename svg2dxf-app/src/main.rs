use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use svg2dxf_config::{AppConfig, ConfigError, DegeneratePolicy};
use svg2dxf_engine::Converter;
use svg2dxf_io::{DocumentSaver, DxfFacade, SourceLoader, SvgLoader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// 将 IFC 导出的 SVG 剖面图转换为 DXF。
#[derive(Debug, Parser)]
#[command(name = "svg2dxf", version, about)]
struct Args {
    /// 输入 SVG 文件
    input: PathBuf,
    /// 输出 DXF 文件，默认与输入同名
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// 配置文件路径，覆盖自动发现
    #[arg(long)]
    config: Option<PathBuf>,
    /// 不转换 `<line>` 元素
    #[arg(long)]
    no_lines: bool,
    /// 不转换 `<text>` 元素
    #[arg(long)]
    no_texts: bool,
    /// 遇到退化分组时中止转换
    #[arg(long)]
    strict: bool,
}

fn main() {
    let args = Args::parse();
    let (mut config, discovery_error) = match load_configuration(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => {
            init_logging(&AppConfig::default());
            error!(error = %err, "加载配置失败");
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    };
    init_logging(&config);
    if let Some(err) = discovery_error {
        report_discovery_failure(&err);
    }
    apply_overrides(&mut config, &args);

    if let Err(err) = run(&args, &config) {
        error!(error = %err, "转换失败");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("dxf"));
    info!(input = %args.input.display(), output = %output.display(), "开始转换");

    let loader = SvgLoader::with_identifier_attribute(
        config.conversion.identifier_attribute.as_str(),
    );
    let drawing = loader
        .load(&args.input)
        .with_context(|| format!("无法读取 {}", args.input.display()))?;

    let mut converter = Converter::new(config.conversion.clone());
    converter.convert(&drawing)?;
    let (document, report) = converter.into_parts();

    for diagnostic in &report.diagnostics {
        warn!(
            index = diagnostic.group_index,
            element = diagnostic.element_id.as_deref().unwrap_or("-"),
            error = %diagnostic.error,
            "分组已跳过"
        );
    }

    DxfFacade::new()
        .save(&document, &output)
        .with_context(|| format!("无法写出 {}", output.display()))?;

    println!(
        "{} -> {}: {} layers, {} blocks, {} entities, {} diagnostics",
        args.input.display(),
        output.display(),
        document.layers().count(),
        document.blocks().count(),
        document.entities().count(),
        report.diagnostics.len()
    );
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if args.no_lines {
        config.conversion.convert_lines = false;
    }
    if args.no_texts {
        config.conversion.convert_texts = false;
    }
    if args.strict {
        config.conversion.degenerate_groups = DegeneratePolicy::Error;
    }
}

/// 显式指定的配置加载失败时直接返回错误；自动发现失败则回退到默认值，
/// 并把错误留到日志初始化之后再输出。
fn load_configuration(
    override_path: Option<&Path>,
) -> Result<(AppConfig, Option<ConfigError>)> {
    match override_path {
        Some(path) => {
            let config = AppConfig::from_file(path)
                .with_context(|| format!("无法加载配置 {}", path.display()))?;
            Ok((config, None))
        }
        None => match AppConfig::discover() {
            Ok(cfg) => Ok((cfg, None)),
            Err(err) => Ok((AppConfig::default(), Some(err))),
        },
    }
}

fn report_discovery_failure(err: &ConfigError) {
    match err {
        ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
            warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
        }
        ConfigError::Context { .. } => {
            warn!(error = %err, "加载默认配置失败，使用内建默认值");
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
