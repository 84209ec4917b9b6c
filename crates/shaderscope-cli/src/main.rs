use anyhow::{Context, Result};
use shaderscope_config::Config;
use shaderscope_engine::{Source, settings_for_path};
use shaderscope_syntax::{Profile, Settings, ShaderType, Snapshot};
use std::{env, fs, path::PathBuf, process};

mod report;

const USAGE: &str = "\
Usage: shaderscope [options] <command> <file> [line:column]

Commands:
  tokens        every token with its position and kind
  tree          the syntax tree
  outline       declarations, locals indented
  diagnostics   syntax errors and a summary
  locate        what is at line:column and where it is declared

Options:
  --stage <name>      shader stage (vertex, fragment, ...); repeatable
  --profile <value>   GLSL profile, e.g. \"450 core\" or \"310 es\"
  -D <name[=value]>   predefined macro; repeatable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Tokens,
    Tree,
    Outline,
    Diagnostics,
    Locate,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "tokens" => Command::Tokens,
            "tree" => Command::Tree,
            "outline" => Command::Outline,
            "diagnostics" => Command::Diagnostics,
            "locate" => Command::Locate,
            _ => return None,
        })
    }
}

#[derive(Debug, PartialEq)]
struct Options {
    command: Command,
    path: PathBuf,
    line_col: Option<(usize, usize)>,
    stages: Vec<String>,
    profile: Option<String>,
    defines: Vec<String>,
}

fn parse_line_col(value: &str) -> Option<(usize, usize)> {
    let (line, col) = value.split_once(':')?;
    Some((line.parse().ok()?, col.parse().ok()?))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut stages = Vec::new();
    let mut profile = None;
    let mut defines = Vec::new();
    let mut positional = Vec::new();

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .cloned()
                .ok_or_else(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--stage" => stages.push(value("--stage")?),
            "--profile" => profile = Some(value("--profile")?),
            "-D" => defines.push(value("-D")?),
            other if other.starts_with("-D") && other.len() > 2 => {
                defines.push(other[2..].to_string())
            }
            other if other.starts_with('-') => return Err(format!("unknown option {other}")),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let command = positional.next().ok_or("missing command")?;
    let command =
        Command::from_name(&command).ok_or_else(|| format!("unknown command {command}"))?;
    let path = PathBuf::from(positional.next().ok_or("missing file")?);
    let line_col = match positional.next() {
        Some(value) => Some(
            parse_line_col(&value).ok_or_else(|| format!("expected line:column, got {value}"))?,
        ),
        None => None,
    };
    if command == Command::Locate && line_col.is_none() {
        return Err("locate needs a line:column".to_string());
    }
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument {extra}"));
    }

    Ok(Options {
        command,
        path,
        line_col,
        stages,
        profile,
        defines,
    })
}

/// Config-derived settings with the command line applied on top.
fn settings(config: &Config, options: &Options) -> Result<Settings> {
    let mut settings = settings_for_path(config, &options.path);
    if !options.stages.is_empty() {
        let mut shader_type = ShaderType::empty();
        for stage in &options.stages {
            shader_type |= ShaderType::from_stage_name(stage)
                .with_context(|| format!("unknown shader stage '{stage}'"))?;
        }
        settings.shader_type = shader_type;
    }
    if let Some(profile) = &options.profile {
        settings.profile = profile
            .parse::<Profile>()
            .with_context(|| format!("invalid profile '{profile}'"))?;
    }
    settings
        .predefined_macros
        .extend(options.defines.iter().cloned());
    Ok(settings)
}

fn run(options: &Options) -> Result<String> {
    let config = Config::load()?.unwrap_or_default();
    let level = config.log_level_filter()?;
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let text = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read {}", options.path.display()))?;
    let settings = settings(&config, options)?;
    log::debug!(
        "{}: stages {:?}, profile {}",
        options.path.display(),
        settings.shader_type,
        settings.profile
    );

    let source = Source::new(&text, settings);
    let analysis = source.reparse();
    let tree = analysis.tree();
    log::info!(
        "parsed {} in {:?}, {} error(s)",
        options.path.display(),
        analysis.elapsed(),
        tree.errors().len()
    );

    Ok(match options.command {
        Command::Tokens => report::tokens(tree),
        Command::Tree => tree.debug_tree(),
        Command::Outline => report::outline(tree),
        Command::Diagnostics => {
            report::diagnostics(tree, &options.path.display().to_string())
        }
        Command::Locate => {
            let (line, col) = options.line_col.unwrap_or((1, 1));
            let snapshot = analysis.snapshot();
            let position = report::position_of(snapshot.as_ref(), line, col)
                .with_context(|| {
                    format!(
                        "line {line} is past the end ({} lines)",
                        snapshot.line_count()
                    )
                })?;
            report::locate(tree, position)
        }
    })
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    match run(&options) {
        Ok(output) => print!("{output}"),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}
