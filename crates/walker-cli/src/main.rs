use std::env;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use walker_core::{
    Action, ConfigStore, Dispatcher, IconSet, IconTheme, NoProcessIcons, QueryEnv, ResultItem,
    ResultList, effective_options, load_context_menus, run_query,
};

mod actions;

#[derive(Debug, Parser)]
#[command(author, version, about = "Project-walker launcher CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render the result list for a raw query string.
    Query {
        /// Raw query text: free-text search, `-o <path>`, or `-c`.
        #[arg(long, short, default_value = "", allow_hyphen_values = true)]
        search: String,
        /// Output mode (`items-json`, `json`, `human`).
        #[arg(long, value_enum, default_value_t = OutputModeArg::ItemsJson)]
        output: OutputModeArg,
    },
    /// Render secondary actions for a selected result's raw search text.
    ContextMenu {
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        search: String,
        #[arg(long, value_enum, default_value_t = OutputModeArg::ItemsJson)]
        output: OutputModeArg,
    },
    /// Resolve one configured option against a project path and execute it.
    Run {
        /// Absolute project path, or a path relative to the base path.
        #[arg(long)]
        path: PathBuf,
        /// Name of the configured open option to execute.
        #[arg(long)]
        option: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputModeArg {
    /// Bare result-list JSON the host consumes directly.
    ItemsJson,
    /// Service envelope JSON.
    Json,
    /// Plain text, one result per line.
    Human,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    User,
    Runtime,
}

#[derive(Debug)]
struct AppError {
    kind: ErrorKind,
    code: &'static str,
    message: String,
}

impl AppError {
    fn user(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::User,
            code,
            message: message.into(),
        }
    }

    fn runtime(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            code,
            message: message.into(),
        }
    }

    fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::User => 2,
            ErrorKind::Runtime => 1,
        }
    }
}

const ERROR_CODE_USER_CONFIG: &str = "user.config_load";
const ERROR_CODE_USER_INVALID_PATH: &str = "user.invalid_path";
const ERROR_CODE_USER_UNKNOWN_OPTION: &str = "user.unknown_option";
const ERROR_CODE_USER_OPTION_SKIPPED: &str = "user.option_not_applicable";
const ERROR_CODE_RUNTIME_SERIALIZE: &str = "runtime.serialize_failed";
const ERROR_CODE_RUNTIME_ACTION: &str = "runtime.action_failed";

/// Process-wide state for one invocation: the loaded config store plus the
/// ambient bits queries need.
struct Runtime {
    store: ConfigStore,
    icons: IconSet,
    home: String,
}

impl Runtime {
    fn from_env() -> Result<Self, AppError> {
        let config_path = walker_core::default_config_path();
        let store = ConfigStore::open(config_path)
            .map_err(|err| AppError::user(ERROR_CODE_USER_CONFIG, err.to_string()))?;

        let theme = env::var("WALKER_THEME")
            .ok()
            .and_then(|raw| IconTheme::parse(&raw))
            .unwrap_or_default();
        let icons = IconSet::new(store.icon_dir(), theme);
        let home = env::var("HOME").unwrap_or_default();

        Ok(Self { store, icons, home })
    }

    fn query_env(&self) -> QueryEnv<'_> {
        QueryEnv {
            config: self.store.config(),
            config_path: self.store.path(),
            icons: &self.icons,
            process_icons: &NoProcessIcons,
            home: &self.home,
        }
    }
}

impl Cli {
    fn command_name(&self) -> &'static str {
        match &self.command {
            Commands::Query { .. } => "walker.query",
            Commands::ContextMenu { .. } => "walker.context-menu",
            Commands::Run { .. } => "walker.run",
        }
    }

    fn output_mode_hint(&self) -> OutputModeArg {
        match &self.command {
            Commands::Query { output, .. } | Commands::ContextMenu { output, .. } => *output,
            Commands::Run { .. } => OutputModeArg::Human,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command_name();
    let output_mode = cli.output_mode_hint();

    let mut runtime = match Runtime::from_env() {
        Ok(runtime) => runtime,
        Err(err) => {
            emit_error(command, output_mode, &err);
            std::process::exit(err.exit_code());
        }
    };

    match run_with(cli, &mut runtime, actions::execute) {
        Ok(stdout) => println!("{stdout}"),
        Err(err) => {
            emit_error(command, output_mode, &err);
            std::process::exit(err.exit_code());
        }
    }
}

fn run_with<Exec>(cli: Cli, runtime: &mut Runtime, execute: Exec) -> Result<String, AppError>
where
    Exec: Fn(&Action) -> Result<String, String>,
{
    match cli.command {
        Commands::Query { search, output } => {
            let list = run_query(&runtime.query_env(), &search);
            render_list("walker.query", output, &list)
        }
        Commands::ContextMenu { search, output } => {
            let selected = ResultItem::new(search.clone()).with_context_data(search);
            let list = ResultList::new(load_context_menus(&selected, &runtime.icons));
            render_list("walker.context-menu", output, &list)
        }
        Commands::Run { path, option } => {
            let resolved = resolve_project_path(runtime, &path);
            if !resolved.is_dir() {
                return Err(AppError::user(
                    ERROR_CODE_USER_INVALID_PATH,
                    format!("path is not a directory: {}", resolved.to_string_lossy()),
                ));
            }

            let action = build_action(runtime, &resolved, &option)?;
            if action == Action::ReloadConfig {
                runtime
                    .store
                    .reload()
                    .map_err(|err| AppError::user(ERROR_CODE_USER_CONFIG, err.to_string()))?;
                return Ok("config reloaded".to_string());
            }

            execute(&action).map_err(|message| {
                AppError::runtime(ERROR_CODE_RUNTIME_ACTION, message)
            })
        }
    }
}

/// A relative `--path` is taken against the configured base path, the same
/// way the `-o` query prefix resolves.
fn resolve_project_path(runtime: &Runtime, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    runtime
        .store
        .config()
        .expanded_base_path(&runtime.home)
        .join(path)
}

fn build_action(runtime: &Runtime, path: &Path, option_name: &str) -> Result<Action, AppError> {
    let config = runtime.store.config();
    let base = config.expanded_base_path(&runtime.home);

    let repo = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string());
    let parent = path
        .parent()
        .filter(|parent| *parent != base.as_path())
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string());

    let options = effective_options(config, parent.as_deref(), repo.as_deref());
    let max_index = options.iter().map(|option| option.index).max().unwrap_or(0);
    let option = options
        .iter()
        .find(|candidate| candidate.name == option_name)
        .ok_or_else(|| {
            AppError::user(
                ERROR_CODE_USER_UNKNOWN_OPTION,
                format!("no open option named '{option_name}'"),
            )
        })?;

    let dispatcher = Dispatcher {
        icons: &runtime.icons,
        process_icons: &NoProcessIcons,
        try_extract_process_icons: config.try_extract_process_icons,
    };

    let item = dispatcher
        .build_option(option, max_index, path, "")
        .map_err(|skip| {
            AppError::user(
                ERROR_CODE_USER_OPTION_SKIPPED,
                format!("option '{option_name}' produced no result: {skip}"),
            )
        })?;

    item.action.ok_or_else(|| {
        AppError::user(
            ERROR_CODE_USER_OPTION_SKIPPED,
            format!("option '{option_name}' produced no action"),
        )
    })
}

#[derive(Debug, Serialize)]
struct ServiceErrorEnvelope {
    code: &'static str,
    message: String,
    details: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ServiceEnvelope {
    schema_version: &'static str,
    command: &'static str,
    ok: bool,
    result: Option<Value>,
    error: Option<ServiceErrorEnvelope>,
}

fn render_list(
    command: &'static str,
    output: OutputModeArg,
    list: &ResultList,
) -> Result<String, AppError> {
    match output {
        OutputModeArg::ItemsJson => list.to_json().map_err(|err| {
            AppError::runtime(
                ERROR_CODE_RUNTIME_SERIALIZE,
                format!("failed to serialize result list: {err}"),
            )
        }),
        OutputModeArg::Json => {
            let result = serde_json::to_value(list).map_err(|err| {
                AppError::runtime(
                    ERROR_CODE_RUNTIME_SERIALIZE,
                    format!("failed to serialize result list: {err}"),
                )
            })?;
            serde_json::to_string(&ServiceEnvelope {
                schema_version: "v1",
                command,
                ok: true,
                result: Some(result),
                error: None,
            })
            .map_err(|err| {
                AppError::runtime(
                    ERROR_CODE_RUNTIME_SERIALIZE,
                    format!("failed to serialize service envelope: {err}"),
                )
            })
        }
        OutputModeArg::Human => Ok(render_human(list)),
    }
}

fn render_human(list: &ResultList) -> String {
    if list.items.is_empty() {
        return "No results".to_string();
    }

    let mut lines = Vec::with_capacity(list.items.len());
    for item in &list.items {
        match &item.subtitle {
            Some(subtitle) => lines.push(format!("{} | {}", item.title, subtitle)),
            None => lines.push(item.title.clone()),
        }
    }
    lines.join("\n")
}

fn emit_error(command: &'static str, output_mode: OutputModeArg, error: &AppError) {
    match output_mode {
        OutputModeArg::Json => {
            let envelope = ServiceEnvelope {
                schema_version: "v1",
                command,
                ok: false,
                result: None,
                error: Some(ServiceErrorEnvelope {
                    code: error.code,
                    message: error.message.clone(),
                    details: Some(serde_json::json!({
                        "kind": match error.kind {
                            ErrorKind::User => "user",
                            ErrorKind::Runtime => "runtime",
                        },
                        "exit_code": error.exit_code(),
                    })),
                }),
            };
            match serde_json::to_string(&envelope) {
                Ok(body) => println!("{body}"),
                Err(_) => eprintln!("error[{}]: {}", error.code, error.message),
            }
        }
        OutputModeArg::ItemsJson | OutputModeArg::Human => {
            eprintln!("error[{}]: {}", error.code, error.message);
        }
    }
}
