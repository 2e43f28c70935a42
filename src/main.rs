use std::net::SocketAddr;
use std::sync::Arc;

use md2docx_backend_core::api::server::serve;
use md2docx_backend_core::config::port::{
    bind_host_from_env, port_override_from_env, select_listen_port,
};
use md2docx_backend_core::config::settings::{default_settings_path, load_settings_with_discovery};
use md2docx_backend_core::config::tool::{validate_template, validate_tool};
use md2docx_backend_core::config::{ConfigStore, SharedConfigStore};
use md2docx_backend_core::conversion::orchestrator::ConversionService;
use md2docx_backend_core::conversion::runner::StdToolCommandRunner;
use md2docx_backend_core::conversion::ConversionRequest;
use serde_json::json;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli_args = std::env::args().skip(1).collect::<Vec<_>>();
    if matches!(cli_args.first().map(String::as_str), Some("validate-config")) {
        run_validate_config_cli(cli_args.into_iter().skip(1).collect::<Vec<_>>())?;
        return Ok(());
    }
    if matches!(cli_args.first().map(String::as_str), Some("convert")) {
        let converted = run_convert_cli(cli_args.into_iter().skip(1).collect::<Vec<_>>())?;
        if !converted {
            std::process::exit(1);
        }
        return Ok(());
    }
    if cli_args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print_usage();
        return Ok(());
    }

    let config = open_config_store()?;
    let host = bind_host_from_env()?;
    let preferred = port_override_from_env().unwrap_or(config.snapshot().server_port);
    let port = select_listen_port(host, preferred)?;
    if port != preferred {
        info!(preferred, selected = port, "preferred port unavailable");
    }
    if let Err(error) = config.set_server_port(port) {
        warn!(%error, "failed to persist selected server port");
    }

    let settings = config.snapshot();
    match validate_tool(&settings.tool, &StdToolCommandRunner) {
        Ok(resolved) => info!(
            program = %resolved.program,
            version = %resolved.version,
            "conversion tool is available"
        ),
        Err(error) => warn!(
            tool_path = %settings.tool.tool_path,
            %error,
            "conversion tool is not usable; conversions will fail until it is configured"
        ),
    }

    serve(SocketAddr::new(host, port), config).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}

fn open_config_store() -> Result<SharedConfigStore, Box<dyn std::error::Error>> {
    let settings_path = default_settings_path();
    let settings = load_settings_with_discovery(settings_path.as_path())?;
    info!(
        path = %settings_path.display(),
        tool_path = %settings.tool.tool_path,
        "loaded settings"
    );
    Ok(Arc::new(ConfigStore::new(settings, settings_path)))
}

fn run_validate_config_cli(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print_validate_config_usage();
        return Ok(());
    }
    if let Some(unknown) = args.first() {
        return Err(std::io::Error::other(format!(
            "Unknown argument: {unknown}\n\nUse --help for usage."
        ))
        .into());
    }

    let config = open_config_store()?;
    let settings = config.snapshot();
    let tool = match validate_tool(&settings.tool, &StdToolCommandRunner) {
        Ok(resolved) => json!({
            "ok": true,
            "program": resolved.program,
            "version": resolved.version,
        }),
        Err(error) => json!({ "ok": false, "error": error.to_string() }),
    };
    let template = match validate_template(settings.tool.template_file.as_str()) {
        Ok(()) => json!({ "ok": true }),
        Err(error) => json!({ "ok": false, "error": error.to_string() }),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "success": tool["ok"] == json!(true) && template["ok"] == json!(true),
            "settings_path": config.settings_path().map(|path| path.display().to_string()),
            "pandoc_path": settings.tool.tool_path,
            "template_file": settings.tool.template_file,
            "pandoc": tool,
            "template": template,
        }))?
    );
    Ok(())
}

fn parse_convert_cli_args(args: &[String]) -> Result<ConversionRequest, Box<dyn std::error::Error>> {
    let mut input_file = None::<String>;
    let mut request = ConversionRequest::default();

    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        let needs_value = |idx: usize| -> Result<String, Box<dyn std::error::Error>> {
            let Some(value) = args.get(idx + 1) else {
                return Err(std::io::Error::other(format!("Missing value for {flag}")).into());
            };
            Ok(value.clone())
        };

        match flag {
            "--output-dir" => {
                request.output_dir = Some(needs_value(i)?);
                i += 2;
            }
            "--output-name" => {
                request.output_name = Some(needs_value(i)?);
                i += 2;
            }
            "--template" => {
                request.template_file = Some(needs_value(i)?);
                i += 2;
            }
            unknown if unknown.starts_with('-') => {
                return Err(std::io::Error::other(format!(
                    "Unknown argument: {unknown}\n\nUse --help for usage."
                ))
                .into());
            }
            positional => {
                if input_file.is_some() {
                    return Err(std::io::Error::other(format!(
                        "Unexpected extra input: {positional}\n\nUse --help for usage."
                    ))
                    .into());
                }
                input_file = Some(positional.to_string());
                i += 1;
            }
        }
    }

    request.input_file = input_file
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| std::io::Error::other("Missing required <input.md>"))?;
    Ok(request)
}

/// Returns whether the conversion succeeded.
fn run_convert_cli(args: Vec<String>) -> Result<bool, Box<dyn std::error::Error>> {
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print_convert_usage();
        return Ok(true);
    }
    let request = parse_convert_cli_args(args.as_slice())?;
    let config = open_config_store()?;
    let service = ConversionService::new(config, Arc::new(StdToolCommandRunner));
    let response = service.convert_single(&request);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.success)
}

fn print_usage() {
    eprintln!(concat!(
        "Usage:\n",
        "  md2docx-backend-core                 start the HTTP server\n",
        "  md2docx-backend-core validate-config check the configured pandoc and template\n",
        "  md2docx-backend-core convert <input.md> [options]\n\n",
        "Environment:\n",
        "  SERVER_PORT          preferred listening port (falls back to 8080-8090, then any free port)\n",
        "  MD2DOCX_BIND_HOST    bind host (default 127.0.0.1)\n",
        "  MD2DOCX_CONFIG_DIR   directory holding config.json (default ~/.md2docx)\n",
        "  RUST_LOG             log filter (default info)\n"
    ));
}

fn print_validate_config_usage() {
    eprintln!(concat!(
        "Usage:\n",
        "  md2docx-backend-core validate-config\n\n",
        "Loads config.json, checks that pandoc answers --version and that the\n",
        "default template (if any) is an existing .docx file.\n"
    ));
}

fn print_convert_usage() {
    eprintln!(
        concat!(
            "Usage:\n",
            "  md2docx-backend-core convert <input.md> ",
            "[--output-dir DIR] [--output-name NAME] [--template PATH]\n\n",
            "Defaults:\n",
            "  --output-dir defaults to the input file's directory\n",
            "  --output-name defaults to the input file name with a .docx extension\n",
            "  --template defaults to the configured template_file\n"
        )
    );
}
