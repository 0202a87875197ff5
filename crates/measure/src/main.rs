use measure_tools_lib::command::{execute_json_batch, CommandResponse};
use measure_tools_lib::harness::MeasureHarness;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "measure_cli=info,measure_tools_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("usage: measure-cli --commands <file.json> [--load <measurements.json>]");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

struct Args {
    commands: String,
    load: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut commands = None;
    let mut load = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--commands" if i + 1 < args.len() => {
                commands = Some(args[i + 1].clone());
                i += 1;
            }
            "--load" if i + 1 < args.len() => {
                load = Some(args[i + 1].clone());
                i += 1;
            }
            other => return Err(format!("Unexpected argument {other:?}")),
        }
        i += 1;
    }
    Ok(Args {
        commands: commands.ok_or("Missing --commands <file>")?,
        load,
    })
}

fn run(args: &Args) -> Result<(), String> {
    let mut harness = MeasureHarness::new();

    if let Some(path) = &args.load {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read measurements file {path}: {e}"))?;
        let count = harness.load_json(&json)?;
        tracing::info!("Loaded {count} measurements from {path}");
    }

    let json = std::fs::read_to_string(&args.commands)
        .map_err(|e| format!("Failed to read commands file {}: {e}", args.commands))?;
    let responses: Vec<CommandResponse> = execute_json_batch(&mut harness, &json)?;
    let failed = responses.iter().filter(|r| !r.success).count();

    let out = serde_json::to_string_pretty(&responses)
        .map_err(|e| format!("Failed to serialize responses: {e}"))?;
    println!("{out}");

    tracing::info!(commands = responses.len(), failed, "Done");
    harness.ctx.shutdown();
    Ok(())
}
