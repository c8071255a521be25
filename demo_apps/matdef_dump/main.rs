//! Material definition dump tool.
//!
//! ```text
//! matdef_dump <file> [--json] [--define NAME]... [--all-params]
//! ```
//!
//! Prints every generated stage of every sub-technology. By default each
//! stage gets the guard macros of the parameters it references; `--define`
//! adds parameters by name and `--all-params` enables all of them. `--json`
//! prints the compiled artifact instead.
//!
//! Set `RUST_LOG=debug` to trace the compiler.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use matdef::{MaterialDefinition, ShaderDefines};

#[derive(Debug, Default)]
struct Cli {
    input: Option<PathBuf>,
    json: bool,
    all_params: bool,
    defines: Vec<String>,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => cli.json = true,
            "--all-params" => cli.all_params = true,
            "--define" => {
                let Some(v) = args.get(i + 1) else {
                    bail!("missing value for --define");
                };
                cli.defines.push(v.clone());
                i += 1;
            }
            other if other.starts_with("--") => {
                bail!("unknown argument: {other} (supported: --json, --define <name>, --all-params)");
            }
            path => {
                if cli.input.replace(PathBuf::from(path)).is_some() {
                    bail!("only one input file is supported");
                }
            }
        }
        i += 1;
    }
    Ok(cli)
}

fn stage_defines(def: &MaterialDefinition, stage: &matdef::StageSource, cli: &Cli) -> ShaderDefines {
    let mut defines = if cli.all_params {
        def.defines_for(def.parameters().iter().map(matdef::Parameter::name))
    } else {
        stage.parameter_defines(def.parameters())
    };
    defines.merge(&def.defines_for(cli.defines.iter().map(String::as_str)));
    defines
}

fn print_definition(def: &MaterialDefinition, cli: &Cli) {
    println!("// Material: {}", def.name());
    for param in def.parameters() {
        match param.default_value() {
            Some(value) => println!("//   param {} {} = {}", param.declared_type(), param.name(), value),
            None => println!("//   param {} {}", param.declared_type(), param.name()),
        }
    }

    for tech in def.sub_technologies() {
        println!();
        println!("// ===== SubTechnology {} =====", tech.name());
        println!("//   parameters: {:?}", tech.used_parameters());
        println!("//   contexts:   {:?}", tech.used_contexts());
        for stage in tech.stages() {
            println!();
            println!("// ----- {} stage -----", stage.kind());
            print!("{}", stage.with_defines(&stage_defines(def, stage, cli)));
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&args)?;
    let input = cli
        .input
        .as_ref()
        .ok_or_else(|| anyhow!("usage: matdef_dump <file> [--json] [--define NAME]... [--all-params]"))?;

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let def = matdef::compile(&text).with_context(|| format!("failed to compile {}", input.display()))?;

    if def.ignored_trailing_lines() > 0 {
        log::warn!(
            "{}: {} trailing line(s) ignored",
            input.display(),
            def.ignored_trailing_lines()
        );
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&def)?);
    } else {
        print_definition(&def, &cli);
    }
    Ok(())
}
