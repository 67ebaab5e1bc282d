use std::env;
use std::fs;

use bfx_codegen::{Artifact, CompileOptions};
use bfx_vm::{Machine, MachineOptions};

/// Flags shared by `build` and `run`.
struct Options {
    source_path: String,
    output_path: Option<String>,
    compile: CompileOptions,
    symbols: bool,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut source_path = None;
    let mut output_path = None;
    let mut compile = CompileOptions::default();
    let mut symbols = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" => {
                let path = iter.next().ok_or("-o requires a path")?;
                output_path = Some(path.clone());
            }
            "--no-cancel" => compile.cancel_opposites = false,
            "--symbols" => symbols = true,
            "--max-size" => {
                let value = iter.next().ok_or("--max-size requires a number")?;
                compile.max_array_size = value
                    .parse()
                    .map_err(|_| format!("invalid --max-size '{}'", value))?;
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown option: {}", flag)),
            path => {
                if source_path.replace(path.to_string()).is_some() {
                    return Err("only one source file may be given".to_string());
                }
            }
        }
    }

    let source_path = source_path.ok_or("no source file given")?;
    compile.file = source_path.clone();
    Ok(Options {
        source_path,
        output_path,
        compile,
        symbols,
    })
}

fn compile(options: &Options) -> Result<Artifact, String> {
    let source = fs::read_to_string(&options.source_path)
        .map_err(|e| format!("Error reading file '{}': {}", options.source_path, e))?;

    // Step 1: Lex
    let mut lexer = bfx_lexer::Lexer::new(&source);
    let tokens = lexer.tokenize().map_err(|e| format!("{}", e))?;

    // Step 2: Parse
    let mut parser = bfx_parser::Parser::new(tokens);
    let program = parser.parse().map_err(|e| format!("{}", e))?;

    // Step 3: Codegen
    let mut compiler = bfx_codegen::Compiler::new(options.compile.clone());
    compiler.compile(program).map_err(|e| format!("{}", e))
}

fn default_output_path(source_path: &str) -> String {
    match source_path.strip_suffix(".bfx") {
        Some(stem) => format!("{}.bf", stem),
        None => format!("{}.bf", source_path),
    }
}

fn print_symbols(artifact: &Artifact, machine: Option<&Machine>) {
    for (name, addr) in &artifact.symbols {
        match machine {
            Some(machine) => println!("{:>12} @ {:<5} = {}", name, addr, machine.cell(*addr)),
            None => println!("{:>12} @ {}", name, addr),
        }
    }
}

fn cmd_build(options: &Options) {
    let artifact = match compile(options) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let output_path = options
        .output_path
        .clone()
        .unwrap_or_else(|| default_output_path(&options.source_path));

    match fs::write(&output_path, &artifact.code) {
        Ok(_) => println!(
            "Compiled {} -> {} ({} ops)",
            options.source_path,
            output_path,
            artifact.code.trim_end().len()
        ),
        Err(e) => {
            eprintln!("Error writing '{}': {}", output_path, e);
            std::process::exit(1);
        }
    }

    if options.symbols {
        print_symbols(&artifact, None);
    }
}

fn cmd_run(options: &Options) {
    let artifact = match compile(options) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut machine = Machine::new(MachineOptions::default());
    if let Err(e) = machine.run(&artifact.code) {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }

    let output = machine.output();
    if !output.is_empty() {
        println!("{}", String::from_utf8_lossy(output));
    }
    if options.symbols {
        print_symbols(&artifact, Some(&machine));
        println!("{} steps", machine.steps());
    }
}

fn print_usage() {
    eprintln!("bfx Compiler");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  bfx build <source.bfx> [options]   Compile to .bf");
    eprintln!("  bfx run <source.bfx> [options]     Compile and execute");
    eprintln!("  bfx <source.bfx> [options]         Compile to .bf (shorthand)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o <path>         Output path (default: source with .bf extension)");
    eprintln!("  --no-cancel       Keep opposite moves/increments in the output");
    eprintln!("  --symbols         Print the address (and, for run, value) of main's variables and the step count");
    eprintln!("  --max-size <n>    Largest variable size in cells (default 255)");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let (command, rest) = match args[1].as_str() {
        "build" | "run" => (args[1].as_str(), &args[2..]),
        "-h" | "--help" => {
            print_usage();
            return;
        }
        _ => ("build", &args[1..]),
    };

    let options = match parse_options(rest) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    match command {
        "run" => cmd_run(&options),
        _ => cmd_build(&options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_map_onto_compile_options() {
        let options = parse_options(&args(&[
            "prog.bfx",
            "-o",
            "out.bf",
            "--no-cancel",
            "--symbols",
            "--max-size",
            "16",
        ]))
        .unwrap();
        assert_eq!(options.source_path, "prog.bfx");
        assert_eq!(options.output_path.as_deref(), Some("out.bf"));
        assert!(!options.compile.cancel_opposites);
        assert!(options.symbols);
        assert_eq!(options.compile.max_array_size, 16);
        assert_eq!(options.compile.file, "prog.bfx");
    }

    #[test]
    fn bad_arguments() {
        assert!(parse_options(&args(&[])).is_err());
        assert!(parse_options(&args(&["a.bfx", "b.bfx"])).is_err());
        assert!(parse_options(&args(&["a.bfx", "--max-size", "many"])).is_err());
        assert!(parse_options(&args(&["a.bfx", "--frobnicate"])).is_err());
        assert!(parse_options(&args(&["a.bfx", "-o"])).is_err());
    }

    #[test]
    fn output_path_replaces_extension() {
        assert_eq!(default_output_path("dir/prog.bfx"), "dir/prog.bf");
        assert_eq!(default_output_path("prog"), "prog.bf");
    }
}
