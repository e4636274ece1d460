// mimatty: Time-Travel Debugger for the Mima with Memory Visualization

mod machine;
mod parser;
mod timeline;
mod ui;

use std::fs;
use std::io;
use std::path::Path;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use machine::exec::{Executor, DEFAULT_MAX_STEPS};
use machine::state::{ACCU, IAR};
use machine::to_signed;
use timeline::Timeline;
use ui::App;

struct Options {
    file: String,
    headless: bool,
    max_steps: usize,
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} <file.mima> [--run] [--max-steps N]", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --run           execute and print the final state, no TUI");
    eprintln!("  --max-steps N   step limit for non-halting programs (default {})", DEFAULT_MAX_STEPS);
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} demos/sum.mima          # Step through the sum example", program_name);
    eprintln!("  {} myprogram.mima --run    # Headless run", program_name);
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut file = None;
    let mut headless = false;
    let mut max_steps = DEFAULT_MAX_STEPS;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--run" => headless = true,
            "--max-steps" => {
                i += 1;
                let value = args.get(i).ok_or("--max-steps requires a value")?;
                max_steps = value
                    .parse()
                    .map_err(|_| format!("invalid step count '{}'", value))?;
            }
            arg if arg.starts_with("--") => {
                return Err(format!("unknown option '{}'", arg));
            }
            arg => {
                if file.replace(arg.to_string()).is_some() {
                    return Err("more than one input file given".to_string());
                }
            }
        }
        i += 1;
    }

    let file = file.ok_or("No input file provided")?;
    Ok(Options {
        file,
        headless,
        max_steps,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("mimatty");

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            print_usage(program_name);
            std::process::exit(1);
        }
    };

    if !Path::new(&options.file).exists() {
        eprintln!("Error: File '{}' not found", options.file);
        print_usage(program_name);
        std::process::exit(1);
    }

    // Read and assemble the source
    let source = fs::read_to_string(&options.file)?;

    eprintln!("Assembling {}...", options.file);
    let program = match parser::assembler::assemble(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    eprintln!(
        "Assembled successfully. {} commands, {} labels.",
        program.commands.len(),
        program.label_map.len()
    );

    // Run the forward pass once to build the delta log
    eprintln!("Executing program...");
    let mut executor = Executor::new(&program);
    match executor.run(options.max_steps) {
        Ok(()) => {
            eprintln!("Execution halted after {} steps.", executor.steps());
        }
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            if options.headless {
                std::process::exit(1);
            }
            eprintln!("Entering TUI with partial execution history...");
        }
    }

    let mut timeline = Timeline::new(
        executor.into_log(),
        source,
        program.label_map,
        program.commands,
        &program.initial_values,
    );

    if options.headless {
        print_final_state(&mut timeline);
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(timeline);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Navigate to the last step and print registers and memory to stdout.
fn print_final_state(timeline: &mut Timeline) {
    timeline.set_position(timeline.count_steps() as i64);

    let accu = timeline.get(ACCU);
    let iar = timeline.get(IAR);
    println!("Steps: {}", timeline.count_steps());
    println!("ACCU:  0x{:06X} ({})", accu, to_signed(accu));
    println!("IAR:   0x{:05X}", iar);
    for address in timeline.memory_addresses() {
        let value = timeline.get(address);
        match timeline.name_for(address) {
            Some(label) => println!(
                "0x{:05X}  0x{:06X} ({})  {}",
                address,
                value,
                to_signed(value),
                label
            ),
            None => println!("0x{:05X}  0x{:06X} ({})", address, value, to_signed(value)),
        }
    }
}
