// src/main.rs

use clap::Parser;
use log::info;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use results_grapher::controls::{parse_command, parse_date_time, parse_window, Command, WindowKind};
use results_grapher::crate_version;
use results_grapher::session::{GraphSession, Outcome, StatusMessage};

/// Graphs power target/prediction results with optional smoothing and anomaly bands.
#[derive(Parser)]
#[command(name = "results_grapher", version)]
#[command(about = "Graph power prediction results from a CSV file", long_about = None)]
struct Cli {
    /// Results file with columns Timestamp,Target,Prediction[,Anomaly]
    input: Option<PathBuf>,

    /// Start of the displayed range (inclusive)
    #[arg(long, value_name = "YYYY-MM-DD HH:MM:SS")]
    start: Option<String>,

    /// End of the displayed range (exclusive)
    #[arg(long, value_name = "YYYY-MM-DD HH:MM:SS")]
    end: Option<String>,

    /// Smooth target and prediction over this many minutes
    #[arg(long, value_name = "MINUTES")]
    smooth: Option<String>,

    /// Show anomaly bands over windows of this many minutes
    #[arg(long, value_name = "MINUTES")]
    anomalies: Option<String>,

    /// Directory the graph image is written to
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,

    /// Compute the graph without writing an image
    #[arg(long)]
    no_render: bool,

    /// Read commands from stdin after loading the input file
    #[arg(long, short = 'i')]
    interactive: bool,
}

fn print_status(message: &StatusMessage) {
    if message.is_error() {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

/// Loads the input, applies the options given on the command line and draws once.
/// Returns false if any step reported an error.
fn run_batch(session: &mut GraphSession, cli: &Cli) -> bool {
    let input = match &cli.input {
        Some(input) => input.clone(),
        None => {
            eprintln!("Usage: results_grapher <input_file.csv> [options], or --interactive");
            return false;
        }
    };

    if let Err(err) = session.load_file(&input) {
        print_status(&StatusMessage::error(&err));
        return false;
    }

    let mut commands = Vec::new();
    let mut ok = true;
    let mut push = |parsed: Result<Command, results_grapher::GraphError>| match parsed {
        Ok(command) => commands.push(command),
        Err(err) => {
            print_status(&StatusMessage::error(&err));
            ok = false;
        }
    };

    if let Some(start) = &cli.start {
        push(parse_date_time(start).map(Command::Start));
    }
    if let Some(end) = &cli.end {
        push(parse_date_time(end).map(Command::End));
    }
    if let Some(window) = &cli.smooth {
        push(parse_window(window, WindowKind::Smoothing).map(|w| Command::Smooth(Some(w))));
    }
    if let Some(window) = &cli.anomalies {
        push(parse_window(window, WindowKind::Anomaly).map(|w| Command::Anomalies(Some(w))));
    }
    commands.push(Command::Update);

    for command in commands {
        if let Outcome::Continue(message) = session.handle(command) {
            ok &= !message.is_error();
            print_status(&message);
        }
    }
    ok
}

/// Reads commands line by line until `quit` or end of input.
fn run_interactive(session: &mut GraphSession, cli: &Cli) -> Result<(), Box<dyn Error>> {
    if let Some(input) = &cli.input {
        if let Outcome::Continue(message) = session.handle(Command::Load(input.clone())) {
            print_status(&message);
        }
    }
    println!("Type 'help' for a list of commands.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            Ok(Some(command)) => match session.handle(command) {
                Outcome::Continue(message) => print_status(&message),
                Outcome::Quit => break,
            },
            Ok(None) => {}
            Err(err) => print_status(&StatusMessage::error(&err)),
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("results_grapher {}", crate_version());

    let output_dir = if cli.no_render {
        None
    } else {
        std::fs::create_dir_all(&cli.output_dir)?;
        Some(cli.output_dir.clone())
    };
    let mut session = GraphSession::new(output_dir);

    if cli.interactive {
        run_interactive(&mut session, &cli)
    } else if run_batch(&mut session, &cli) {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
