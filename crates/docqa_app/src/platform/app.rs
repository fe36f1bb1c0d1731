use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;

use docqa_core::{update, AppState, Msg};
use docqa_logging::{docqa_error, docqa_info};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::commands::{self, Command};
use super::ui::render;
use super::{logging, AppEvent};

pub fn run_app() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("docqa: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::initialize(config.log);
    docqa_info!("Starting docqa backend={}", config.backend_url);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = match EffectRunner::new(&config, event_tx.clone()) {
        Ok(runner) => runner,
        Err(err) => {
            docqa_error!("Could not start engine: {}", err);
            eprintln!("docqa: could not start engine: {err}");
            return ExitCode::FAILURE;
        }
    };
    spawn_stdin_reader(event_tx);

    println!("{}", commands::HELP);
    let mut state = AppState::new();
    print_view(&state);

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Line(line) => match commands::parse(&line) {
                Command::Quit => break,
                Command::Help => println!("{}", commands::HELP),
                Command::Empty => {}
                Command::Invalid(usage) => println!("{usage}"),
                command => match commands::to_msgs(command, &state.view()) {
                    Ok(msgs) => {
                        for msg in msgs {
                            state = dispatch(state, msg, &runner);
                        }
                    }
                    Err(reason) => println!("{reason}"),
                },
            },
            AppEvent::Engine(msg) => state = dispatch(state, msg, &runner),
            AppEvent::InputClosed => break,
        }

        if state.consume_dirty() {
            print_view(&state);
        }
    }

    // No audio may outlive the session.
    let (_state, effects) = update(state, Msg::Shutdown);
    runner.enqueue(effects);
    drop(runner);
    docqa_info!("docqa exiting");
    ExitCode::SUCCESS
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    runner.enqueue(effects);
    state
}

fn print_view(state: &AppState) {
    let mut stdout = io::stdout().lock();
    for line in render::render(&state.view()) {
        let _ = writeln!(stdout, "{line}");
    }
    let _ = write!(stdout, "> ");
    let _ = stdout.flush();
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(AppEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}
