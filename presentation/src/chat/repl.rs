//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::formatter::ConsoleFormatter;
use crate::progress::reporter::ProgressReporter;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use thinktank_application::{ChatGateway, RunTurnInput, RunTurnUseCase, TurnEvent};
use thinktank_domain::{Mode, Model};

/// Interactive chat REPL
pub struct ChatRepl<G: ChatGateway + 'static> {
    use_case: RunTurnUseCase<G>,
    thread_id: String,
    mode: Mode,
    participants: Option<Vec<Model>>,
    debate: bool,
    stream: bool,
    show_progress: bool,
}

impl<G: ChatGateway + 'static> ChatRepl<G> {
    pub fn new(use_case: RunTurnUseCase<G>, thread_id: impl Into<String>) -> Self {
        Self {
            use_case,
            thread_id: thread_id.into(),
            mode: Mode::default(),
            participants: None,
            debate: true,
            stream: false,
            show_progress: true,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_participants(mut self, participants: Option<Vec<Model>>) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_debate(mut self, debate: bool) -> Self {
        self.debate = debate;
        self
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("thinktank").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│           ThinkTank - Group Chat            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Thread: {}   Mode: {}", self.thread_id, self.mode.label());
        println!();
        println!("Commands:");
        println!("  /help              - Show this help");
        println!("  /mode <id>         - Switch mode (eco/budget/balanced/deluxe/council)");
        println!("  /use <id> [<id>..] - Set participant models for the thread");
        println!("  /participants      - Show the active participant override");
        println!("  /debate on|off     - Toggle the council debate round");
        println!("  /quit              - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        let mut parts = cmd.split_whitespace();
        match parts.next().unwrap_or_default() {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return true;
            }
            "/help" | "/h" | "/?" => {
                self.print_welcome();
            }
            "/mode" => match parts.next() {
                Some(value) => {
                    self.mode = Mode::resolve(Some(value));
                    println!("Mode: {}", self.mode.label());
                }
                None => println!("Mode: {}", self.mode.label()),
            },
            "/use" => {
                let models: Vec<Model> = parts.map(|s| s.parse().unwrap()).collect();
                if models.is_empty() {
                    println!("Usage: /use <model-id> [<model-id> ...]");
                } else {
                    println!(
                        "Participants: {}",
                        models
                            .iter()
                            .map(|m| m.short_name().to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                    self.participants = Some(models);
                }
            }
            "/participants" => match &self.participants {
                Some(models) => {
                    for model in models {
                        println!("  - {}", model);
                    }
                }
                None => println!("Using the thread's stored participants"),
            },
            "/debate" => match parts.next() {
                Some("on") => {
                    self.debate = true;
                    println!("Debate round enabled");
                }
                Some("off") => {
                    self.debate = false;
                    println!("Debate round disabled");
                }
                _ => println!("Usage: /debate on|off"),
            },
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn build_input(&self, text: &str) -> RunTurnInput {
        let mut input = RunTurnInput::new(self.thread_id.clone(), text).with_mode(self.mode);
        if let Some(participants) = &self.participants {
            input = input.with_participants(participants.clone());
        }
        if !self.debate {
            input = input.without_debate();
        }
        input
    }

    async fn process_message(&self, text: &str) {
        println!();

        if self.stream {
            self.process_streaming(text).await;
            return;
        }

        let result = if self.show_progress {
            let progress = ProgressReporter::new();
            self.use_case
                .execute_with_progress(self.build_input(text), &progress)
                .await
        } else {
            self.use_case.execute(self.build_input(text)).await
        };

        match result {
            Ok(replies) => {
                println!("{}", ConsoleFormatter::format_replies(&replies));
            }
            Err(e) => {
                eprintln!("Error: {}", e);
            }
        }
        println!();
    }

    async fn process_streaming(&self, text: &str) {
        match self.use_case.execute_streaming(self.build_input(text)).await {
            Ok(mut rx) => {
                while let Some(event) = rx.recv().await {
                    match event {
                        TurnEvent::Reply(message) => {
                            println!("{}\n", ConsoleFormatter::format_message(&message));
                        }
                        TurnEvent::Debate(messages) => {
                            println!("{}\n", ConsoleFormatter::format_replies(&messages));
                        }
                        TurnEvent::Done => break,
                    }
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
            }
        }
    }
}
