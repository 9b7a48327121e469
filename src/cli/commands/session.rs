//! Session Command
//!
//! Interactive explorer over one repository. A single orchestrator lives for
//! the whole session, so the explanation stores, the client mirror and the
//! usage ledger carry across commands.
//!
//! Usage:
//!   repoglance open <url> [--all] [--yes]

use std::io::BufRead;
use std::sync::Arc;

use crate::ai::PricingTable;
use crate::cli::commands::browse::list_folder;
use crate::cli::commands::deep_dive::deep_dive;
use crate::cli::commands::explain::explain_folder;
use crate::cli::commands::file::show_file;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, open_folder, path_segments};
use crate::explorer::Orchestrator;
use crate::service::ExplanationService;
use crate::types::{GlanceError, Result};

const HELP: &str = "\
  ls              list the current folder
  cd <path>       open a folder (.. goes up, / is the root)
  explain         explain every item in the current folder
  file <path>     explain one file in detail
  deep <path>     longer explanation of one file or folder
  hidden          show or hide dependency and build folders
  usage           tokens, cost and cache statistics so far
  reset           zero the usage counters
  help            this list
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    List,
    Cd(String),
    Explain,
    File(String),
    Deep(String),
    Hidden,
    Usage,
    Reset,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line
pub fn parse_command(line: &str) -> std::result::Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let needs_arg = |make: fn(String) -> SessionCommand| {
        if arg.is_empty() {
            Err(format!("`{}` needs a path", word))
        } else {
            Ok(make(arg.to_string()))
        }
    };

    let command = match word {
        "ls" => SessionCommand::List,
        "cd" => SessionCommand::Cd(if arg.is_empty() { "/".to_string() } else { arg.to_string() }),
        "explain" => SessionCommand::Explain,
        "file" => needs_arg(SessionCommand::File)?,
        "deep" | "deep-dive" => needs_arg(SessionCommand::Deep)?,
        "hidden" => SessionCommand::Hidden,
        "usage" => SessionCommand::Usage,
        "reset" => SessionCommand::Reset,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(format!("Unknown command `{}`. Type `help`.", other)),
    };
    Ok(Some(command))
}

/// Resolve `target` against the folder `current`. A leading `/` starts at
/// the root; `..` and `.` work as in a shell.
pub fn resolve_path(current: &str, target: &str) -> String {
    let mut parts = if target.starts_with('/') {
        Vec::new()
    } else {
        path_segments(current)
    };
    for segment in path_segments(target) {
        match segment {
            "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
    parts.join("/")
}

pub struct Session {
    service: Arc<ExplanationService>,
    orchestrator: Orchestrator<ExplanationService>,
    pricing: PricingTable,
    output: Output,
    yes: bool,
    /// Set when explanations are unavailable (no provider configured)
    disabled: Option<String>,
}

impl Session {
    pub fn new(
        service: Arc<ExplanationService>,
        orchestrator: Orchestrator<ExplanationService>,
        pricing: PricingTable,
        yes: bool,
    ) -> Self {
        Self {
            service,
            orchestrator,
            pricing,
            output: Output::new(),
            yes,
            disabled: None,
        }
    }

    pub fn from_context(ctx: &CommandContext, all: bool, yes: bool) -> Self {
        let mut session = Self::new(
            Arc::clone(&ctx.service),
            ctx.orchestrator(all),
            ctx.config.pricing.clone(),
            yes,
        );
        session.disabled = ctx.require_provider().err().map(|err| err.to_string());
        session
    }

    pub fn orchestrator(&self) -> &Orchestrator<ExplanationService> {
        &self.orchestrator
    }

    /// Folder of the right-most open column
    pub fn current_folder(&self) -> String {
        self.orchestrator
            .snapshot()
            .columns
            .last()
            .map(|col| col.path.clone())
            .unwrap_or_default()
    }

    pub async fn open(&self, url: &str) -> Result<()> {
        self.orchestrator.load_repo(url).await?;
        if let Some(meta) = self.orchestrator.snapshot().repo {
            self.output.header(&format!("{} ★ {}", meta.id, meta.stars));
            if !meta.description.is_empty() {
                println!("{}", meta.description);
            }
        }
        list_folder(&self.orchestrator, &self.output, "");
        Ok(())
    }

    /// Run one command. Returns `false` when the session should end.
    pub async fn execute(&self, command: SessionCommand) -> Result<bool> {
        let current = self.current_folder();
        match command {
            SessionCommand::List => list_folder(&self.orchestrator, &self.output, &current),
            SessionCommand::Cd(target) => {
                let path = resolve_path(&current, &target);
                let scope = if path.is_empty() {
                    self.orchestrator.navigate_to_depth(0);
                    path
                } else {
                    open_folder(&self.orchestrator, &path)?
                };
                list_folder(&self.orchestrator, &self.output, &scope);
            }
            SessionCommand::Explain => {
                self.ensure_enabled()?;
                explain_folder(&self.orchestrator, &self.pricing, &self.output, &current, self.yes)
                    .await?;
                self.output.ledger(&self.orchestrator.snapshot().ledger);
            }
            SessionCommand::File(target) => {
                self.ensure_enabled()?;
                let path = resolve_path(&current, &target);
                show_file(&self.orchestrator, &self.pricing, &self.output, &path, self.yes).await?;
                self.output.ledger(&self.orchestrator.snapshot().ledger);
            }
            SessionCommand::Deep(target) => {
                self.ensure_enabled()?;
                let path = resolve_path(&current, &target);
                deep_dive(&self.orchestrator, &self.pricing, &self.output, &path, self.yes).await?;
                self.output.ledger(&self.orchestrator.snapshot().ledger);
            }
            SessionCommand::Hidden => {
                self.orchestrator.toggle_hidden();
                let shown = self.orchestrator.snapshot().show_hidden;
                self.output.info(if shown {
                    "Showing dependency and build folders"
                } else {
                    "Hiding dependency and build folders"
                });
                list_folder(&self.orchestrator, &self.output, &current);
            }
            SessionCommand::Usage => {
                self.output.ledger(&self.orchestrator.snapshot().ledger);
                let items = self.service.item_store();
                let files = self.service.file_store();
                self.output.cache_stats("Folder items", &items.stats(), items.len());
                self.output.cache_stats("File details", &files.stats(), files.len());
            }
            SessionCommand::Reset => {
                self.orchestrator.reset_ledger();
                self.output.success("Usage counters reset");
            }
            SessionCommand::Help => println!("{}", HELP),
            SessionCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn ensure_enabled(&self) -> Result<()> {
        match &self.disabled {
            Some(reason) => Err(GlanceError::Config(format!("Explanations unavailable: {}", reason))),
            None => Ok(()),
        }
    }
}

pub async fn run(url: &str, all: bool, yes: bool) -> Result<()> {
    let ctx = CommandContext::load_for_browsing()?;
    let output = Output::new();
    if !ctx.can_explain() {
        output.warning("No AI provider configured; browsing only");
    }

    let session = Session::from_context(&ctx, all, yes);
    session.open(url).await?;
    output.info("Type `help` for commands");

    let stdin = std::io::stdin();
    loop {
        let folder = session.current_folder();
        output.prompt(&format!("/{}", folder))?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(command)) => match session.execute(command).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => output.error(&err.to_string()),
            },
            Err(message) => output.error(&message),
        }
    }

    output.ledger(&session.orchestrator().snapshot().ledger);
    Ok(())
}
