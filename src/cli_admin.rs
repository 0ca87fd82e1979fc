use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use media_library_server::user::{AuthToken, AuthTokenValue, UserStore};
use media_library_server::SqliteLibraryStore;

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the library database file, created if missing.
    #[clap(value_parser = parse_path)]
    pub path: PathBuf,
}

#[derive(Parser)]
#[command(name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Creates a user with the given handle.
    AddUser { user_handle: String },

    /// Deletes a user together with their tokens and library entries.
    DeleteUser { user_handle: String },

    /// Issues a new bearer token for the given user and prints it.
    IssueToken { user_handle: String },

    /// Revokes a previously issued token.
    RevokeToken { token: String },

    /// Shows the tokens issued to the given user.
    Tokens { user_handle: String },

    /// Shows all user handles.
    UserHandles,

    /// Shows the path of the current library db.
    Where,

    /// Close this program.
    Exit,
}

#[derive(Debug, PartialEq)]
enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

const PROMPT: &str = ">> ";

fn require_user_id(store: &dyn UserStore, user_handle: &str) -> Result<usize> {
    match store.get_user_id(user_handle)? {
        Some(id) => Ok(id),
        None => bail!("User '{}' not found", user_handle),
    }
}

fn run_command(command: InnerCommand, store: &dyn UserStore, db_path: &str) -> Result<bool> {
    match command {
        InnerCommand::AddUser { user_handle } => {
            if user_handle.trim().is_empty() {
                bail!("User handle cannot be empty");
            }
            let id = store.create_user(&user_handle)?;
            println!("Created user '{}' with id {}", user_handle, id);
        }
        InnerCommand::DeleteUser { user_handle } => {
            let user_id = require_user_id(store, &user_handle)?;
            store.delete_user(user_id)?;
            println!("Deleted user '{}'", user_handle);
        }
        InnerCommand::IssueToken { user_handle } => {
            let user_id = require_user_id(store, &user_handle)?;
            let token = AuthToken {
                user_id,
                value: AuthTokenValue::generate(),
                created: Utc::now().timestamp(),
                last_used: None,
            };
            let value = token.value.clone();
            store.add_user_auth_token(token)?;
            println!("{}", value);
        }
        InnerCommand::RevokeToken { token } => {
            match store.delete_user_auth_token(&AuthTokenValue(token))? {
                Some(revoked) => println!("Revoked token of user id {}", revoked.user_id),
                None => bail!("Token not found"),
            }
        }
        InnerCommand::Tokens { user_handle } => {
            let user_id = require_user_id(store, &user_handle)?;
            for token in store.get_all_user_auth_tokens(user_id)? {
                println!("{:#?}", token);
            }
        }
        InnerCommand::UserHandles => {
            println!("{:#?}", store.get_all_user_handles()?);
        }
        InnerCommand::Where => {
            println!("{}", db_path);
        }
        InnerCommand::Exit => return Ok(false),
    }
    Ok(true)
}

fn execute_command(line: String, store: &dyn UserStore, db_path: &str) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            println!("{} {}", PROMPT, &line);
            match run_command(cli.command, store, db_path) {
                Ok(true) => CommandExecutionResult::Ok,
                Ok(false) => CommandExecutionResult::Exit,
                Err(err) => CommandExecutionResult::Error(format!("{:#}", err)),
            }
        }
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            CommandExecutionResult::Ok
        }
    }
}

#[derive(rustyline_derive::Hinter)]
struct AdminHelper {
    commands_names: Vec<String>,
}

impl AdminHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        AdminHelper { commands_names }
    }
}

impl Completer for AdminHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for AdminHelper {}
impl Validator for AdminHelper {}
impl Helper for AdminHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let db_path = cli_args.path.display().to_string();
    let store = SqliteLibraryStore::new(&cli_args.path)
        .with_context(|| format!("Could not open library db at {}", db_path))?;

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<AdminHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(AdminHelper::new()));

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &store, &db_path) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => eprintln!("Error: {}", err),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    Ok(())
}
