use crate::{
    action::ActionStatus,
    cli::{Commands, ListArgs, RunArgs, VarsArgs},
    command::{commands_dir, CommandScanner},
    effects::OsEffects,
    engine::Orchestrator,
    error::Result,
    prompt::get_prompter,
    renderer::get_template_engine,
    role::RoleStore,
};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::time::Duration;

fn project_root(dir: &Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Runs one command's action files against the project.
pub fn run_command(args: &RunArgs) -> Result<()> {
    let root = project_root(&args.dir)?;
    let renderer = get_template_engine();
    let effects = OsEffects;
    let prompter = get_prompter(!args.non_interactive);

    let mut orchestrator = Orchestrator::new(&root, &renderer, &effects, prompter.as_ref());
    if let Some(seconds) = args.timeout {
        orchestrator = orchestrator.with_exec_timeout(Duration::from_secs(seconds));
    }
    let supplied: IndexMap<String, String> = args.options.iter().cloned().collect();

    let report = orchestrator.execute(&args.noun, &args.verb, &supplied)?;

    println!(
        "Command '{} {}' completed: {} succeeded, {} skipped, {} failed.",
        args.noun,
        args.verb,
        report.count(ActionStatus::Success),
        report.count(ActionStatus::Skipped),
        report.count(ActionStatus::Failure),
    );
    Ok(())
}

/// Prints every noun and its verbs.
pub fn list_commands(args: &ListArgs) -> Result<()> {
    let root = project_root(&args.dir)?;
    let nouns = CommandScanner::new(commands_dir(&root)).scan()?;
    if nouns.is_empty() {
        println!("No commands found in {}", commands_dir(&root).display());
        return Ok(());
    }
    for noun in nouns {
        let name = noun.command.name.unwrap_or_default();
        println!("{name}: {}", noun.command.description.unwrap_or_default());
        for verb in noun.verbs {
            println!(
                "  {name} {}: {}",
                verb.name.unwrap_or_default(),
                verb.description.unwrap_or_default()
            );
        }
    }
    Ok(())
}

/// Prints a role file, or the names of the stored roles.
pub fn show_vars(args: &VarsArgs) -> Result<()> {
    let root = project_root(&args.dir)?;
    let store = RoleStore::new(&root);
    if args.list {
        for name in store.role_names(&OsEffects)? {
            println!("{name}");
        }
        return Ok(());
    }
    let vars = store.load(&OsEffects, args.role.as_deref())?;
    if vars.is_empty() {
        println!("No variables stored in {}", store.file_path(args.role.as_deref()).display());
    } else {
        print!("{}", serde_yaml::to_string(&vars)?);
    }
    Ok(())
}

/// Main entry point for CLI execution
pub fn run(command: &Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run_command(args),
        Commands::List(args) => list_commands(args),
        Commands::Vars(args) => show_vars(args),
    }
}
