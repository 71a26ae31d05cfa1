//! Constants used throughout the stencil engine

/// Project-local directory holding commands and roles
pub const SPRING_DIR: &str = ".spring";

/// Directory below [`SPRING_DIR`] holding `<noun>/<verb>` command trees
pub const COMMANDS_DIR: &str = "commands";

/// Optional manifest describing a command or subcommand
pub const COMMAND_MANIFEST: &str = "command.yaml";

/// Directory (relative to the project root) holding role variable files
pub const ROLES_VARS_DIR: &str = ".spring/roles/vars";

/// Default template engine declared by action files that name none
pub const DEFAULT_ENGINE: &str = "minijinja";

/// Engine names accepted in front matter without a warning
pub const KNOWN_ENGINES: &[&str] = &["minijinja", "jinja", "handlebars", "mustache"];

/// Default subprocess timeout for exec actions, in seconds
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 300;

/// Model variable receiving exec output when no `define.name` is given
pub const EXEC_OUTPUT_VARIABLE: &str = "exec-output";

/// Number of leading bytes inspected when deciding whether a file is text
pub const TEXT_SNIFF_LEN: usize = 8192;

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
