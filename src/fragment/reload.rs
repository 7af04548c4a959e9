//! Reload notification for the service consuming an assembled file.

use std::process::Command;

use super::AssemblyError;

/// Command run after the assembled file changed on disk, e.g.
/// `["systemctl", "reload", "haproxy"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadCommand {
    program: String,
    args: Vec<String>,
}

impl ReloadCommand {
    /// Builds a command from an argv list. An empty list means no reload.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Runs the command to completion.
    pub fn run(&self) -> Result<(), AssemblyError> {
        let command = self.to_string();
        tracing::info!(command = %command, "Running reload command");

        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| AssemblyError::ReloadSpawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(AssemblyError::Reload {
                command,
                status: status.to_string(),
            });
        }

        Ok(())
    }
}

impl std::fmt::Display for ReloadCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_argv_means_no_reload() {
        assert_eq!(ReloadCommand::from_argv(&[]), None);
    }

    #[test]
    fn display_joins_argv() {
        let argv = vec!["systemctl".to_string(), "reload".into(), "haproxy".into()];
        let command = ReloadCommand::from_argv(&argv).unwrap();
        assert_eq!(command.to_string(), "systemctl reload haproxy");
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_an_error() {
        let command = ReloadCommand::from_argv(&["false".to_string()]).unwrap();
        assert!(matches!(command.run(), Err(AssemblyError::Reload { .. })));
    }

    #[test]
    fn missing_program_is_an_error() {
        let command = ReloadCommand::from_argv(&["/nonexistent/balancermember-reload".to_string()]).unwrap();
        assert!(matches!(command.run(), Err(AssemblyError::ReloadSpawn { .. })));
    }
}
