//! Shell command construction for terminal-backed operations.
//!
//! Every bulk operation (copy, move, delete, archive, extract, run) is a
//! shell command shown in the terminal overlay. Paths are quoted with
//! single quotes and mapped to the host through a [`HostPrefix`].

use std::path::Path;

use itertools::Itertools;
use twinpane_core::path;

use crate::root::HostPrefix;

/// Archive suffixes that "open" extracts instead of editing.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".zip", ".rar", ".7z", ".tar", ".tar.gz", ".tgz", ".tar.bz2", ".tbz", ".tbz2", ".tar.xz",
    ".txz", ".gz", ".bz2", ".xz", ".lzma", ".cab", ".iso", ".lz", ".z", ".sit", ".sitx", ".hqx",
    ".bin", ".arj", ".arc",
];

/// Check if a file name looks like an archive.
pub fn is_archive(name: &str) -> bool {
    let lower = name.to_lowercase();
    ARCHIVE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Quote a string for POSIX `sh`.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// A command ready to run in the terminal overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// Command line passed to `sh -c`.
    pub command: String,
    /// Host working directory, if the command needs one.
    pub cwd: Option<String>,
    /// Close the overlay once the command signals completion.
    pub exit_when_done: bool,
}

impl ShellCommand {
    fn exiting(command: String) -> Self {
        Self {
            command,
            cwd: None,
            exit_when_done: true,
        }
    }
}

/// Builds [`ShellCommand`]s for logical paths.
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    prefix: HostPrefix,
}

impl CommandBuilder {
    pub fn new(prefix: HostPrefix) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> &HostPrefix {
        &self.prefix
    }

    fn host(&self, logical: &str) -> String {
        shell_quote(&self.prefix.apply(logical))
    }

    fn hosts<'a>(&self, logical: impl IntoIterator<Item = &'a str>) -> String {
        logical.into_iter().map(|p| self.host(p)).join(" ")
    }

    /// `cp -aiv` the sources into `dest`.
    pub fn copy<'a>(&self, sources: impl IntoIterator<Item = &'a str>, dest: &str) -> ShellCommand {
        ShellCommand::exiting(format!("cp -aiv {} {}", self.hosts(sources), self.host(dest)))
    }

    /// `mv -iv` the sources into `dest`.
    pub fn move_to<'a>(&self, sources: impl IntoIterator<Item = &'a str>, dest: &str) -> ShellCommand {
        ShellCommand::exiting(format!("mv -iv {} {}", self.hosts(sources), self.host(dest)))
    }

    /// `rm -Rv` the paths.
    pub fn delete<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> ShellCommand {
        ShellCommand::exiting(format!("rm -Rv {}", self.hosts(paths)))
    }

    /// Store-only zip of `names` inside `cwd`.
    ///
    /// A single item is archived as `<name>.zip`, several as
    /// `<directory name>.zip` (`archive.zip` at the root).
    pub fn archive(&self, cwd: &str, names: &[&str]) -> ShellCommand {
        let zip_name = match names {
            [single] => format!("{single}.zip"),
            _ => format!("{}.zip", path::last_segment(cwd).unwrap_or("archive")),
        };
        let quoted = names.iter().map(|n| shell_quote(n)).join(" ");
        ShellCommand::exiting(format!(
            "cd {} && zip -r -0 {} {}",
            self.host(cwd),
            shell_quote(&zip_name),
            quoted
        ))
    }

    /// Extract the archive at logical `file` into its own directory.
    pub fn extract(&self, file: &str) -> ShellCommand {
        let dir = path::parent(file);
        let name = path::display_name(file);
        let tool = if name.to_lowercase().ends_with(".zip") {
            "unzip"
        } else {
            "unar -o ."
        };
        ShellCommand::exiting(format!("cd {} && {} {}", self.host(&dir), tool, shell_quote(&name)))
    }

    /// Run `name` inside `cwd`: Python files through the interpreter,
    /// anything else made executable first.
    pub fn run(&self, cwd: &str, name: &str) -> ShellCommand {
        let quoted = shell_quote(name);
        let command = if name.to_lowercase().ends_with(".py") {
            format!("cd {} && python {}", self.host(cwd), quoted)
        } else {
            format!(
                "cd {} && chmod a+x {} && {}",
                self.host(cwd),
                quoted,
                shell_quote(&format!("./{name}"))
            )
        };
        ShellCommand::exiting(command)
    }

    /// Open logical `file` in the editor. The terminal stays open.
    pub fn edit(&self, file: &str) -> ShellCommand {
        ShellCommand {
            command: format!("micro {}", shell_quote(&path::display_name(file))),
            cwd: Some(self.prefix.apply(&path::parent(file))),
            exit_when_done: false,
        }
    }

    /// Open a plain shell in `cwd`.
    pub fn shell(&self, cwd: &str) -> ShellCommand {
        ShellCommand {
            command: String::new(),
            cwd: Some(self.prefix.apply(cwd)),
            exit_when_done: false,
        }
    }

    /// Invoke a userscript with `-d <cwd>` and, when something is focused,
    /// `-f <name>`.
    pub fn userscript(&self, script: &Path, cwd: &str, focused: Option<&str>) -> ShellCommand {
        let mut command = format!(
            "{} -d {}",
            shell_quote(&script.to_string_lossy()),
            self.host(cwd)
        );
        if let Some(name) = focused {
            command.push_str(" -f ");
            command.push_str(&shell_quote(name));
        }
        ShellCommand::exiting(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CommandBuilder {
        CommandBuilder::new(HostPrefix::new("/hostroot"))
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_copy_and_move() {
        let b = builder();
        assert_eq!(
            b.copy(["/a/x", "/a/y z"], "/b").command,
            "cp -aiv '/hostroot/a/x' '/hostroot/a/y z' '/hostroot/b'"
        );
        assert_eq!(b.move_to(["/a/x"], "/b").command, "mv -iv '/hostroot/a/x' '/hostroot/b'");
        assert!(b.delete(["/a/x"]).exit_when_done);
    }

    #[test]
    fn test_archive_names() {
        let b = builder();
        assert_eq!(
            b.archive("/docs", &["report"]).command,
            "cd '/hostroot/docs' && zip -r -0 'report.zip' 'report'"
        );
        assert_eq!(
            b.archive("/docs", &["a", "b"]).command,
            "cd '/hostroot/docs' && zip -r -0 'docs.zip' 'a' 'b'"
        );
        assert!(b.archive("/", &["a", "b"]).command.contains("'archive.zip'"));
    }

    #[test]
    fn test_extract_and_run() {
        let b = builder();
        assert_eq!(b.extract("/d/x.zip").command, "cd '/hostroot/d' && unzip 'x.zip'");
        assert_eq!(b.extract("/d/x.tar.gz").command, "cd '/hostroot/d' && unar -o . 'x.tar.gz'");
        assert_eq!(b.run("/d", "job.py").command, "cd '/hostroot/d' && python 'job.py'");
        assert_eq!(
            b.run("/d", "job.sh").command,
            "cd '/hostroot/d' && chmod a+x 'job.sh' && './job.sh'"
        );
    }

    #[test]
    fn test_edit_keeps_terminal_open() {
        let cmd = builder().edit("/d/notes.md");
        assert_eq!(cmd.command, "micro 'notes.md'");
        assert_eq!(cmd.cwd.as_deref(), Some("/hostroot/d"));
        assert!(!cmd.exit_when_done);
    }

    #[test]
    fn test_userscript_arguments() {
        let b = builder();
        let script = Path::new("/opt/scripts/tidy.sh");
        assert_eq!(
            b.userscript(script, "/d", Some("a.txt")).command,
            "'/opt/scripts/tidy.sh' -d '/hostroot/d' -f 'a.txt'"
        );
        assert_eq!(
            b.userscript(script, "/d", None).command,
            "'/opt/scripts/tidy.sh' -d '/hostroot/d'"
        );
    }

    #[test]
    fn test_is_archive() {
        assert!(is_archive("Backup.TAR.GZ"));
        assert!(is_archive("a.zip"));
        assert!(!is_archive("a.txt"));
    }
}
