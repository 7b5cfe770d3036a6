//! Replaying a command sequence onto a log

use std::io::Write;

use crate::diag_warn;
use crate::error::{LogError, LogResult};
use crate::log::{ContextGuard, Log, LogExt, LogFileBox};

use super::command::Command;

/// Scope opened on the target while replaying
enum Scope<'a, L: Log + ?Sized> {
    Context(ContextGuard<'a, L>),
    File(LogFileBox<'a>),
}

/// Open scopes, released innermost first when dropped
struct ScopeStack<'a, L: Log + ?Sized> {
    scopes: Vec<Scope<'a, L>>,
}

impl<'a, L: Log + ?Sized> ScopeStack<'a, L> {
    fn push(&mut self, scope: Scope<'a, L>) {
        self.scopes.push(scope);
    }

    fn pop(&mut self) -> Option<Scope<'a, L>> {
        self.scopes.pop()
    }
}

impl<L: Log + ?Sized> Drop for ScopeStack<'_, L> {
    fn drop(&mut self) {
        while let Some(scope) = self.scopes.pop() {
            drop(scope);
        }
    }
}

/// Re-issue `commands` onto `log`, rebuilding the nesting of scopes
pub(crate) fn replay_commands<L: Log + ?Sized>(commands: &[Command], log: &L) -> LogResult<()> {
    let mut stack = ScopeStack { scopes: Vec::new() };

    for (index, command) in commands.iter().enumerate() {
        match command {
            Command::ContextEnter { title } => {
                stack.push(Scope::Context(log.context(title)?));
            }
            Command::ContextExit => match stack.pop() {
                Some(Scope::Context(guard)) => guard.exit()?,
                Some(file @ Scope::File(_)) => {
                    stack.push(file);
                    return Err(LogError::malformed(index, "context_exit while a file is open"));
                }
                None => {
                    return Err(LogError::malformed(index, "context_exit without an open context"));
                }
            },
            Command::OpenEnter {
                filename,
                mode,
                level,
                id,
            } => {
                let file = log.open(filename, *mode, *level, id.as_ref())?;
                stack.push(Scope::File(file));
            }
            Command::OpenExit { data } => match stack.pop() {
                Some(Scope::File(mut file)) => {
                    if let Some(data) = data {
                        file.write_all(data)?;
                    }
                    file.close()?;
                }
                Some(context @ Scope::Context(_)) => {
                    stack.push(context);
                    return Err(LogError::malformed(index, "open_exit while a context is open"));
                }
                None => {
                    return Err(LogError::malformed(index, "open_exit without an open file"));
                }
            },
            Command::Write { text, level } => log.write(text, *level)?,
        }
    }

    if !stack.scopes.is_empty() {
        diag_warn!(
            "recording ended with {} open scopes, closing them",
            stack.scopes.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{CaptureLog, Event};
    use crate::types::{FileId, FileMode, Level};

    fn open_enter(name: &str) -> Command {
        Command::OpenEnter {
            filename: name.to_string(),
            mode: FileMode::Text,
            level: Level::Info,
            id: None,
        }
    }

    #[test]
    fn test_replay_rebuilds_nesting() {
        let commands = vec![
            Command::context_enter("build"),
            Command::write("start", Level::Info),
            open_enter("out.txt"),
            Command::OpenExit {
                data: Some(b"data".to_vec()),
            },
            Command::ContextExit,
        ];
        let target = CaptureLog::new();
        replay_commands(&commands, &target).unwrap();
        assert_eq!(
            target.events(),
            vec![
                Event::ContextEnter("build".to_string()),
                Event::Write {
                    text: "start".to_string(),
                    level: Level::Info,
                },
                Event::File {
                    name: "out.txt".to_string(),
                    mode: FileMode::Text,
                    level: Level::Info,
                    data: b"data".to_vec(),
                },
                Event::ContextExit,
            ]
        );
    }

    #[test]
    fn test_missing_data_closes_without_writing() {
        let commands = vec![open_enter("empty.txt"), Command::OpenExit { data: None }];
        let target = CaptureLog::new();
        replay_commands(&commands, &target).unwrap();
        assert_eq!(target.files(), vec![("empty.txt".to_string(), Vec::new())]);
    }

    #[test]
    fn test_forwards_id_to_target() {
        let commands = vec![
            Command::OpenEnter {
                filename: "a".to_string(),
                mode: FileMode::Binary,
                level: Level::Debug,
                id: Some(FileId::new("abc")),
            },
            Command::OpenExit {
                data: Some(vec![7]),
            },
        ];
        let target = crate::record::RecordLog::new();
        replay_commands(&commands, &target).unwrap();
        assert_eq!(target.cached(&FileId::new("abc")), Some(vec![7]));
    }

    #[test]
    fn test_context_exit_underflow() {
        let commands = vec![Command::write("x", Level::Info), Command::ContextExit];
        let target = CaptureLog::new();
        let err = replay_commands(&commands, &target).unwrap_err();
        assert!(matches!(err, LogError::MalformedRecording { index: 1, .. }));
    }

    #[test]
    fn test_open_exit_underflow() {
        let commands = vec![Command::OpenExit { data: None }];
        let target = CaptureLog::new();
        let err = replay_commands(&commands, &target).unwrap_err();
        assert!(matches!(err, LogError::MalformedRecording { index: 0, .. }));
    }

    #[test]
    fn test_mismatched_exit_releases_scopes() {
        let commands = vec![
            Command::context_enter("outer"),
            open_enter("f.txt"),
            Command::ContextExit,
        ];
        let target = CaptureLog::new();
        let err = replay_commands(&commands, &target).unwrap_err();
        assert!(matches!(err, LogError::MalformedRecording { index: 2, .. }));
        assert_eq!(target.depth(), 0);
        assert_eq!(
            target.events(),
            vec![
                Event::ContextEnter("outer".to_string()),
                Event::File {
                    name: "f.txt".to_string(),
                    mode: FileMode::Text,
                    level: Level::Info,
                    data: Vec::new(),
                },
                Event::ContextExit,
            ]
        );
    }

    #[test]
    fn test_unterminated_recording_is_closed() {
        let commands = vec![Command::context_enter("open"), Command::write("x", Level::User)];
        let target = CaptureLog::new();
        replay_commands(&commands, &target).unwrap();
        assert_eq!(target.depth(), 0);
        assert_eq!(target.events().last(), Some(&Event::ContextExit));
    }
}
