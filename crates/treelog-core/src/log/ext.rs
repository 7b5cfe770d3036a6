//! Derived log operations shared by every backend

use std::fmt::Display;

use crate::closing::{Closing, ClosingIter};
use crate::error::{LogError, LogResult};
use crate::types::{FileId, FileMode, Level};
use crate::diag_error;

use super::traits::{Log, LogFile, LogFileBox};

/// Open context on a log, popped when the guard goes out of scope
///
/// ```
/// use treelog_core::{CaptureLog, LogExt};
///
/// let log = CaptureLog::new();
/// {
///     let _build = log.context("build").unwrap();
///     log.info(["compiling"]).unwrap();
/// }
/// assert_eq!(log.depth(), 0);
/// ```
#[must_use = "the context is popped as soon as the guard is dropped"]
pub struct ContextGuard<'a, L: Log + ?Sized> {
    log: &'a L,
    open: bool,
}

impl<'a, L: Log + ?Sized> ContextGuard<'a, L> {
    /// Pop the context now, returning the backend's error if any
    pub fn exit(mut self) -> LogResult<()> {
        self.open = false;
        self.log.pop_context()
    }
}

impl<L: Log + ?Sized> Closing for ContextGuard<'_, L> {
    fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        if let Err(e) = self.log.pop_context() {
            diag_error!("pop_context failed during scope exit: {}", e);
        }
        true
    }
}

impl<L: Log + ?Sized> Drop for ContextGuard<'_, L> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Iterator that wraps every element in a numbered context
///
/// Created by [`LogExt::iter`]. The context for element `i` is pushed before
/// the element is pulled, so work done by a lazy producer is logged inside
/// it, and stays open while the consumer works on the element. It is popped
/// before the next context is pushed or when the iterator is dropped. When
/// the source runs out, the context pushed for the attempt is popped again
/// and nothing is yielded.
pub struct LogIter<'a, L: Log + ?Sized, I> {
    log: &'a L,
    title: String,
    iter: I,
    length: Option<usize>,
    index: usize,
    open: bool,
    done: bool,
}

impl<'a, L: Log + ?Sized, I: Iterator> LogIter<'a, L, I> {
    fn new(log: &'a L, title: &str, iter: I, length: Option<usize>) -> Self {
        let length = length.or_else(|| match iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower),
            _ => None,
        });
        Self {
            log,
            title: title.to_string(),
            iter,
            length,
            index: 0,
            open: false,
            done: false,
        }
    }

    fn context_title(&self) -> String {
        let mut text = format!("{} {}", self.title, self.index);
        if let Some(length) = self.length.filter(|n| *n > 0) {
            let percent = 100.0 * (self.index as f64 + 0.5) / length as f64;
            text.push_str(&format!(" ({:.0}%)", percent));
        }
        text
    }

    fn fail(&mut self, error: LogError) -> Option<LogResult<I::Item>> {
        self.done = true;
        Some(Err(error))
    }
}

impl<L: Log + ?Sized, I: Iterator> Iterator for LogIter<'_, L, I> {
    type Item = LogResult<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.open {
            self.open = false;
            self.index += 1;
            if let Err(e) = self.log.pop_context() {
                return self.fail(e);
            }
        }

        let title = self.context_title();
        if let Err(e) = self.log.push_context(&title) {
            return self.fail(e);
        }
        self.open = true;

        match self.iter.next() {
            Some(value) => Some(Ok(value)),
            None => {
                self.open = false;
                self.done = true;
                match self.log.pop_context() {
                    Ok(()) => None,
                    Err(e) => Some(Err(e)),
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            self.iter.size_hint()
        }
    }
}

impl<L: Log + ?Sized, I> Drop for LogIter<'_, L, I> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(e) = self.log.pop_context() {
                diag_error!("pop_context failed while closing iteration: {}", e);
            }
        }
    }
}

/// Convenience surface derived from the four [`Log`] primitives
pub trait LogExt: Log {
    /// Enter a context that is popped when the returned guard is dropped
    fn context(&self, title: &str) -> LogResult<ContextGuard<'_, Self>> {
        self.push_context(title)?;
        Ok(ContextGuard {
            log: self,
            open: true,
        })
    }

    /// Run `f` inside a context
    ///
    /// The context is popped whether or not `f` succeeds. An error from `f`
    /// is returned unchanged; a pop failure is only returned when `f`
    /// succeeded.
    fn with_context<R, E, F>(&self, title: &str, f: F) -> Result<R, E>
    where
        F: FnOnce() -> Result<R, E>,
        E: From<LogError>,
    {
        let guard = self.context(title)?;
        match f() {
            Ok(value) => {
                guard.exit()?;
                Ok(value)
            }
            Err(e) => {
                drop(guard);
                Err(e)
            }
        }
    }

    /// Run `f` with a file opened at `level`
    ///
    /// The file is closed when `f` succeeds. When `f` fails the file is
    /// aborted instead, so a recording keeps none of the partial content, and
    /// the error from `f` is returned unchanged.
    fn with_file<R, E, F>(
        &self,
        name: &str,
        mode: FileMode,
        level: Level,
        id: Option<&FileId>,
        f: F,
    ) -> Result<R, E>
    where
        F: FnOnce(&mut dyn LogFile) -> Result<R, E>,
        E: From<LogError>,
    {
        let mut file = self.open(name, mode, level, id)?;
        match f(&mut *file) {
            Ok(value) => {
                file.close()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = file.abort() {
                    diag_error!("aborting {} failed: {}", name, abort_err);
                }
                Err(e)
            }
        }
    }

    /// Iterate with a numbered context around every element
    ///
    /// Contexts are titled `"{title} {i}"`, with a progress percentage when
    /// `length` is given or the iterator reports an exact size.
    fn iter<I>(
        &self,
        title: &str,
        iterable: I,
        length: Option<usize>,
    ) -> ClosingIter<LogIter<'_, Self, I::IntoIter>>
    where
        I: IntoIterator,
    {
        ClosingIter::new(LogIter::new(self, title, iterable.into_iter(), length))
    }

    /// Join `args` with `sep` and write the result at `level`
    fn print<I>(&self, level: Level, args: I, sep: &str) -> LogResult<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let text = args
            .into_iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .join(sep);
        self.write(&text, level)
    }

    fn debug<I>(&self, args: I) -> LogResult<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.print(Level::Debug, args, " ")
    }

    fn info<I>(&self, args: I) -> LogResult<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.print(Level::Info, args, " ")
    }

    fn user<I>(&self, args: I) -> LogResult<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.print(Level::User, args, " ")
    }

    fn warning<I>(&self, args: I) -> LogResult<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.print(Level::Warning, args, " ")
    }

    fn error<I>(&self, args: I) -> LogResult<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.print(Level::Error, args, " ")
    }

    /// Open a debug level file; `mode` is text (`"w"`) or binary (`"wb"`)
    fn debug_file(&self, name: &str, mode: FileMode, id: Option<&FileId>) -> LogResult<LogFileBox<'_>> {
        self.open(name, mode, Level::Debug, id)
    }

    fn info_file(&self, name: &str, mode: FileMode, id: Option<&FileId>) -> LogResult<LogFileBox<'_>> {
        self.open(name, mode, Level::Info, id)
    }

    fn user_file(&self, name: &str, mode: FileMode, id: Option<&FileId>) -> LogResult<LogFileBox<'_>> {
        self.open(name, mode, Level::User, id)
    }

    fn warning_file(&self, name: &str, mode: FileMode, id: Option<&FileId>) -> LogResult<LogFileBox<'_>> {
        self.open(name, mode, Level::Warning, id)
    }

    fn error_file(&self, name: &str, mode: FileMode, id: Option<&FileId>) -> LogResult<LogFileBox<'_>> {
        self.open(name, mode, Level::Error, id)
    }
}

impl<T: Log + ?Sized> LogExt for T {}

/// Write a message built from any number of `Display` values
///
/// `log_print!(log, Level::Info, "a", 1)` writes `"a 1"`; a custom separator
/// goes after a semicolon: `log_print!(log, Level::Info, "a", 1; sep = "-")`.
#[macro_export]
macro_rules! log_print {
    ($log:expr, $level:expr, $($arg:expr),+ $(,)? ; sep = $sep:expr) => {{
        use $crate::LogExt as _;
        ($log).print($level, [$(&$arg as &dyn ::std::fmt::Display),+], $sep)
    }};
    ($log:expr, $level:expr, $($arg:expr),+ $(,)?) => {
        $crate::log_print!($log, $level, $($arg),+ ; sep = " ")
    };
}

#[macro_export]
macro_rules! log_debug {
    ($log:expr, $($rest:tt)+) => {
        $crate::log_print!($log, $crate::Level::Debug, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($log:expr, $($rest:tt)+) => {
        $crate::log_print!($log, $crate::Level::Info, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_user {
    ($log:expr, $($rest:tt)+) => {
        $crate::log_print!($log, $crate::Level::User, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($log:expr, $($rest:tt)+) => {
        $crate::log_print!($log, $crate::Level::Warning, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($log:expr, $($rest:tt)+) => {
        $crate::log_print!($log, $crate::Level::Error, $($rest)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{CaptureLog, Event};

    fn enter(title: &str) -> Event {
        Event::ContextEnter(title.to_string())
    }

    fn write(text: &str, level: Level) -> Event {
        Event::Write {
            text: text.to_string(),
            level,
        }
    }

    #[test]
    fn test_context_guard_pops_on_drop() {
        let log = CaptureLog::new();
        {
            let _outer = log.context("outer").unwrap();
            let _inner = log.context("inner").unwrap();
            assert_eq!(log.depth(), 2);
        }
        assert_eq!(log.depth(), 0);
        assert_eq!(
            log.events(),
            vec![enter("outer"), enter("inner"), Event::ContextExit, Event::ContextExit]
        );
    }

    #[test]
    fn test_with_context_pops_on_error() {
        let log = CaptureLog::new();
        let result: Result<(), LogError> =
            log.with_context("failing", || Err(LogError::backend("boom")));
        assert!(matches!(result, Err(LogError::Backend(ref m)) if m == "boom"));
        assert_eq!(log.depth(), 0);
        assert_eq!(log.events(), vec![enter("failing"), Event::ContextExit]);
    }

    #[test]
    fn test_iter_titles_with_percentage() {
        let log = CaptureLog::new();
        let items: Vec<_> = log
            .iter("item", vec!["x0", "x1", "x2"], None)
            .collect::<LogResult<_>>()
            .unwrap();
        assert_eq!(items, vec!["x0", "x1", "x2"]);
        assert_eq!(
            log.events(),
            vec![
                enter("item 0 (17%)"),
                Event::ContextExit,
                enter("item 1 (50%)"),
                Event::ContextExit,
                enter("item 2 (83%)"),
                Event::ContextExit,
                enter("item 3 (117%)"),
                Event::ContextExit,
            ]
        );
        assert_eq!(log.depth(), 0);
    }

    #[test]
    fn test_iter_unknown_length_has_no_suffix() {
        let log = CaptureLog::new();
        let evens = (0..6).filter(|n| n % 2 == 0);
        let count = log.iter("step", evens, None).count();
        assert_eq!(count, 3);
        let titles: Vec<_> = log
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::ContextEnter(title) => Some(title),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["step 0", "step 1", "step 2", "step 3"]);
    }

    #[test]
    fn test_iter_early_stop_pops_once() {
        let log = CaptureLog::new();
        let mut seen = Vec::new();
        for item in log.iter("item", [1, 2, 3], None).enter() {
            let item = item.unwrap();
            assert_eq!(log.depth(), 1);
            seen.push(item);
            if item == 1 {
                break;
            }
        }
        assert_eq!(seen, vec![1]);
        assert_eq!(log.depth(), 0);
        assert_eq!(log.events(), vec![enter("item 0 (17%)"), Event::ContextExit]);
    }

    #[test]
    fn test_iter_producer_runs_inside_context() {
        let log = CaptureLog::new();
        let producer = (0..2).map(|i| {
            log.info([format!("computing {}", i)]).unwrap();
            i
        });
        for item in log.iter("step", producer, Some(2)).enter() {
            let item = item.unwrap();
            assert_eq!(log.contexts(), vec![format!("step {} ({}%)", item, 25 + 50 * item)]);
        }
        assert_eq!(
            log.events(),
            vec![
                enter("step 0 (25%)"),
                write("computing 0", Level::Info),
                Event::ContextExit,
                enter("step 1 (75%)"),
                write("computing 1", Level::Info),
                Event::ContextExit,
                enter("step 2 (125%)"),
                Event::ContextExit,
            ]
        );
    }

    #[test]
    fn test_iter_explicit_length() {
        let log = CaptureLog::new();
        let mut iter = log.iter("chunk", std::iter::repeat(0u8), Some(2)).enter();
        iter.next().unwrap().unwrap();
        iter.next().unwrap().unwrap();
        drop(iter);
        assert_eq!(
            log.events(),
            vec![
                enter("chunk 0 (25%)"),
                Event::ContextExit,
                enter("chunk 1 (75%)"),
                Event::ContextExit,
            ]
        );
    }

    #[test]
    fn test_leveled_methods() {
        let log = CaptureLog::new();
        log.warning(["a", "b"]).unwrap();
        log.print(Level::Warning, ["a", "b"], "-").unwrap();
        log.debug([1, 2, 3]).unwrap();
        log.user(Vec::<String>::new()).unwrap();
        assert_eq!(
            log.events(),
            vec![
                write("a b", Level::Warning),
                write("a-b", Level::Warning),
                write("1 2 3", Level::Debug),
                write("", Level::User),
            ]
        );
    }

    #[test]
    fn test_print_macros() {
        let log = CaptureLog::new();
        crate::log_warning!(log, "a", "b").unwrap();
        crate::log_warning!(log, "a", "b"; sep = "-").unwrap();
        crate::log_info!(&log, "answer", 42).unwrap();
        assert_eq!(
            log.events(),
            vec![
                write("a b", Level::Warning),
                write("a-b", Level::Warning),
                write("answer 42", Level::Info),
            ]
        );
    }

    #[test]
    fn test_with_file_closes_on_success() {
        use std::io::Write;

        let log = CaptureLog::new();
        let written = log
            .with_file("out.txt", FileMode::Text, Level::User, None, |file| {
                file.write_all(b"done")?;
                Ok::<_, LogError>(4)
            })
            .unwrap();
        assert_eq!(written, 4);
        assert_eq!(log.files(), vec![("out.txt".to_string(), b"done".to_vec())]);
    }

    #[test]
    fn test_with_file_returns_producer_error() {
        use std::io::Write;

        let log = CaptureLog::new();
        let result: LogResult<()> = log.with_file("out.txt", FileMode::Text, Level::User, None, |file| {
            file.write_all(b"part")?;
            Err(LogError::backend("producer failed"))
        });
        assert!(matches!(result, Err(LogError::Backend(ref m)) if m == "producer failed"));
        // Capturing backends have no cache, so aborting just closes
        assert_eq!(log.files(), vec![("out.txt".to_string(), b"part".to_vec())]);
    }

    #[test]
    fn test_leveled_files() {
        use std::io::Write;

        let log = CaptureLog::new();
        let mut file = log.error_file("dump.bin", FileMode::Binary, None).unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        file.close().unwrap();
        drop(file);
        assert_eq!(
            log.events(),
            vec![Event::File {
                name: "dump.bin".to_string(),
                mode: FileMode::Binary,
                level: Level::Error,
                data: vec![1, 2, 3],
            }]
        );
    }
}
