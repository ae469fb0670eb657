//! `watch` subcommand — run the indicator, reading status events from stdin.
//!
//! Line protocol on stdin, one command per line:
//!
//! ```text
//! init | preview | recording | paused | error | upcoming
//! next=<secs>   next scheduled recording starts in <secs>; bare `next=` clears
//! quit          shut down
//! ```
//!
//! EOF behaves like `quit`. Ctrl+C shuts down cleanly too, darkening the
//! stick before exit.

use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use recstick_lib::connection::UsbSource;
use recstick_lib::coordinator::{ScheduleSource, StatusCoordinator};
use recstick_lib::runtime::{self, Event};
use recstick_lib::status::Status;

use super::{Config, Result};

/// Schedule slot shared between the stdin reader and the event loop.
#[derive(Clone, Default)]
struct SharedSchedule(Arc<Mutex<Option<SystemTime>>>);

impl SharedSchedule {
    fn set(&self, start: Option<SystemTime>) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = start;
        }
    }
}

impl ScheduleSource for SharedSchedule {
    fn next_recording_start(&self) -> Option<SystemTime> {
        self.0.lock().map(|slot| *slot).unwrap_or(None)
    }
}

/// One parsed stdin line. Blank lines, comments, and garbage parse to `None`.
#[derive(Debug, PartialEq, Eq)]
enum WatchCommand {
    Status(Status),
    Next(Option<Duration>),
    Quit,
}

fn parse_line(line: &str) -> Option<WatchCommand> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if line == "quit" {
        return Some(WatchCommand::Quit);
    }
    if let Some(rest) = line.strip_prefix("next=") {
        if rest.is_empty() {
            return Some(WatchCommand::Next(None));
        }
        return match rest.parse::<u64>() {
            Ok(secs) => Some(WatchCommand::Next(Some(Duration::from_secs(secs)))),
            Err(_) => {
                log::warn!("ignoring bad schedule offset: {rest:?}");
                None
            }
        };
    }
    match line.parse::<Status>() {
        Ok(status) => Some(WatchCommand::Status(status)),
        Err(e) => {
            log::warn!("ignoring stdin line: {e}");
            None
        }
    }
}

pub(super) fn cmd_watch(tick_ms: u64, config_path: Option<&Path>) -> Result<()> {
    let palette = Config::load_or_default(config_path)?.resolve()?;
    let schedule = SharedSchedule::default();
    let (tx, rx) = mpsc::channel();

    #[cfg(not(windows))]
    {
        let tx = tx.clone();
        ctrlc::set_handler(move || {
            let _ = tx.send(Event::Shutdown);
        })
        .ok();
    }

    println!("recstick — recording-status indicator (reading events from stdin)");
    println!("  init | preview | recording | paused | error | upcoming");
    println!("  next=<secs> announces the next scheduled recording, quit exits");
    println!();

    let reader_schedule = schedule.clone();
    let reader = std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_line(&line) {
                // `upcoming` is a notification, not a recorder status push.
                Some(WatchCommand::Status(Status::Upcoming)) => {
                    if tx.send(Event::Upcoming).is_err() {
                        return;
                    }
                }
                Some(WatchCommand::Status(status)) => {
                    if tx.send(Event::Status(status)).is_err() {
                        return;
                    }
                }
                Some(WatchCommand::Next(offset)) => {
                    reader_schedule.set(offset.map(|d| SystemTime::now() + d));
                    // React now instead of waiting for the next repaint.
                    if tx.send(Event::Tick).is_err() {
                        return;
                    }
                }
                Some(WatchCommand::Quit) => {
                    let _ = tx.send(Event::Shutdown);
                    return;
                }
                None => {}
            }
        }
        // EOF behaves like quit.
        let _ = tx.send(Event::Shutdown);
    });

    let coordinator = StatusCoordinator::new(&palette, UsbSource);
    runtime::run(coordinator, &rx, &schedule, Duration::from_millis(tick_ms));

    // After Ctrl+C the reader may still be blocked on stdin; detach rather
    // than join, process exit reclaims it.
    drop(reader);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_words_and_aliases() {
        assert_eq!(
            parse_line("recording"),
            Some(WatchCommand::Status(Status::Recording))
        );
        assert_eq!(
            parse_line("  rec  "),
            Some(WatchCommand::Status(Status::Recording))
        );
        assert_eq!(
            parse_line("paused"),
            Some(WatchCommand::Status(Status::Paused))
        );
        assert_eq!(
            parse_line("upcoming"),
            Some(WatchCommand::Status(Status::Upcoming))
        );
    }

    #[test]
    fn parses_schedule_offsets() {
        assert_eq!(
            parse_line("next=90"),
            Some(WatchCommand::Next(Some(Duration::from_secs(90))))
        );
        assert_eq!(parse_line("next="), Some(WatchCommand::Next(None)));
        assert_eq!(parse_line("next=soon"), None);
    }

    #[test]
    fn parses_quit() {
        assert_eq!(parse_line("quit"), Some(WatchCommand::Quit));
    }

    #[test]
    fn skips_blanks_comments_and_garbage() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# a comment"), None);
        assert_eq!(parse_line("frobnicate"), None);
    }

    #[test]
    fn shared_schedule_round_trips() {
        let schedule = SharedSchedule::default();
        assert_eq!(schedule.next_recording_start(), None);

        let start = SystemTime::now() + Duration::from_secs(30);
        schedule.set(Some(start));
        assert_eq!(schedule.next_recording_start(), Some(start));

        schedule.set(None);
        assert_eq!(schedule.next_recording_start(), None);
    }
}
