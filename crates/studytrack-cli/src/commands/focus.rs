//! Focus timer commands.
//!
//! Every invocation builds a fresh timer over the database and recovers the
//! persisted session first, so a session started by one command is picked up
//! by the next one.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Timelike, Utc};
use clap::Subcommand;
use studytrack_core::timer::{CapabilityError, NoopWakeLock, Notification, Permission};
use studytrack_core::{
    Config, Database, Event, FocusState, FocusTimer, KvTimerStore, Notifier, SessionRecord,
    SystemClock, TimerStore,
};

use super::{print_json, resolve_category, CmdResult};

const MIN_TICK_INTERVAL_MS: u64 = 100;

#[derive(Subcommand)]
pub enum FocusAction {
    /// Start a focus session
    Start {
        /// Category to study (defaults to `default_category`)
        #[arg(long)]
        category: Option<String>,
        /// Session length in minutes, clamped to 1-60
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Print the current focus state as JSON
    Status,
    /// Pause or resume the running session
    Pause,
    /// Abandon the current session
    Cancel {
        /// Log the whole minutes studied so far
        #[arg(long)]
        save: bool,
    },
    /// Follow the current session until it ends
    Watch {
        /// Start another round of the same length when one completes
        #[arg(long)]
        another: bool,
    },
}

/// Rings the terminal bell and prints to stderr.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn show(&mut self, notification: &Notification) -> Result<(), CapabilityError> {
        eprintln!("\x07{}: {}", notification.title, notification.body);
        Ok(())
    }
}

fn build_timer<'a>(db: &'a Database, config: &Config) -> FocusTimer<KvTimerStore<'a>> {
    let timer = FocusTimer::new(KvTimerStore::new(db), Arc::new(SystemClock))
        .with_default_minutes(config.focus_minutes())
        .with_wake_lock(Box::new(NoopWakeLock));
    if config.notifications.enabled {
        timer.with_notifier(Box::new(TerminalNotifier))
    } else {
        timer
    }
}

/// Credit studied minutes to a category's log.
///
/// The record lands on the local date the session ended and remembers the
/// local hour it started.
fn credit(
    db: &Database,
    category: &str,
    minutes: u32,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
) -> Result<SessionRecord, Box<dyn std::error::Error>> {
    let date = ended_at.with_timezone(&Local).date_naive();
    let start_hour = started_at.with_timezone(&Local).hour() as u8;

    let mut log = db.load_log(category)?;
    let record = log.apply_focus(
        date,
        minutes,
        Some(start_hour),
        ended_at.timestamp_millis().max(0) as u64,
    )?;
    db.save_log(&log)?;
    tracing::info!(category, minutes, %date, "focus minutes logged");
    Ok(record)
}

fn credit_committed(db: &Database, event: &Event) -> CmdResult {
    if let Event::SessionCommitted {
        category,
        minutes,
        started_at,
        ended_at,
        ..
    } = event
    {
        credit(db, category, *minutes, *started_at, *ended_at)?;
    }
    Ok(())
}

/// Print `event` and settle the session if it just completed.
fn settle(
    db: &Database,
    config: &Config,
    timer: &mut FocusTimer<KvTimerStore<'_>>,
    event: &Event,
) -> CmdResult {
    print_json(event)?;
    if timer.state() == FocusState::Completed {
        settle_completed(db, config, timer)?;
    }
    Ok(())
}

fn recover(
    db: &Database,
    config: &Config,
    timer: &mut FocusTimer<KvTimerStore<'_>>,
) -> CmdResult {
    if let Some(event) = timer.recover() {
        settle(db, config, timer, &event)?;
    }
    Ok(())
}

pub fn run(action: FocusAction) -> CmdResult {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut timer = build_timer(&db, &config);
    recover(&db, &config, &mut timer)?;

    match action {
        FocusAction::Start { category, minutes } => {
            let category = resolve_category(category, &config)?;
            if !db.has_category(&category)? {
                return Err(format!("unknown category: {category}").into());
            }
            timer.set_category(&category)?;
            if let Some(minutes) = minutes {
                timer.select_duration(minutes)?;
            }
            print_json(&timer.start()?)?;
        }
        FocusAction::Status => {
            if let Some(event) = timer.tick() {
                settle(&db, &config, &mut timer, &event)?;
            }
            print_json(&timer.snapshot())?;
        }
        FocusAction::Pause => {
            print_json(&timer.toggle_pause()?)?;
        }
        FocusAction::Cancel { save } => {
            let event = timer.cancel()?;
            print_json(&event)?;
            if let Event::FocusCancelled {
                category,
                partial_minutes,
                started_at,
                at,
                ..
            } = &event
            {
                if save && *partial_minutes > 0 {
                    let record = credit(&db, category, *partial_minutes, *started_at, *at)?;
                    print_json(&record)?;
                }
            }
        }
        FocusAction::Watch { another } => {
            if !matches!(timer.state(), FocusState::Running | FocusState::Paused) {
                return Err("no focus session in progress".into());
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(watch(&db, &config, timer, another))?;
        }
    }
    Ok(())
}

/// Tick until the session ends or Ctrl-C.
///
/// Another process may pause, resume or cancel the session meanwhile; when
/// the persisted record changes the timer is rebuilt from it.
async fn watch<'a>(
    db: &'a Database,
    config: &Config,
    mut timer: FocusTimer<KvTimerStore<'a>>,
    another: bool,
) -> CmdResult {
    let period = Duration::from_millis(config.focus.tick_interval_ms.max(MIN_TICK_INTERVAL_MS));
    let mut ticker = tokio::time::interval(period);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut last_seen = timer.store().load();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                eprintln!();
                tracing::info!("watch stopped, session left as is");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let current = timer.store().load();
        if current != last_seen {
            timer = build_timer(db, config);
            recover(db, config, &mut timer)?;
            last_seen = timer.store().load();
        }

        if let Some(event) = timer.tick() {
            eprintln!();
            print_json(&event)?;
            if another {
                print_json(&start_another(db, config, &mut timer)?)?;
                last_seen = timer.store().load();
                continue;
            }
            settle_completed(db, config, &mut timer)?;
            return Ok(());
        }

        match timer.state() {
            FocusState::Running => eprint!(
                "\r{}  {} remaining ",
                timer.category(),
                format_clock(timer.remaining_secs())
            ),
            FocusState::Paused => eprint!(
                "\r{}  paused at {}  ",
                timer.category(),
                format_clock(timer.remaining_secs())
            ),
            FocusState::Idle | FocusState::Completed => {
                eprintln!();
                return Ok(());
            }
        }
    }
}

/// Log a completed session, or let it go when `focus.auto_commit` is off.
fn settle_completed(
    db: &Database,
    config: &Config,
    timer: &mut FocusTimer<KvTimerStore<'_>>,
) -> CmdResult {
    if config.focus.auto_commit {
        if let Some(committed) = timer.commit_studied()? {
            credit_committed(db, &committed)?;
            print_json(&committed)?;
        }
    } else {
        tracing::info!("auto_commit disabled, completed session not logged");
        timer.commit(0)?;
    }
    Ok(())
}

/// Settle the completed session like [`settle_completed`] and start the next
/// round with the same category and length.
fn start_another(
    db: &Database,
    config: &Config,
    timer: &mut FocusTimer<KvTimerStore<'_>>,
) -> Result<Event, Box<dyn std::error::Error>> {
    if !config.focus.auto_commit {
        settle_completed(db, config, timer)?;
        return Ok(timer.start()?);
    }
    let (committed, started) = timer.commit_and_restart()?;
    if let Some(committed) = committed {
        credit_committed(db, &committed)?;
        print_json(&committed)?;
    }
    Ok(started)
}

/// `mm:ss`
fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use studytrack_core::ManualClock;

    use super::*;

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(25 * 60 + 7), "25:07");
        assert_eq!(format_clock(60 * 60), "60:00");
    }

    #[test]
    fn credit_merges_into_the_same_day() {
        let db = Database::open_memory().unwrap();
        db.add_category("Math").unwrap();
        let started_at = Utc::now() - chrono::Duration::minutes(30);
        let at = Utc::now();

        credit(&db, "Math", 25, started_at, at).unwrap();
        let record = credit(&db, "Math", 5, started_at, at).unwrap();

        assert_eq!(record.minutes, 30);
        assert!(record.completed);
        assert_eq!(db.load_log("Math").unwrap().records().len(), 1);
    }

    fn completed_timer<'a>(
        db: &'a Database,
        clock: &ManualClock,
    ) -> FocusTimer<KvTimerStore<'a>> {
        db.add_category("Math").unwrap();
        let mut timer = FocusTimer::new(KvTimerStore::new(db), Arc::new(clock.clone()))
            .with_default_minutes(10);
        timer.set_category("Math").unwrap();
        timer.start().unwrap();
        clock.advance_secs(10 * 60);
        assert!(timer.tick().is_some());
        timer
    }

    #[test]
    fn another_round_skips_logging_without_auto_commit() {
        let db = Database::open_memory().unwrap();
        let clock = ManualClock::new(1_700_000_000_000);
        let mut timer = completed_timer(&db, &clock);
        let mut config = Config::default();
        config.focus.auto_commit = false;

        let started = start_another(&db, &config, &mut timer).unwrap();

        assert!(matches!(started, Event::FocusStarted { duration_secs: 600, .. }));
        assert_eq!(timer.state(), FocusState::Running);
        assert!(db.load_log("Math").unwrap().records().is_empty());
    }

    #[test]
    fn another_round_logs_with_auto_commit() {
        let db = Database::open_memory().unwrap();
        let clock = ManualClock::new(1_700_000_000_000);
        let mut timer = completed_timer(&db, &clock);

        start_another(&db, &Config::default(), &mut timer).unwrap();

        assert_eq!(timer.state(), FocusState::Running);
        let log = db.load_log("Math").unwrap();
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].minutes, 10);
    }

    #[test]
    fn late_commit_is_dated_by_the_session_end() {
        let db = Database::open_memory().unwrap();
        db.add_category("Math").unwrap();
        let ended_at = Utc::now() - chrono::Duration::days(3);
        let committed = Event::SessionCommitted {
            category: "Math".to_string(),
            minutes: 25,
            started_at: ended_at - chrono::Duration::minutes(25),
            ended_at,
            at: Utc::now(),
        };

        credit_committed(&db, &committed).unwrap();

        let log = db.load_log("Math").unwrap();
        assert_eq!(
            log.records()[0].date,
            ended_at.with_timezone(&Local).date_naive()
        );
    }

    #[test]
    fn credit_to_unknown_category_fails() {
        let db = Database::open_memory().unwrap();
        assert!(credit(&db, "Nope", 10, Utc::now(), Utc::now()).is_err());
    }
}
