//! zcompare 命令行：`zcompare <old> <new>`
//!
//! 在内存宿主中打开两个文件、比较并输出带标记的对齐结果。
//! 退出码与 diff 一致：0 相同，1 不同，2 出错。

use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use zcompare::kernel::services::adapters::{
    load_config, LineDiffEngine, MemoryHost, ScriptedPrompt,
};
use zcompare::kernel::services::ports::{DiffEngine, DocumentControl, HostShell, UserPrompt};
use zcompare::kernel::{CompareOutcome, CompareSession};
use zcompare::models::{DiffMask, ViewId};

mod logging;

const MAX_TICKS: usize = 64;

fn marker_char(mask: DiffMask) -> char {
    if mask.contains(DiffMask::MOVED) {
        '>'
    } else if mask.contains(DiffMask::CHANGED) {
        '~'
    } else if mask.contains(DiffMask::ADDED) {
        '+'
    } else if mask.contains(DiffMask::REMOVED) {
        '-'
    } else {
        ' '
    }
}

fn print_view(host: &MemoryHost, view: ViewId) {
    let Some(buffer) = host.buffer_in_view(view) else {
        return;
    };
    println!("=== {} ({:?})", host.full_path(buffer), view);
    for line in 0..host.line_count(view) {
        for _ in 0..host.padding_before(view, line) {
            println!("  |");
        }
        println!(
            "{} | {}",
            marker_char(host.markers(view, line)),
            host.line_text(view, line)
        );
    }
    for _ in 0..host.padding_before(view, host.line_count(view)) {
        println!("  |");
    }
}

fn pump<E, P>(session: &mut CompareSession<E, P>, host: &mut MemoryHost, now: Instant)
where
    E: DiffEngine,
    P: UserPrompt,
{
    while let Some(notification) = host.poll_notification() {
        session.notify(host, notification, now);
    }
}

fn read(path: &str) -> Option<String> {
    match std::fs::read_to_string(Path::new(path)) {
        Ok(text) => Some(text),
        Err(e) => {
            eprintln!("zcompare: {}: {}", path, e);
            None
        }
    }
}

fn main() -> ExitCode {
    let _logging = logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [old_path, new_path] = args.as_slice() else {
        eprintln!("usage: zcompare <old> <new>");
        return ExitCode::from(2);
    };

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to default settings");
            Default::default()
        }
    };

    let (Some(old_text), Some(new_text)) = (read(old_path), read(new_path)) else {
        return ExitCode::from(2);
    };

    let old_view = config.old_file_view;
    let mut session = CompareSession::new(config, LineDiffEngine::new(), ScriptedPrompt::new(false));
    let mut host = MemoryHost::new();
    host.attach_lock(session.notification_lock());
    host.open_saved(old_view, old_path, &old_text);
    host.open_saved(old_view.other(), new_path, &new_text);

    let mut now = Instant::now();
    pump(&mut session, &mut host, now);
    let outcome = match session.compare(&mut host, now) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("zcompare: {}", e);
            return ExitCode::from(2);
        }
    };

    for _ in 0..MAX_TICKS {
        pump(&mut session, &mut host, now);
        if session.scheduler().is_idle() {
            break;
        }
        now = session
            .scheduler()
            .next_deadline()
            .unwrap_or(now + Duration::from_millis(1));
        session.tick(&mut host, now);
    }

    for notice in session.prompt().notices() {
        println!("{}", notice);
    }

    match outcome {
        CompareOutcome::Mismatch => {
            print_view(&host, ViewId::Main);
            print_view(&host, ViewId::Sub);
            if !host.status().is_empty() {
                println!("{}", host.status());
            }
            ExitCode::from(1)
        }
        CompareOutcome::MatchRemoved | CompareOutcome::MatchKept => ExitCode::SUCCESS,
    }
}
