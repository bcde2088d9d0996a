use crate::params::Subdivision;
use crossbeam::channel::Receiver;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::thread;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub tempo_bpm: Option<f64>,
    pub effective_bpm: Option<f64>,
    pub is_playing: bool,
    pub time: Subdivision,
    pub on_beat: usize,
    pub off_beat: usize,
    pub pending_note_offs: usize,
}

pub fn create_status_spinner() -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix("Repeat");
    pb
}

pub fn format_status(status: &StatusSnapshot) -> String {
    let tempo = match status.tempo_bpm {
        Some(bpm) => format!("{:.1}", bpm),
        None => "--".to_string(),
    };
    let locked = match status.effective_bpm {
        Some(bpm) => format!("{:.1}", bpm),
        None => "--".to_string(),
    };

    format!(
        "BPM: {} (locked {}) | {} | Time: {} | On: {} Off: {} | Pending: {}",
        tempo,
        locked,
        if status.is_playing { "Playing" } else { "Stopped" },
        status.time,
        status.on_beat,
        status.off_beat,
        status.pending_note_offs
    )
}

/// Renders snapshots until the sending side goes away.
pub fn run_status_display(rx: Receiver<StatusSnapshot>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let spinner = create_status_spinner();
        while let Ok(status) = rx.recv() {
            spinner.set_message(format_status(&status));
            spinner.tick();
        }
        spinner.finish_and_clear();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            tempo_bpm: Some(120.0),
            effective_bpm: None,
            is_playing: true,
            time: Subdivision::EighthDotted,
            on_beat: 2,
            off_beat: 1,
            pending_note_offs: 3,
        }
    }

    #[test]
    fn test_format_status() {
        assert_eq!(
            format_status(&snapshot()),
            "BPM: 120.0 (locked --) | Playing | Time: 1/8 dotted | On: 2 Off: 1 | Pending: 3"
        );
    }

    #[test]
    fn test_spinner_has_no_length() {
        let spinner = create_status_spinner();
        assert!(spinner.length().is_none());
    }

    #[test]
    fn test_display_thread_exits_when_sender_drops() {
        let (tx, rx) = crossbeam::channel::bounded(1);
        let handle = run_status_display(rx);
        tx.send(snapshot()).unwrap();
        drop(tx);
        handle.join().unwrap();
    }
}
