use super::*;

#[test]
fn null_progress_accepts_any_call_sequence() {
    let mut p = NullProgress;
    p.start(Some(100), "file.bin");
    p.update(50, Some(1));
    p.finish();
}

#[test]
fn terminal_progress_handles_unknown_total() {
    let mut p = TerminalProgress::new();
    p.start(None, "stdin");
    p.update(10, None);
    p.finish();
}
