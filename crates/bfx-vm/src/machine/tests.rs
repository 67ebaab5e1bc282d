use super::*;

fn run(code: &str) -> Machine {
    let mut m = Machine::new(MachineOptions::default());
    m.run(code).expect("run failed");
    m
}

#[test]
fn cells_wrap() {
    let m = run("-");
    assert_eq!(m.cell(0), 255);
    let m = run(&"+".repeat(256));
    assert_eq!(m.cell(0), 0);
}

#[test]
fn tape_grows_right() {
    let m = run(&">".repeat(100));
    assert_eq!(m.pointer(), 100);
    assert_eq!(m.cell(100), 0);
    assert_eq!(m.cell(5000), 0);
}

#[test]
fn loops_skip_and_repeat() {
    // 3 * 4 into cell 1
    let m = run("+++[>++++<-]");
    assert_eq!(m.cell(0), 0);
    assert_eq!(m.cell(1), 12);
    let m = run("[>+<]>+");
    assert_eq!(m.cell(1), 1);
}

#[test]
fn io_ops() {
    let mut m = Machine::new(MachineOptions::default()).with_input(b"A");
    m.run(",.+.,.").unwrap();
    assert_eq!(m.output(), &[b'A', b'B', 0]);
}

#[test]
fn comments_are_ignored() {
    let m = run("set + to one\n");
    assert_eq!(m.cell(0), 1);
}

#[test]
fn underflow_is_an_error() {
    let mut m = Machine::new(MachineOptions::default());
    assert_eq!(m.run("><<"), Err(VmError::PointerUnderflow(2)));
}

#[test]
fn unmatched_brackets() {
    let mut m = Machine::new(MachineOptions::default());
    assert_eq!(m.run("[+"), Err(VmError::UnmatchedOpen(0)));
    assert_eq!(m.run("+]"), Err(VmError::UnmatchedClose(1)));
}

#[test]
fn step_limit_stops_infinite_loops() {
    let mut m = Machine::new(MachineOptions {
        step_limit: Some(1000),
        ..MachineOptions::default()
    });
    assert_eq!(m.run("+[]"), Err(VmError::StepLimit(1000)));
}

#[test]
fn steps_count_executed_ops() {
    // `[` once, then `-` and `]` for each of the three passes
    let m = run("+++[-]");
    assert_eq!(m.steps(), 3 + 1 + 2 * 3);
    let m = run("[-]");
    assert_eq!(m.steps(), 1);
}
