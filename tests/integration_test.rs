// Integration tests for the full pipeline: assemble → execute → navigate

use mimatty::machine::errors::ExecError;
use mimatty::machine::exec::{Executor, DEFAULT_MAX_STEPS};
use mimatty::machine::state::{ACCU, IAR};
use mimatty::parser::assembler::assemble;
use mimatty::timeline::Timeline;
use std::fs;
use std::path::Path;

/// Assemble and execute `source`, returning the timeline at position 0 and
/// the executor's verdict.
fn build_timeline(source: &str, max_steps: usize) -> (Timeline, Result<(), ExecError>) {
    let program = assemble(source).expect("assembly failed");
    let mut executor = Executor::new(&program);
    let verdict = executor.run(max_steps);
    let timeline = Timeline::new(
        executor.into_log(),
        source.to_string(),
        program.label_map,
        program.commands,
        &program.initial_values,
    );
    (timeline, verdict)
}

const SUM_SOURCE: &str = r#"
START:  LDC 0
        STV sum
        LDC 5
        STV i
LOOP:   LDV i
        EQL zero
        JMN END
        LDV sum
        ADD i
        STV sum
        LDV i
        ADD minus1
        STV i
        JMP LOOP
END:    HALT
zero:   DS 0
minus1: DS -1
sum:    DS 0
i:      DS 0
"#;

#[test]
fn test_sum_program_end_to_end() {
    let (mut timeline, verdict) = build_timeline(SUM_SOURCE, DEFAULT_MAX_STEPS);
    verdict.expect("program should halt");

    let sum = timeline.label_map()["sum"];
    let i = timeline.label_map()["i"];

    // Prologue (4) + five full iterations (10 each) + exit check (3) + HALT.
    assert_eq!(timeline.count_steps(), 58);

    // Before any navigation the state is the initial one.
    assert_eq!(timeline.position(), 0);
    assert_eq!(timeline.get(sum), 0);
    assert_eq!(timeline.get(i), 0);
    assert_eq!(timeline.get(IAR), timeline.label_map()["START"]);

    // At the end: 5 + 4 + 3 + 2 + 1.
    timeline.set_position(timeline.count_steps() as i64);
    assert_eq!(timeline.get(sum), 15);
    assert_eq!(timeline.get(i), 0);
    // The halted IAR points past the code, at data.
    assert!(timeline.find_current_command().is_none());

    // Back to the start restores the initial state exactly.
    timeline.set_position(0);
    assert_eq!(timeline.get(sum), 0);
    assert_eq!(timeline.get(i), 0);
    assert_eq!(timeline.get(ACCU), 0);
    assert_eq!(timeline.get(IAR), timeline.label_map()["START"]);
}

#[test]
fn test_sum_program_mid_run_navigation() {
    let (mut timeline, verdict) = build_timeline(SUM_SOURCE, DEFAULT_MAX_STEPS);
    verdict.expect("program should halt");

    let sum = timeline.label_map()["sum"];
    let i = timeline.label_map()["i"];

    // After the prologue and one full iteration: sum = 5, i = 4.
    timeline.set_position(14);
    assert_eq!(timeline.get(sum), 5);
    assert_eq!(timeline.get(i), 4);

    // Jump around and return; the state must be bit-identical.
    timeline.set_position(timeline.count_steps() as i64);
    timeline.set_position(3);
    timeline.set_position(14);
    assert_eq!(timeline.get(sum), 5);
    assert_eq!(timeline.get(i), 4);

    // The current command's line maps back into the source text.
    let command = timeline.find_current_command().expect("command at IAR");
    assert!(timeline.source().lines().count() >= command.line);
}

#[test]
fn test_indirect_addressing() {
    let source = r#"
START:  LDC 0x20
        STV ptr
        LDC 7
        STIV ptr        ; mem[0x20] := 7
        LDC 0
        LDIV ptr        ; ACCU := mem[0x20]
        HALT
ptr:    DS 0
"#;
    let (mut timeline, verdict) = build_timeline(source, DEFAULT_MAX_STEPS);
    verdict.expect("program should halt");

    timeline.set_position(timeline.count_steps() as i64);
    assert_eq!(timeline.get(0x20), 7);
    assert_eq!(timeline.get(ACCU), 7);

    // Undo the indirect store as well.
    timeline.set_position(0);
    assert_eq!(timeline.get(0x20), 0);
}

#[test]
fn test_missing_halt_yields_partial_history() {
    // One instruction, then the IAR runs into undefined memory.
    let (mut timeline, verdict) = build_timeline("LDC 1\n", DEFAULT_MAX_STEPS);

    match verdict {
        Err(ExecError::NoCommand { address, step }) => {
            assert_eq!(address, 1);
            assert_eq!(step, 1);
        }
        other => panic!("expected NoCommand, got {:?}", other),
    }

    // The step that did execute is still navigable.
    assert_eq!(timeline.count_steps(), 1);
    timeline.set_position(1);
    assert_eq!(timeline.get(ACCU), 1);
    timeline.set_position(0);
    assert_eq!(timeline.get(ACCU), 0);
}

#[test]
fn test_step_limit_is_enforced() {
    let (timeline, verdict) = build_timeline("LOOP: JMP LOOP\n", 10);
    assert_eq!(verdict, Err(ExecError::StepLimitExceeded { limit: 10 }));
    assert_eq!(timeline.count_steps(), 10);
}

#[test]
fn test_demo_file_assembles_and_halts() {
    let path = Path::new("demos/sum.mima");
    let source = fs::read_to_string(path).expect("Failed to read demo file");

    let (mut timeline, verdict) = build_timeline(&source, DEFAULT_MAX_STEPS);
    verdict.expect("demo should halt");

    let sum = timeline.label_map()["sum"];
    timeline.set_position(timeline.count_steps() as i64);
    assert_eq!(timeline.get(sum), 15);
}
