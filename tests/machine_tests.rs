// Instruction-semantics tests, driven through the assembled pipeline so the
// encodings, executor and timeline all agree.

use mimatty::machine::exec::{Executor, DEFAULT_MAX_STEPS};
use mimatty::machine::instruction::Instruction;
use mimatty::machine::state::ACCU;
use mimatty::machine::{to_signed, VALUE_MASK};
use mimatty::parser::assembler::assemble;
use mimatty::timeline::Timeline;

/// Assemble, run to completion, and return the timeline at the final step.
fn run_to_end(source: &str) -> Timeline {
    let program = assemble(source).expect("assembly failed");
    let mut executor = Executor::new(&program);
    executor.run(DEFAULT_MAX_STEPS).expect("program should halt");
    let mut timeline = Timeline::new(
        executor.into_log(),
        source.to_string(),
        program.label_map,
        program.commands,
        &program.initial_values,
    );
    timeline.set_position(timeline.count_steps() as i64);
    timeline
}

#[test]
fn test_not_complements_all_24_bits() {
    let timeline = run_to_end("LDC 0\nNOT\nHALT\n");
    assert_eq!(timeline.get(ACCU), VALUE_MASK);
    assert_eq!(to_signed(timeline.get(ACCU)), -1);
}

#[test]
fn test_rar_rotates_bit_zero_to_the_top() {
    let timeline = run_to_end("LDC 1\nRAR\nHALT\n");
    assert_eq!(timeline.get(ACCU), 0x80_0000);
}

#[test]
fn test_add_wraps_at_24_bits() {
    // ACCU = -1 (all ones), plus 1, wraps to 0.
    let timeline = run_to_end("LDC 0\nNOT\nADD one\nHALT\none: DS 1\n");
    assert_eq!(timeline.get(ACCU), 0);
}

#[test]
fn test_bitwise_instructions() {
    let timeline = run_to_end("LDC 0xF0\nAND m\nHALT\nm: DS 0x3C\n");
    assert_eq!(timeline.get(ACCU), 0x30);

    let timeline = run_to_end("LDC 0xF0\nOR m\nHALT\nm: DS 0x0F\n");
    assert_eq!(timeline.get(ACCU), 0xFF);

    let timeline = run_to_end("LDC 0xFF\nXOR m\nHALT\nm: DS 0x0F\n");
    assert_eq!(timeline.get(ACCU), 0xF0);
}

#[test]
fn test_eql_produces_all_ones_or_zero() {
    let timeline = run_to_end("LDC 7\nEQL m\nHALT\nm: DS 7\n");
    assert_eq!(timeline.get(ACCU), VALUE_MASK);

    let timeline = run_to_end("LDC 7\nEQL m\nHALT\nm: DS 8\n");
    assert_eq!(timeline.get(ACCU), 0);
}

#[test]
fn test_jmn_only_jumps_on_negative() {
    // Positive ACCU falls through to the STV.
    let timeline = run_to_end(
        "LDC 1\nJMN skip\nLDC 5\nSTV out\nskip: HALT\nout: DS 0\n",
    );
    let out = timeline.label_map()["out"];
    assert_eq!(timeline.get(out), 5);

    // Negative ACCU takes the jump and the STV never runs.
    let timeline = run_to_end(
        "LDC 0\nNOT\nJMN skip\nLDC 5\nSTV out\nskip: HALT\nout: DS 0\n",
    );
    let out = timeline.label_map()["out"];
    assert_eq!(timeline.get(out), 0);
}

#[test]
fn test_stv_and_ldv_round_trip_through_memory() {
    let timeline = run_to_end("LDC 123\nSTV cell\nLDC 0\nLDV cell\nHALT\ncell: DS 0\n");
    assert_eq!(timeline.get(ACCU), 123);
}

#[test]
fn test_command_encoding_round_trip() {
    let program = assemble("START: LDV 0x123\nHALT\n").expect("assembly failed");
    assert_eq!(program.commands[0].instruction, Instruction::Ldv(0x123));
    assert_eq!(program.commands[0].encoding(), (0x1 << 20) | 0x123);
    assert_eq!(program.commands[1].encoding(), 0xF0 << 16);
}

#[test]
fn test_code_is_visible_in_memory_image() {
    // The memory cell at a command's address holds the command's encoding.
    let program = assemble("START: HALT\n").expect("assembly failed");
    let mut executor = Executor::new(&program);
    executor.run(DEFAULT_MAX_STEPS).expect("program should halt");
    let timeline = Timeline::new(
        executor.into_log(),
        String::new(),
        program.label_map,
        program.commands.clone(),
        &program.initial_values,
    );
    assert_eq!(timeline.get(0), program.commands[0].encoding());
}
